use crate::simulation::buffer_ring::{InitTargets, Slot, UpdateBindings};
use crate::simulation::dispatch::WorkSize;
use crate::simulation::params::ParameterSet;
use crate::simulation::reset::ResetCause;

/// One GPU submission step, in the order the frame must encode it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GpuCommand {
    UploadParams(ParameterSet),
    /// Write fresh starting positions over the whole capacity.
    Initialize { targets: InitTargets, groups: u32 },
    /// Fill the indirect buffer for this frame's update and draw.
    ComputeIndirectArgs,
    Update { bindings: UpdateBindings, work: WorkSize },
    /// Instanced draw reading the current-role buffer in `instances`.
    Draw { instances: Slot, work: WorkSize },
}

/// The commands of one frame (or of startup) plus what led to them.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub frame: u64,
    pub reset: Option<ResetCause>,
    pub commands: Vec<GpuCommand>,
}

impl FramePlan {
    pub fn reinitializes(&self) -> bool {
        self.reset.is_some()
    }

    pub fn update_work(&self) -> Option<WorkSize> {
        self.commands.iter().find_map(|command| match command {
            GpuCommand::Update { work, .. } => Some(*work),
            _ => None,
        })
    }

    pub fn count(&self, predicate: impl Fn(&GpuCommand) -> bool) -> usize {
        self.commands.iter().filter(|command| predicate(command)).count()
    }
}
