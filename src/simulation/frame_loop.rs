//! Per-frame orchestration of reinitialization, dispatch sizing, the update
//! pass, buffer relabeling and the draw submission.
//!
//! The loop never talks to the GPU itself. Each step returns a [`FramePlan`]
//! that the renderer encodes verbatim, so the ordering and the slot
//! assignments can be checked without a device.

use std::fmt;

use log::{debug, info};
use thiserror::Error;

use crate::simulation::buffer_ring::{BufferRing, Role};
use crate::simulation::commands::{FramePlan, GpuCommand};
use crate::simulation::dispatch::DispatchPlanner;
use crate::simulation::input::{ParamEdit, apply_edits};
use crate::simulation::params::ParameterSet;
use crate::simulation::reset::{ResetCause, ResetController};
use crate::simulation::types::{Capabilities, INIT_DISPATCH_GROUPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Ready,
    ShuttingDown,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Uninitialized => "uninitialized",
            LoopState::Ready => "ready",
            LoopState::ShuttingDown => "shutting down",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame loop is {state}, expected ready")]
    NotReady { state: LoopState },
}

pub struct FrameLoop {
    state: LoopState,
    params: ParameterSet,
    reset: ResetController,
    planner: DispatchPlanner,
    ring: BufferRing,
    frame: u64,
}

impl FrameLoop {
    pub fn new(capabilities: Capabilities) -> Self {
        let params = ParameterSet::default();
        Self {
            state: LoopState::Uninitialized,
            params,
            reset: ResetController::new(&params),
            planner: DispatchPlanner::new(capabilities.indirect),
            ring: BufferRing::new(),
            frame: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn ring(&self) -> &BufferRing {
        &self.ring
    }

    pub fn uses_indirect(&self) -> bool {
        self.planner.uses_indirect()
    }

    /// Enters `Ready` and plans the initial fill of the particle buffers.
    pub fn start(&mut self) -> Result<FramePlan, FrameError> {
        if self.state != LoopState::Uninitialized {
            return Err(FrameError::NotReady { state: self.state });
        }
        self.state = LoopState::Ready;
        info!(
            "Simulation ready: preset shape {}, indirect {}",
            self.params.initial_shape.name(),
            if self.planner.indirect_supported() {
                "available"
            } else {
                "unavailable"
            }
        );

        Ok(FramePlan {
            frame: self.frame,
            reset: Some(ResetCause::Startup),
            commands: vec![
                GpuCommand::UploadParams(self.params),
                GpuCommand::Initialize {
                    targets: self.ring.init_targets(),
                    groups: INIT_DISPATCH_GROUPS,
                },
            ],
        })
    }

    /// Applies this frame's edits and plans its submissions.
    pub fn advance(&mut self, edits: &[ParamEdit]) -> Result<FramePlan, FrameError> {
        if self.state != LoopState::Ready {
            return Err(FrameError::NotReady { state: self.state });
        }

        let outcome = apply_edits(self.params, edits);
        if outcome.indirect_toggled {
            self.planner.toggle_indirect();
        }

        let decision =
            self.reset
                .resolve(outcome.params, outcome.selected_shape, outcome.reset_requested);
        self.params = decision.params;

        let mut commands = Vec::with_capacity(5);
        commands.push(GpuCommand::UploadParams(self.params));

        if let Some(cause) = decision.cause {
            info!("Reinitializing particles ({cause:?})");
            commands.push(GpuCommand::Initialize {
                targets: self.ring.init_targets(),
                groups: INIT_DISPATCH_GROUPS,
            });
        }

        let work = self.planner.plan(&self.params);
        if self.planner.uses_indirect() {
            commands.push(GpuCommand::ComputeIndirectArgs);
        }

        commands.push(GpuCommand::Update {
            bindings: self.ring.update_bindings(),
            work,
        });

        self.ring.swap();

        commands.push(GpuCommand::Draw {
            instances: self.ring.readable(Role::Current),
            work,
        });

        self.frame += 1;
        debug!("Frame {} planned with {work:?}", self.frame);

        Ok(FramePlan {
            frame: self.frame,
            reset: decision.cause,
            commands,
        })
    }

    /// Final transition. Only valid between frames; idempotent.
    pub fn shutdown(&mut self) {
        if self.state != LoopState::ShuttingDown {
            info!("Simulation shutting down after {} frames", self.frame);
            self.state = LoopState::ShuttingDown;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::buffer_ring::Slot;
    use crate::simulation::dispatch::WorkSize;

    fn ready_loop(capabilities: Capabilities) -> FrameLoop {
        let mut frame_loop = FrameLoop::new(capabilities);
        frame_loop.start().expect("fresh loop starts");
        frame_loop
    }

    #[test]
    fn startup_plans_full_initialization() {
        let mut frame_loop = FrameLoop::new(Capabilities::FULL);
        let plan = frame_loop.start().expect("fresh loop starts");

        assert_eq!(frame_loop.state(), LoopState::Ready);
        assert_eq!(plan.reset, Some(ResetCause::Startup));
        assert_eq!(
            plan.commands[1],
            GpuCommand::Initialize {
                targets: frame_loop.ring().init_targets(),
                groups: 64
            }
        );
        assert_eq!(frame_loop.ring().swap_count(), 0);
    }

    #[test]
    fn advance_before_start_is_rejected() {
        let mut frame_loop = FrameLoop::new(Capabilities::FULL);
        assert_eq!(
            frame_loop.advance(&[]),
            Err(FrameError::NotReady {
                state: LoopState::Uninitialized
            })
        );
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut frame_loop = ready_loop(Capabilities::FULL);
        assert!(frame_loop.start().is_err());
    }

    #[test]
    fn frame_steps_follow_fixed_order() {
        let mut frame_loop = ready_loop(Capabilities::FULL);
        let plan = frame_loop
            .advance(&[ParamEdit::Reset, ParamEdit::ToggleIndirect])
            .expect("ready loop advances");

        let kinds: Vec<&str> = plan
            .commands
            .iter()
            .map(|command| match command {
                GpuCommand::UploadParams(_) => "upload",
                GpuCommand::Initialize { .. } => "init",
                GpuCommand::ComputeIndirectArgs => "indirect",
                GpuCommand::Update { .. } => "update",
                GpuCommand::Draw { .. } => "draw",
            })
            .collect();
        assert_eq!(kinds, ["upload", "init", "indirect", "update", "draw"]);
    }

    #[test]
    fn draw_reads_freshly_written_slot() {
        let mut frame_loop = ready_loop(Capabilities::FULL);
        let plan = frame_loop.advance(&[]).expect("ready loop advances");

        let (bindings, instances) = match (&plan.commands[1], &plan.commands[2]) {
            (GpuCommand::Update { bindings, .. }, GpuCommand::Draw { instances, .. }) => {
                (*bindings, *instances)
            }
            other => panic!("unexpected commands {other:?}"),
        };
        assert_eq!(bindings.current_read, Slot::A);
        assert_eq!(bindings.current_write, Slot::B);
        assert_eq!(instances, bindings.current_write);
    }

    #[test]
    fn reinit_writes_what_update_reads() {
        let mut frame_loop = ready_loop(Capabilities::FULL);
        frame_loop.advance(&[]).expect("ready loop advances");
        let plan = frame_loop.advance(&[ParamEdit::Reset]).expect("ready loop advances");

        match (&plan.commands[1], &plan.commands[2]) {
            (GpuCommand::Initialize { targets, .. }, GpuCommand::Update { bindings, .. }) => {
                assert_eq!(targets.previous, bindings.previous_read);
                assert_eq!(targets.current, bindings.current_read);
                assert!(bindings.is_hazard_free());
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn indirect_unsupported_stays_direct() {
        let mut frame_loop = ready_loop(Capabilities::DIRECT_ONLY);
        let plan = frame_loop
            .advance(&[ParamEdit::ToggleIndirect])
            .expect("ready loop advances");
        assert!(!frame_loop.uses_indirect());
        assert_eq!(plan.count(|c| matches!(c, GpuCommand::ComputeIndirectArgs)), 0);
        assert_eq!(
            plan.update_work(),
            Some(WorkSize::Direct {
                groups: 32,
                items: 16384
            })
        );
    }

    #[test]
    fn shutdown_rejects_further_frames() {
        let mut frame_loop = ready_loop(Capabilities::FULL);
        frame_loop.shutdown();
        frame_loop.shutdown();
        assert_eq!(
            frame_loop.advance(&[]),
            Err(FrameError::NotReady {
                state: LoopState::ShuttingDown
            })
        );
    }
}
