use log::{info, warn};

use crate::simulation::params::ParameterSet;
use crate::simulation::types::{MAX_PARTICLE_COUNT, THREAD_GROUP_UPDATE_SIZE};

/// How the update pass and the draw call learn their sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkSize {
    /// Host-known counts.
    Direct { groups: u32, items: u32 },
    /// Counts read from the indirect buffer written earlier in the frame.
    Indirect,
}

/// Work items processed by a direct dispatch of `dispatch_size` groups.
pub fn direct_work_count(dispatch_size: u32) -> u32 {
    dispatch_size
        .saturating_mul(THREAD_GROUP_UPDATE_SIZE)
        .min(MAX_PARTICLE_COUNT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPlanner {
    indirect_supported: bool,
    indirect_enabled: bool,
}

impl DispatchPlanner {
    pub fn new(indirect_supported: bool) -> Self {
        Self {
            indirect_supported,
            indirect_enabled: false,
        }
    }

    pub fn indirect_supported(&self) -> bool {
        self.indirect_supported
    }

    pub fn uses_indirect(&self) -> bool {
        self.indirect_supported && self.indirect_enabled
    }

    /// Returns the resulting mode. Enabling is refused when unsupported.
    pub fn set_indirect_enabled(&mut self, enabled: bool) -> bool {
        if enabled && !self.indirect_supported {
            warn!("Indirect dispatch is not supported by this GPU; staying in direct mode");
            return false;
        }
        if self.indirect_enabled != enabled {
            info!(
                "Switching to {} dispatch",
                if enabled { "indirect" } else { "direct" }
            );
        }
        self.indirect_enabled = enabled;
        self.uses_indirect()
    }

    pub fn toggle_indirect(&mut self) -> bool {
        self.set_indirect_enabled(!self.indirect_enabled)
    }

    pub fn plan(&self, params: &ParameterSet) -> WorkSize {
        if self.uses_indirect() {
            WorkSize::Indirect
        } else {
            let groups = params.clamped_dispatch_size();
            WorkSize::Direct {
                groups,
                items: direct_work_count(groups),
            }
        }
    }
}
