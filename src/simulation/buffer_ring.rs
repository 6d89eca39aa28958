//! Role indirection over the four physical position buffers.
//!
//! Both logical roles (`Previous`, `Current`) own two physical slots. Instead
//! of swapping buffer handles the ring only remembers which physical slot is
//! labeled `0` (readable) for each role; the other one is labeled `1`
//! (writable). Swapping flips those labels and never touches buffer data.

/// One of the two physical copies backing a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Previous,
    Current,
}

/// A physical buffer: a role plus one of its slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicalBuffer {
    pub role: Role,
    pub slot: Slot,
}

/// Bindings of the update pass, in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateBindings {
    pub previous_read: Slot,
    pub current_read: Slot,
    pub previous_write: Slot,
    pub current_write: Slot,
}

impl UpdateBindings {
    pub fn reads(&self) -> [PhysicalBuffer; 2] {
        [
            PhysicalBuffer {
                role: Role::Previous,
                slot: self.previous_read,
            },
            PhysicalBuffer {
                role: Role::Current,
                slot: self.current_read,
            },
        ]
    }

    pub fn writes(&self) -> [PhysicalBuffer; 2] {
        [
            PhysicalBuffer {
                role: Role::Previous,
                slot: self.previous_write,
            },
            PhysicalBuffer {
                role: Role::Current,
                slot: self.current_write,
            },
        ]
    }

    /// True when no physical buffer is both read and written by the pass.
    pub fn is_hazard_free(&self) -> bool {
        let writes = self.writes();
        self.reads().iter().all(|read| !writes.contains(read))
    }
}

/// Write targets of the reinitialization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitTargets {
    pub previous: Slot,
    pub current: Slot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRing {
    previous_front: Slot,
    current_front: Slot,
    swaps: u64,
}

impl BufferRing {
    pub fn new() -> Self {
        Self {
            previous_front: Slot::A,
            current_front: Slot::A,
            swaps: 0,
        }
    }

    /// Physical slot currently labeled `0` for `role`.
    pub fn readable(&self, role: Role) -> Slot {
        match role {
            Role::Previous => self.previous_front,
            Role::Current => self.current_front,
        }
    }

    /// Physical slot currently labeled `1` for `role`.
    pub fn writable(&self, role: Role) -> Slot {
        self.readable(role).other()
    }

    pub fn update_bindings(&self) -> UpdateBindings {
        UpdateBindings {
            previous_read: self.readable(Role::Previous),
            current_read: self.readable(Role::Current),
            previous_write: self.writable(Role::Previous),
            current_write: self.writable(Role::Current),
        }
    }

    /// Reinitialization writes the slots the following update pass reads.
    pub fn init_targets(&self) -> InitTargets {
        InitTargets {
            previous: self.readable(Role::Previous),
            current: self.readable(Role::Current),
        }
    }

    /// Relabel both roles after an update pass so the freshly written slots become readable.
    pub fn swap(&mut self) {
        self.previous_front = self.previous_front.other();
        self.current_front = self.current_front.other();
        self.swaps += 1;
    }

    pub fn swap_count(&self) -> u64 {
        self.swaps
    }
}

impl Default for BufferRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_reading_slot_a() {
        let ring = BufferRing::new();
        assert_eq!(ring.readable(Role::Previous), Slot::A);
        assert_eq!(ring.readable(Role::Current), Slot::A);
        assert_eq!(ring.writable(Role::Previous), Slot::B);
        assert_eq!(ring.writable(Role::Current), Slot::B);
    }

    #[test]
    fn two_swaps_restore_labels() {
        let mut ring = BufferRing::new();
        let original = ring.update_bindings();

        ring.swap();
        assert_ne!(ring.update_bindings(), original);
        ring.swap();
        assert_eq!(ring.update_bindings(), original);
        assert_eq!(ring.swap_count(), 2);
    }

    #[test]
    fn swap_makes_written_slot_readable() {
        let mut ring = BufferRing::new();
        let bindings = ring.update_bindings();
        ring.swap();
        assert_eq!(ring.readable(Role::Current), bindings.current_write);
        assert_eq!(ring.readable(Role::Previous), bindings.previous_write);
    }

    #[test]
    fn update_never_aliases() {
        let mut ring = BufferRing::new();
        for _ in 0..5 {
            assert!(ring.update_bindings().is_hazard_free());
            ring.swap();
        }
    }

    #[test]
    fn aliased_bindings_are_detected() {
        let bindings = UpdateBindings {
            previous_read: Slot::A,
            current_read: Slot::B,
            previous_write: Slot::B,
            current_write: Slot::B,
        };
        assert!(!bindings.is_hazard_free());
    }

    #[test]
    fn init_targets_feed_next_update() {
        let mut ring = BufferRing::new();
        ring.swap();
        let targets = ring.init_targets();
        let bindings = ring.update_bindings();
        assert_eq!(targets.previous, bindings.previous_read);
        assert_eq!(targets.current, bindings.current_read);
    }
}
