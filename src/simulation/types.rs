use bytemuck::{Pod, Zeroable};

// Constants for simulation
pub const THREAD_GROUP_UPDATE_SIZE: u32 = 512;
pub const MAX_PARTICLE_COUNT: u32 = 32 * 1024;
pub const MAX_DISPATCH_SIZE: i32 = (MAX_PARTICLE_COUNT / THREAD_GROUP_UPDATE_SIZE) as i32;
pub const MIN_DISPATCH_SIZE: i32 = 1;
pub const INIT_DISPATCH_GROUPS: u32 = MAX_PARTICLE_COUNT / THREAD_GROUP_UPDATE_SIZE;

// Editing range of the random seed
pub const MIN_SEED: i32 = 0;
pub const MAX_SEED: i32 = 100;

// Byte offsets of the argument blocks inside the indirect buffer
pub const INDIRECT_DISPATCH_OFFSET: u64 = 0;
pub const INDIRECT_DRAW_OFFSET: u64 = 16;
pub const INDIRECT_BUFFER_SIZE: u64 = 48;

// Index count of the instanced particle quad
pub const QUAD_INDEX_COUNT: u32 = 6;

// One particle as stored in the position buffers
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ParticlePosition {
    pub position: [f32; 4], // xyz = position, w = acceleration magnitude
}

/// What the adapter can do, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub compute: bool,
    pub indirect: bool,
}

impl Capabilities {
    pub const FULL: Self = Self {
        compute: true,
        indirect: true,
    };

    pub const DIRECT_ONLY: Self = Self {
        compute: true,
        indirect: false,
    };
}
