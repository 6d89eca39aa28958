use crate::simulation::types::{Capabilities, THREAD_GROUP_UPDATE_SIZE};

// Shared memory of the update pass: one padded vec3 per thread
const UPDATE_WORKGROUP_STORAGE: u32 = THREAD_GROUP_UPDATE_SIZE * 16;

/// Compute needs compute shaders plus room for 512-wide workgroups;
/// indirect additionally needs indirect execution.
pub fn detect(flags: wgpu::DownlevelFlags, limits: &wgpu::Limits) -> Capabilities {
    let compute = flags.contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
        && limits.max_compute_invocations_per_workgroup >= THREAD_GROUP_UPDATE_SIZE
        && limits.max_compute_workgroup_size_x >= THREAD_GROUP_UPDATE_SIZE
        && limits.max_compute_workgroup_storage_size >= UPDATE_WORKGROUP_STORAGE;
    let indirect = compute && flags.contains(wgpu::DownlevelFlags::INDIRECT_EXECUTION);

    Capabilities { compute, indirect }
}

/// Device limits to request from an adapter with `adapter_limits`.
pub fn required_limits(capabilities: Capabilities, adapter_limits: wgpu::Limits) -> wgpu::Limits {
    if !capabilities.compute {
        return wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter_limits);
    }

    // Downlevel baseline so any adapter passing `detect` can satisfy it
    let mut limits = wgpu::Limits::downlevel_defaults().using_resolution(adapter_limits);
    limits.max_compute_invocations_per_workgroup = THREAD_GROUP_UPDATE_SIZE;
    limits.max_compute_workgroup_size_x = THREAD_GROUP_UPDATE_SIZE;
    limits.max_compute_workgroup_storage_size = limits
        .max_compute_workgroup_storage_size
        .max(UPDATE_WORKGROUP_STORAGE);
    limits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_limits() -> wgpu::Limits {
        wgpu::Limits {
            max_compute_invocations_per_workgroup: 1024,
            max_compute_workgroup_size_x: 1024,
            ..wgpu::Limits::default()
        }
    }

    #[test]
    fn full_support() {
        let caps = detect(wgpu::DownlevelFlags::all(), &wide_limits());
        assert_eq!(caps, Capabilities::FULL);
    }

    #[test]
    fn no_indirect_execution() {
        let flags = wgpu::DownlevelFlags::all() - wgpu::DownlevelFlags::INDIRECT_EXECUTION;
        assert_eq!(detect(flags, &wide_limits()), Capabilities::DIRECT_ONLY);
    }

    #[test]
    fn no_compute_means_nothing() {
        let flags = wgpu::DownlevelFlags::all() - wgpu::DownlevelFlags::COMPUTE_SHADERS;
        assert_eq!(detect(flags, &wide_limits()), Capabilities::default());
    }

    #[test]
    fn narrow_workgroups_disable_compute() {
        // wgpu's portable defaults stop at 256 invocations
        let caps = detect(wgpu::DownlevelFlags::all(), &wgpu::Limits::default());
        assert!(!caps.compute);
        assert!(!caps.indirect);
    }

    #[test]
    fn compute_limits_are_raised() {
        let limits = required_limits(Capabilities::FULL, wide_limits());
        assert_eq!(limits.max_compute_invocations_per_workgroup, 512);
        assert_eq!(limits.max_compute_workgroup_size_x, 512);
    }

    #[test]
    fn downlevel_adapter_can_grant_requested_limits() {
        // Barely wide enough for the update pass, below the defaults elsewhere
        let adapter = wgpu::Limits {
            max_compute_invocations_per_workgroup: 512,
            max_compute_workgroup_size_x: 512,
            ..wgpu::Limits::downlevel_defaults()
        };
        let caps = detect(wgpu::DownlevelFlags::all(), &adapter);
        assert!(caps.compute);

        let requested = required_limits(caps, adapter.clone());
        assert!(requested.check_limits(&adapter));
        assert!(!wgpu::Limits::default().check_limits(&adapter));
    }

    #[test]
    fn no_compute_asks_for_webgl2_limits() {
        let adapter = wgpu::Limits::downlevel_webgl2_defaults();
        let requested = required_limits(Capabilities::default(), adapter.clone());
        assert!(requested.check_limits(&adapter));
    }
}
