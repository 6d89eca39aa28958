use thiserror::Error;

/// Failures while bringing up the GPU. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum RendererError {
    #[error("failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("failed to request adapter: {0}")]
    AdapterRequest(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture format")]
    NoSurfaceFormat,
}
