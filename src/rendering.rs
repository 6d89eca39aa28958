mod camera;
mod capabilities;
mod error;
mod render_config;
mod render_pass;
mod renderer;
mod simulation_resources;

pub use camera::{Camera, CameraUniform};
pub use capabilities::{detect as detect_capabilities, required_limits};
pub use error::RendererError;
pub use render_config::RenderConfig;
pub use renderer::Renderer;
