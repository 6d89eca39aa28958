use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rand::Rng;
use winit::window::Window;

use crate::rendering::camera::Camera;
use crate::rendering::capabilities;
use crate::rendering::error::RendererError;
use crate::rendering::render_config::RenderConfig;
use crate::rendering::render_pass::{BACKGROUND, create_background_render_pass};
use crate::rendering::simulation_resources::SimulationResources;
use crate::simulation::dispatch::direct_work_count;
use crate::simulation::frame_loop::{FrameLoop, LoopState};
use crate::simulation::input::ParamEdit;
use crate::simulation::params::{InitialShape, ScalarParam};
use crate::simulation::types::{MAX_SEED, MIN_SEED};

const WINDOW_TITLE: &str = "wgpu-nbody";
const COMPUTE_UNSUPPORTED_NOTICE: &str = "Compute is not supported by GPU.";

enum Mode {
    Simulation {
        frame_loop: FrameLoop,
        render_config: RenderConfig,
        resources: SimulationResources,
    },
    ComputeUnsupported,
    ShutDown,
}

// Main renderer struct
pub struct Renderer {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: winit::dpi::PhysicalSize<u32>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    mode: Mode,

    camera: Camera,
    last_update: Instant,
    pending_edits: Vec<ParamEdit>,
    selected_scalar: ScalarParam,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let adapter_info = adapter.get_info();
        let capabilities = capabilities::detect(
            adapter.get_downlevel_capabilities().flags,
            &adapter.limits(),
        );
        info!(
            "Using {} ({:?}): compute {}, indirect {}",
            adapter_info.name, adapter_info.backend, capabilities.compute, capabilities.indirect
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("N-Body Device"),
                required_features: wgpu::Features::empty(),
                required_limits: capabilities::required_limits(capabilities, adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let size = window.inner_size();
        let surface_format = surface
            .get_capabilities(&adapter)
            .formats
            .first()
            .copied()
            .ok_or(RendererError::NoSurfaceFormat)?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            // Request compatibility with the sRGB-format texture view we're going to create later.
            view_formats: vec![surface_format.add_srgb_suffix()],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: size.width.max(1),
            height: size.height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::AutoVsync,
        };
        surface.configure(&device, &surface_config);

        let camera = Camera::new();

        let mode = if capabilities.compute {
            let mut frame_loop = FrameLoop::new(capabilities);
            let render_config = RenderConfig::new(&device, surface_format, capabilities.indirect);
            let resources = SimulationResources::new(
                &device,
                &render_config,
                frame_loop.params(),
                &camera.uniform(aspect_ratio(size)),
            );
            info!(
                "Allocated {} KiB of particle storage",
                resources.position_storage_bytes() / 1024
            );

            // Ready is entered once every resource exists
            match frame_loop.start() {
                Ok(plan) => {
                    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("N-Body Startup Encoder"),
                    });
                    resources.encode(&queue, &mut encoder, &render_config, &plan, None);
                    queue.submit(std::iter::once(encoder.finish()));
                }
                Err(err) => warn!("Startup plan rejected: {err}"),
            }

            Mode::Simulation {
                frame_loop,
                render_config,
                resources,
            }
        } else {
            warn!("{COMPUTE_UNSUPPORTED_NOTICE} Showing a static notice instead");
            Mode::ComputeUnsupported
        };

        let renderer = Self {
            window,
            device,
            queue,
            size,
            surface,
            surface_config,
            mode,
            camera,
            last_update: Instant::now(),
            pending_edits: Vec::new(),
            selected_scalar: ScalarParam::default(),
        };
        renderer.refresh_title();

        Ok(renderer)
    }

    pub fn get_window(&self) -> &Window {
        &self.window
    }

    pub fn configure_surface(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.configure_surface();
        }
    }

    /// Renders one frame. Surface errors leave the simulation untouched.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;
        self.camera.update(dt);

        if matches!(self.mode, Mode::ShutDown) {
            return Ok(());
        }

        let surface_texture = self.surface.get_current_texture()?;
        let texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.surface_config.format.add_srgb_suffix()),
                ..Default::default()
            });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("N-Body Command Encoder"),
            });

        let mut title_stale = false;
        match &mut self.mode {
            Mode::Simulation {
                frame_loop,
                render_config,
                resources,
            } => {
                let edits = std::mem::take(&mut self.pending_edits);
                match frame_loop.advance(&edits) {
                    Ok(plan) => {
                        let camera = self.camera.uniform(aspect_ratio(self.size));
                        resources.update_camera(&self.queue, &camera);
                        resources.encode(
                            &self.queue,
                            &mut encoder,
                            render_config,
                            &plan,
                            Some(&texture_view),
                        );
                        title_stale = !edits.is_empty() || plan.reinitializes();
                    }
                    Err(err) => warn!("Skipping frame: {err}"),
                }
            }
            Mode::ComputeUnsupported | Mode::ShutDown => {
                create_background_render_pass(&mut encoder, &texture_view, BACKGROUND);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();

        if title_stale {
            self.refresh_title();
        }

        Ok(())
    }

    /// Moves the simulation to its terminal state and releases all GPU resources.
    pub fn shutdown(&mut self) {
        let mode = std::mem::replace(&mut self.mode, Mode::ShutDown);
        if let Mode::Simulation { mut frame_loop, .. } = mode {
            frame_loop.shutdown();
            debug_assert_eq!(frame_loop.state(), LoopState::ShuttingDown);
        }
        self.pending_edits.clear();
        info!("GPU resources released");
    }

    pub fn queue_edit(&mut self, edit: ParamEdit) {
        if matches!(self.mode, Mode::Simulation { .. }) {
            self.pending_edits.push(edit);
        }
    }

    pub fn select_shape(&mut self, shape: InitialShape) {
        self.queue_edit(ParamEdit::SelectShape(shape));
    }

    pub fn randomize_seed(&mut self) {
        let seed = rand::thread_rng().gen_range(MIN_SEED..=MAX_SEED);
        debug!("Random seed {seed} picked, applied on next reset");
        self.queue_edit(ParamEdit::SetSeed(seed));
    }

    /// Moves keyboard editing on to the next scalar parameter.
    pub fn cycle_scalar(&mut self) {
        self.selected_scalar = self.selected_scalar.next();
        self.refresh_title();
    }

    pub fn nudge_scalar(&mut self, steps: f32) {
        self.queue_edit(ParamEdit::AdjustScalar(self.selected_scalar, steps));
    }

    // Input handling methods
    pub fn handle_mouse_press(&mut self, position: [f32; 2]) {
        self.camera.handle_mouse_press(position);
    }

    pub fn handle_mouse_release(&mut self) {
        self.camera.handle_mouse_release();
    }

    pub fn handle_mouse_move(&mut self, position: [f32; 2]) {
        self.camera.handle_mouse_move(position);
    }

    pub fn handle_mouse_wheel(&mut self, delta: f32) {
        self.camera.handle_mouse_wheel(delta);
    }

    fn refresh_title(&self) {
        let title = match &self.mode {
            Mode::Simulation { frame_loop, .. } => {
                let params = frame_loop.params();
                format!(
                    "{WINDOW_TITLE} | {} | seed {} | {} particles | {} | {} {:.4}",
                    params.initial_shape.name(),
                    params.base_seed,
                    direct_work_count(params.clamped_dispatch_size()),
                    if frame_loop.uses_indirect() {
                        "indirect"
                    } else {
                        "direct"
                    },
                    self.selected_scalar.name(),
                    self.selected_scalar.get(params),
                )
            }
            Mode::ComputeUnsupported => format!("{WINDOW_TITLE} | {COMPUTE_UNSUPPORTED_NOTICE}"),
            Mode::ShutDown => WINDOW_TITLE.to_string(),
        };
        self.window.set_title(&title);
    }
}

fn aspect_ratio(size: winit::dpi::PhysicalSize<u32>) -> f32 {
    size.width.max(1) as f32 / size.height.max(1) as f32
}
