use std::sync::Arc;

use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    error::EventLoopError,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::rendering::Renderer;
use crate::simulation::input::ParamEdit;
use crate::simulation::params::InitialShape;

#[derive(Default)]
pub struct App {
    state: Option<Renderer>,
    last_cursor: [f32; 2],
}

impl App {
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.state.as_mut() {
            renderer.shutdown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("wgpu-nbody")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Renderer::new(window.clone())) {
            Ok(renderer) => {
                self.state = Some(renderer);
                window.request_redraw();
            }
            Err(err) => {
                error!("Failed to initialize GPU: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!("The close button was pressed; stopping");
                self.shutdown(event_loop);
            }
            WindowEvent::RedrawRequested => {
                match state.render() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        warn!("Surface lost or outdated; reconfiguring");
                        state.configure_surface();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("GPU is out of memory; stopping");
                        self.shutdown(event_loop);
                        return;
                    }
                    Err(err) => warn!("Frame skipped: {err}"),
                }
                // Emits a new redraw requested event.
                state.get_window().request_redraw();
            }
            WindowEvent::Resized(size) => {
                // Reconfigures the size of the surface. We do not re-render
                // here as this event is always followed up by redraw request.
                state.resize(size);
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => state.handle_mouse_wheel(y),
                // Touchpad gesture - needs smaller scaling factor to feel natural
                MouseScrollDelta::PixelDelta(position) => {
                    state.handle_mouse_wheel(position.y as f32 * 0.003)
                }
            },
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => match button_state {
                ElementState::Pressed => state.handle_mouse_press(self.last_cursor),
                ElementState::Released => state.handle_mouse_release(),
            },
            WindowEvent::CursorMoved { position, .. } => {
                // Store the last known cursor position
                self.last_cursor = [position.x as f32, position.y as f32];
                state.handle_mouse_move(self.last_cursor);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat,
                        ..
                    },
                ..
            } => match key_code {
                KeyCode::Digit1 => state.select_shape(InitialShape::Point),
                KeyCode::Digit2 => state.select_shape(InitialShape::Sphere),
                KeyCode::Digit3 => state.select_shape(InitialShape::Box),
                KeyCode::Digit4 => state.select_shape(InitialShape::Donut),

                KeyCode::KeyR if !repeat => state.queue_edit(ParamEdit::Reset),
                KeyCode::KeyI if !repeat => state.queue_edit(ParamEdit::ToggleIndirect),
                KeyCode::KeyN if !repeat => state.randomize_seed(),

                KeyCode::ArrowUp => state.queue_edit(ParamEdit::AdjustDispatchSize(1)),
                KeyCode::ArrowDown => state.queue_edit(ParamEdit::AdjustDispatchSize(-1)),

                KeyCode::Tab if !repeat => state.cycle_scalar(),
                KeyCode::BracketRight => state.nudge_scalar(1.0),
                KeyCode::BracketLeft => state.nudge_scalar(-1.0),

                KeyCode::Equal | KeyCode::NumpadAdd => state.handle_mouse_wheel(1.0),
                KeyCode::Minus | KeyCode::NumpadSubtract => state.handle_mouse_wheel(-1.0),

                KeyCode::Escape => self.shutdown(event_loop),
                _ => (),
            },
            _ => (),
        }
    }
}

pub fn run() -> Result<(), EventLoopError> {
    // Initialize logger
    env_logger::init();

    // Create event loop
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    // Create app
    let mut app = App::default();
    event_loop.run_app(&mut app)
}
