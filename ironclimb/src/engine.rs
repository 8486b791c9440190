use std::time::{Duration, Instant};

use anyhow::Result;
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    canvas::Canvas,
    config::WindowConfig,
    input::{InputMap, InputState},
    math::Vec2,
    render::Renderer,
    scene::{FrameContext, SceneManager},
};

/// Longest frame time handed to the scenes. Longer hitches (window drags,
/// breakpoints) are simulated as this much time.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(50);

/// Opens the window and runs the scene manager until the window closes.
pub struct Engine {
    config: WindowConfig,
    input_map: InputMap,
}

impl Engine {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            input_map: InputMap::with_default_bindings(),
        }
    }

    /// Run until the window is closed, Escape is pressed or a scene fails.
    pub fn run(self, mut scenes: SceneManager) -> Result<()> {
        let config = self.config;
        let input_map = self.input_map;

        let event_loop = EventLoop::new()?;
        let mut window_attributes = Window::default_attributes();
        window_attributes.title = config.title.clone();
        window_attributes.inner_size = Some(LogicalSize::new(config.width, config.height).into());
        let window = event_loop.create_window(window_attributes)?;

        // The window lives for the rest of the program.
        let window: &'static Window = Box::leak(Box::new(window));

        let mut renderer = Renderer::new(window, config.vsync)?;
        let virtual_size = Vec2::new(config.width as f32, config.height as f32);
        let mut canvas = Canvas::new(virtual_size);
        let mut input = InputState::new();
        let mut last_frame = Instant::now();

        log::info!("window opened: {}x{}", config.width, config.height);

        event_loop.run(move |event, elwt| match event {
            Event::NewEvents(_) => {
                input.begin_frame();
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if is_escape_pressed(&event) {
                        elwt.exit();
                    }
                    input.handle_key(&event);
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input.handle_mouse_button(button, state);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let cursor = to_virtual(position, renderer.surface_size(), virtual_size);
                    input.handle_cursor_moved(cursor.x, cursor.y);
                }
                WindowEvent::Resized(new_size) => {
                    renderer.resize(new_size);
                }
                WindowEvent::RedrawRequested => {
                    canvas.begin();
                    scenes.draw(&mut canvas);
                    if let Err(err) = renderer.render(&canvas) {
                        log::error!("Encountered error during draw: {err:?}");
                        elwt.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                let now = Instant::now();
                let dt = (now - last_frame).min(MAX_FRAME_TIME);
                last_frame = now;

                let ctx = FrameContext::new(dt, input_map.controls(&input), virtual_size);
                if let Err(err) = scenes.update(&ctx) {
                    log::error!("Encountered error during update: {err:?}");
                    elwt.exit();
                    return;
                }
                window.request_redraw();
            }
            _ => {}
        })?;

        Ok(())
    }
}

fn is_escape_pressed(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && matches!(event.physical_key, PhysicalKey::Code(KeyCode::Escape))
}

/// Map a cursor position in surface pixels to the canvas' virtual resolution.
fn to_virtual(position: PhysicalPosition<f64>, surface: (u32, u32), virtual_size: Vec2) -> Vec2 {
    let (w, h) = (surface.0.max(1) as f32, surface.1.max(1) as f32);
    Vec2::new(
        position.x as f32 * virtual_size.x / w,
        position.y as f32 * virtual_size.y / h,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_maps_into_virtual_resolution() {
        let p = to_virtual(
            PhysicalPosition::new(1000.0, 550.0),
            (2000, 1100),
            Vec2::new(1000.0, 550.0),
        );
        assert_eq!(p, Vec2::new(500.0, 275.0));
    }
}
