//! Window event loop driving the scene update/render cycle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::assets::TextureKind;
use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::pipeline::ShaderAssignment;
use crate::scene::{SceneManager, populate_demo_scene};

/// How often the window title's frame-time readout refreshes, in seconds.
const TITLE_UPDATE_INTERVAL: f32 = 0.5;

/// Runs the demo until the window closes.
///
/// `model_path` optionally names an STL file to drop into the scene as an
/// extra showcase model; a load failure is fatal, like any other scene
/// initialization error.
pub fn run(model_path: Option<PathBuf>) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(model_path);
    event_loop.run_app(&mut app)
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    scene: Option<SceneManager>,
    input: Input,
    model_path: Option<PathBuf>,
    last_frame: Instant,
    title_timer: f32,
    title_frames: u32,
}

impl App {
    fn new(model_path: Option<PathBuf>) -> Self {
        Self {
            window: None,
            gpu: None,
            scene: None,
            input: Input::new(),
            model_path,
            last_frame: Instant::now(),
            title_timer: 0.0,
            title_frames: 0,
        }
    }

    fn step_frame(&mut self) {
        let (Some(window), Some(gpu), Some(scene)) =
            (&self.window, &self.gpu, &mut self.scene)
        else {
            return;
        };

        let now = Instant::now();
        // Clamp long stalls (window drags, debugger pauses) so controls
        // don't teleport.
        let frame_time = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;

        scene.update(&self.input, frame_time);
        self.input.begin_frame();
        scene.render(gpu);

        self.title_timer += frame_time;
        self.title_frames += 1;
        if self.title_timer > TITLE_UPDATE_INTERVAL {
            let avg = self.title_timer / self.title_frames as f32;
            window.set_title(&format!(
                "Portico - Frame Time: {:.2}ms, FPS: {:.0}",
                avg * 1000.0,
                1.0 / avg,
            ));
            self.title_timer = 0.0;
            self.title_frames = 0;
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = Arc::new(
            event_loop
                .create_window(Window::default_attributes().with_title("Portico"))
                .unwrap(),
        );

        let gpu = GpuContext::new(window.clone());

        let mut scene = match SceneManager::new(&gpu) {
            Ok(scene) => scene,
            Err(err) => {
                log::error!("scene initialization failed: {err}");
                event_loop.exit();
                return;
            }
        };
        populate_demo_scene(&mut scene, &gpu);

        if let Some(path) = &self.model_path {
            match RawGeometry::from_path(path) {
                Ok(mut geometry) => {
                    geometry.recenter();
                    geometry.normalize();
                    geometry.smooth_normals();
                    let mesh = scene.add_mesh(geometry.upload(&gpu));
                    scene.new_model(
                        mesh,
                        vec![TextureKind::Metal],
                        Vec3::new(-25.0, 10.0, -15.0),
                        15.0,
                        Vec3::ZERO,
                        0.0,
                        ShaderAssignment::PixelLighting,
                    );
                }
                Err(err) => {
                    log::error!("failed to load {}: {err}", path.display());
                    event_loop.exit();
                    return;
                }
            }
        }

        self.gpu = Some(gpu);
        self.scene = Some(scene);
        self.window = Some(window);
        self.last_frame = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.step_frame();
            }
            _ => {}
        }
    }
}
