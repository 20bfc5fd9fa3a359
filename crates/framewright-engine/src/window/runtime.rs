use std::sync::Arc;

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{FrameController, LifecycleState, Scene, default_size};
use crate::device::{Gpu, GpuInit};
use crate::time::TimerConfig;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub min_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let (width, height) = default_size();
        Self {
            title: "framewright".to_string(),
            initial_size: LogicalSize::new(width as f64, height as f64),
            min_size: LogicalSize::new(320.0, 200.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `scene` until the window is closed or a
    /// controller call fails.
    pub fn run<S>(config: RuntimeConfig, gpu_init: GpuInit, timer: TimerConfig, scene: S) -> Result<()>
    where
        S: Scene<Gpu> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let controller = FrameController::new(Gpu::new(gpu_init), scene, timer);
        let mut host = HostState::new(config, controller);

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;

        match host.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct HostState<S>
where
    S: Scene<Gpu>,
{
    config: RuntimeConfig,
    controller: FrameController<Gpu, S>,
    window: Option<Arc<Window>>,
    fatal: Option<anyhow::Error>,
}

impl<S> HostState<S>
where
    S: Scene<Gpu>,
{
    fn new(config: RuntimeConfig, controller: FrameController<Gpu, S>) -> Self {
        Self {
            config,
            controller,
            window: None,
            fatal: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_min_inner_size(self.config.min_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        self.window = Some(Arc::clone(&window));
        self.controller
            .initialize(Arc::clone(&window), size.width, size.height)?;

        window.request_redraw();
        Ok(())
    }

    fn check(&mut self, event_loop: &ActiveEventLoop, result: Result<()>) {
        if let Err(err) = result {
            log::error!("fatal: {err:#}");
            self.controller.shutdown();
            self.fatal = Some(err);
            event_loop.exit();
        }
    }
}

impl<S> ApplicationHandler for HostState<S>
where
    S: Scene<Gpu> + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let result = self.create_window(event_loop);
            self.check(event_loop, result);
        } else {
            self.controller.on_resuming();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.controller.on_suspending();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.controller.state() == LifecycleState::Terminated {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }
        if self.controller.state() == LifecycleState::Terminated {
            return;
        }

        let result = match event {
            WindowEvent::CloseRequested => {
                self.controller.shutdown();
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) => self
                .controller
                .on_window_size_changed(size.width, size.height),
            WindowEvent::Moved(_) => self.controller.on_window_moved(),
            WindowEvent::ScaleFactorChanged { .. } => self.controller.on_display_change(),
            WindowEvent::Focused(true) => {
                self.controller.on_activated();
                Ok(())
            }
            WindowEvent::Focused(false) => {
                self.controller.on_deactivated();
                Ok(())
            }
            WindowEvent::RedrawRequested => self.controller.tick(),
            _ => Ok(()),
        };

        self.check(event_loop, result);
    }
}
