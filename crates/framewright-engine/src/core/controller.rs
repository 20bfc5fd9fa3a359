use std::time::Instant;

use anyhow::Result;

use crate::device::{DeviceNotify, DeviceResources};
use crate::time::{StepTimer, TimerConfig};

use super::{LifecycleError, Scene};

/// Preferred initial window size in pixels.
pub const fn default_size() -> (u32, u32) {
    (800, 600)
}

/// Lifecycle of a [`FrameController`].
///
/// `Uninitialized → Ready → (DeviceLost → Ready)* → Terminated`
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LifecycleState {
    Uninitialized,
    Ready,
    /// Scene device resources are released; nothing renders until restored.
    DeviceLost,
    Terminated,
}

/// Owns the device manager, the step timer and the scene, and sequences them.
///
/// Host calls map one-to-one onto platform events; see `window::Runtime` for
/// the winit mapping.
pub struct FrameController<D, S> {
    device: D,
    scene: S,
    timer: StepTimer,
    state: LifecycleState,
}

impl<D, S> FrameController<D, S>
where
    D: DeviceResources,
    S: Scene<D>,
{
    pub fn new(device: D, scene: S, timer: TimerConfig) -> Self {
        Self {
            device,
            scene,
            timer: StepTimer::new(timer),
            state: LifecycleState::Uninitialized,
        }
    }

    pub const fn default_size() -> (u32, u32) {
        default_size()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn timer(&self) -> &StepTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut StepTimer {
        &mut self.timer
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Binds the output surface and creates every resource, device first.
    pub fn initialize(&mut self, surface: D::Surface, width: u32, height: u32) -> Result<()> {
        match self.state {
            LifecycleState::Uninitialized => {}
            LifecycleState::Terminated => return Err(LifecycleError::Terminated.into()),
            LifecycleState::Ready | LifecycleState::DeviceLost => {
                return Err(LifecycleError::AlreadyInitialized.into());
            }
        }

        log::debug!("initializing frame controller at {width}x{height}");

        self.device.set_window(surface, width, height);
        self.device.create_device_resources()?;
        self.scene.create_device_dependent_resources(&self.device)?;
        self.device.create_window_size_dependent_resources()?;
        self.scene
            .create_window_size_dependent_resources(&self.device)?;

        self.state = LifecycleState::Ready;
        log::info!("frame controller ready");
        Ok(())
    }

    /// Advances the timer to now, runs updates, then renders.
    pub fn tick(&mut self) -> Result<()> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Result<()> {
        self.ensure_running()?;

        let scene = &mut self.scene;
        self.timer.tick_at(now, |timer| scene.update(timer));

        self.render()
    }

    /// Draws the current scene state without advancing time.
    ///
    /// Skipped before the first update and whenever the controller is not
    /// `Ready`.
    pub fn render(&mut self) -> Result<()> {
        if self.state != LifecycleState::Ready || self.timer.frame_count() == 0 {
            return Ok(());
        }

        let clear = self.scene.clear_color();
        let mut notify = SceneNotify::new(&mut self.scene, &mut self.state);
        let Some(mut frame) = self.device.begin_frame(clear, &mut notify)? else {
            return Ok(());
        };

        self.scene.render(&self.device, &mut frame)?;

        let mut notify = SceneNotify::new(&mut self.scene, &mut self.state);
        self.device.present(frame, &mut notify)
    }

    /// Releases scene device resources. No-op unless `Ready`.
    pub fn on_device_lost(&mut self) {
        release_scene::<D, S>(&mut self.scene, &mut self.state);
    }

    /// Rebuilds scene device and window-size resources against the current device.
    pub fn on_device_restored(&mut self) -> Result<()> {
        self.ensure_running()?;
        restore_scene(&mut self.scene, &mut self.state, &self.device)
    }

    pub fn on_window_size_changed(&mut self, width: u32, height: u32) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }

        if !self.device.window_size_changed(width, height)? {
            return Ok(());
        }

        log::debug!("output resized to {width}x{height}");

        if self.state == LifecycleState::Ready {
            self.scene
                .create_window_size_dependent_resources(&self.device)?;
        }
        Ok(())
    }

    pub fn on_window_moved(&mut self) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }

        let size = self.device.output_size();
        self.device.window_size_changed(size.width, size.height)?;
        Ok(())
    }

    /// Re-evaluates the output colour format; format-bound scene resources are
    /// rebuilt if it changed.
    pub fn on_display_change(&mut self) -> Result<()> {
        if self.state != LifecycleState::Ready {
            return Ok(());
        }

        if !self.device.update_color_space() {
            return Ok(());
        }

        log::info!("display format changed; rebuilding scene resources");
        release_scene::<D, S>(&mut self.scene, &mut self.state);
        restore_scene(&mut self.scene, &mut self.state, &self.device)
    }

    pub fn on_activated(&mut self) {
        if self.is_running() {
            self.scene.on_activated();
        }
    }

    pub fn on_deactivated(&mut self) {
        if self.is_running() {
            self.scene.on_deactivated();
        }
    }

    pub fn on_suspending(&mut self) {
        if self.is_running() {
            log::debug!("suspending");
            self.scene.on_suspending();
        }
    }

    pub fn on_resuming(&mut self) {
        self.on_resuming_at(Instant::now());
    }

    /// Discards the time spent suspended so the next tick does not catch up.
    pub fn on_resuming_at(&mut self, now: Instant) {
        if !self.is_running() {
            return;
        }

        log::debug!("resuming");
        self.timer.reset_elapsed_time_at(now);
        self.scene.on_resuming();
    }

    /// Releases scene device resources and terminates. Idempotent.
    pub fn shutdown(&mut self) {
        match self.state {
            LifecycleState::Terminated => return,
            LifecycleState::Ready => self.scene.release_device_dependent_resources(),
            LifecycleState::Uninitialized | LifecycleState::DeviceLost => {}
        }

        self.state = LifecycleState::Terminated;
        log::info!("frame controller shut down");
    }

    fn is_running(&self) -> bool {
        matches!(
            self.state,
            LifecycleState::Ready | LifecycleState::DeviceLost
        )
    }

    fn ensure_running(&self) -> Result<(), LifecycleError> {
        match self.state {
            LifecycleState::Ready | LifecycleState::DeviceLost => Ok(()),
            LifecycleState::Uninitialized => Err(LifecycleError::NotInitialized),
            LifecycleState::Terminated => Err(LifecycleError::Terminated),
        }
    }
}

fn release_scene<D, S>(scene: &mut S, state: &mut LifecycleState)
where
    D: DeviceResources,
    S: Scene<D>,
{
    if *state != LifecycleState::Ready {
        log::debug!("device lost while {state:?}; nothing to release");
        return;
    }

    scene.release_device_dependent_resources();
    *state = LifecycleState::DeviceLost;
    log::warn!("scene device resources released");
}

fn restore_scene<D, S>(scene: &mut S, state: &mut LifecycleState, device: &D) -> Result<()>
where
    D: DeviceResources,
    S: Scene<D>,
{
    scene.create_device_dependent_resources(device)?;
    scene.create_window_size_dependent_resources(device)?;

    *state = LifecycleState::Ready;
    log::info!("scene device resources restored");
    Ok(())
}

/// Lends the scene and state to the device manager for one call.
struct SceneNotify<'a, S> {
    scene: &'a mut S,
    state: &'a mut LifecycleState,
}

impl<'a, S> SceneNotify<'a, S> {
    fn new(scene: &'a mut S, state: &'a mut LifecycleState) -> Self {
        Self { scene, state }
    }
}

impl<D, S> DeviceNotify<D> for SceneNotify<'_, S>
where
    D: DeviceResources,
    S: Scene<D>,
{
    fn on_device_lost(&mut self) {
        release_scene::<D, S>(self.scene, self.state);
    }

    fn on_device_restored(&mut self, device: &D) -> Result<()> {
        restore_scene(self.scene, self.state, device)
    }
}
