use anyhow::Result;

use crate::device::DeviceResources;
use crate::paint::Color;
use crate::time::StepTimer;

/// Application content driven by a [`FrameController`](super::FrameController).
///
/// Device-dependent resources (textures, pipelines, buffers) live in the scene
/// and are only valid between `create_device_dependent_resources` and the
/// next `release_device_dependent_resources`.
pub trait Scene<D: DeviceResources> {
    /// Builds everything tied to the current device.
    fn create_device_dependent_resources(&mut self, device: &D) -> Result<()>;

    /// Recomputes values derived from the output size (projections, layout).
    fn create_window_size_dependent_resources(&mut self, device: &D) -> Result<()>;

    /// Drops every device-dependent handle. Must not fail.
    fn release_device_dependent_resources(&mut self);

    /// Advances simulation state. No device access.
    fn update(&mut self, timer: &StepTimer);

    /// Records draws into an already-cleared frame.
    fn render(&mut self, device: &D, frame: &mut D::Frame) -> Result<()>;

    fn clear_color(&self) -> Color {
        Color::CORNFLOWER_BLUE
    }

    fn on_activated(&mut self) {}

    fn on_deactivated(&mut self) {}

    fn on_suspending(&mut self) {}

    fn on_resuming(&mut self) {}
}
