use anyhow::Result;

use crate::coords::{OutputSize, Viewport};
use crate::paint::Color;

/// Receiver for device-lifetime notifications.
///
/// The device manager calls `on_device_lost` before it drops the device and
/// `on_device_restored` once a replacement device (and its window-size
/// resources) exist. Both calls happen synchronously on the control thread.
pub trait DeviceNotify<D: ?Sized> {
    /// Drops every handle that belongs to the lost device. Must not fail.
    fn on_device_lost(&mut self);

    /// Rebuilds device-dependent state against the new device.
    fn on_device_restored(&mut self, device: &D) -> Result<()>;
}

/// Owner of the graphics device, swap chain and back-buffer views.
///
/// The frame controller drives an implementation of this trait; it never
/// touches the underlying API directly. Calls that can discover device loss
/// (`begin_frame`, `present`, `handle_device_lost`) borrow a [`DeviceNotify`]
/// for the duration of the call.
pub trait DeviceResources {
    /// Handle to the output the swap chain presents into.
    type Surface;

    /// An acquired, cleared back buffer ready for draw recording.
    type Frame;

    /// Binds the output surface and records its initial size.
    fn set_window(&mut self, surface: Self::Surface, width: u32, height: u32);

    /// Creates the device and everything independent of the output size.
    fn create_device_resources(&mut self) -> Result<()>;

    /// (Re)creates the swap chain and depth buffer at the current output size.
    fn create_window_size_dependent_resources(&mut self) -> Result<()>;

    /// Records a new output size.
    ///
    /// Returns `Ok(false)` without touching any resource when the size is
    /// unchanged (after clamping to at least 1×1).
    fn window_size_changed(&mut self, width: u32, height: u32) -> Result<bool>;

    /// Re-evaluates the output colour format; returns `true` if it changed.
    fn update_color_space(&mut self) -> bool;

    fn output_size(&self) -> OutputSize;

    fn viewport(&self) -> Viewport {
        self.output_size().viewport()
    }

    /// Acquires and clears the next back buffer.
    ///
    /// `Ok(None)` means the frame should be skipped (transient surface error,
    /// or device loss that has just been handled).
    fn begin_frame(
        &mut self,
        clear: Color,
        notify: &mut dyn DeviceNotify<Self>,
    ) -> Result<Option<Self::Frame>>;

    /// Submits recorded work and presents the frame.
    fn present(&mut self, frame: Self::Frame, notify: &mut dyn DeviceNotify<Self>) -> Result<()>;

    /// Tears down the lost device, builds a new one and notifies `notify`.
    fn handle_device_lost(&mut self, notify: &mut dyn DeviceNotify<Self>) -> Result<()>;
}
