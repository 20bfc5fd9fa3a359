use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use winit::window::Window;

use crate::coords::OutputSize;
use crate::paint::Color;
use crate::render::RenderCtx;

use super::resources::{DeviceNotify, DeviceResources};
use super::surface;
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// wgpu implementation of [`DeviceResources`].
///
/// Lifecycle mirrors the trait:
/// - `new` only builds the instance; nothing is bound yet
/// - `set_window` binds the output window
/// - `create_device_resources` creates Surface/Adapter/Device/Queue
/// - `create_window_size_dependent_resources` configures the swap chain and depth buffer
pub struct Gpu {
    init: GpuInit,

    /// wgpu instance used to create adapters and surfaces.
    instance: wgpu::Instance,

    /// Output window. Shared with the runtime, which owns the event loop.
    window: Option<Arc<Window>>,

    /// Current output size, clamped to at least 1×1.
    output_size: OutputSize,

    /// Everything tied to the current device; `None` before creation and while
    /// a lost device is being replaced.
    core: Option<GpuCore>,

    /// Bumped by every `begin_frame`; renderers use it to rewind their
    /// per-frame upload cursors.
    frame_index: u64,
}

struct GpuCore {
    surface: wgpu::Surface<'static>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: Option<DepthBuffer>,

    /// Raised by the device-lost callback. One flag per device so that the
    /// callback of a device we dropped on purpose cannot flag its successor.
    lost: Arc<AtomicBool>,
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    has_stencil: bool,
}

impl Gpu {
    pub fn new(init: GpuInit) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        Self {
            init,
            instance,
            window: None,
            output_size: OutputSize::default(),
            core: None,
            frame_index: 0,
        }
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> Result<&wgpu::Device> {
        Ok(&self.core()?.device)
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> Result<&wgpu::Queue> {
        Ok(&self.core()?.queue)
    }

    /// Returns the active back-buffer format.
    pub fn surface_format(&self) -> Result<wgpu::TextureFormat> {
        Ok(self.core()?.config.format)
    }

    pub fn adapter_info(&self) -> Option<wgpu::AdapterInfo> {
        self.core.as_ref().map(|c| c.adapter.get_info())
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }

    /// Renderer-facing view of the current device at the current output size.
    pub fn render_ctx(&self) -> Result<RenderCtx<'_>> {
        let core = self.core()?;
        Ok(RenderCtx::new(
            &core.device,
            &core.queue,
            core.config.format,
            self.output_size.viewport(),
            self.frame_index,
        ))
    }

    fn core(&self) -> Result<&GpuCore> {
        self.core
            .as_ref()
            .context("graphics device resources have not been created")
    }

    fn device_lost(&self) -> bool {
        self.core
            .as_ref()
            .is_some_and(|c| c.lost.load(Ordering::Acquire))
    }
}

impl DeviceResources for Gpu {
    type Surface = Arc<Window>;
    type Frame = GpuFrame;

    fn set_window(&mut self, surface: Arc<Window>, width: u32, height: u32) {
        self.window = Some(surface);
        self.output_size = OutputSize::new(width, height).clamped();
    }

    fn create_device_resources(&mut self) -> Result<()> {
        let window = self
            .window
            .clone()
            .context("set_window must be called before creating device resources")?;

        let surface = self
            .instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = pollster::block_on(self.instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            },
        ))
        .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("framewright device"),
            required_features: self.init.required_features,
            required_limits: self.init.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .context("failed to create wgpu device/queue")?;

        let lost = Arc::new(AtomicBool::new(false));
        {
            let lost = Arc::clone(&lost);
            device.set_device_lost_callback(move |reason, message| {
                log::warn!("graphics device lost ({reason:?}): {message}");
                lost.store(true, Ordering::Release);
            });
        }

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, self.init.prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&caps, self.init.alpha_mode);

        let size = self.output_size.clamped();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: self.init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: self.init.desired_maximum_frame_latency,
        };

        log::debug!("device created; surface format {format:?}, alpha {alpha_mode:?}");

        self.core = Some(GpuCore {
            surface,
            adapter,
            device,
            queue,
            config,
            depth: None,
            lost,
        });

        Ok(())
    }

    fn create_window_size_dependent_resources(&mut self) -> Result<()> {
        let size = self.output_size.clamped();
        let depth_format = self.init.depth_format;

        let core = self
            .core
            .as_mut()
            .context("graphics device resources have not been created")?;

        core.config.width = size.width;
        core.config.height = size.height;
        core.surface.configure(&core.device, &core.config);

        // Release the old depth buffer before allocating the new one.
        core.depth = None;
        core.depth = depth_format.map(|format| create_depth_buffer(&core.device, size, format));

        log::debug!("swap chain configured at {}x{}", size.width, size.height);
        Ok(())
    }

    fn window_size_changed(&mut self, width: u32, height: u32) -> Result<bool> {
        let new_size = OutputSize::new(width, height).clamped();
        if new_size == self.output_size {
            return Ok(false);
        }

        self.output_size = new_size;
        self.create_window_size_dependent_resources()?;
        Ok(true)
    }

    fn update_color_space(&mut self) -> bool {
        let prefer_srgb = self.init.prefer_srgb;
        let Some(core) = self.core.as_mut() else {
            return false;
        };

        let caps = core.surface.get_capabilities(&core.adapter);
        let Some(format) = surface::choose_surface_format(&caps, prefer_srgb) else {
            return false;
        };

        if format == core.config.format {
            return false;
        }

        log::info!("output format changed {:?} -> {format:?}", core.config.format);
        core.config.format = format;
        core.surface.configure(&core.device, &core.config);
        true
    }

    fn output_size(&self) -> OutputSize {
        self.output_size
    }

    fn begin_frame(
        &mut self,
        clear: Color,
        notify: &mut dyn DeviceNotify<Self>,
    ) -> Result<Option<GpuFrame>> {
        if self.device_lost() {
            self.handle_device_lost(notify)?;
            return Ok(None);
        }

        self.frame_index = self.frame_index.wrapping_add(1);
        let core = self.core()?;

        let surface_texture = match core.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                let reason = err.to_string();
                let action =
                    surface::map_surface_error(&core.surface, &core.device, &core.config, err);
                return match action {
                    SurfaceErrorAction::Fatal => Err(anyhow!("surface error: {reason}")),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        log::debug!("skipping frame after surface error: {reason}");
                        Ok(None)
                    }
                };
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = core
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("framewright frame encoder"),
            });

        encoder.push_debug_group("Clear");
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("framewright clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: core.depth.as_ref().map(|d| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view: &d.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: d.has_stencil.then_some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(0),
                            store: wgpu::StoreOp::Store,
                        }),
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }
        encoder.pop_debug_group();

        // Closed in `present`.
        encoder.push_debug_group("Render");

        Ok(Some(GpuFrame {
            surface_texture,
            view,
            encoder,
        }))
    }

    fn present(&mut self, frame: GpuFrame, notify: &mut dyn DeviceNotify<Self>) -> Result<()> {
        {
            let core = self.core()?;
            let GpuFrame {
                surface_texture,
                view,
                mut encoder,
            } = frame;

            encoder.pop_debug_group();
            core.queue.submit(std::iter::once(encoder.finish()));
            drop(view);

            if let Some(window) = &self.window {
                window.pre_present_notify();
            }
            surface_texture.present();
        }

        if self.device_lost() {
            self.handle_device_lost(notify)?;
        }

        Ok(())
    }

    fn handle_device_lost(&mut self, notify: &mut dyn DeviceNotify<Self>) -> Result<()> {
        log::warn!("recreating graphics device after loss");

        notify.on_device_lost();

        self.core = None;

        self.create_device_resources()
            .context("failed to recreate device after device loss")?;
        self.create_window_size_dependent_resources()
            .context("failed to recreate swap chain after device loss")?;

        notify.on_device_restored(self)?;

        log::info!("graphics device restored");
        Ok(())
    }
}

fn create_depth_buffer(
    device: &wgpu::Device,
    size: OutputSize,
    format: wgpu::TextureFormat,
) -> DepthBuffer {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("framewright depth buffer"),
        size: wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    DepthBuffer {
        _texture: texture,
        view,
        has_stencil: format.has_stencil_aspect(),
    }
}
