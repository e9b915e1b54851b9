use std::any::Any;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::graphics::{ClearColor, GraphicsContext, SurfaceErrorAction};

use super::frame::GpuFrame;
use super::init::{present_mode_for, GpuInit};
use super::surface;

/// wgpu-backed `GraphicsContext` bound to one winit window.
///
/// Construction is cheap; the adapter, device and surface are acquired in
/// `initialize`. The native handles exposed for interop are `wgpu::Device` and
/// `wgpu::Queue`.
pub struct WgpuContext {
    // Field order is drop order: the in-flight frame before the surface, the
    // surface before the window it was created from.
    frame: Option<GpuFrame>,
    gpu: Option<GpuState>,
    init: GpuInit,
    /// Surface configuration changed while a frame was in flight.
    pending_reconfigure: bool,
    window: Arc<Window>,
}

/// Core wgpu objects, present only after a successful `initialize`.
struct GpuState {
    /// Surface bound to the window. `'static` because it holds an `Arc<Window>`.
    surface: wgpu::Surface<'static>,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl GpuState {
    /// Adapter/device acquisition is asynchronous under wgpu.
    async fn new(window: Arc<Window>, init: &GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        // Use all backends to allow wgpu to select the optimal platform backend.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("drite-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, init.prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = surface::choose_alpha_mode(&surface_caps, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            config,
            size,
        })
    }

    fn reconfigure(&self) {
        if self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
    }
}

impl WgpuContext {
    /// Creates an uninitialized context for `window`.
    pub fn new(window: Arc<Window>, init: GpuInit) -> Self {
        Self {
            frame: None,
            gpu: None,
            init,
            pending_reconfigure: false,
            window,
        }
    }

    /// Returns the active surface format, once initialized.
    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.gpu.as_ref().map(|g| g.config.format)
    }

    /// Returns information about the selected adapter, once initialized.
    pub fn adapter_info(&self) -> Option<wgpu::AdapterInfo> {
        self.gpu.as_ref().map(|g| g.adapter.get_info())
    }

    /// Reconfigures the surface after the window changed size.
    ///
    /// Deferred to the end of the current frame when one is in flight.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        gpu.size = new_size;
        if !surface::resize_config(&mut gpu.config, new_size) {
            return;
        }

        if self.frame.is_some() {
            self.pending_reconfigure = true;
        } else {
            gpu.reconfigure();
        }
    }

    fn apply_pending_reconfigure(&mut self) {
        if !self.pending_reconfigure || self.frame.is_some() {
            return;
        }
        if let Some(gpu) = self.gpu.as_ref() {
            gpu.reconfigure();
        }
        self.pending_reconfigure = false;
    }
}

impl GraphicsContext for WgpuContext {
    fn initialize(&mut self) -> Result<()> {
        if self.gpu.is_some() {
            return Ok(());
        }

        let gpu = pollster::block_on(GpuState::new(self.window.clone(), &self.init))?;
        let size = gpu.size;
        self.gpu = Some(gpu);

        if let (Some(info), Some(format)) = (self.adapter_info(), self.surface_format()) {
            log::info!(
                "graphics: {} ({:?}, {:?}), surface {:?} {}x{}",
                info.name,
                info.backend,
                info.device_type,
                format,
                size.width,
                size.height
            );
        }
        Ok(())
    }

    fn begin_frame(&mut self) -> std::result::Result<(), SurfaceErrorAction> {
        if self.frame.is_some() {
            log::warn!("begin_frame called while a frame is already open");
            return Ok(());
        }

        self.apply_pending_reconfigure();

        let Some(gpu) = self.gpu.as_ref() else {
            return Err(SurfaceErrorAction::SkipFrame);
        };

        // Minimized windows report a zero-sized drawable; nothing to acquire.
        if gpu.size.width == 0 || gpu.size.height == 0 {
            return Err(SurfaceErrorAction::SkipFrame);
        }

        let surface_texture = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                let action = surface::classify_surface_error(&err);
                log::debug!("surface acquisition failed ({err}): {action:?}");
                if action == SurfaceErrorAction::Reconfigured {
                    gpu.reconfigure();
                }
                return Err(action);
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("drite frame encoder"),
            });

        self.frame = Some(GpuFrame {
            surface_texture,
            view,
            encoder,
        });

        Ok(())
    }

    fn end_frame(&mut self) {
        let Some(frame) = self.frame.take() else {
            log::warn!("end_frame called without an open frame");
            return;
        };

        if let Some(gpu) = self.gpu.as_ref() {
            gpu.queue.submit(std::iter::once(frame.encoder.finish()));
            self.window.pre_present_notify();
            drop(frame.view);
            frame.surface_texture.present();
        }

        self.apply_pending_reconfigure();
    }

    fn clear(&mut self, color: ClearColor) {
        let Some(frame) = self.frame.as_mut() else {
            log::warn!("clear called outside of a frame");
            return;
        };

        // The pass only exists for its load op; dropping it ends the pass.
        let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("drite clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view:           &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load:  wgpu::LoadOp::Clear(color.into()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes:         None,
            occlusion_query_set:      None,
            multiview_mask:           None,
        });
    }

    fn set_vsync(&mut self, enabled: bool) {
        let mode = present_mode_for(enabled);
        self.init.present_mode = mode;

        if let Some(gpu) = self.gpu.as_mut() {
            if gpu.config.present_mode == mode {
                return;
            }
            gpu.config.present_mode = mode;
            self.pending_reconfigure = true;
            self.apply_pending_reconfigure();
        }
    }

    fn viewport_size(&self) -> (u32, u32) {
        let size = match &self.gpu {
            Some(gpu) => gpu.size,
            None => self.window.inner_size(),
        };
        (size.width, size.height)
    }

    fn native_device(&self) -> Option<&dyn Any> {
        self.gpu.as_ref().map(|g| &g.device as &dyn Any)
    }

    fn native_command_queue(&self) -> Option<&dyn Any> {
        self.gpu.as_ref().map(|g| &g.queue as &dyn Any)
    }
}
