//! The canvas surface and page-texture uploads, on `spine2d-wgpu`.

use spine2d::DrawList;
use spine2d_wgpu::{SpineRenderer, TextureProvider, create_texture_bind_group};
use spine_viewer::{
    Camera, DataUrl, PageImage, PageTexture, RenderSurface, Scene, SnapshotFormat, SurfaceSize,
    TextureUploader, ViewOptions, ViewerError,
};

use super::dom::js_error_message;
use crate::{DEBUG_TEXTURE, SpineRig};

fn unavailable(what: &str, e: impl std::fmt::Debug) -> ViewerError {
    ViewerError::RenderingUnavailable {
        message: format!("{what}: {e:?}"),
    }
}

/// Creates the wgpu surface on `canvas` and everything that renders into it.
pub(crate) async fn init(
    canvas: web_sys::HtmlCanvasElement,
    size: SurfaceSize,
) -> Result<(GpuSurface, GpuUploader), ViewerError> {
    let width = size.width.max(1);
    let height = size.height.max(1);
    canvas.set_width(width);
    canvas.set_height(height);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| unavailable("create_surface", e))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| unavailable("request_adapter", e))?;

    // Snapshots render far larger than the page canvas.
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("spine-viewer device"),
            required_limits: adapter.limits(),
            ..Default::default()
        })
        .await
        .map_err(|e| unavailable("request_device", e))?;

    let caps = surface.get_capabilities(&adapter);
    let format = caps
        .formats
        .first()
        .copied()
        .ok_or_else(|| unavailable("surface", "no formats"))?;
    let present_mode = caps
        .present_modes
        .first()
        .copied()
        .unwrap_or(wgpu::PresentMode::Fifo);
    // Transparent snapshots need a surface that keeps alpha.
    let alpha_mode = caps
        .alpha_modes
        .iter()
        .copied()
        .find(|m| *m == wgpu::CompositeAlphaMode::PreMultiplied)
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        desired_maximum_frame_latency: 2,
        present_mode,
        alpha_mode,
        view_formats: vec![],
    };
    surface.configure(&device, &config);
    log::info!(
        "surface configured: {width}x{height} {format:?}, alpha {alpha_mode:?}, max texture {}",
        device.limits().max_texture_dimension_2d
    );

    let renderer = SpineRenderer::new(&device, config.format);
    let mut uploader = GpuUploader {
        device: device.clone(),
        queue: queue.clone(),
        layout: renderer.texture_bind_group_layout().clone(),
    };
    let white = PageImage {
        width: 1,
        height: 1,
        pixels: vec![255; 4],
    };
    let debug_texture = uploader.upload(DEBUG_TEXTURE, &white)?;

    let surface = GpuSurface {
        canvas,
        surface,
        device,
        queue,
        config,
        renderer,
        draw_list: DrawList::default(),
        debug_texture,
    };
    Ok((surface, uploader))
}

/// Creates one sRGB texture and bind group per atlas page.
#[derive(Clone)]
pub(crate) struct GpuUploader {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: wgpu::BindGroupLayout,
}

impl TextureUploader for GpuUploader {
    type Texture = wgpu::BindGroup;

    fn upload(&mut self, page: &str, image: &PageImage) -> Result<wgpu::BindGroup, ViewerError> {
        let max = self.device.limits().max_texture_dimension_2d;
        if image.width > max || image.height > max {
            return Err(ViewerError::Decode {
                file: page.to_string(),
                message: format!(
                    "{}x{} exceeds the maximum texture size {max}",
                    image.width, image.height
                ),
            });
        }

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(page),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            texture.as_image_copy(),
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("spine-viewer page sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(create_texture_bind_group(
            &self.device,
            &self.layout,
            &view,
            &sampler,
        ))
    }
}

/// Page textures of the installed scene plus the debug-overlay texture.
struct SceneTextures<'a> {
    pages: &'a [PageTexture<wgpu::BindGroup>],
    debug: &'a wgpu::BindGroup,
}

impl TextureProvider for SceneTextures<'_> {
    fn bind_group_for(&self, texture_path: &str) -> Option<&wgpu::BindGroup> {
        if texture_path == DEBUG_TEXTURE {
            return Some(self.debug);
        }
        self.pages
            .iter()
            .find(|p| p.page == texture_path)
            .map(|p| &p.texture)
    }
}

pub(crate) struct GpuSurface {
    canvas: web_sys::HtmlCanvasElement,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: SpineRenderer,
    draw_list: DrawList,
    debug_texture: wgpu::BindGroup,
}

impl RenderSurface for GpuSurface {
    type Rig = SpineRig;
    type Texture = wgpu::BindGroup;

    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.config.width, self.config.height)
    }

    fn resize(&mut self, size: SurfaceSize) -> SurfaceSize {
        let max = self.device.limits().max_texture_dimension_2d;
        let width = size.width.clamp(1, max);
        let height = size.height.clamp(1, max);
        if width != size.width || height != size.height {
            log::warn!(
                "surface size {}x{} clamped to {width}x{height}",
                size.width,
                size.height
            );
        }
        if width != self.config.width || height != self.config.height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
        self.size()
    }

    fn draw(
        &mut self,
        scene: Option<&Scene<SpineRig, wgpu::BindGroup>>,
        camera: &Camera,
        options: &ViewOptions,
    ) -> Result<(), ViewerError> {
        self.draw_list.clear();
        if let Some(scene) = scene {
            scene
                .rig
                .append_draw_list(&mut self.draw_list, options.premultiplied_alpha);
            if options.debug_overlay {
                scene
                    .rig
                    .append_debug_overlay(&mut self.draw_list, camera.zoom);
            }
        }
        self.renderer
            .update_globals_matrix(&self.queue, camera.clip_from_world(self.size()));
        self.renderer
            .upload(&self.device, &self.queue, &self.draw_list);

        // One retry after reconfiguring; a capture must not read a skipped frame.
        let frame = match self.surface.get_current_texture() {
            Ok(f) => f,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| unavailable("get_current_texture", e))?
            }
            Err(e) => return Err(unavailable("get_current_texture", e)),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("spine-viewer encoder"),
            });

        let [r, g, b, a] = options.clear_color.0;
        let textures = SceneTextures {
            pages: scene.map(|s| s.textures.as_slice()).unwrap_or(&[]),
            debug: &self.debug_texture,
        };
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("spine-viewer pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer
                .render(&mut pass, &self.draw_list, &textures);
        }

        self.queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }

    fn capture(&mut self, format: SnapshotFormat) -> Result<DataUrl, ViewerError> {
        let url = self
            .canvas
            .to_data_url_with_type(format.mime())
            .map_err(|e| ViewerError::Snapshot {
                message: js_error_message(&e),
            })?;
        DataUrl::parse(&url)
    }
}
