use log::warn;
use winit::dpi::PhysicalSize;

use crate::{RenderFormat, Texture};

/// Offscreen per-frame targets: an msaa color texture resolved into the
/// surface view, plus the depth buffer. With `msaa_sample_count == 1` the
/// pass renders straight into the surface view.
pub struct ScreenTextures {
    pub render_format: RenderFormat,
    pub depth_texture: Option<DepthTexture>,
    pub msaa_texture: Option<wgpu::TextureView>,
}

impl ScreenTextures {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, render_format: RenderFormat) -> Self {
        let depth_texture = render_format.depth.map(|depth_format| {
            DepthTexture::create(
                device,
                width,
                height,
                depth_format,
                render_format.msaa_sample_count,
            )
        });
        let msaa_texture = (render_format.msaa_sample_count > 1)
            .then(|| create_msaa_texture(device, width, height, render_format));

        Self {
            render_format,
            depth_texture,
            msaa_texture,
        }
    }

    pub fn new_render_pass<'e>(
        &'e self,
        encoder: &'e mut wgpu::CommandEncoder,
        surface_view: &'e wgpu::TextureView,
        clear_color: wgpu::Color,
    ) -> wgpu::RenderPass<'e> {
        let color_attachment = match &self.msaa_texture {
            Some(msaa_view) => wgpu::RenderPassColorAttachment {
                view: msaa_view,
                resolve_target: Some(surface_view),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            },
            None => wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            },
        };
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("screen renderpass"),
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment: self.depth_texture.as_ref().map(|depth_texture| {
                wgpu::RenderPassDepthStencilAttachment {
                    view: depth_texture.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        if let Some(depth_texture) = &mut self.depth_texture {
            depth_texture.recreate(device, size.width, size.height);
        }
        if self.msaa_texture.is_some() {
            self.msaa_texture = Some(create_msaa_texture(
                device,
                size.width,
                size.height,
                self.render_format,
            ));
        }
    }
}

fn create_msaa_texture(
    device: &wgpu::Device,
    mut width: u32,
    mut height: u32,
    render_format: RenderFormat,
) -> wgpu::TextureView {
    if width == 0 || height == 0 {
        warn!("attempted to create msaa texture with size {width}x{height}");
        width = width.max(1);
        height = height.max(1);
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa color target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: render_format.msaa_sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: render_format.color,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

pub struct DepthTexture {
    texture: Texture,
    depth_format: wgpu::TextureFormat,
    sample_count: u32,
}

impl DepthTexture {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.texture.view
    }

    pub fn create(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let format = depth_format;
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some("Depth texture"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[format],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture: Texture {
                label: Some("Depth Texture".into()),
                texture,
                view,
                sampler,
                size,
            },
            depth_format,
            sample_count,
        }
    }

    pub fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        *self = Self::create(device, width, height, self.depth_format, self.sample_count);
    }
}
