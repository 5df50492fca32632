use std::sync::OnceLock;

use image::RgbaImage;

#[derive(Debug)]
pub struct Texture {
    pub label: Option<String>,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: wgpu::Extent3d,
}

/// A texture plus the rgba bind group (group layout cached process-wide) that
/// renderers bind at slot 1.
#[derive(Debug)]
pub struct BindableTexture {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl BindableTexture {
    pub fn new(device: &wgpu::Device, texture: Texture) -> Self {
        let layout = rgba_bind_group_layout_cached(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: texture.label.as_deref(),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });
        BindableTexture {
            texture,
            bind_group,
        }
    }
}

impl Texture {
    /// Uploads an rgba image into an sRGB texture. Sprite sheets want
    /// `wgpu::FilterMode::Nearest` to keep frame edges crisp.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        filter: wgpu::FilterMode,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width()),
                rows_per_image: Some(image.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Texture {
            label: label.map(|s| s.to_owned()),
            texture,
            view,
            sampler,
            size,
        }
    }
}

static RGBA_BIND_GROUP_LAYOUT: OnceLock<wgpu::BindGroupLayout> = OnceLock::new();

pub fn rgba_bind_group_layout_cached(device: &wgpu::Device) -> &'static wgpu::BindGroupLayout {
    RGBA_BIND_GROUP_LAYOUT.get_or_init(|| {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rgba texture"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    })
}

static WHITE_PX_TEXTURE: OnceLock<BindableTexture> = OnceLock::new();

/// 1x1 opaque white fallback, bound while the real sprite sheet is still
/// loading (or failed to load).
pub fn white_px_texture_cached(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> &'static BindableTexture {
    WHITE_PX_TEXTURE.get_or_init(|| create_white_px_texture(device, queue))
}

pub fn create_white_px_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> BindableTexture {
    let image = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
    let texture = Texture::from_image(
        device,
        queue,
        &image,
        wgpu::FilterMode::Nearest,
        Some("white px"),
    );
    BindableTexture::new(device, texture)
}
