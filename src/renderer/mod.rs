pub mod globes;
pub mod screen_textures;

#[derive(Debug, Clone, Copy)]
pub struct RenderFormat {
    pub color: wgpu::TextureFormat,
    pub depth: Option<wgpu::TextureFormat>,
    pub msaa_sample_count: u32,
}

impl RenderFormat {
    pub const LDR_MSAA4: RenderFormat = RenderFormat {
        color: wgpu::TextureFormat::Bgra8UnormSrgb,
        depth: Some(wgpu::TextureFormat::Depth32Float),
        msaa_sample_count: 4,
    };

    pub const LDR_NO_MSAA: RenderFormat = RenderFormat {
        color: wgpu::TextureFormat::Bgra8UnormSrgb,
        depth: Some(wgpu::TextureFormat::Depth32Float),
        msaa_sample_count: 1,
    };
}
