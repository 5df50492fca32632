use std::sync::OnceLock;

use glam::Vec4;
use image::RgbaImage;

use crate::{
    AssetSource, BindableTexture, Camera3d, GeometryId, GraphicsContext, InstanceBuffer,
    LoadingAsset, Physics, Texture, Time, Transform, UniformBuffer,
};

use super::{GlobeCluster, GlobeInstance, GLOBE_SIZE};

/// File name of the sprite sheet, resolved against the configured base
/// location. A horizontal strip of 8 equal-width frames.
const SPRITE_SHEET_NAME: &str = "globes.png";

#[derive(Debug, Clone)]
pub struct GlobesConfig {
    pub row_count: u32,
    pub type_count: u32,
    pub seed: String,
    pub max_particles: usize,
    /// Directory or http(s) url the sprite sheet is fetched relative to.
    pub base_location: String,
}

impl Default for GlobesConfig {
    fn default() -> Self {
        Self {
            row_count: 32,
            type_count: 3,
            seed: "lol".to_owned(),
            max_particles: 256,
            base_location: "./assets".to_owned(),
        }
    }
}

/// The fixed uniform record of the globes material. Explicitly shaped, one
/// field per uniform, mirrored by the `Globes` struct in `globes.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobesUniformsRaw {
    /// Camera orientation quaternion as (x, y, z, w).
    pub billboard_quat: Vec4,
    /// Milliseconds since startup.
    pub time: f32,
    pub globe_size: f32,
    pub _pad: [f32; 2],
}

/// The globes effect: fixed seeded particle layout, a fixed-capacity
/// instance buffer rewritten every frame, the material uniforms, and the
/// asynchronously loading sprite sheet.
pub struct GlobesMesh {
    pub transform: Transform,
    cluster: GlobeCluster,
    instance_buffer: InstanceBuffer<GlobeInstance>,
    uniforms: UniformBuffer<GlobesUniformsRaw>,
    uniforms_bind_group: wgpu::BindGroup,
    pending_uniforms: GlobesUniformsRaw,
    texture: Option<BindableTexture>,
    /// In flight until the sprite sheet arrives; dropped (and thereby
    /// cancelled) on teardown.
    loading_texture: Option<LoadingAsset<RgbaImage>>,
    /// Physics geometry acquired by this effect. Stays empty today, but
    /// everything that ends up in here is released in [`GlobesMesh::cleanup`].
    physics_ids: Vec<GeometryId>,
}

impl GlobesMesh {
    pub fn new(
        config: &GlobesConfig,
        ctx: &GraphicsContext,
        rt: &tokio::runtime::Runtime,
    ) -> anyhow::Result<Self> {
        let cluster = GlobeCluster::new(
            config.row_count,
            config.type_count,
            &config.seed,
            config.max_particles,
        )?;
        let instance_buffer = InstanceBuffer::new(config.max_particles, &ctx.device);

        let pending_uniforms = GlobesUniformsRaw {
            billboard_quat: Vec4::new(0.0, 0.0, 0.0, 1.0),
            time: 0.0,
            globe_size: GLOBE_SIZE,
            _pad: [0.0; 2],
        };
        let uniforms = UniformBuffer::new(pending_uniforms, &ctx.device);
        let uniforms_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globes BindGroup"),
            layout: globes_uniforms_bind_group_layout_cached(&ctx.device),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.buffer().as_entire_binding(),
            }],
        });

        let source = AssetSource::relative_to(&config.base_location, SPRITE_SHEET_NAME);
        let loading_texture = Some(LoadingAsset::spawn(source, rt));

        Ok(Self {
            transform: Transform::default(),
            cluster,
            instance_buffer,
            uniforms,
            uniforms_bind_group,
            pending_uniforms,
            texture: None,
            loading_texture,
            physics_ids: vec![],
        })
    }

    /// Once per frame: recompute all instance offsets for the frame's
    /// timestamp and refresh the camera-facing quaternion.
    pub fn update(&mut self, time: &Time, camera: &Camera3d) {
        let time_ms = time.total_ms();
        self.cluster.update(time_ms);
        self.pending_uniforms = GlobesUniformsRaw {
            billboard_quat: Vec4::from(camera.transform.orientation()),
            time: time_ms as f32,
            globe_size: GLOBE_SIZE,
            _pad: [0.0; 2],
        };
    }

    /// Uploads this frame's instance offsets and uniforms, and publishes the
    /// sprite sheet once its load has finished. A failed load is logged and
    /// leaves the effect on the fallback texture.
    pub fn prepare(&mut self, ctx: &GraphicsContext) {
        if let Some(loading) = &mut self.loading_texture {
            if let Some(result) = loading.poll() {
                match result {
                    Ok(image) => {
                        let texture = Texture::from_image(
                            &ctx.device,
                            &ctx.queue,
                            &image,
                            wgpu::FilterMode::Nearest,
                            Some(SPRITE_SHEET_NAME),
                        );
                        self.texture = Some(BindableTexture::new(&ctx.device, texture));
                    }
                    Err(err) => {
                        log::warn!("could not load sprite sheet {SPRITE_SHEET_NAME}: {err:#}");
                    }
                }
                self.loading_texture = None;
            }
        }

        self.instance_buffer.prepare(self.cluster.instances(), &ctx.queue);
        self.uniforms
            .update_and_prepare(self.pending_uniforms, &ctx.queue);
    }

    /// Releases everything this effect acquired from the host: all physics
    /// geometry handles, and the pending sprite sheet load (aborted by drop).
    pub fn cleanup(&mut self, physics: &mut Physics) {
        for id in self.physics_ids.drain(..) {
            physics.remove_geometry(id);
        }
        self.loading_texture = None;
    }

    pub fn texture(&self) -> Option<&BindableTexture> {
        self.texture.as_ref()
    }

    pub fn uniforms_bind_group(&self) -> &wgpu::BindGroup {
        &self.uniforms_bind_group
    }

    pub fn instance_buffer(&self) -> &InstanceBuffer<GlobeInstance> {
        &self.instance_buffer
    }

    pub fn n_particles(&self) -> usize {
        self.cluster.n_particles()
    }

    pub fn cluster(&self) -> &GlobeCluster {
        &self.cluster
    }
}

static GLOBES_UNIFORMS_BIND_GROUP_LAYOUT: OnceLock<wgpu::BindGroupLayout> = OnceLock::new();

pub fn globes_uniforms_bind_group_layout_cached(
    device: &wgpu::Device,
) -> &'static wgpu::BindGroupLayout {
    GLOBES_UNIFORMS_BIND_GROUP_LAYOUT.get_or_init(|| {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globes BindGroupLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    })
}
