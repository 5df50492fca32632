use std::sync::Arc;

use wgpu::ShaderStages;

use crate::{
    make_shader_source, rgba_bind_group_layout_cached, white_px_texture_cached, Camera3dGR,
    GraphicsContext, HotReload, RenderFormat, ShaderCache, ShaderSource, ToRaw, TransformRaw,
    VertsLayout,
};

use super::{globes_uniforms_bind_group_layout_cached, GlobeInstance, GlobesMesh};

const SHADER_SOURCE: ShaderSource = make_shader_source!("globes.wgsl");

pub struct GlobesRenderer {
    pipeline: wgpu::RenderPipeline,
    render_format: RenderFormat,
    ctx: GraphicsContext,
    camera_layout: Arc<wgpu::BindGroupLayout>,
}

impl GlobesRenderer {
    pub fn new(
        ctx: &GraphicsContext,
        camera: &Camera3dGR,
        render_format: RenderFormat,
        cache: &mut ShaderCache,
    ) -> GlobesRenderer {
        let ctx = ctx.clone();
        let shader = cache.register(SHADER_SOURCE, &ctx.device);
        let pipeline = create_pipeline(&shader, &ctx.device, camera.bind_group_layout(), render_format);
        let camera_layout = camera.bind_group_layout().clone();

        GlobesRenderer {
            pipeline,
            render_format,
            ctx,
            camera_layout,
        }
    }

    pub fn render<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        camera: &'a Camera3dGR,
        mesh: &'a GlobesMesh,
    ) {
        // until the sprite sheet arrives, draw with the white fallback.
        let texture = mesh
            .texture()
            .unwrap_or_else(|| white_px_texture_cached(&self.ctx.device, &self.ctx.queue));

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera.bind_group(), &[]);
        pass.set_bind_group(1, &texture.bind_group, &[]);
        pass.set_bind_group(2, mesh.uniforms_bind_group(), &[]);
        pass.set_push_constants(
            ShaderStages::VERTEX,
            0,
            bytemuck::cast_slice(&[mesh.transform.to_raw()]),
        );
        pass.set_vertex_buffer(0, mesh.instance_buffer().buffer().slice(..));
        pass.draw(0..4, 0..mesh.instance_buffer().n_instances() as u32);
    }
}

fn create_pipeline(
    shader: &wgpu::ShaderModule,
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
    render_format: RenderFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("globes pipeline layout"),
        bind_group_layouts: &[
            camera_layout,
            rgba_bind_group_layout_cached(device),
            globes_uniforms_bind_group_layout_cached(device),
        ],
        push_constant_ranges: &[wgpu::PushConstantRange {
            stages: wgpu::ShaderStages::VERTEX,
            range: 0..std::mem::size_of::<TransformRaw>() as u32,
        }],
    });

    let vertexes = VertsLayout::new().instance::<GlobeInstance>();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("globes pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: vertexes.layout(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: render_format.color,
                // the fragment stage discards below 0.99 alpha; blending is
                // kept on alongside it, matching the original material state.
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: Some(wgpu::IndexFormat::Uint32),
            front_face: wgpu::FrontFace::Ccw,
            // billboards are double-sided
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: render_format.depth.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: render_format.msaa_sample_count,
            ..Default::default()
        },
        multiview: None,
    })
}

impl HotReload for GlobesRenderer {
    fn source(&self) -> ShaderSource {
        SHADER_SOURCE
    }

    fn hot_reload(&mut self, shader: &wgpu::ShaderModule, device: &wgpu::Device) {
        self.pipeline = create_pipeline(shader, device, &self.camera_layout, self.render_format);
    }
}

#[cfg(test)]
mod tests {
    use super::SHADER_SOURCE;

    #[test]
    fn shader_source_is_valid_wgsl() {
        for file in SHADER_SOURCE.files {
            wgpu::naga::front::wgsl::parse_str(file.wgsl)
                .unwrap_or_else(|err| panic!("{}: {err}", file.file));
        }
    }
}
