use std::sync::Arc;

use glam::vec3;
use winit::event::WindowEvent;

use crate::{
    AppT, Camera3d, Camera3dGR, GlobesConfig, GlobesMesh, GlobesRenderer, GraphicsContext,
    Physics, RenderFormat, Runner, RunnerCallbacks, ScreenTextures, ShaderCache, Time, Window,
};

use crate::renderer::globes::GLOBE_SEPARATION_Y;

/// use it like this.
pub fn main() {
    let runner = Runner::new(Default::default());
    let mut world = GlobesWorld::new(runner.window()).unwrap();
    runner.run(&mut world).unwrap();
}

const RENDER_FORMAT: RenderFormat = RenderFormat::LDR_MSAA4;

/// The host side of the effect: owns the window, graphics context, clock,
/// camera and physics registry, drives the effect once per frame, and tears
/// it down when the window closes.
pub struct GlobesWorld {
    pub window: Arc<Window>,
    pub rt: tokio::runtime::Runtime,
    pub ctx: GraphicsContext,
    pub shader_cache: ShaderCache,
    pub time: Time,
    pub camera: Camera3d,
    pub camera_gr: Camera3dGR,
    pub screen_textures: ScreenTextures,
    pub physics: Physics,
    pub globes_renderer: GlobesRenderer,
    pub globes: GlobesMesh,
    close_requested: bool,
}

impl AppT for GlobesWorld {
    fn receive_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                self.ctx.resize(*size);
                self.screen_textures.resize(&self.ctx.device, *size);
                self.camera.resize(*size);
            }
            _ => {}
        }
    }

    fn update(&mut self, cb: &mut RunnerCallbacks) {
        if self.close_requested {
            self.teardown();
            cb.exit("window closed");
            return;
        }
        self.start_frame();
        self.orbit_camera();
        self.globes.update(&self.time, &self.camera);
        self.render();
    }
}

impl GlobesWorld {
    pub fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let ctx = GraphicsContext::new(Default::default(), &rt, &window)?;
        let mut shader_cache = ShaderCache::new(Some("./assets"));

        let size = window.inner_size();
        let camera = Camera3d::new(size.width, size.height);
        let camera_gr = Camera3dGR::new(&ctx, &camera);
        let screen_textures =
            ScreenTextures::new(&ctx.device, size.width, size.height, RENDER_FORMAT);

        let physics = Physics::new();
        let globes_renderer =
            GlobesRenderer::new(&ctx, &camera_gr, RENDER_FORMAT, &mut shader_cache);
        let globes = GlobesMesh::new(&GlobesConfig::default(), &ctx, &rt)?;

        Ok(Self {
            window,
            rt,
            ctx,
            shader_cache,
            time: Time::new(),
            camera,
            camera_gr,
            screen_textures,
            physics,
            globes_renderer,
            globes,
            close_requested: false,
        })
    }

    fn start_frame(&mut self) {
        self.time.start_frame();
        if self.time.frame_count() % 300 == 0 {
            log::debug!("fps: {:.1}", self.time.fps());
        }
        self.shader_cache
            .hot_reload(&mut [&mut self.globes_renderer], &self.ctx.device);
    }

    /// Slow circle around the cluster anchor, aimed at its mid height.
    fn orbit_camera(&mut self) {
        let angle = self.time.total().as_secs_f32() * 0.1;
        let n_rows = (self.globes.cluster().n_particles() / 2) as f32;
        let mid_height = n_rows * GLOBE_SEPARATION_Y * 0.5;
        self.camera.transform.pos = vec3(angle.sin() * 14.0, mid_height + 2.0, angle.cos() * 14.0);
        self.camera.transform.look_at(vec3(0.0, mid_height, 0.0));
    }

    fn render(&mut self) {
        let mut encoder = self.ctx.new_encoder();

        self.camera_gr.prepare(&self.ctx.queue, &self.camera);
        self.globes.prepare(&self.ctx);

        let (surface, view) = self.ctx.new_surface_texture_and_view();
        let clear_color = wgpu::Color {
            r: 0.01,
            g: 0.01,
            b: 0.02,
            a: 1.0,
        };
        let mut pass = self
            .screen_textures
            .new_render_pass(&mut encoder, &view, clear_color);
        self.globes_renderer
            .render(&mut pass, &self.camera_gr, &self.globes);
        drop(pass);

        self.ctx.queue.submit([encoder.finish()]);
        surface.present();
    }

    /// Runs exactly once, right before exit: the effect releases everything
    /// it acquired from the host.
    fn teardown(&mut self) {
        self.globes.cleanup(&mut self.physics);
    }
}
