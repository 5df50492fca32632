pub mod app;
pub mod asset;
pub mod buffer;
pub mod camera3d;
pub mod graphics_context;
pub mod physics;
pub mod procgen;
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod time;
pub mod transform;
pub mod vertex;
pub mod watcher;
pub mod world;

pub use renderer::{
    globes::{GlobeCluster, GlobeInstance, GlobesConfig, GlobesMesh, GlobesRenderer, Particle},
    screen_textures::{DepthTexture, ScreenTextures},
    RenderFormat,
};

pub use app::{AppT, Runner, RunnerCallbacks, WindowConfig};
pub use asset::{AssetSource, AssetT, LoadingAsset};
pub use buffer::{InstanceBuffer, ToRaw, UniformBuffer};
pub use camera3d::{Camera3DTransform, Camera3d, Camera3dGR, Camera3dRaw, Projection};
pub use graphics_context::{GraphicsContext, GraphicsContextConfig};
pub use physics::{GeometryId, Physics, PhysicsGeometry};
pub use procgen::SeededRng;
pub use shader::{HotReload, ShaderCache, ShaderFile, ShaderSource};
pub use texture::{
    create_white_px_texture, rgba_bind_group_layout_cached, white_px_texture_cached,
    BindableTexture, Texture,
};
pub use time::{Time, TimeStats};
pub use transform::{Transform, TransformRaw};
pub use vertex::{VertexT, VertsLayout};
pub use watcher::FileChangeWatcher;
pub use winit::{dpi::PhysicalSize, event::WindowEvent, keyboard::KeyCode, window::Window};
pub use world::GlobesWorld;

pub mod ext {
    pub use anyhow;
    pub use bytemuck;
    pub use glam;
    pub use image;
    pub use smallvec;
    pub use tokio;
    pub use wgpu;
    pub use winit;
}
