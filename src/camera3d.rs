use std::sync::Arc;

use glam::{vec3, Mat3, Mat4, Quat, Vec3};
use winit::dpi::PhysicalSize;

use crate::{GraphicsContext, ToRaw, UniformBuffer};

/// Position plus pitch/yaw orientation. Yaw 0 / pitch 0 looks down -Z.
#[derive(Debug, Clone, Copy)]
pub struct Camera3DTransform {
    pub pos: Vec3,
    pub pitch: f32,
    pub yaw: f32,
}

impl Camera3DTransform {
    pub fn forward(&self) -> Vec3 {
        vec3(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.pos, self.forward(), Vec3::Y)
    }

    /// World-space orientation of the camera, the quaternion billboards
    /// rotate their quads by so they face the viewer.
    pub fn orientation(&self) -> Quat {
        // the view rotation is orthonormal, so its inverse is the transpose.
        let rot = Mat3::from_mat4(self.view_matrix()).transpose();
        Quat::from_mat3(&rot).normalize()
    }

    /// Aims the camera at `target` from its current position.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.pos).normalize_or_zero();
        self.pitch = dir.y.asin();
        self.yaw = dir.x.atan2(-dir.z);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub fov_y_radians: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, self.aspect, self.z_near, self.z_far)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Camera3d {
    pub transform: Camera3DTransform,
    pub projection: Projection,
}

impl Camera3d {
    pub fn new(width: u32, height: u32) -> Self {
        Camera3d {
            transform: Camera3DTransform {
                pos: vec3(0.0, 0.0, 10.0),
                pitch: 0.0,
                yaw: 0.0,
            },
            projection: Projection {
                fov_y_radians: 0.78,
                aspect: width as f32 / height as f32,
                z_near: 0.1,
                z_far: 1000.0,
            },
        }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.projection.aspect = size.width as f32 / size.height as f32;
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Camera3dRaw {
    view_proj: Mat4,
    view_position: [f32; 4],
}

impl ToRaw for Camera3d {
    type Raw = Camera3dRaw;

    fn to_raw(&self) -> Self::Raw {
        Camera3dRaw {
            view_proj: self.projection.matrix() * self.transform.view_matrix(),
            view_position: self.transform.pos.extend(1.0).to_array(),
        }
    }
}

/// GPU resources for the camera: uniform buffer + bind group at slot 0.
pub struct Camera3dGR {
    uniform: UniformBuffer<Camera3dRaw>,
    bind_group: wgpu::BindGroup,
    bind_group_layout: Arc<wgpu::BindGroupLayout>,
}

impl Camera3dGR {
    pub fn new(ctx: &GraphicsContext, camera: &Camera3d) -> Self {
        let uniform = UniformBuffer::new(camera.to_raw(), &ctx.device);

        let layout_descriptor = wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera BindGroupLayout"),
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
        };
        let bind_group_layout = Arc::new(ctx.device.create_bind_group_layout(&layout_descriptor));
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera BindGroup"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.buffer().as_entire_binding(),
            }],
        });

        Self {
            uniform,
            bind_group_layout,
            bind_group,
        }
    }

    pub fn prepare(&mut self, queue: &wgpu::Queue, camera: &Camera3d) {
        self.uniform.update_and_prepare(camera.to_raw(), queue);
    }

    pub fn bind_group_layout(&self) -> &Arc<wgpu::BindGroupLayout> {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_orientation_is_identity() {
        let transform = Camera3DTransform {
            pos: vec3(3.0, 2.0, 1.0),
            pitch: 0.0,
            yaw: 0.0,
        };
        let q = transform.orientation();
        assert!(q.angle_between(Quat::IDENTITY) < 1e-5);
    }

    #[test]
    fn orientation_rotates_quad_towards_camera() {
        // a camera yawed 90 degrees right must rotate +Z into its backward axis.
        let transform = Camera3DTransform {
            pos: Vec3::ZERO,
            pitch: 0.0,
            yaw: std::f32::consts::FRAC_PI_2,
        };
        let backward = -transform.forward();
        let rotated = transform.orientation() * Vec3::Z;
        assert!((rotated - backward).length() < 1e-4);
    }

    #[test]
    fn look_at_points_forward_to_target() {
        let mut transform = Camera3DTransform {
            pos: vec3(0.0, 5.0, 10.0),
            pitch: 0.0,
            yaw: 0.0,
        };
        transform.look_at(vec3(0.0, 4.0, 0.0));
        let dir = (vec3(0.0, 4.0, 0.0) - transform.pos).normalize();
        assert!((transform.forward() - dir).length() < 1e-4);
    }
}
