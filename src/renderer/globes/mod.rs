//! The "globes" effect: two columns of billboarded sprite quads orbiting a
//! shared anchor, one pair per height row, staggered in phase so the whole
//! formation twists into a slow spiral. Layout is procedural but seeded, so
//! a given seed always produces the same cluster.

use std::f32::consts::{PI, TAU};

use glam::{vec3, Quat, Vec3};

use crate::{SeededRng, VertexT};

mod globes_mesh;
pub use globes_mesh::{
    globes_uniforms_bind_group_layout_cached, GlobesConfig, GlobesMesh, GlobesUniformsRaw,
};

mod globes_renderer;
pub use globes_renderer::GlobesRenderer;

/// Phase offset per row, in revolutions.
pub const ROTATION_HEIGHT_RATE: f32 = 0.05;
/// Milliseconds per full orbit revolution.
pub const ROTATION_TIME_RATE: f64 = 4000.0;
/// Constant lean of the whole formation, applied after the spin.
pub const TILT_ANGLE: f32 = PI * 0.05;
/// Lateral distance of each globe from the spin axis.
pub const GLOBE_SEPARATION_X: f32 = 1.0;
/// Vertical distance between adjacent rows.
pub const GLOBE_SEPARATION_Y: f32 = 0.3;
/// Edge length of a globe quad.
pub const GLOBE_SIZE: f32 = 0.3;
/// Frames in the horizontal sprite strip.
pub const NUM_FRAMES: u32 = 8;

/// One globe of the cluster. Created once at construction, immutable after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Height band, `0..row_count`.
    pub row: u32,
    /// Which half of the pair, exactly -1.0 or +1.0.
    pub side: f32,
    /// Sprite-strip frame, `0..type_count`. Shared by both sides of a row.
    pub type_index: u32,
}

/// Per-instance GPU record. `frame` never changes after construction;
/// `offset` is recomputed every frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobeInstance {
    pub offset: Vec3,
    pub frame: u32,
}

impl VertexT for GlobeInstance {
    const ATTRIBUTES: &'static [wgpu::VertexFormat] = &[
        wgpu::VertexFormat::Float32x3, // offset
        wgpu::VertexFormat::Uint32,    // frame (flat integer attribute)
    ];
}

/// Draws one type per row from the seeded rng and emits the symmetric pair.
/// Total for any `row_count >= 0` and `type_count >= 1`.
pub fn generate_particles(
    row_count: u32,
    type_count: u32,
    rng: &mut SeededRng,
) -> Vec<Particle> {
    let mut particles = Vec::with_capacity(row_count as usize * 2);
    for row in 0..row_count {
        let type_index = rng.next_index(type_count as usize) as u32;
        for side in [-1.0, 1.0] {
            particles.push(Particle {
                row,
                side,
                type_index,
            });
        }
    }
    particles
}

fn tilt_quaternion() -> Quat {
    Quat::from_rotation_z(TILT_ANGLE)
}

/// World-space offset of a particle from the cluster anchor at time
/// `time_ms`: spin about Y (row-proportional phase plus the periodic time
/// term), then the constant tilt, applied to the particle's base offset.
pub fn orbit_offset(particle: &Particle, time_ms: f64) -> Vec3 {
    let time_turns = ((time_ms.rem_euclid(ROTATION_TIME_RATE)) / ROTATION_TIME_RATE) as f32;
    let angle = (particle.row as f32 * ROTATION_HEIGHT_RATE + time_turns) * TAU;
    let rotation = tilt_quaternion() * Quat::from_axis_angle(Vec3::Y, angle);
    let base = vec3(
        particle.side * GLOBE_SEPARATION_X,
        particle.row as f32 * GLOBE_SEPARATION_Y,
        0.0,
    );
    rotation * base
}

/// Mirror of the fragment stage's U remap (kept in sync with `globes.wgsl`):
/// maps quad-local `u` into frame `frame` of the horizontal strip. The small
/// nudge is inherited from the original sprite sheet's authoring.
pub fn sprite_strip_u(u: f32, frame: u32) -> f32 {
    (u + frame as f32) / NUM_FRAMES as f32 + 1.0 / (NUM_FRAMES as f32 * 31.0)
}

/// CPU side of the effect: the fixed particle list plus the instance staging
/// that is refilled in place every frame and uploaded by the mesh.
#[derive(Debug)]
pub struct GlobeCluster {
    particles: Vec<Particle>,
    instances: Vec<GlobeInstance>,
    max_particles: usize,
}

impl GlobeCluster {
    pub fn new(
        row_count: u32,
        type_count: u32,
        seed: &str,
        max_particles: usize,
    ) -> anyhow::Result<Self> {
        let n_particles = row_count as usize * 2;
        if n_particles > max_particles {
            anyhow::bail!(
                "globe cluster needs {n_particles} instance slots ({row_count} rows), \
                 but max_particles is {max_particles}"
            );
        }
        let mut rng = SeededRng::new(seed);
        let particles = generate_particles(row_count, type_count, &mut rng);
        let instances = particles
            .iter()
            .map(|p| GlobeInstance {
                offset: Vec3::ZERO,
                frame: p.type_index,
            })
            .collect();
        Ok(Self {
            particles,
            instances,
            max_particles,
        })
    }

    /// Recomputes every instance offset for `time_ms`. No allocation; writes
    /// go into the preallocated staging slots.
    pub fn update(&mut self, time_ms: f64) {
        for (particle, instance) in self.particles.iter().zip(self.instances.iter_mut()) {
            *instance = GlobeInstance {
                offset: orbit_offset(particle, time_ms),
                frame: particle.type_index,
            };
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn instances(&self) -> &[GlobeInstance] {
        &self.instances
    }

    pub fn n_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn assert_vec3_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_particles(32, 3, &mut SeededRng::new("lol"));
        let b = generate_particles(32, 3, &mut SeededRng::new("lol"));
        assert_eq!(a, b);
    }

    #[test]
    fn rows_are_symmetric_pairs() {
        let particles = generate_particles(16, 3, &mut SeededRng::new("pairs"));
        for row in 0..16 {
            let pair: Vec<&Particle> = particles.iter().filter(|p| p.row == row).collect();
            assert_eq!(pair.len(), 2);
            assert_eq!(pair[0].type_index, pair[1].type_index);
            let mut sides = [pair[0].side, pair[1].side];
            sides.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(sides, [-1.0, 1.0]);
        }
    }

    #[test]
    fn particle_count_is_twice_the_rows() {
        for rows in [0u32, 1, 7, 32, 100] {
            let particles = generate_particles(rows, 3, &mut SeededRng::new("count"));
            assert_eq!(particles.len(), rows as usize * 2);
        }
    }

    #[test]
    fn random_row_counts_keep_the_invariants() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let rows: u32 = rng.gen_range(0..200);
            let types: u32 = rng.gen_range(1..10);
            let particles = generate_particles(rows, types, &mut SeededRng::new("fuzz"));
            assert_eq!(particles.len(), rows as usize * 2);
            assert!(particles.iter().all(|p| p.type_index < types));
        }
    }

    #[test]
    fn orbit_is_periodic() {
        let particle = Particle {
            row: 13,
            side: -1.0,
            type_index: 0,
        };
        for t in [0.0, 123.0, 999.5, 3999.0] {
            assert_vec3_close(
                orbit_offset(&particle, t),
                orbit_offset(&particle, t + ROTATION_TIME_RATE),
            );
        }
    }

    #[test]
    fn row_zero_at_time_zero_is_pure_tilt() {
        // no time term and no row phase: only the constant tilt remains.
        for side in [-1.0, 1.0] {
            let particle = Particle {
                row: 0,
                side,
                type_index: 0,
            };
            let expected = Quat::from_rotation_z(TILT_ANGLE) * vec3(side * GLOBE_SEPARATION_X, 0.0, 0.0);
            assert_vec3_close(orbit_offset(&particle, 0.0), expected);
        }
    }

    #[test]
    fn tilt_is_applied_after_the_spin() {
        let particle = Particle {
            row: 5,
            side: 1.0,
            type_index: 0,
        };
        let angle = 5.0 * ROTATION_HEIGHT_RATE * TAU;
        let expected = Quat::from_rotation_z(TILT_ANGLE)
            * (Quat::from_axis_angle(Vec3::Y, angle)
                * vec3(GLOBE_SEPARATION_X, 5.0 * GLOBE_SEPARATION_Y, 0.0));
        assert_vec3_close(orbit_offset(&particle, 0.0), expected);
    }

    #[test]
    fn sprite_strip_u_stays_inside_the_frame() {
        for frame in 0..NUM_FRAMES {
            let lo = frame as f32 / NUM_FRAMES as f32;
            let hi = (frame + 1) as f32 / NUM_FRAMES as f32;
            for u in [0.0, 0.25, 0.5, 0.75, 1.0] {
                let remapped = sprite_strip_u(u, frame);
                assert!(remapped >= lo - 1e-5 && remapped <= hi + 1e-2);
            }
        }
    }

    #[test]
    fn cluster_frames_never_change_across_updates() {
        let mut cluster = GlobeCluster::new(32, 3, "lol", 256).unwrap();
        let frames_at_start: Vec<u32> = cluster.instances().iter().map(|i| i.frame).collect();
        for t in [0.0, 16.7, 1000.0, 123456.0] {
            cluster.update(t);
            let frames: Vec<u32> = cluster.instances().iter().map(|i| i.frame).collect();
            assert_eq!(frames, frames_at_start);
        }
    }

    #[test]
    fn scenario_32_rows_seed_lol() {
        let mut cluster = GlobeCluster::new(32, 3, "lol", 256).unwrap();
        assert_eq!(cluster.n_particles(), 64);

        let row0: Vec<Particle> = cluster
            .particles()
            .iter()
            .copied()
            .filter(|p| p.row == 0)
            .collect();
        assert_eq!(row0.len(), 2);
        assert!(row0[0].type_index < 3);
        assert_eq!(row0[0].type_index, row0[1].type_index);

        cluster.update(0.0);
        let at_zero: Vec<GlobeInstance> = cluster.instances().to_vec();
        cluster.update(ROTATION_TIME_RATE);
        for (a, b) in at_zero.iter().zip(cluster.instances()) {
            assert_vec3_close(a.offset, b.offset);
            assert_eq!(a.frame, b.frame);
        }
    }

    #[test]
    fn capacity_boundary() {
        // 32 rows fill 64 slots exactly
        let cluster = GlobeCluster::new(32, 3, "lol", 64).unwrap();
        assert_eq!(cluster.n_particles(), cluster.max_particles());
        // 33 rows would need 66 slots: rejected, not truncated
        assert!(GlobeCluster::new(33, 3, "lol", 64).is_err());
    }
}
