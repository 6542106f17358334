/*
 * Boid Module
 *
 * The spatial state of one agent. Orientation is a unit quaternion whose +Z
 * axis is the heading; there is no separate up vector, so roll is free. Scale
 * is always one.
 */

use glam::{Mat4, Quat, Vec3};
use rand::Rng;

use crate::math;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    // Build a transform whose heading is `forward` (zero falls back to +Z)
    pub fn looking(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            rotation: math::quaternion_between(Vec3::Z, forward),
        }
    }

    // Current heading, unit length whenever the rotation is normalized
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::ONE, self.rotation, self.position)
    }

    pub fn from_matrix(m: &Mat4) -> Self {
        Self {
            position: math::position(m),
            rotation: math::rotation(m).normalize(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }

    // Random spawn: a point inside the sphere of `radius` around `origin`,
    // facing somewhere between `base` and a uniformly random rotation
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        origin: Vec3,
        radius: f32,
        base: Quat,
        jitter: f32,
    ) -> Self {
        let position = origin + random_in_unit_sphere(rng) * radius;
        let rotation = base.slerp(random_rotation(rng), jitter.clamp(0.0, 1.0)).normalize();
        Self { position, rotation }
    }
}

fn random_in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

// Shoemake's method for uniformly distributed rotations
fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Quat {
    let u1: f32 = rng.gen();
    let u2: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
    let u3: f32 = rng.gen_range(0.0..std::f32::consts::TAU);

    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    Quat::from_xyzw(a * u2.sin(), a * u2.cos(), b * u3.sin(), b * u3.cos()).normalize()
}
