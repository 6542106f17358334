/*
 * Vector Math Module
 *
 * Stateless helpers shared by the kernel and the driver:
 * - Reading position / forward / rotation out of a 4x4 transform matrix
 * - The minimal rotation between two directions
 * - Zero-preserving normalization
 * - Classic 2D Perlin noise used for per-agent speed variation
 */

use glam::{Mat4, Quat, Vec3};

// Vectors shorter than this normalize to zero instead of blowing up
pub const EPSILON: f32 = 1.0e-6;

#[inline]
pub fn position(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}

#[inline]
pub fn forward(m: &Mat4) -> Vec3 {
    m.z_axis.truncate()
}

#[inline]
pub fn rotation(m: &Mat4) -> Quat {
    let (_, rotation, _) = m.to_scale_rotation_translation();
    rotation
}

/// Normalize `v`, returning the zero vector when `v` is (nearly) zero.
#[inline]
pub fn normalize_safe(v: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq <= EPSILON * EPSILON || !len_sq.is_finite() {
        return Vec3::ZERO;
    }
    v / len_sq.sqrt()
}

/// Shortest-arc rotation taking the direction of `from` onto the direction of `to`.
///
/// Either input being zero yields the identity. Opposite directions resolve to a
/// half turn about an arbitrary axis perpendicular to `from`.
pub fn quaternion_between(from: Vec3, to: Vec3) -> Quat {
    let from_sq = from.length_squared();
    let to_sq = to.length_squared();
    if from_sq <= EPSILON * EPSILON || to_sq <= EPSILON * EPSILON {
        return Quat::IDENTITY;
    }

    let cross = from.cross(to);
    let w = (from_sq * to_sq).sqrt() + from.dot(to);

    // Antiparallel: the cross product vanishes along with w
    if w <= EPSILON * (from_sq * to_sq).sqrt() {
        let axis = (from / from_sq.sqrt()).any_orthonormal_vector();
        return Quat::from_axis_angle(axis, std::f32::consts::PI);
    }

    Quat::from_xyzw(cross.x, cross.y, cross.z, w).normalize()
}

// Ken Perlin's reference permutation
const PERM: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn hash(x: i32, y: i32) -> u8 {
    let xi = (x & 255) as usize;
    let yi = (y & 255) as usize;
    PERM[(PERM[xi] as usize + yi) & 255]
}

#[inline]
fn grad(hash: u8, x: f32, y: f32) -> f32 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}

/// Classic 2D Perlin noise, roughly in [-1, 1], zero on integer lattice points.
pub fn perlin(x: f32, y: f32) -> f32 {
    if !x.is_finite() || !y.is_finite() {
        return 0.0;
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let xf = x - x0;
    let yf = y - y0;
    let xi = x0 as i32;
    let yi = y0 as i32;

    let u = fade(xf);
    let v = fade(yf);

    let aa = hash(xi, yi);
    let ba = hash(xi.wrapping_add(1), yi);
    let ab = hash(xi, yi.wrapping_add(1));
    let bb = hash(xi.wrapping_add(1), yi.wrapping_add(1));

    lerp(
        lerp(grad(aa, xf, yf), grad(ba, xf - 1.0, yf), u),
        lerp(grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0), u),
        v,
    )
}

/// Perlin noise remapped into [0, 1].
#[inline]
pub fn noise01(x: f32, y: f32) -> f32 {
    ((perlin(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1.0e-5
    }

    #[test]
    fn matrix_accessors_read_columns() {
        let rot = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let m = Mat4::from_rotation_translation(rot, Vec3::new(1.0, 2.0, 3.0));

        assert!(approx(position(&m), Vec3::new(1.0, 2.0, 3.0)));
        assert!(approx(forward(&m), rot * Vec3::Z));
        assert!(rotation(&m).dot(rot).abs() > 1.0 - 1.0e-5);
    }

    #[test]
    fn normalize_safe_preserves_zero() {
        assert_eq!(normalize_safe(Vec3::ZERO), Vec3::ZERO);
        assert_eq!(normalize_safe(Vec3::splat(1.0e-9)), Vec3::ZERO);
        assert!(approx(normalize_safe(Vec3::new(0.0, 3.0, 4.0)), Vec3::new(0.0, 0.6, 0.8)));
    }

    #[test]
    fn quaternion_between_rotates_onto_target() {
        let from = Vec3::Z;
        let to = Vec3::new(1.0, 1.0, 0.0);
        let q = quaternion_between(from, to);
        assert!(approx(q * from, to.normalize()));
    }

    #[test]
    fn quaternion_between_handles_degenerate_inputs() {
        assert_eq!(quaternion_between(Vec3::ZERO, Vec3::X), Quat::IDENTITY);
        assert_eq!(quaternion_between(Vec3::X, Vec3::ZERO), Quat::IDENTITY);

        let flipped = quaternion_between(Vec3::Z, -Vec3::Z);
        assert!(flipped.is_finite());
        assert!(approx(flipped * Vec3::Z, -Vec3::Z));
    }

    #[test]
    fn perlin_is_deterministic_and_bounded() {
        for i in 0..200 {
            let x = i as f32 * 0.37;
            let y = i as f32 * 0.11 + 3.3;
            let n = perlin(x, y);
            assert_eq!(n, perlin(x, y));
            assert!(n.abs() <= 1.0 + 1.0e-4);
            assert!((0.0..=1.0).contains(&noise01(x, y)));
        }
        assert_eq!(perlin(3.0, 7.0), 0.0);
        assert_eq!(perlin(f32::NAN, 1.0), 0.0);
    }
}
