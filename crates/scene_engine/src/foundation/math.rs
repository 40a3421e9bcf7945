//! Math utilities and types
//!
//! Provides the vector/quaternion types shared by components, the render graph
//! and the physics world. The world is Z-up.

pub use nalgebra::{
    Vector3,
    Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Position, rotation and scale of an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform from all three parts
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Pi / 3, the default spotlight cone angle
    pub const THIRD_PI: f32 = PI / 3.0;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// World up axis
    pub const UP: [f32; 3] = [0.0, 0.0, 1.0];
}

/// Build a rotation from flat `[x, y, z, w]` parameters
///
/// Degenerate (zero length) input yields the identity rotation.
pub fn quat_from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Quat {
    let raw = Quaternion::new(w, x, y, z);
    Unit::try_new(raw, f32::EPSILON).unwrap_or_else(Quat::identity)
}

/// Flatten a rotation into `[x, y, z, w]` parameters
pub fn quat_to_xyzw(rotation: &Quat) -> [f32; 4] {
    let q = rotation.quaternion();
    [q.i, q.j, q.k, q.w]
}

/// Rotation of `angle` radians around one of the unit axes
pub fn axis_angle(axis: &Vec3, angle: f32) -> Quat {
    Unit::try_new(*axis, f32::EPSILON)
        .map_or_else(Quat::identity, |axis| Quat::from_axis_angle(&axis, angle))
}

/// Packed `0xRRGGBB` colour helpers
pub mod colour {
    use super::Vec3;

    /// Largest value a packed 24-bit colour can hold
    pub const MAX: u32 = 0x00FF_FFFF;

    /// White
    pub const WHITE: u32 = MAX;

    /// Unpack into linear `[0, 1]` RGB channels
    pub fn to_rgb(packed: u32) -> Vec3 {
        let channel = |shift: u32| f32::from(((packed >> shift) & 0xFF) as u8) / 255.0;
        Vec3::new(channel(16), channel(8), channel(0))
    }

    /// Pack `[0, 1]` RGB channels, clamping out-of-range values
    pub fn from_rgb(rgb: &Vec3) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(rgb.x) << 16) | (channel(rgb.y) << 8) | channel(rgb.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_quat_flat_parameters_use_xyzw_order() {
        let rotation = quat_from_xyzw(0.0, 0.0, 0.707_106_8, 0.707_106_8);
        let [x, y, z, w] = quat_to_xyzw(&rotation);
        assert_relative_eq!(x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(y, 0.0, epsilon = EPSILON);
        assert_relative_eq!(z, 0.707_106_8, epsilon = 1e-5);
        assert_relative_eq!(w, 0.707_106_8, epsilon = 1e-5);
    }

    #[test]
    fn test_degenerate_quat_is_identity() {
        let rotation = quat_from_xyzw(0.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(rotation.angle(), 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_colour_unpack_and_pack() {
        let rgb = colour::to_rgb(0x00FF_8000);
        assert_relative_eq!(rgb.x, 1.0, epsilon = EPSILON);
        assert_relative_eq!(rgb.y, 128.0 / 255.0, epsilon = EPSILON);
        assert_relative_eq!(rgb.z, 0.0, epsilon = EPSILON);
        assert_eq!(colour::from_rgb(&rgb), 0x00FF_8000);
        assert_eq!(colour::from_rgb(&Vec3::new(2.0, -1.0, 1.0)), 0x00FF_00FF);
    }

    #[test]
    fn test_transform_matrix_translates() {
        let transform = Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::identity(), Vec3::new(2.0, 2.0, 2.0));
        let point = transform.to_matrix().transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point.x, 3.0, epsilon = EPSILON);
        assert_relative_eq!(point.y, 2.0, epsilon = EPSILON);
        assert_relative_eq!(point.z, 3.0, epsilon = EPSILON);
    }
}
