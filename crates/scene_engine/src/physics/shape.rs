//! Collision shapes of rigid bodies
//!
//! All primitive shapes start with a half extent of 0.5 (unit size) and are
//! resized through local scaling, matching the unit geometries of the render
//! graph.

use crate::foundation::math::Vec3;

/// Half extent of an unscaled primitive
pub const UNIT_HALF_EXTENT: f32 = 0.5;

/// Primitive kind of a collision shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Box
    Box,
    /// Sphere
    Sphere,
    /// Cylinder along the Y axis
    Cylinder,
}

impl ShapeKind {
    /// Name used in option payloads
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
        }
    }

    /// Parse an option payload name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "box" => Some(Self::Box),
            "sphere" => Some(Self::Sphere),
            "cylinder" => Some(Self::Cylinder),
            _ => None,
        }
    }
}

/// Collision shape with local scaling
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionShape {
    kind: ShapeKind,
    local_scaling: Vec3,
}

impl CollisionShape {
    /// Unit shape of the given kind
    pub fn new(kind: ShapeKind) -> Self {
        Self { kind, local_scaling: Vec3::new(1.0, 1.0, 1.0) }
    }

    /// Primitive kind
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Current local scaling
    pub fn local_scaling(&self) -> Vec3 {
        self.local_scaling
    }

    /// Resize the shape
    pub fn set_local_scaling(&mut self, scaling: Vec3) {
        self.local_scaling = scaling.abs();
    }

    /// Scaled half extents along each axis
    pub fn half_extents(&self) -> Vec3 {
        self.local_scaling * UNIT_HALF_EXTENT
    }

    /// Diagonal of the inertia tensor for a body of `mass`
    pub fn local_inertia(&self, mass: f32) -> Vec3 {
        if mass <= 0.0 {
            return Vec3::zeros();
        }
        let h = self.half_extents();
        match self.kind {
            ShapeKind::Box => {
                let (x2, y2, z2) = (h.x * h.x, h.y * h.y, h.z * h.z);
                Vec3::new(y2 + z2, x2 + z2, x2 + y2) * (mass / 3.0)
            }
            ShapeKind::Sphere => {
                // Spheres only honour the X scaling
                let radius = h.x;
                Vec3::repeat(0.4 * mass * radius * radius)
            }
            ShapeKind::Cylinder => {
                let radius = h.x;
                let height = 2.0 * h.y;
                let side = mass * (radius * radius / 4.0 + height * height / 12.0);
                Vec3::new(side, 0.5 * mass * radius * radius, side)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_unit_box_inertia() {
        let shape = CollisionShape::new(ShapeKind::Box);
        // m/12 * (1 + 1) for a unit cube
        assert_relative_eq!(shape.local_inertia(6.0), Vec3::repeat(1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_scaled_sphere_inertia() {
        let mut shape = CollisionShape::new(ShapeKind::Sphere);
        shape.set_local_scaling(Vec3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(shape.local_inertia(1.0), Vec3::repeat(0.4), epsilon = EPSILON);
    }

    #[test]
    fn test_static_body_has_no_inertia() {
        let shape = CollisionShape::new(ShapeKind::Cylinder);
        assert_relative_eq!(shape.local_inertia(0.0), Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_shape_names() {
        for kind in [ShapeKind::Box, ShapeKind::Sphere, ShapeKind::Cylinder] {
            assert_eq!(ShapeKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ShapeKind::from_name("torus"), None);
    }
}
