//! Camera component

use std::any::Any;

use crate::ecs::component::{Capabilities, Component};
use crate::ecs::components::TransformComponent;
use crate::ecs::entity::Entity;
use crate::ecs::registry::{FactoryContext, RegisteredComponent};
use crate::ecs::schema::{Options, PropertySchema};
use crate::render::{Node3D, NodeHandle, NodeKind, PerspectiveCamera};

const DEFAULT_FOV: f32 = 75.0;
const DEFAULT_NEAR: f32 = 0.1;
const DEFAULT_FAR: f32 = 1000.0;

/// Perspective camera following the entity's transform
pub struct CameraComponent {
    node: NodeHandle,
}

impl CameraComponent {
    /// Camera with the given projection parameters and a square aspect
    pub fn new(fov: f32, near: f32, far: f32) -> Self {
        let camera = PerspectiveCamera::new(fov, 1.0, near, far);
        Self { node: NodeHandle::new(Node3D::new(NodeKind::Camera(camera))) }
    }

    /// Camera node
    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Set width over height and recompute the projection
    pub fn set_aspect_ratio(&self, aspect: f32) {
        self.with_camera(|camera| camera.aspect = aspect);
    }

    /// Vertical field of view in degrees
    pub fn fov(&self) -> f32 {
        self.read(|camera| camera.fov)
    }

    /// Set the vertical field of view
    pub fn set_fov(&self, fov: f32) {
        self.with_camera(|camera| camera.fov = fov);
    }

    /// Near clip plane
    pub fn near(&self) -> f32 {
        self.read(|camera| camera.near)
    }

    /// Set the near clip plane
    pub fn set_near(&self, near: f32) {
        self.with_camera(|camera| camera.near = near);
    }

    /// Far clip plane
    pub fn far(&self) -> f32 {
        self.read(|camera| camera.far)
    }

    /// Set the far clip plane
    pub fn set_far(&self, far: f32) {
        self.with_camera(|camera| camera.far = far);
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.read(|camera| camera.aspect)
    }

    fn read(&self, f: impl FnOnce(&PerspectiveCamera) -> f32) -> f32 {
        self.node.borrow().as_camera().map_or(0.0, f)
    }

    fn with_camera(&self, f: impl FnOnce(&mut PerspectiveCamera)) {
        if let Some(camera) = self.node.borrow_mut().as_camera_mut() {
            f(camera);
            camera.update_projection_matrix();
        }
    }
}

impl Component for CameraComponent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::APPLY_OPTIONS | Capabilities::RENDER_NODE
    }

    fn update(&mut self, _dt: f32, entity: &Entity) {
        if let Some(pose) = TransformComponent::pose_of(entity) {
            let mut node = self.node.borrow_mut();
            node.position = pose.position;
            node.quaternion = pose.rotation;
        }
    }

    fn apply_options(&mut self, options: &Options) {
        let fov = options.f32("fov").unwrap_or(DEFAULT_FOV);
        let near = options.f32("near").unwrap_or(DEFAULT_NEAR);
        let far = options.f32("far").unwrap_or(DEFAULT_FAR);
        self.with_camera(|camera| {
            camera.fov = fov;
            camera.near = near;
            camera.far = far;
        });
    }

    fn render_node(&self) -> Option<NodeHandle> {
        Some(self.node.clone())
    }

    fn to_options(&self) -> Options {
        Options::new().with("fov", self.fov()).with("near", self.near()).with("far", self.far())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RegisteredComponent for CameraComponent {
    const TYPE_NAME: &'static str = "camera";

    fn schema() -> PropertySchema {
        PropertySchema::new()
            .number("fov", f64::from(DEFAULT_FOV))
            .number("near", f64::from(DEFAULT_NEAR))
            .number("far", f64::from(DEFAULT_FAR))
    }

    fn from_options(options: &Options, _context: &FactoryContext) -> Self {
        let mut camera = Self::new(DEFAULT_FOV, DEFAULT_NEAR, DEFAULT_FAR);
        camera.apply_options(options);
        camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aspect_ratio_updates_projection() {
        let camera = CameraComponent::new(60.0, 0.1, 100.0);
        let square = *camera.node().borrow().as_camera().unwrap().projection_matrix();

        camera.set_aspect_ratio(2.0);
        let node = camera.node().borrow();
        let wide = node.as_camera().unwrap().projection_matrix();
        assert_relative_eq!(wide[(0, 0)] * 2.0, square[(0, 0)], epsilon = 1e-5);
        assert_relative_eq!(wide[(1, 1)], square[(1, 1)], epsilon = 1e-5);
    }

    #[test]
    fn test_options_override_defaults() {
        let camera = CameraComponent::from_options(&Options::new().with("fov", 45.0), &FactoryContext::default());
        assert_relative_eq!(camera.fov(), 45.0);
        assert_relative_eq!(camera.near(), DEFAULT_NEAR);
        assert_relative_eq!(camera.far(), DEFAULT_FAR);
    }
}
