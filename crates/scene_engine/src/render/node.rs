//! Render graph nodes
//!
//! A [`Node3D`] is the native visual object a component exposes to the
//! scene's render graph. Components keep a [`NodeHandle`] to it and push their
//! pose into it every frame; the renderer only ever reads nodes.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use crate::foundation::math::{constants, Mat4, Quat, Transform, Vec3};

/// Shared, mutable handle to a render node
///
/// Equality is identity: two handles are equal when they point at the same node.
#[derive(Debug, Clone)]
pub struct NodeHandle(Rc<RefCell<Node3D>>);

impl NodeHandle {
    /// Wrap a node into a new handle
    pub fn new(node: Node3D) -> Self {
        Self(Rc::new(RefCell::new(node)))
    }

    /// Borrow the node immutably
    pub fn borrow(&self) -> Ref<'_, Node3D> {
        self.0.borrow()
    }

    /// Borrow the node mutably
    pub fn borrow_mut(&self) -> RefMut<'_, Node3D> {
        self.0.borrow_mut()
    }

    /// Whether both handles refer to the same node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Non-owning reference to the node
    pub fn downgrade(&self) -> WeakNodeHandle {
        WeakNodeHandle(Rc::downgrade(&self.0))
    }
}

impl PartialEq for NodeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for NodeHandle {}

/// Non-owning handle to a render node, used for light targets
#[derive(Debug, Clone, Default)]
pub struct WeakNodeHandle(Weak<RefCell<Node3D>>);

impl WeakNodeHandle {
    /// Upgrade to a strong handle if the node is still alive
    pub fn upgrade(&self) -> Option<NodeHandle> {
        self.0.upgrade().map(NodeHandle)
    }
}

/// Primitive geometries meshes can be built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Axis aligned box
    Box {
        /// Extent along X
        width: f32,
        /// Extent along Y
        height: f32,
        /// Extent along Z
        depth: f32,
    },
    /// UV sphere
    Sphere {
        /// Sphere radius
        radius: f32,
        /// Horizontal segments
        width_segments: u32,
        /// Vertical segments
        height_segments: u32,
    },
    /// Capped cylinder along the Y axis
    Cylinder {
        /// Radius of the top cap
        radius_top: f32,
        /// Radius of the bottom cap
        radius_bottom: f32,
        /// Height along Y
        height: f32,
        /// Segments around the circumference
        radial_segments: u32,
    },
}

impl Geometry {
    /// 1x1x1 box
    pub const fn unit_box() -> Self {
        Self::Box { width: 1.0, height: 1.0, depth: 1.0 }
    }

    /// Sphere of diameter 1
    pub const fn unit_sphere() -> Self {
        Self::Sphere { radius: 0.5, width_segments: 16, height_segments: 16 }
    }

    /// Cylinder of diameter 1 and height 1
    pub const fn unit_cylinder() -> Self {
        Self::Cylinder { radius_top: 0.5, radius_bottom: 0.5, height: 1.0, radial_segments: 16 }
    }
}

/// Shading model of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Specular highlights
    Phong,
    /// Diffuse only
    Lambert,
    /// Unlit
    Basic,
}

/// Surface material of a mesh node
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Shading model
    pub kind: MaterialKind,
    /// Packed `0xRRGGBB` colour
    pub colour: u32,
    /// Set when the shader must be rebuilt, e.g. after the light set changed
    pub needs_update: bool,
}

impl Material {
    /// Create a material that still needs its first build
    pub fn new(kind: MaterialKind, colour: u32) -> Self {
        Self { kind, colour, needs_update: true }
    }
}

/// Geometry plus material
#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    /// Shape of the mesh
    pub geometry: Geometry,
    /// Surface material
    pub material: Material,
}

/// Perspective projection parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Width over height
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    /// Create a camera and compute its projection matrix
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self { fov, aspect, near, far, projection: Mat4::identity() };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the projection after any parameter changed
    ///
    /// Degenerate parameters keep the previous matrix.
    pub fn update_projection_matrix(&mut self) {
        if self.aspect.abs() < 1e-6 || (self.far - self.near).abs() < 1e-6 {
            log::warn!(
                "Ignoring degenerate camera projection (aspect {}, near {}, far {})",
                self.aspect, self.near, self.far
            );
            return;
        }
        self.projection = Mat4::new_perspective(self.aspect, self.fov * constants::DEG_TO_RAD, self.near, self.far);
    }

    /// Current projection matrix
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Uniform light from everywhere
    Ambient,
    /// Omnidirectional light from a point
    Point,
    /// Cone of light towards a target
    Spot,
    /// Parallel rays towards a target
    Directional,
}

impl LightKind {
    /// Whether this kind can cast shadows at all
    pub const fn supports_shadows(self) -> bool {
        matches!(self, Self::Spot | Self::Directional)
    }
}

/// Shadow parameters of a shadow-casting light
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowSettings {
    /// 0 = no shadow, 1 = black shadow
    pub darkness: f32,
    /// Near plane of the shadow camera
    pub camera_near: f32,
    /// Far plane of the shadow camera
    pub camera_far: f32,
    /// Field of view of the shadow camera in degrees
    pub camera_fov: f32,
    /// Draw the shadow camera frustum for debugging
    pub camera_visible: bool,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            darkness: 0.5,
            camera_near: 0.1,
            camera_far: 1000.0,
            camera_fov: 75.0,
            camera_visible: false,
        }
    }
}

/// Light source parameters
#[derive(Debug, Clone)]
pub struct LightNode {
    /// Kind of light
    pub kind: LightKind,
    /// Packed `0xRRGGBB` colour
    pub colour: u32,
    /// Brightness multiplier
    pub intensity: f32,
    /// Falloff distance, 0 means unlimited
    pub distance: f32,
    /// Cone angle for spotlights in radians
    pub angle: f32,
    /// Cone falloff exponent for spotlights
    pub exponent: f32,
    /// Shadow parameters
    pub shadow: ShadowSettings,
    /// Node the light points at, if any
    pub target: Option<WeakNodeHandle>,
}

impl LightNode {
    /// White light of intensity 1 of the given kind
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            colour: crate::foundation::math::colour::WHITE,
            intensity: 1.0,
            distance: 0.0,
            angle: constants::THIRD_PI,
            exponent: 10.0,
            shadow: ShadowSettings::default(),
            target: None,
        }
    }

    /// Target node, if it is still alive
    pub fn target(&self) -> Option<NodeHandle> {
        self.target.as_ref().and_then(WeakNodeHandle::upgrade)
    }
}

/// Payload of a render node
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pose only, used by transforms
    Group,
    /// Drawable mesh
    Mesh(MeshNode),
    /// Perspective camera
    Camera(PerspectiveCamera),
    /// Light source
    Light(LightNode),
}

/// A native visual object in the render graph
#[derive(Debug, Clone)]
pub struct Node3D {
    /// Position in world space
    pub position: Vec3,
    /// Orientation in world space
    pub quaternion: Quat,
    /// Scale factors
    pub scale: Vec3,
    /// Up axis used by look-at style operations
    pub up: Vec3,
    /// Whether the renderer draws this node
    pub visible: bool,
    /// Mesh and light nodes may cast shadows
    pub cast_shadow: bool,
    /// Meshes may receive shadows
    pub receive_shadow: bool,
    /// Node payload
    pub kind: NodeKind,
}

impl Node3D {
    /// Node at the origin with identity rotation and unit scale
    pub fn new(kind: NodeKind) -> Self {
        Self {
            position: Vec3::zeros(),
            quaternion: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            up: Vec3::from(constants::UP),
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            kind,
        }
    }

    /// Empty group node
    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    /// Current pose of the node
    pub fn pose(&self) -> Transform {
        Transform::new(self.position, self.quaternion, self.scale)
    }

    /// Local transformation matrix
    pub fn local_matrix(&self) -> Mat4 {
        self.pose().to_matrix()
    }

    /// Mesh payload, if this is a mesh
    pub fn as_mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Mutable mesh payload
    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshNode> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Camera payload, if this is a camera
    pub fn as_camera(&self) -> Option<&PerspectiveCamera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Mutable camera payload
    pub fn as_camera_mut(&mut self) -> Option<&mut PerspectiveCamera> {
        match &mut self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Light payload, if this is a light
    pub fn as_light(&self) -> Option<&LightNode> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Mutable light payload
    pub fn as_light_mut(&mut self) -> Option<&mut LightNode> {
        match &mut self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Whether this node is a light source
    pub fn is_light(&self) -> bool {
        matches!(self.kind, NodeKind::Light(_))
    }
}
