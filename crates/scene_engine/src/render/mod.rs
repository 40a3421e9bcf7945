//! Render graph and renderer contract
//!
//! The engine does not rasterise anything itself. Scenes own a [`SceneGraph`]
//! of [`Node3D`]s, and an external [`Renderer`] draws it from the active camera.

pub mod node;
pub mod scene_graph;

pub use node::{
    Geometry, LightKind, LightNode, Material, MaterialKind, MeshNode, Node3D, NodeHandle, NodeKind,
    PerspectiveCamera, ShadowSettings, WeakNodeHandle,
};
pub use scene_graph::{SceneGraph, SimpleListGraph};

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Shadow map filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadowMapType {
    /// Unfiltered
    #[serde(rename = "BasicShadowMap")]
    Basic,
    /// Percentage closer filtering
    #[default]
    #[serde(rename = "PCFShadowMap")]
    Pcf,
    /// Soft percentage closer filtering
    #[serde(rename = "PCFSoftShadowMap")]
    PcfSoft,
}

/// Frame-independent renderer state taken from the game config
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Packed `0xRRGGBB` clear colour
    pub clear_colour: u32,
    /// Whether shadow maps are rendered
    pub shadow_map_enabled: bool,
    /// Shadow map filtering
    pub shadow_map_type: ShadowMapType,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_colour: 0,
            shadow_map_enabled: true,
            shadow_map_type: ShadowMapType::default(),
        }
    }
}

/// Something that can draw a render graph
pub trait Renderer {
    /// Draw one frame of `graph` as seen from `camera`
    fn render(&mut self, graph: &dyn SceneGraph, camera: &NodeHandle, settings: &RenderSettings);
}

/// Summary of one headless frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Visible mesh nodes
    pub meshes: usize,
    /// Visible light nodes
    pub lights: usize,
    /// Materials rebuilt this frame
    pub materials_rebuilt: usize,
    /// Camera position this frame
    pub camera_position: Vec3,
}

/// Renderer that walks the graph without drawing, for tests and batch runs
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    last: FrameStats,
}

impl HeadlessRenderer {
    /// Create a renderer that has drawn nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames rendered
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Stats of the most recent frame
    pub fn last_frame(&self) -> &FrameStats {
        &self.last
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, graph: &dyn SceneGraph, camera: &NodeHandle, _settings: &RenderSettings) {
        self.frames += 1;
        let mut stats = FrameStats {
            frame: self.frames,
            camera_position: camera.borrow().position,
            ..FrameStats::default()
        };

        for handle in graph.nodes() {
            let mut node = handle.borrow_mut();
            if !node.visible {
                continue;
            }
            match &mut node.kind {
                NodeKind::Mesh(mesh) => {
                    stats.meshes += 1;
                    if mesh.material.needs_update {
                        mesh.material.needs_update = false;
                        stats.materials_rebuilt += 1;
                    }
                }
                NodeKind::Light(_) => stats.lights += 1,
                NodeKind::Group | NodeKind::Camera(_) => {}
            }
        }

        log::trace!("Rendered frame {}: {} meshes, {} lights", stats.frame, stats.meshes, stats.lights);
        self.last = stats;
    }
}
