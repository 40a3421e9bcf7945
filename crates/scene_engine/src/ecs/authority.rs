//! Transform authority delegation
//!
//! A transform normally owns its entity's position, rotation and scale. Any
//! component exposing a [`SpatialAuthority`] (a physics body, typically) can
//! take that role over: the transform then forwards reads to the authority,
//! forwards writes to it while mirroring them locally, and copies the
//! authority's pose into its own node every frame so the render graph never
//! needs to know a delegation is active.
//!
//! The link is weak. Dropping the authority quietly returns ownership to the
//! transform's own storage.

use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Quat, Transform, Vec3};
use crate::render::{Node3D, NodeHandle};

/// Read/write access to a pose, through shared references
pub trait SpatialAuthority {
    /// World position
    fn position(&self) -> Vec3;
    /// Move to `position`
    fn set_position(&self, position: Vec3);
    /// World rotation
    fn rotation(&self) -> Quat;
    /// Rotate to `rotation`
    fn set_rotation(&self, rotation: Quat);
    /// Scale factors
    fn scale(&self) -> Vec3;
    /// Resize to `scale`
    fn set_scale(&self, scale: Vec3);
}

/// Whether transforms accept a spatial authority
///
/// Editors pass [`DelegationMode::Disabled`] so direct edits stay authoritative
/// while the simulation is not running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelegationMode {
    /// Authorities may subscribe
    #[default]
    Enabled,
    /// Subscriptions are refused
    Disabled,
}

/// Why a subscription was refused
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DelegationError {
    /// The transform was built with [`DelegationMode::Disabled`]
    #[error("transform delegation is disabled")]
    Disabled,

    /// The candidate does not expose a spatial authority
    #[error("component '{0}' cannot own spatial state")]
    NotAnAuthority(String),
}

struct Subscriber {
    source: String,
    authority: Weak<dyn SpatialAuthority>,
}

/// The pose of one entity and who owns it
pub struct TransformAuthority {
    node: NodeHandle,
    mode: DelegationMode,
    subscriber: Option<Subscriber>,
}

impl TransformAuthority {
    /// Self-owned pose stored in a fresh group node
    pub fn new(mode: DelegationMode) -> Self {
        Self {
            node: NodeHandle::new(Node3D::group()),
            mode,
            subscriber: None,
        }
    }

    /// Backing render node
    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Delegation mode chosen at construction
    pub fn mode(&self) -> DelegationMode {
        self.mode
    }

    /// Hand authority to `authority`, replacing any previous subscriber
    ///
    /// The currently stored pose is pushed into the new authority first, so it
    /// starts where the entity is rather than from its own defaults.
    pub fn subscribe(&mut self, source: &str, authority: &Rc<dyn SpatialAuthority>) -> Result<(), DelegationError> {
        if self.mode == DelegationMode::Disabled {
            return Err(DelegationError::Disabled);
        }

        let pose = self.node.borrow().pose();
        authority.set_position(pose.position);
        authority.set_rotation(pose.rotation);
        authority.set_scale(pose.scale);

        self.subscriber = Some(Subscriber {
            source: source.to_string(),
            authority: Rc::downgrade(authority),
        });
        log::debug!("Transform delegated to '{}'", source);
        Ok(())
    }

    /// Take authority back. Returns whether a subscriber was set.
    pub fn unsubscribe(&mut self) -> bool {
        self.subscriber.take().is_some()
    }

    /// Type name of the subscribed component, while one is set
    pub fn subscriber_source(&self) -> Option<&str> {
        self.subscriber.as_ref().map(|s| s.source.as_str())
    }

    /// Whether a live authority is set
    pub fn is_delegating(&self) -> bool {
        self.authority().is_some()
    }

    fn authority(&self) -> Option<Rc<dyn SpatialAuthority>> {
        self.subscriber.as_ref().and_then(|s| s.authority.upgrade())
    }

    /// Authoritative position
    pub fn position(&self) -> Vec3 {
        self.authority().map_or_else(|| self.node.borrow().position, |a| a.position())
    }

    /// Set the position, mirroring into the node when delegating
    pub fn set_position(&self, position: Vec3) {
        if let Some(authority) = self.authority() {
            authority.set_position(position);
        }
        self.node.borrow_mut().position = position;
    }

    /// Authoritative rotation
    pub fn rotation(&self) -> Quat {
        self.authority().map_or_else(|| self.node.borrow().quaternion, |a| a.rotation())
    }

    /// Set the rotation, mirroring into the node when delegating
    pub fn set_rotation(&self, rotation: Quat) {
        if let Some(authority) = self.authority() {
            authority.set_rotation(rotation);
        }
        self.node.borrow_mut().quaternion = rotation;
    }

    /// Authoritative scale
    pub fn scale(&self) -> Vec3 {
        self.authority().map_or_else(|| self.node.borrow().scale, |a| a.scale())
    }

    /// Set the scale, mirroring into the node when delegating
    pub fn set_scale(&self, scale: Vec3) {
        if let Some(authority) = self.authority() {
            authority.set_scale(scale);
        }
        self.node.borrow_mut().scale = scale;
    }

    /// Authoritative pose
    pub fn pose(&self) -> Transform {
        Transform::new(self.position(), self.rotation(), self.scale())
    }

    /// Copy the authority's pose into the node
    pub fn sync(&self) {
        if let Some(authority) = self.authority() {
            let mut node = self.node.borrow_mut();
            node.position = authority.position();
            node.quaternion = authority.rotation();
            node.scale = authority.scale();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{RigidBody, ShapeKind};
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    fn body_authority() -> (Rc<RefCell<RigidBody>>, Rc<dyn SpatialAuthority>) {
        let body = Rc::new(RefCell::new(RigidBody::new(ShapeKind::Box, 1.0)));
        let authority: Rc<dyn SpatialAuthority> = body.clone();
        (body, authority)
    }

    #[test]
    fn test_subscribe_transfers_stored_pose() {
        let mut transform = TransformAuthority::new(DelegationMode::Enabled);
        transform.set_position(Vec3::new(1.0, 2.0, 3.0));
        transform.set_scale(Vec3::new(2.0, 2.0, 2.0));
        let (body, authority) = body_authority();

        transform.subscribe("physics", &authority).unwrap();

        assert_relative_eq!(body.borrow().position(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(body.borrow().scale(), Vec3::new(2.0, 2.0, 2.0));
        assert!(transform.is_delegating());
        assert_eq!(transform.subscriber_source(), Some("physics"));
    }

    #[test]
    fn test_reads_follow_the_authority() {
        let mut transform = TransformAuthority::new(DelegationMode::Enabled);
        let (body, authority) = body_authority();
        transform.subscribe("physics", &authority).unwrap();

        body.borrow_mut().set_position(Vec3::new(0.0, 0.0, -5.0));
        assert_relative_eq!(transform.position(), Vec3::new(0.0, 0.0, -5.0));
        // node is stale until synced
        assert_relative_eq!(transform.node().borrow().position, Vec3::zeros());

        transform.sync();
        assert_relative_eq!(transform.node().borrow().position, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_writes_are_mirrored() {
        let mut transform = TransformAuthority::new(DelegationMode::Enabled);
        let (body, authority) = body_authority();
        transform.subscribe("physics", &authority).unwrap();

        transform.set_position(Vec3::new(4.0, 0.0, 0.0));
        assert_relative_eq!(body.borrow().position(), Vec3::new(4.0, 0.0, 0.0));
        assert_relative_eq!(transform.node().borrow().position, Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_disabled_mode_refuses_and_keeps_state() {
        let mut transform = TransformAuthority::new(DelegationMode::Disabled);
        transform.set_position(Vec3::new(1.0, 0.0, 0.0));
        let (body, authority) = body_authority();

        assert_eq!(transform.subscribe("physics", &authority), Err(DelegationError::Disabled));
        assert!(!transform.is_delegating());
        assert_relative_eq!(body.borrow().position(), Vec3::zeros());
    }

    #[test]
    fn test_last_subscriber_wins() {
        let mut transform = TransformAuthority::new(DelegationMode::Enabled);
        let (first, first_authority) = body_authority();
        let (second, second_authority) = body_authority();
        transform.subscribe("a", &first_authority).unwrap();
        transform.subscribe("b", &second_authority).unwrap();

        transform.set_position(Vec3::new(9.0, 0.0, 0.0));
        assert_relative_eq!(second.borrow().position(), Vec3::new(9.0, 0.0, 0.0));
        assert_relative_eq!(first.borrow().position(), Vec3::zeros());
    }

    #[test]
    fn test_dropped_authority_falls_back_to_node() {
        let mut transform = TransformAuthority::new(DelegationMode::Enabled);
        let (body, authority) = body_authority();
        transform.subscribe("physics", &authority).unwrap();
        body.borrow_mut().set_position(Vec3::new(3.0, 3.0, 3.0));
        transform.sync();

        drop(authority);
        drop(body);
        assert!(!transform.is_delegating());
        assert_relative_eq!(transform.position(), Vec3::new(3.0, 3.0, 3.0));
    }
}
