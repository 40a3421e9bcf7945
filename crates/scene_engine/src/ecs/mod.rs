//! Entity-component system
//!
//! Components are created by name through a [`ComponentRegistry`], owned by
//! an [`Entity`] and notified about their siblings as those come and go. A
//! transform may hand its pose over to a [`SpatialAuthority`] such as a
//! physics body.

pub mod authority;
pub mod component;
pub mod components;
pub mod entity;
pub mod registry;
pub mod schema;

pub use authority::{DelegationError, DelegationMode, SpatialAuthority, TransformAuthority};
pub use component::{Capabilities, Component, ComponentEvent, ComponentHandle};
pub use entity::{Entity, EntityData, EntityError};
pub use registry::{
    ComponentDescriptor, ComponentFactory, ComponentRegistry, FactoryContext, RegisteredComponent, RegistryError,
    Translation,
};
pub use schema::{Options, PropertyDef, PropertySchema, PropertyType, PropertyValue};
