//! Component registry
//!
//! Central catalog of component types. The registry is the single place that
//! defaults, validates, translates and serialises option payloads, and it is
//! passed explicitly to whoever needs it (loader, scenes, editor code).

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use super::authority::DelegationMode;
use super::component::{Capabilities, Component, ComponentHandle};
use super::schema::{Options, PropertySchema};

/// Builds a component from fully defaulted options
pub type ComponentFactory = Rc<dyn Fn(&Options, &FactoryContext) -> Box<dyn Component>>;

/// Runtime settings handed to every factory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactoryContext {
    /// Whether transforms accept spatial authorities
    pub delegation: DelegationMode,
}

/// Form of vector and quaternion values in defaulted options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// Native [`crate::foundation::math::Vec3`] / [`crate::foundation::math::Quat`] values
    Native,
    /// Flat parameter arrays, as shown by property editors
    Raw,
}

/// Registry errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Registration without a type name
    #[error("component type name must not be empty")]
    EmptyTypeName,

    /// No type registered under this name
    #[error("unknown component type '{0}'")]
    UnknownComponentType(String),
}

/// A component type the engine knows how to build from options
pub trait RegisteredComponent: Component + Sized {
    /// Name the type is registered and serialised under
    const TYPE_NAME: &'static str;

    /// Property schema of the type
    fn schema() -> PropertySchema;

    /// Build from fully defaulted, translated options
    fn from_options(options: &Options, context: &FactoryContext) -> Self;
}

/// Everything the registry knows about one type
#[derive(Clone)]
pub struct ComponentDescriptor {
    type_name: String,
    factory: ComponentFactory,
    schema: PropertySchema,
}

impl ComponentDescriptor {
    /// Registered name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Property schema
    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("type_name", &self.type_name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Catalog of component types
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    descriptors: BTreeMap<String, ComponentDescriptor>,
    context: FactoryContext,
}

impl ComponentRegistry {
    /// Empty registry
    pub fn new(delegation: DelegationMode) -> Self {
        Self {
            descriptors: BTreeMap::new(),
            context: FactoryContext { delegation },
        }
    }

    /// Registry with every built-in component type
    pub fn with_builtin_components(delegation: DelegationMode) -> Result<Self, RegistryError> {
        let mut registry = Self::new(delegation);
        crate::ecs::components::register_builtin_components(&mut registry)?;
        Ok(registry)
    }

    /// Settings handed to factories
    pub fn context(&self) -> FactoryContext {
        self.context
    }

    /// Register a type, replacing any previous registration of the same name
    pub fn register<F>(&mut self, type_name: &str, factory: F, schema: PropertySchema) -> Result<(), RegistryError>
    where
        F: Fn(&Options, &FactoryContext) -> Box<dyn Component> + 'static,
    {
        if type_name.trim().is_empty() {
            return Err(RegistryError::EmptyTypeName);
        }
        let descriptor = ComponentDescriptor {
            type_name: type_name.to_string(),
            factory: Rc::new(factory),
            schema,
        };
        if self.descriptors.insert(type_name.to_string(), descriptor).is_some() {
            log::debug!("Replaced component type '{}'", type_name);
        }
        Ok(())
    }

    /// Register a built-in style component type
    pub fn register_component<C: RegisteredComponent>(&mut self) -> Result<(), RegistryError> {
        self.register(
            C::TYPE_NAME,
            |options, context| Box::new(C::from_options(options, context)),
            C::schema(),
        )
    }

    /// Whether `type_name` is registered
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.descriptors.contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn list(&self) -> Vec<&str> {
        self.descriptors.keys().map(String::as_str).collect()
    }

    /// Descriptor of `type_name`
    pub fn descriptor(&self, type_name: &str) -> Result<&ComponentDescriptor, RegistryError> {
        self.descriptors
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownComponentType(type_name.to_string()))
    }

    /// Property schema of `type_name`
    pub fn properties(&self, type_name: &str) -> Result<&PropertySchema, RegistryError> {
        self.descriptor(type_name).map(ComponentDescriptor::schema)
    }

    /// Complete option set for `type_name` from a partial raw payload
    ///
    /// Every schema property takes the caller's value when present and well
    /// shaped, the schema default otherwise. Malformed values are logged and
    /// replaced by the default.
    pub fn defaults(&self, type_name: &str, raw: &Value, translation: Translation) -> Result<Options, RegistryError> {
        let schema = self.properties(type_name)?;
        let supplied = payload_object(type_name, raw);

        let options = schema
            .iter()
            .map(|(name, def)| {
                let value = match supplied.and_then(|map| map.get(name)).filter(|v| !v.is_null()) {
                    Some(given) => def.kind.parse(given).unwrap_or_else(|| {
                        log::warn!(
                            "Malformed '{}.{}' ({}), expected {}; using default",
                            type_name, name, given, def.kind.name()
                        );
                        def.default.clone()
                    }),
                    None => def.default.clone(),
                };
                let value = match translation {
                    Translation::Native => def.kind.translate(value),
                    Translation::Raw => value,
                };
                (name.to_string(), value)
            })
            .collect();
        Ok(options)
    }

    /// Build a component of `type_name` from a partial raw payload
    pub fn create(&self, type_name: &str, raw: &Value) -> Result<ComponentHandle, RegistryError> {
        let descriptor = self.descriptor(type_name)?;
        let options = self.defaults(type_name, raw, Translation::Native)?;
        let component = (descriptor.factory)(&options, &self.context);
        Ok(ComponentHandle::from_boxed(type_name, component))
    }

    /// Push a partial raw payload into a live component
    ///
    /// Returns `false` when the component does not accept live edits.
    pub fn apply_options(&self, type_name: &str, component: &ComponentHandle, raw: &Value) -> Result<bool, RegistryError> {
        let options = self.defaults(type_name, raw, Translation::Native)?;
        if !component.has_capability(Capabilities::APPLY_OPTIONS) {
            return Ok(false);
        }
        component.borrow_mut().apply_options(&options);
        Ok(true)
    }

    /// Canonical flat JSON options of a component's current state
    ///
    /// Properties the component does not report fall back to their defaults.
    pub fn serialize(&self, component: &ComponentHandle) -> Result<Value, RegistryError> {
        let type_name = component.type_name();
        let schema = self.properties(type_name)?;
        let state = component.borrow().to_options();

        let mut flat = Map::new();
        for (name, def) in schema.iter() {
            let value = state
                .get(name)
                .and_then(|value| def.kind.to_json(value))
                .or_else(|| def.kind.to_json(&def.default))
                .unwrap_or(Value::Null);
            flat.insert(name.to_string(), value);
        }
        Ok(Value::Object(flat))
    }
}

fn payload_object<'a>(type_name: &str, raw: &'a Value) -> Option<&'a Map<String, Value>> {
    match raw {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            log::warn!("Options for '{}' must be an object, got {}; using defaults", type_name, other);
            None
        }
    }
}
