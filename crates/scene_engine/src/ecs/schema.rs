//! Property schemas and option payloads
//!
//! Every component type declares a [`PropertySchema`]: property name to
//! semantic type plus default. Option payloads arrive as flat JSON, are
//! validated against the schema and come out as [`Options`].
//!
//! Flat JSON shapes:
//! - vectors: `{"type": "vector", "parameters": [x, y, z]}`
//! - quaternions: `{"type": "quaternion", "parameters": [x, y, z, w]}`
//! - colours: packed `0xRRGGBB` integers
//! - everything else: the JSON primitive

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::foundation::math::{colour, quat_from_xyzw, quat_to_xyzw, Quat, Vec3};

/// Semantic type of a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    /// Unbounded number
    Number,
    /// Number edited with a slider
    Scalar,
    /// Boolean
    Bool,
    /// Free text
    Text,
    /// One of a fixed list of names
    Choice(Vec<String>),
    /// Three component vector
    Vector,
    /// Rotation quaternion
    Quaternion,
    /// Packed 24-bit colour
    Colour,
}

impl PropertyType {
    /// Name shown to editors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Scalar => "scalar",
            Self::Bool => "bool",
            Self::Text => "text",
            Self::Choice(_) => "list",
            Self::Vector => "vector",
            Self::Quaternion => "quaternion",
            Self::Colour => "colour",
        }
    }

    const fn parameter_count(&self) -> Option<usize> {
        match self {
            Self::Vector => Some(3),
            Self::Quaternion => Some(4),
            _ => None,
        }
    }

    /// Validate a raw JSON value
    ///
    /// Vector and quaternion values come back as [`PropertyValue::Parameters`],
    /// with or without the `{type, parameters}` wrapper on input.
    pub fn parse(&self, raw: &Value) -> Option<PropertyValue> {
        match self {
            Self::Number | Self::Scalar => raw.as_f64().map(PropertyValue::Number),
            Self::Bool => raw.as_bool().map(PropertyValue::Bool),
            Self::Text => raw.as_str().map(|s| PropertyValue::Text(s.to_string())),
            Self::Choice(choices) => raw
                .as_str()
                .filter(|s| choices.iter().any(|c| c == s))
                .map(|s| PropertyValue::Text(s.to_string())),
            Self::Vector | Self::Quaternion => self.parse_parameters(raw),
            Self::Colour => parse_colour(raw).map(PropertyValue::Colour),
        }
    }

    fn parse_parameters(&self, raw: &Value) -> Option<PropertyValue> {
        let expected = self.parameter_count()?;
        let array = match raw {
            Value::Array(items) => items,
            Value::Object(wrapper) => {
                if let Some(tag) = wrapper.get("type") {
                    if tag.as_str() != Some(self.name()) {
                        return None;
                    }
                }
                wrapper.get("parameters")?.as_array()?
            }
            _ => return None,
        };
        if array.len() != expected {
            return None;
        }
        array
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<_>>>()
            .map(PropertyValue::Parameters)
    }

    /// Convert flat parameters into native math values
    #[allow(clippy::cast_possible_truncation)]
    pub fn translate(&self, value: PropertyValue) -> PropertyValue {
        match (self, value) {
            (Self::Vector, PropertyValue::Parameters(p)) if p.len() == 3 => {
                PropertyValue::Vector(Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32))
            }
            (Self::Quaternion, PropertyValue::Parameters(p)) if p.len() == 4 => {
                PropertyValue::Quaternion(quat_from_xyzw(p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32))
            }
            (_, other) => other,
        }
    }

    /// Canonical flat JSON form of a value of this type
    ///
    /// `None` if the value does not fit the type.
    pub fn to_json(&self, value: &PropertyValue) -> Option<Value> {
        match (self, value) {
            (Self::Number | Self::Scalar, PropertyValue::Number(n)) => Some(json!(n)),
            (Self::Bool, PropertyValue::Bool(b)) => Some(Value::Bool(*b)),
            (Self::Text | Self::Choice(_), PropertyValue::Text(s)) => Some(Value::String(s.clone())),
            (Self::Colour, PropertyValue::Colour(c)) => Some(json!(c)),
            (Self::Vector | Self::Quaternion, value) => {
                let parameters = value.parameters()?;
                if Some(parameters.len()) != self.parameter_count() {
                    return None;
                }
                Some(json!({ "type": self.name(), "parameters": parameters }))
            }
            _ => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_colour(raw: &Value) -> Option<u32> {
    if let Some(packed) = raw.as_u64() {
        return u32::try_from(packed).ok().filter(|c| *c <= colour::MAX);
    }
    let number = raw.as_f64()?;
    if number.fract() != 0.0 || !(0.0..=f64::from(colour::MAX)).contains(&number) {
        return None;
    }
    Some(number as u32)
}

/// A property value, in raw (flat) or translated (native) form
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Number or scalar
    Number(f64),
    /// Boolean
    Bool(bool),
    /// Text or choice
    Text(String),
    /// Packed 24-bit colour
    Colour(u32),
    /// Flat vector or quaternion parameters, `[x, y, z]` or `[x, y, z, w]`
    Parameters(Vec<f64>),
    /// Native vector
    Vector(Vec3),
    /// Native rotation
    Quaternion(Quat),
}

impl PropertyValue {
    /// Number, if this is one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean, if this is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text, if this is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Colour, if this is one
    pub fn as_colour(&self) -> Option<u32> {
        match self {
            Self::Colour(c) => Some(*c),
            _ => None,
        }
    }

    /// Vector in either form
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            Self::Vector(v) => Some(*v),
            Self::Parameters(p) if p.len() == 3 => Some(Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32)),
            _ => None,
        }
    }

    /// Rotation in either form
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_quaternion(&self) -> Option<Quat> {
        match self {
            Self::Quaternion(q) => Some(*q),
            Self::Parameters(p) if p.len() == 4 => {
                Some(quat_from_xyzw(p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32))
            }
            _ => None,
        }
    }

    /// Flat parameters of a vector or rotation in either form
    pub fn parameters(&self) -> Option<Vec<f64>> {
        match self {
            Self::Parameters(p) => Some(p.clone()),
            Self::Vector(v) => Some(v.iter().map(|c| f64::from(*c)).collect()),
            Self::Quaternion(q) => Some(quat_to_xyzw(q).iter().map(|c| f64::from(*c)).collect()),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec3> for PropertyValue {
    fn from(value: Vec3) -> Self {
        Self::Vector(value)
    }
}

impl From<Quat> for PropertyValue {
    fn from(value: Quat) -> Self {
        Self::Quaternion(value)
    }
}

/// Declaration of one property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// Semantic type
    pub kind: PropertyType,
    /// Default, in raw form
    pub default: PropertyValue,
}

/// Property declarations of a component type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySchema {
    properties: BTreeMap<String, PropertyDef>,
}

impl PropertySchema {
    /// Empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property
    #[must_use]
    pub fn property(mut self, name: &str, kind: PropertyType, default: PropertyValue) -> Self {
        self.properties.insert(name.to_string(), PropertyDef { kind, default });
        self
    }

    /// Add a number property
    #[must_use]
    pub fn number(self, name: &str, default: f64) -> Self {
        self.property(name, PropertyType::Number, PropertyValue::Number(default))
    }

    /// Add a scalar property
    #[must_use]
    pub fn scalar(self, name: &str, default: f64) -> Self {
        self.property(name, PropertyType::Scalar, PropertyValue::Number(default))
    }

    /// Add a boolean property
    #[must_use]
    pub fn boolean(self, name: &str, default: bool) -> Self {
        self.property(name, PropertyType::Bool, PropertyValue::Bool(default))
    }

    /// Add a text property
    #[must_use]
    pub fn text(self, name: &str, default: &str) -> Self {
        self.property(name, PropertyType::Text, PropertyValue::from(default))
    }

    /// Add a choice property. `default` should be one of `choices`.
    #[must_use]
    pub fn choice(self, name: &str, choices: &[&str], default: &str) -> Self {
        let choices = choices.iter().map(|c| (*c).to_string()).collect();
        self.property(name, PropertyType::Choice(choices), PropertyValue::from(default))
    }

    /// Add a vector property
    #[must_use]
    pub fn vector(self, name: &str, default: [f64; 3]) -> Self {
        self.property(name, PropertyType::Vector, PropertyValue::Parameters(default.to_vec()))
    }

    /// Add a quaternion property, default given as `[x, y, z, w]`
    #[must_use]
    pub fn quaternion(self, name: &str, default: [f64; 4]) -> Self {
        self.property(name, PropertyType::Quaternion, PropertyValue::Parameters(default.to_vec()))
    }

    /// Add a colour property
    #[must_use]
    pub fn colour(self, name: &str, default: u32) -> Self {
        self.property(name, PropertyType::Colour, PropertyValue::Colour(default))
    }

    /// Declaration of `name`
    pub fn get(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// All declarations by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDef)> {
        self.properties.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether there are no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Editor description: `{name: {type, default, options?}}`
    pub fn describe(&self) -> Value {
        let mut described = serde_json::Map::new();
        for (name, def) in &self.properties {
            let mut entry = serde_json::Map::new();
            entry.insert("type".to_string(), Value::String(def.kind.name().to_string()));
            if let PropertyType::Choice(choices) = &def.kind {
                entry.insert("options".to_string(), json!(choices));
            }
            entry.insert("default".to_string(), def.kind.to_json(&def.default).unwrap_or(Value::Null));
            described.insert(name.clone(), Value::Object(entry));
        }
        Value::Object(described)
    }
}

/// A complete, validated option set for one component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    values: BTreeMap<String, PropertyValue>,
}

impl Options {
    /// Empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value
    pub fn insert(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Value of `name`
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Whether `name` is set
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Property names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Values by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number value
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropertyValue::as_f64)
    }

    /// Number value narrowed to `f32`
    #[allow(clippy::cast_possible_truncation)]
    pub fn f32(&self, name: &str) -> Option<f32> {
        self.number(name).map(|n| n as f32)
    }

    /// Boolean value
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropertyValue::as_bool)
    }

    /// Text value
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_str)
    }

    /// Colour value
    pub fn colour(&self, name: &str) -> Option<u32> {
        self.get(name).and_then(PropertyValue::as_colour)
    }

    /// Vector value in either form
    pub fn vector(&self, name: &str) -> Option<Vec3> {
        self.get(name).and_then(PropertyValue::as_vector)
    }

    /// Rotation value in either form
    pub fn quaternion(&self, name: &str) -> Option<Quat> {
        self.get(name).and_then(PropertyValue::as_quaternion)
    }
}

impl FromIterator<(String, PropertyValue)> for Options {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vector_accepts_wrapper_and_bare_array() {
        let wrapped = json!({"type": "vector", "parameters": [1, 2, 3]});
        let bare = json!([1.0, 2.0, 3.0]);
        let expected = PropertyValue::Parameters(vec![1.0, 2.0, 3.0]);
        assert_eq!(PropertyType::Vector.parse(&wrapped), Some(expected.clone()));
        assert_eq!(PropertyType::Vector.parse(&bare), Some(expected));
    }

    #[test]
    fn test_malformed_shapes_are_rejected() {
        assert_eq!(PropertyType::Vector.parse(&json!([1, 2])), None);
        assert_eq!(PropertyType::Vector.parse(&json!({"type": "quaternion", "parameters": [1, 2, 3]})), None);
        assert_eq!(PropertyType::Quaternion.parse(&json!([0, 0, "z", 1])), None);
        assert_eq!(PropertyType::Number.parse(&json!("ten")), None);
        assert_eq!(PropertyType::Choice(vec!["box".into()]).parse(&json!("torus")), None);
        assert_eq!(PropertyType::Colour.parse(&json!(0x0100_0000)), None);
        assert_eq!(PropertyType::Colour.parse(&json!(-1)), None);
    }

    #[test]
    fn test_colour_accepts_integral_floats() {
        assert_eq!(PropertyType::Colour.parse(&json!(255.0)), Some(PropertyValue::Colour(255)));
        assert_eq!(PropertyType::Colour.parse(&json!(255.5)), None);
    }

    #[test]
    fn test_quaternion_translation_uses_xyzw() {
        let raw = PropertyValue::Parameters(vec![0.0, 0.0, 1.0, 0.0]);
        let rotation = PropertyType::Quaternion.translate(raw).as_quaternion().unwrap();
        assert_relative_eq!(rotation.quaternion().k, 1.0);
        assert_relative_eq!(rotation.quaternion().w, 0.0);
    }

    #[test]
    fn test_flat_json_forms() {
        let vector = PropertyType::Vector.to_json(&PropertyValue::Vector(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(vector, Some(json!({"type": "vector", "parameters": [1.0, 2.0, 3.0]})));

        let rotation = PropertyType::Quaternion.to_json(&PropertyValue::Quaternion(Quat::identity()));
        assert_eq!(rotation, Some(json!({"type": "quaternion", "parameters": [0.0, 0.0, 0.0, 1.0]})));

        assert_eq!(PropertyType::Colour.to_json(&PropertyValue::Colour(0xFF)), Some(json!(255)));
        assert_eq!(PropertyType::Bool.to_json(&PropertyValue::Number(1.0)), None);
    }

    #[test]
    fn test_schema_description_lists_choices() {
        let schema = PropertySchema::new().choice("shape", &["box", "sphere"], "box").number("mass", 1.0);
        let described = schema.describe();
        assert_eq!(described["shape"]["type"], "list");
        assert_eq!(described["shape"]["options"], json!(["box", "sphere"]));
        assert_eq!(described["mass"]["default"], json!(1.0));
    }

    #[test]
    fn test_options_getters_accept_both_forms() {
        let options = Options::new()
            .with("raw", PropertyValue::Parameters(vec![1.0, 2.0, 3.0]))
            .with("native", Vec3::new(4.0, 5.0, 6.0))
            .with("fov", 75.0_f32);
        assert_relative_eq!(options.vector("raw").unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(options.vector("native").unwrap(), Vec3::new(4.0, 5.0, 6.0));
        assert_relative_eq!(options.f32("fov").unwrap(), 75.0);
        assert_eq!(options.text("fov"), None);
    }
}
