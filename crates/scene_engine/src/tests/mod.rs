//! Cross-module tests: registry, entities, scenes and the game working together

mod authority;
mod end_to_end;
mod serialization;

use std::rc::Rc;

use crate::ecs::{ComponentRegistry, DelegationMode};

const EPSILON: f32 = 1e-5;

fn runtime_registry() -> Rc<ComponentRegistry> {
    Rc::new(ComponentRegistry::with_builtin_components(DelegationMode::Enabled).unwrap())
}
