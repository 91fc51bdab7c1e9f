//! Definition types shared across the crate.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Wiring portion of a definition: the constructor kind, the named
/// references to other components, and free-form property values.
#[derive(Debug, Clone, Deserialize)]
pub struct DefinitionBase {
    pub kind: String,
    /// Field name on the component -> name of the referenced component.
    #[serde(default)]
    pub refs: BTreeMap<String, String>,
    /// Populated by the parsing handler, not deserialized directly.
    #[serde(default, skip_deserializing)]
    pub properties: HashMap<String, serde_json::Value>,
}

/// Named, namespace-qualified description of how to construct one
/// component. Created during document parsing, consumed during refresh,
/// never mutated after refresh begins.
#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    pub name: String,
    /// Namespace URI of the element this definition was parsed from.
    pub namespace: String,
    pub base: DefinitionBase,
}

impl std::ops::Deref for ComponentDefinition {
    type Target = DefinitionBase;
    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
