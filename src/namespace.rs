//! Namespace handlers and handler registries.
//!
//! Every definition element of an assembly document is qualified by a
//! namespace URI, and a [`HandlerResolver`] decides which
//! [`NamespaceHandler`] interprets it. The built-in registry ships the core
//! wiring handler; [`OverrideHandlerRegistry`] pins one known handler for
//! one namespace ahead of a delegate, so a host-controlled dialect is always
//! routed to the handler the host trusts rather than whatever the delegate
//! would discover.

use std::collections::HashMap;
use std::sync::{Arc, Once};

use crate::error::{Error, Result};
use crate::loader;
use crate::types::{ComponentDefinition, DefinitionBase};

/// Namespace claimed by the built-in core wiring handler.
pub const CORE_NAMESPACE: &str = "urn:assemblage:core";

/// One namespace-qualified element of an assembly document. The reserved
/// dialect keys (`namespace`) have already been stripped from `body`.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub namespace: String,
    pub body: toml::Table,
}

/// Interprets elements of one namespace into component definitions.
///
/// Stateful handlers may rely on `init` having run before the first
/// `parse`; registries guarantee it runs exactly once per entry, even under
/// concurrent first use.
pub trait NamespaceHandler: Send + Sync {
    /// One-time initialization hook.
    fn init(&self) {}

    /// Parse one element into zero or more definitions.
    fn parse(&self, element: &Element) -> Result<Vec<ComponentDefinition>>;
}

/// Resolves a namespace URI to the handler claiming it.
pub trait HandlerResolver: Send + Sync {
    fn resolve(&self, namespace: &str) -> Option<&dyn NamespaceHandler>;
}

struct Entry {
    handler: Arc<dyn NamespaceHandler>,
    init: Once,
}

impl Entry {
    fn new(handler: Arc<dyn NamespaceHandler>) -> Self {
        Self {
            handler,
            init: Once::new(),
        }
    }

    fn get(&self) -> &dyn NamespaceHandler {
        self.init.call_once(|| self.handler.init());
        self.handler.as_ref()
    }
}

/// Built-in handlers keyed by namespace URI. Read-only after construction;
/// safe for concurrent lookup.
pub struct DefaultHandlerRegistry {
    entries: HashMap<String, Entry>,
}

impl DefaultHandlerRegistry {
    /// Registry holding the core wiring handler.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            CORE_NAMESPACE.to_string(),
            Entry::new(Arc::new(CoreNamespaceHandler)),
        );
        Self { entries }
    }

    /// Registry with no built-in handlers.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl Default for DefaultHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerResolver for DefaultHandlerRegistry {
    fn resolve(&self, namespace: &str) -> Option<&dyn NamespaceHandler> {
        self.entries.get(namespace).map(Entry::get)
    }
}

/// Decorator holding exactly one (namespace, handler) pair, fixed at
/// construction, checked before delegating to the wrapped resolver.
pub struct OverrideHandlerRegistry {
    namespace: String,
    entry: Entry,
    delegate: Arc<dyn HandlerResolver>,
}

impl OverrideHandlerRegistry {
    pub fn new(
        delegate: Arc<dyn HandlerResolver>,
        namespace: impl Into<String>,
        handler: Arc<dyn NamespaceHandler>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            entry: Entry::new(handler),
            delegate,
        }
    }
}

impl HandlerResolver for OverrideHandlerRegistry {
    fn resolve(&self, namespace: &str) -> Option<&dyn NamespaceHandler> {
        if namespace == self.namespace {
            Some(self.entry.get())
        } else {
            self.delegate.resolve(namespace)
        }
    }
}

/// Core wiring dialect: one element maps to one definition carrying `kind`,
/// `refs`, and `properties`.
pub struct CoreNamespaceHandler;

impl NamespaceHandler for CoreNamespaceHandler {
    fn parse(&self, element: &Element) -> Result<Vec<ComponentDefinition>> {
        let mut body = element.body.clone();
        let properties = match body.remove("properties") {
            Some(toml::Value::Table(table)) => loader::toml_table_to_json_map(&table)?,
            Some(_) => {
                return Err(Error::Parse(format!(
                    "'properties' of '{}' must be a table",
                    element.name
                )));
            }
            None => HashMap::new(),
        };

        let mut base: DefinitionBase =
            toml::Value::Table(body)
                .try_into()
                .map_err(|e: toml::de::Error| {
                    Error::Parse(format!("invalid definition '{}': {e}", element.name))
                })?;
        base.properties = properties;

        Ok(vec![ComponentDefinition {
            name: element.name.clone(),
            namespace: element.namespace.clone(),
            base,
        }])
    }
}
