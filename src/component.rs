//! The live component model: the `Component` trait, resolved references,
//! and the kind-to-constructor loader.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::ComponentDefinition;

/// A live, named component instance.
///
/// Implementors opt into the post-construction start hook by overriding
/// `start`. The assembly factory suppresses start hooks while it refreshes;
/// the embedding host runs them afterwards, either directly or through
/// `AssemblyContext::refresh` with auto-start enabled.
pub trait Component: Any + Send + Sync {
    /// Post-construction start hook. Not invoked while auto-start is
    /// suppressed.
    fn start(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Upcast used for typed extraction.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Component")
    }
}

/// References already instantiated for a component under construction,
/// keyed by the field names declared in its definition.
pub struct Refs {
    entries: HashMap<String, Arc<dyn Component>>,
}

impl Refs {
    pub(crate) fn new(entries: HashMap<String, Arc<dyn Component>>) -> Self {
        Self { entries }
    }

    pub fn get(&self, field: &str) -> Option<Arc<dyn Component>> {
        self.entries.get(field).cloned()
    }

    /// The referenced instance, downcast to its concrete type.
    pub fn get_as<T: Any + Send + Sync>(&self, field: &str) -> Option<Arc<T>> {
        self.entries
            .get(field)
            .and_then(|component| component.clone().into_any().downcast::<T>().ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Constructor for one component kind.
pub type Constructor =
    Box<dyn Fn(&ComponentDefinition, &Refs) -> anyhow::Result<Arc<dyn Component>> + Send + Sync>;

/// Resolves `kind` names to constructors.
///
/// This is the loader the assembly machinery is isolated against: kind
/// resolution during refresh goes through the ambient loader binding when
/// one is installed (see [`crate::invoker`]), falling back to the loader the
/// context was loaded with.
#[derive(Default)]
pub struct ComponentLoader {
    constructors: HashMap<String, Constructor>,
}

impl ComponentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `kind`, replacing any previous entry.
    pub fn register<F>(&mut self, kind: impl Into<String>, ctor: F)
    where
        F: Fn(&ComponentDefinition, &Refs) -> anyhow::Result<Arc<dyn Component>>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(kind.into(), Box::new(ctor));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_kind<F>(mut self, kind: impl Into<String>, ctor: F) -> Self
    where
        F: Fn(&ComponentDefinition, &Refs) -> anyhow::Result<Arc<dyn Component>>
            + Send
            + Sync
            + 'static,
    {
        self.register(kind, ctor);
        self
    }

    pub fn resolve(&self, kind: &str) -> Option<&Constructor> {
        self.constructors.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

impl fmt::Debug for ComponentLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("ComponentLoader").field("kinds", &kinds).finish()
    }
}
