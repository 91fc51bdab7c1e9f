//! The assembly context: owner of one context document's definitions and,
//! after refresh, the live instances built from them.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context as _;

use crate::component::{Component, ComponentLoader, Refs};
use crate::error::{Error, Result};
use crate::graph::DefinitionGraph;
use crate::invoker;
use crate::types::ComponentDefinition;

pub struct AssemblyContext {
    loader: Arc<ComponentLoader>,
    definitions: Vec<ComponentDefinition>,
    instances: HashMap<String, Arc<dyn Component>>,
    refreshed: bool,
}

impl std::fmt::Debug for AssemblyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblyContext")
            .field("definitions", &self.definitions)
            .field("instances", &self.instances.keys())
            .field("refreshed", &self.refreshed)
            .finish_non_exhaustive()
    }
}

impl AssemblyContext {
    pub(crate) fn new(loader: Arc<ComponentLoader>, definitions: Vec<ComponentDefinition>) -> Self {
        Self {
            loader,
            definitions,
            instances: HashMap::new(),
            refreshed: false,
        }
    }

    /// Definitions in document order.
    pub fn definitions(&self) -> &[ComponentDefinition] {
        &self.definitions
    }

    pub fn loader(&self) -> &Arc<ComponentLoader> {
        &self.loader
    }

    pub fn is_refreshed(&self) -> bool {
        self.refreshed
    }

    /// Instantiate every definition in dependency order, wiring declared
    /// references to the already-built instances, then run start hooks in
    /// the same order when `auto_start` is true.
    ///
    /// Kind resolution goes through the ambient loader binding when one is
    /// installed (see [`crate::invoker::IsolatedInvoker`]), else through the
    /// loader this context was loaded with. On failure no instances are
    /// retained; refreshing an already refreshed context is an error.
    pub fn refresh(&mut self, auto_start: bool) -> Result<()> {
        self.try_refresh(auto_start)
            .map_err(|cause| Error::Assembly { cause })
    }

    fn try_refresh(&mut self, auto_start: bool) -> anyhow::Result<()> {
        if self.refreshed {
            anyhow::bail!("context already refreshed");
        }

        let loader = invoker::ambient_loader().unwrap_or_else(|| self.loader.clone());
        let graph = DefinitionGraph::build(&self.definitions)?;

        let mut instances = HashMap::<String, Arc<dyn Component>>::new();
        let mut build_order = Vec::new();

        for index in graph.build_order() {
            let definition = &graph[index];
            let ctor = loader.resolve(&definition.kind).ok_or_else(|| {
                anyhow::anyhow!(
                    "no constructor registered for kind '{}' (component '{}')",
                    definition.kind,
                    definition.name
                )
            })?;

            let mut entries = HashMap::new();
            for (field, target) in &definition.refs {
                // Graph order guarantees providers are built first.
                let instance = instances.get(target).cloned().ok_or_else(|| {
                    anyhow::anyhow!(
                        "reference '{field}' of '{}' resolved before its provider '{target}'",
                        definition.name
                    )
                })?;
                entries.insert(field.clone(), instance);
            }

            tracing::debug!(name = %definition.name, kind = %definition.kind, "instantiating component");
            let instance = ctor(definition, &Refs::new(entries))
                .with_context(|| format!("failed to construct component '{}'", definition.name))?;
            instances.insert(definition.name.clone(), instance);
            build_order.push(definition.name.clone());
        }

        if auto_start {
            for name in &build_order {
                instances[name]
                    .start()
                    .with_context(|| format!("failed to start component '{name}'"))?;
            }
        }

        self.instances = instances;
        self.refreshed = true;
        Ok(())
    }

    /// Live instances assignable to `T`, in definition order.
    pub fn components_of_type<T: Any + Send + Sync>(&self) -> Vec<Arc<T>> {
        self.definitions
            .iter()
            .filter_map(|definition| self.instances.get(&definition.name))
            .filter_map(|component| component.clone().into_any().downcast::<T>().ok())
            .collect()
    }

    /// All live instances, in definition order.
    pub fn components(&self) -> Vec<Arc<dyn Component>> {
        self.definitions
            .iter()
            .filter_map(|definition| self.instances.get(&definition.name).cloned())
            .collect()
    }

    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.instances
            .get(name)
            .and_then(|component| component.clone().into_any().downcast::<T>().ok())
    }

    pub fn get_dyn(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.instances.get(name).cloned()
    }

    /// Names of the live instances, in definition order.
    pub fn component_names(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .filter(|definition| self.instances.contains_key(&definition.name))
            .map(|definition| definition.name.as_str())
            .collect()
    }
}
