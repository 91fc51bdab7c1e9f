//! The assembly factory: resolve a resource, load its definitions, refresh
//! under an isolated loader binding with auto-start suppressed, and hand
//! back the live components matching the requested type.

use std::any::Any;
use std::sync::Arc;

use crate::component::{Component, ComponentLoader};
use crate::error::{Error, Result};
use crate::invoker::IsolatedInvoker;
use crate::loader;
use crate::namespace::{
    DefaultHandlerRegistry, HandlerResolver, NamespaceHandler, OverrideHandlerRegistry,
};
use crate::resource::Resource;

/// Builds live components from a declarative document.
///
/// Start hooks do not run during assembly; they are the embedding host's to
/// run afterwards, on the returned components or through
/// [`crate::AssemblyContext::refresh`] with auto-start enabled.
pub struct AssemblyFactory {
    loader: Arc<ComponentLoader>,
    resolver: Arc<dyn HandlerResolver>,
}

impl AssemblyFactory {
    /// Factory over `loader` with the built-in handler registry.
    pub fn new(loader: Arc<ComponentLoader>) -> Self {
        Self::builder().loader(loader).build()
    }

    pub fn builder() -> AssemblyFactoryBuilder {
        AssemblyFactoryBuilder::new()
    }

    /// All live components assignable to `T`, in document order across the
    /// document's contexts. Zero matches is an empty vec, not an error; any
    /// refresh failure propagates as [`Error::Assembly`] and no components
    /// are returned.
    pub fn create_list<T: Any + Send + Sync>(
        &self,
        resource: impl Into<Resource>,
    ) -> Result<Vec<Arc<T>>> {
        let contexts = self.assemble(resource)?;
        let mut components = Vec::new();
        for context in &contexts {
            components.extend(context.components_of_type::<T>());
        }
        Ok(components)
    }

    /// Single-result form of [`create_list`](Self::create_list); fails with
    /// [`Error::Cardinality`] unless exactly one component matches.
    pub fn create_single<T: Any + Send + Sync>(
        &self,
        resource: impl Into<Resource>,
    ) -> Result<Arc<T>> {
        let mut components = self.create_list::<T>(resource)?;
        if components.len() != 1 {
            return Err(Error::Cardinality {
                actual: components.len(),
            });
        }
        Ok(components.remove(0))
    }

    /// Every live component regardless of type, in document order.
    pub fn create_all(&self, resource: impl Into<Resource>) -> Result<Vec<Arc<dyn Component>>> {
        let contexts = self.assemble(resource)?;
        let mut components = Vec::new();
        for context in &contexts {
            components.extend(context.components());
        }
        Ok(components)
    }

    fn assemble(&self, resource: impl Into<Resource>) -> Result<Vec<crate::AssemblyContext>> {
        let resource = resource.into();
        let mut contexts =
            loader::load_contexts(&resource, self.resolver.as_ref(), self.loader.clone())?;

        let invoker = IsolatedInvoker::new(self.loader.clone());
        for context in &mut contexts {
            invoker.run(|| context.refresh(false))?;
        }
        Ok(contexts)
    }
}

pub struct AssemblyFactoryBuilder {
    loader: Option<Arc<ComponentLoader>>,
    resolver: Arc<dyn HandlerResolver>,
}

impl AssemblyFactoryBuilder {
    fn new() -> Self {
        Self {
            loader: None,
            resolver: Arc::new(DefaultHandlerRegistry::new()),
        }
    }

    /// The loader installed as the ambient binding while refreshing, and
    /// consulted for kind resolution. Defaults to an empty loader.
    pub fn loader(mut self, loader: Arc<ComponentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Pin `handler` for `namespace` ahead of the resolver built so far.
    /// Each call wraps the current resolver in one override decorator.
    pub fn with_handler(
        mut self,
        namespace: impl Into<String>,
        handler: Arc<dyn NamespaceHandler>,
    ) -> Self {
        self.resolver = Arc::new(OverrideHandlerRegistry::new(
            self.resolver,
            namespace,
            handler,
        ));
        self
    }

    /// Replace the base resolver (default: the built-in registry).
    pub fn resolver(mut self, resolver: Arc<dyn HandlerResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn build(self) -> AssemblyFactory {
        AssemblyFactory {
            loader: self.loader.unwrap_or_default(),
            resolver: self.resolver,
        }
    }
}
