//! Assemblage
//!
//! A declarative component assembly factory: parse a definition document
//! through namespace-scoped handlers, instantiate the defined components in
//! dependency order under an isolated loader binding, and extract the live
//! components by type.
//!
//! # Document dialect
//!
//! An assembly document is TOML. Each root-level table is one element,
//! interpreted by the handler registered for its namespace; the optional
//! root `namespace` key declares the document default. The core namespace
//! (`urn:assemblage:core`) wires one component per element:
//!
//! ```toml
//! namespace = "urn:assemblage:core"
//!
//! [store]
//! kind = "keyed-store"
//!
//! [relay]
//! kind = "relay"
//! refs = { store = "store" }
//! ```
//!
//! The reserved root `context` table splits a document into multiple
//! contexts, each assembled independently.

pub use component::{Component, ComponentLoader, Constructor, Refs};
pub use context::AssemblyContext;
pub use error::{Error, Result};
pub use factory::{AssemblyFactory, AssemblyFactoryBuilder};
pub use invoker::{IsolatedInvoker, ambient_loader};
pub use loader::{load_context, load_contexts};
pub use namespace::{
    CORE_NAMESPACE, CoreNamespaceHandler, DefaultHandlerRegistry, Element, HandlerResolver,
    NamespaceHandler, OverrideHandlerRegistry,
};
pub use resource::Resource;
pub use types::{ComponentDefinition, DefinitionBase};

pub mod component;
pub mod context;
pub mod error;
pub mod factory;
pub mod graph;
pub mod invoker;
pub mod loader;
pub mod namespace;
pub mod resource;
pub mod types;
