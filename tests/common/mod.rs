#![allow(dead_code)]

use std::any::Any;
use std::collections::HashMap;
use std::io::Write;
use std::ops::Deref;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assemblage::{
    Component, ComponentDefinition, ComponentLoader, DefinitionBase, Element, NamespaceHandler,
    Result,
};
use tempfile::{Builder, NamedTempFile};

pub struct TestFile(NamedTempFile);

impl Deref for TestFile {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        self.0.path()
    }
}

pub fn create_toml_test_file(content: &str) -> TestFile {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    write!(temp_file, "{}", content).unwrap();
    TestFile(temp_file)
}

/// In-memory keyed store used as the component under assembly.
#[derive(Debug)]
pub struct KeyedStore {
    entries: Mutex<HashMap<u64, String>>,
    started: AtomicBool,
}

impl KeyedStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            started: AtomicBool::new(false),
        }
    }

    pub fn add(&self, value: &str) -> u64 {
        let mut entries = self.entries.lock().unwrap();
        let id = entries.len() as u64 + 1;
        entries.insert(id, value.to_string());
        id
    }

    pub fn get(&self, id: u64) -> Option<String> {
        self.entries.lock().unwrap().get(&id).cloned()
    }

    pub fn remove(&self, id: u64) -> Option<String> {
        self.entries.lock().unwrap().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

impl Component for KeyedStore {
    fn start(&self) -> anyhow::Result<()> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Component holding a wired reference to a store.
pub struct Relay {
    pub store: Arc<KeyedStore>,
    started: AtomicBool,
}

impl Relay {
    pub fn new(store: Arc<KeyedStore>) -> Self {
        Self {
            store,
            started: AtomicBool::new(false),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

impl Component for Relay {
    fn start(&self) -> anyhow::Result<()> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Component whose start hook always fails.
pub struct Brittle;

impl Component for Brittle {
    fn start(&self) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("start hook exploded"))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Loader with the standard test kinds.
pub fn test_loader() -> Arc<ComponentLoader> {
    let mut loader = ComponentLoader::new();
    loader.register("keyed-store", |_definition, _refs| {
        Ok(Arc::new(KeyedStore::new()) as Arc<dyn Component>)
    });
    loader.register("relay", |definition, refs| {
        let store = refs.get_as::<KeyedStore>("store").ok_or_else(|| {
            anyhow::anyhow!("relay '{}' requires a 'store' reference", definition.name)
        })?;
        Ok(Arc::new(Relay::new(store)) as Arc<dyn Component>)
    });
    loader.register("failing", |_definition, _refs| {
        Err(anyhow::anyhow!("constructor exploded"))
    });
    loader.register("brittle", |_definition, _refs| {
        Ok(Arc::new(Brittle) as Arc<dyn Component>)
    });
    Arc::new(loader)
}

/// A keyed-store definition as a handler would produce it.
pub fn store_definition(name: &str, namespace: &str) -> ComponentDefinition {
    ComponentDefinition {
        name: name.to_string(),
        namespace: namespace.to_string(),
        base: DefinitionBase {
            kind: "keyed-store".to_string(),
            refs: Default::default(),
            properties: Default::default(),
        },
    }
}

/// Override handler instrumented with init/parse counters. Produces one
/// keyed-store definition per element by default; an `emit` array in the
/// element body overrides the produced definition names (empty array means
/// zero definitions).
pub struct CountingHandler {
    pub init_calls: AtomicUsize,
    pub parse_calls: AtomicUsize,
}

impl CountingHandler {
    pub fn new() -> Self {
        Self {
            init_calls: AtomicUsize::new(0),
            parse_calls: AtomicUsize::new(0),
        }
    }
}

impl NamespaceHandler for CountingHandler {
    fn init(&self) {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn parse(&self, element: &Element) -> Result<Vec<ComponentDefinition>> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        let names: Vec<String> = match element.body.get("emit") {
            Some(toml::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => vec![element.name.clone()],
        };
        Ok(names
            .iter()
            .map(|name| store_definition(name, &element.namespace))
            .collect())
    }
}
