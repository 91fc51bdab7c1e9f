use anyhow::Result;
use clap::{Args, Parser};
use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use assemblage::graph::DefinitionGraph;
use assemblage::{Component, ComponentLoader, DefaultHandlerRegistry, Resource, load_contexts};

#[derive(Parser)]
#[command(name = "assemblage")]
#[command(about = "Assemble components from a declarative definition document")]
struct Cli {
    #[command(flatten)]
    mode: ModeArgs,

    /// Assembly definition document (.toml)
    document: PathBuf,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ModeArgs {
    /// Load definitions and print them without instantiating anything
    #[arg(long, short)]
    dry_run: bool,

    /// Export the definition dependency graph to a DOT file (graph.dot)
    #[arg(long, short)]
    export: bool,

    /// Assemble with the built-in sample kinds and list the live components
    #[arg(long, short)]
    assemble: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let resource = Resource::from(cli.document.as_path());
    let registry = DefaultHandlerRegistry::new();
    let mut contexts = load_contexts(&resource, &registry, sample_loader())?;

    if cli.mode.dry_run {
        for (i, context) in contexts.iter().enumerate() {
            println!("--- Context {i} ---");
            for definition in context.definitions() {
                println!("{definition:#?}");
            }
        }
    } else if cli.mode.export {
        let single = contexts.len() == 1;
        for (i, context) in contexts.iter().enumerate() {
            let graph = DefinitionGraph::build(context.definitions())?;
            let filename = if single {
                "graph.dot".to_string()
            } else {
                format!("graph-{i}.dot")
            };
            graph.write_dot_file(&filename)?;
            println!("Graph exported to {filename}");
        }
    } else if cli.mode.assemble {
        for (i, context) in contexts.iter_mut().enumerate() {
            context.refresh(true)?;
            println!("--- Context {i} ---");
            for name in context.component_names() {
                println!("- {name}");
            }
        }
    }

    Ok(())
}

/// Loader with the built-in sample kinds: an in-memory keyed store and a
/// relay holding a reference to one.
fn sample_loader() -> Arc<ComponentLoader> {
    let mut loader = ComponentLoader::new();
    loader.register("keyed-store", |definition, _refs| {
        let store = KeyedStore::new();
        if let Some(seed) = definition.properties.get("seed").and_then(|v| v.as_array()) {
            for value in seed.iter().filter_map(|v| v.as_str()) {
                store.add(value);
            }
        }
        Ok(Arc::new(store) as Arc<dyn Component>)
    });
    loader.register("relay", |definition, refs| {
        let store = refs.get_as::<KeyedStore>("store").ok_or_else(|| {
            anyhow::anyhow!("relay '{}' requires a 'store' reference", definition.name)
        })?;
        Ok(Arc::new(Relay { store }) as Arc<dyn Component>)
    });
    Arc::new(loader)
}

/// In-memory keyed store sample component.
struct KeyedStore {
    entries: Mutex<HashMap<u64, String>>,
}

impl KeyedStore {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn add(&self, value: &str) -> u64 {
        let mut entries = self.entries.lock().unwrap();
        let id = entries.len() as u64 + 1;
        entries.insert(id, value.to_string());
        id
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl Component for KeyedStore {
    fn start(&self) -> Result<()> {
        tracing::info!(entries = self.len(), "keyed store started");
        Ok(())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Sample component wired to a store.
struct Relay {
    store: Arc<KeyedStore>,
}

impl Component for Relay {
    fn start(&self) -> Result<()> {
        tracing::info!(entries = self.store.len(), "relay started");
        Ok(())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
