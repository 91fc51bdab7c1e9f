//! Definition loading: parse a resource through a handler resolver into
//! unrefreshed assembly contexts. Nothing is instantiated here.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::component::ComponentLoader;
use crate::context::AssemblyContext;
use crate::error::{Error, Result};
use crate::namespace::{Element, HandlerResolver};
use crate::resource::Resource;
use crate::types::ComponentDefinition;

const NAMESPACE_KEY: &str = "namespace";
const CONTEXT_KEY: &str = "context";

/// Parse `resource` into zero or more unrefreshed contexts, one per context
/// document, each bound to `loader`.
///
/// A document without a reserved root `context` table is exactly one
/// context; with one, every `context.<name>` sub-table loads as its own
/// context (an empty `context` table yields zero). Each element dispatches
/// to the handler resolved for its namespace.
pub fn load_contexts(
    resource: &Resource,
    resolver: &dyn HandlerResolver,
    loader: Arc<ComponentLoader>,
) -> Result<Vec<AssemblyContext>> {
    let text = resource.read_to_string()?;
    let root: toml::Table = toml::from_str(&text)?;

    let mut contexts = Vec::new();
    for document in split_documents(root)? {
        let definitions = parse_document(document, resolver)?;
        tracing::debug!(definitions = definitions.len(), "loaded context definitions");
        contexts.push(AssemblyContext::new(loader.clone(), definitions));
    }
    Ok(contexts)
}

/// Single-context form of [`load_contexts`]; fails with
/// [`Error::Cardinality`] unless the document produced exactly one context.
pub fn load_context(
    resource: &Resource,
    resolver: &dyn HandlerResolver,
    loader: Arc<ComponentLoader>,
) -> Result<AssemblyContext> {
    let mut contexts = load_contexts(resource, resolver, loader)?;
    if contexts.len() != 1 {
        return Err(Error::Cardinality {
            actual: contexts.len(),
        });
    }
    Ok(contexts.remove(0))
}

/// One context's worth of raw elements.
struct ContextDocument {
    default_namespace: Option<String>,
    elements: toml::Table,
}

fn split_documents(mut root: toml::Table) -> Result<Vec<ContextDocument>> {
    let root_namespace = take_namespace(&mut root)?;

    match root.remove(CONTEXT_KEY) {
        Some(toml::Value::Table(groups)) => {
            if !root.is_empty() {
                let stray: Vec<_> = root.keys().cloned().collect();
                return Err(Error::Parse(format!(
                    "definitions {stray:?} outside 'context' in a multi-context document"
                )));
            }
            let mut documents = Vec::new();
            for (name, value) in groups {
                let toml::Value::Table(mut elements) = value else {
                    return Err(Error::Parse(format!("context '{name}' must be a table")));
                };
                let default_namespace =
                    take_namespace(&mut elements)?.or_else(|| root_namespace.clone());
                documents.push(ContextDocument {
                    default_namespace,
                    elements,
                });
            }
            Ok(documents)
        }
        Some(_) => Err(Error::Parse("'context' must be a table".into())),
        None => Ok(vec![ContextDocument {
            default_namespace: root_namespace,
            elements: root,
        }]),
    }
}

fn take_namespace(table: &mut toml::Table) -> Result<Option<String>> {
    match table.remove(NAMESPACE_KEY) {
        Some(toml::Value::String(namespace)) => Ok(Some(namespace)),
        Some(_) => Err(Error::Parse("'namespace' must be a string".into())),
        None => Ok(None),
    }
}

fn parse_document(
    document: ContextDocument,
    resolver: &dyn HandlerResolver,
) -> Result<Vec<ComponentDefinition>> {
    let mut definitions: Vec<ComponentDefinition> = Vec::new();
    let mut names = HashSet::new();

    for (name, value) in document.elements {
        let toml::Value::Table(mut body) = value else {
            return Err(Error::Parse(format!("definition '{name}' must be a table")));
        };
        let namespace = take_namespace(&mut body)?
            .or_else(|| document.default_namespace.clone())
            .ok_or_else(|| {
                Error::Parse(format!(
                    "definition '{name}' has no namespace and the document declares no default"
                ))
            })?;

        let handler = resolver
            .resolve(&namespace)
            .ok_or_else(|| Error::UnresolvedNamespace(namespace.clone()))?;

        let element = Element {
            name,
            namespace,
            body,
        };
        for definition in handler.parse(&element)? {
            if !names.insert(definition.name.clone()) {
                return Err(Error::DefinitionConflict(definition.name));
            }
            definitions.push(definition);
        }
    }
    Ok(definitions)
}

pub(crate) fn toml_table_to_json_map(
    table: &toml::map::Map<String, toml::Value>,
) -> Result<HashMap<String, serde_json::Value>> {
    let mut map = HashMap::new();
    for (key, value) in table {
        map.insert(key.clone(), toml_value_to_json(value)?);
    }
    Ok(map)
}

fn toml_value_to_json(value: &toml::Value) -> Result<serde_json::Value> {
    match value {
        toml::Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        toml::Value::Integer(i) => Ok(serde_json::Value::Number((*i).into())),
        toml::Value::Float(f) => Ok(serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)),
        toml::Value::Boolean(b) => Ok(serde_json::Value::Bool(*b)),
        toml::Value::Array(arr) => {
            let json_arr: Result<Vec<_>> = arr.iter().map(toml_value_to_json).collect();
            Ok(serde_json::Value::Array(json_arr?))
        }
        toml::Value::Table(table) => {
            let json_map = toml_table_to_json_map(table)?;
            let json_obj: serde_json::Map<String, serde_json::Value> =
                json_map.into_iter().collect();
            Ok(serde_json::Value::Object(json_obj))
        }
        toml::Value::Datetime(dt) => Ok(serde_json::Value::String(dt.to_string())),
    }
}
