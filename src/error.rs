use thiserror::Error;

/// Errors surfaced while loading definitions or assembling components.
///
/// Load-time errors (`Resource`, `Parse`, `UnresolvedNamespace`,
/// `DefinitionConflict`) propagate unchanged to the caller. Failures during
/// refresh are wrapped in `Assembly` with the root cause attached.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read resource '{location}': {source}")]
    Resource {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed assembly document: {0}")]
    Parse(String),
    #[error("no handler registered for namespace '{0}'")]
    UnresolvedNamespace(String),
    #[error("duplicate component name '{0}'")]
    DefinitionConflict(String),
    #[error("assembly failed: {cause:#}")]
    Assembly { cause: anyhow::Error },
    #[error("single result expected, found {actual}")]
    Cardinality { actual: usize },
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
