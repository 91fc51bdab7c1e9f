use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Handle to the bytes of an assembly document.
///
/// A handle is immutable and may be read more than once. Nothing is
/// validated here; format errors surface later, during parsing.
#[derive(Debug, Clone)]
pub enum Resource {
    /// Read from a filesystem location.
    File(PathBuf),
    /// Read from an owned byte buffer.
    Bytes(Vec<u8>),
}

impl Resource {
    /// Resource backed by a filesystem location (`file://` prefix accepted).
    pub fn file(location: impl AsRef<str>) -> Self {
        let location = location.as_ref();
        let path = location.strip_prefix("file://").unwrap_or(location);
        Resource::File(PathBuf::from(path))
    }

    /// Resource backed by a raw byte buffer.
    pub fn bytes(buf: impl Into<Vec<u8>>) -> Self {
        Resource::Bytes(buf.into())
    }

    /// Location description for error reporting.
    pub fn location(&self) -> String {
        match self {
            Resource::File(path) => path.display().to_string(),
            Resource::Bytes(buf) => format!("<{} byte buffer>", buf.len()),
        }
    }

    /// Materialize the document text.
    pub fn read_to_string(&self) -> Result<String> {
        match self {
            Resource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| Error::Resource {
                    location: path.display().to_string(),
                    source,
                })
            }
            Resource::Bytes(buf) => {
                String::from_utf8(buf.clone()).map_err(|e| Error::Resource {
                    location: self.location(),
                    source: io::Error::new(io::ErrorKind::InvalidData, e),
                })
            }
        }
    }
}

impl From<&Path> for Resource {
    fn from(path: &Path) -> Self {
        Resource::File(path.to_path_buf())
    }
}

impl From<PathBuf> for Resource {
    fn from(path: PathBuf) -> Self {
        Resource::File(path)
    }
}

impl From<&str> for Resource {
    fn from(location: &str) -> Self {
        Resource::file(location)
    }
}

impl From<Vec<u8>> for Resource {
    fn from(buf: Vec<u8>) -> Self {
        Resource::Bytes(buf)
    }
}

impl From<&[u8]> for Resource {
    fn from(buf: &[u8]) -> Self {
        Resource::Bytes(buf.to_vec())
    }
}
