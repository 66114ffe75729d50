use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use yolo_common::config::DEFAULT_NAMESPACE;
use yolo_common::{Result, WeightsError};

use super::codec::{self, element_version_tag};
use super::{DirectorySource, is_valid_name, is_valid_namespace, resource_address};

/// Writes flat weights into a directory laid out for [`DirectorySource`].
#[derive(Debug, Clone)]
pub struct StoreWriter {
    root: PathBuf,
    namespace: String,
    version_tag: u64,
}

impl StoreWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_namespace(root, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self { root: root.into(), namespace: namespace.into(), version_tag: element_version_tag() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Encode `values` under `name`, replacing any existing resource.
    /// Returns the path written.
    ///
    /// Fails with [`WeightsError::InvalidName`] if the namespace or name would
    /// place the file outside the root.
    pub fn write(&self, name: &str, values: &[f32]) -> Result<PathBuf> {
        if !is_valid_namespace(&self.namespace) {
            return Err(WeightsError::InvalidName(self.namespace.clone()));
        }
        if !is_valid_name(name) {
            return Err(WeightsError::InvalidName(name.to_string()));
        }
        let address = resource_address(&self.namespace, self.version_tag, name);

        let path = DirectorySource::new(&self.root).path_for(&address);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = BufWriter::new(File::create(&path)?);
        codec::write_weights(&mut out, self.version_tag, values)?;
        out.flush()?;

        debug!("Wrote {} values to {}", values.len(), path.display());
        Ok(path)
    }
}
