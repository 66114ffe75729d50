//! Byte sources that resolve resource addresses to readable streams

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use yolo_common::{Result, WeightsError};

/// A readable stream borrowed from a [`ByteSource`]. Dropping it releases the resource.
pub type ResourceReader<'a> = Box<dyn Read + 'a>;

/// Resolves a `/`-separated resource address to a byte stream.
pub trait ByteSource: Send + Sync {
    /// Open the resource at `address`.
    ///
    /// Returns `Ok(None)` when nothing exists at the address. Any other failure
    /// to open is reported as an error.
    fn open(&self, address: &str) -> Result<Option<ResourceReader<'_>>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn open(&self, address: &str) -> Result<Option<ResourceReader<'_>>> {
        (**self).open(address)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    fn open(&self, address: &str) -> Result<Option<ResourceReader<'_>>> {
        (**self).open(address)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Resolves addresses as relative paths under a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for an address.
    pub fn path_for(&self, address: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(address.split('/').filter(|segment| !segment.is_empty()));
        path
    }
}

impl ByteSource for DirectorySource {
    fn open(&self, address: &str) -> Result<Option<ResourceReader<'_>>> {
        let path = self.path_for(address);
        let file = match File::open(&path) {
            Ok(file) => file,
            // A path through an existing file names nothing, same as a missing one.
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Ok(None);
            }
            Err(e) => return Err(WeightsError::Io(e)),
        };
        if file.metadata()?.is_dir() {
            return Ok(None);
        }
        Ok(Some(Box::new(BufReader::new(file))))
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// Resources held in memory, keyed by address.
///
/// This is the packaged-resource counterpart of [`DirectorySource`]: weights
/// compiled into the binary with `include_bytes!` or loaded up front.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedSource {
    resources: HashMap<String, Cow<'static, [u8]>>,
}

impl EmbeddedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) {
        self.resources.insert(address.into(), bytes.into());
    }

    pub fn with_resource(
        mut self,
        address: impl Into<String>,
        bytes: impl Into<Cow<'static, [u8]>>,
    ) -> Self {
        self.insert(address, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<_> = self.resources.keys().cloned().collect();
        addresses.sort();
        addresses
    }
}

impl ByteSource for EmbeddedSource {
    fn open(&self, address: &str) -> Result<Option<ResourceReader<'_>>> {
        Ok(self.resources.get(address).map(|bytes| Box::new(&bytes[..]) as ResourceReader<'_>))
    }

    fn describe(&self) -> String {
        format!("embedded ({} resources)", self.resources.len())
    }
}
