//! Versioned flat-array weight store.
//!
//! Every resource lives at `<namespace>/<version tag>/<name>.ser`, where the
//! version tag is the hex rendering of [`codec::element_version_tag`]. The
//! tag appears both in the address and in the stream header, so a store
//! written for another element format is never parsed leniently: it reads as
//! not found.

pub mod codec;
pub mod source;
mod writer;

pub use codec::{DecodeFailure, element_version_tag};
pub use source::{ByteSource, DirectorySource, EmbeddedSource, ResourceReader};
pub use writer::StoreWriter;

use tracing::{debug, warn};
use yolo_common::config::DEFAULT_NAMESPACE;
use yolo_common::{Result, WeightsError};

/// File extension of serialized resources.
pub const RESOURCE_EXTENSION: &str = "ser";

/// Address of `name` under `namespace` for the given version tag.
pub fn resource_address(namespace: &str, version_tag: u64, name: &str) -> String {
    format!("{namespace}/{version_tag:016x}/{name}.{RESOURCE_EXTENSION}")
}

/// Resolves names to flat `f32` sequences through a [`ByteSource`].
///
/// Holds only read-only configuration; each fetch opens and drops its own reader.
#[derive(Debug, Clone)]
pub struct WeightStore<S = DirectorySource> {
    source: S,
    namespace: String,
    version_tag: u64,
}

impl<S: ByteSource> WeightStore<S> {
    pub fn new(source: S) -> Self {
        Self::with_namespace(source, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(source: S, namespace: impl Into<String>) -> Self {
        Self { source, namespace: namespace.into(), version_tag: element_version_tag() }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version_tag(&self) -> u64 {
        self.version_tag
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn address(&self, name: &str) -> String {
        resource_address(&self.namespace, self.version_tag, name)
    }

    /// Fetch the flat weights stored under `name`.
    ///
    /// # Errors
    ///
    /// - [`WeightsError::NotFound`] if no resource exists, the name or namespace
    ///   would resolve outside the store, or the stream carries another version tag
    /// - [`WeightsError::Decode`] if the stream is malformed or fails mid-read
    /// - [`WeightsError::Io`] if the resource exists but cannot be opened
    pub fn fetch(&self, name: &str) -> Result<Vec<f32>> {
        let address = self.address(name);
        if !self.resolvable(name) {
            return Err(WeightsError::not_found(address));
        }

        debug!("Fetching weights {} from {}", address, self.source.describe());
        let Some(mut reader) = self.source.open(&address)? else {
            return Err(WeightsError::not_found(address));
        };

        match codec::decode_weights(&mut reader, self.version_tag) {
            Ok(values) => {
                debug!("Decoded {} values from {}", values.len(), address);
                Ok(values)
            }
            Err(DecodeFailure::TagMismatch { found }) => {
                warn!(
                    "Version tag mismatch at {}: found {:016x}, expected {:016x}",
                    address, found, self.version_tag
                );
                Err(WeightsError::not_found(address))
            }
            Err(DecodeFailure::Malformed(reason)) => Err(WeightsError::decode(address, reason)),
        }
    }

    /// Whether a resource exists under `name`, without decoding it.
    pub fn contains(&self, name: &str) -> Result<bool> {
        if !self.resolvable(name) {
            return Ok(false);
        }
        Ok(self.source.open(&self.address(name))?.is_some())
    }

    fn resolvable(&self, name: &str) -> bool {
        is_valid_namespace(&self.namespace) && is_valid_name(name)
    }
}

/// Names are relative, `/`-separated, and never step outside the namespace.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('/')
        && !name.contains('\\')
        && name.split('/').all(is_valid_segment)
}

/// A namespace is exactly one name segment.
fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.contains(['/', '\\']) && is_valid_segment(namespace)
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded_store(entries: &[(&str, &[f32])]) -> WeightStore<EmbeddedSource> {
        let tag = element_version_tag();
        let mut source = EmbeddedSource::new();
        for (name, values) in entries {
            source.insert(
                resource_address(DEFAULT_NAMESPACE, tag, name),
                codec::encode_weights(tag, values),
            );
        }
        WeightStore::new(source)
    }

    #[test]
    fn address_joins_namespace_tag_and_name() {
        let store = WeightStore::with_namespace(EmbeddedSource::new(), "ns");
        let address = store.address("conv_0");
        let tag = format!("{:016x}", element_version_tag());
        assert_eq!(address, format!("ns/{tag}/conv_0.ser"));
    }

    #[test]
    fn fetch_returns_stored_values() {
        let store = embedded_store(&[("bn_1_gamma", &[1.0, 2.0, 3.0][..])]);
        assert_eq!(store.fetch("bn_1_gamma").unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn fetch_missing_is_not_found() {
        let store = embedded_store(&[]);
        assert!(store.fetch("absent").unwrap_err().is_not_found());
    }

    #[test]
    fn fetch_rejects_escaping_names() {
        let store = embedded_store(&[("ok", &[1.0][..])]);
        for name in ["", "../ok", "/ok", "a//b", "a/./b", "a\\b"] {
            assert!(store.fetch(name).unwrap_err().is_not_found(), "{name:?}");
        }
    }

    #[test]
    fn fetch_with_foreign_tag_is_not_found() {
        let tag = element_version_tag();
        let source = EmbeddedSource::new().with_resource(
            resource_address(DEFAULT_NAMESPACE, tag, "stale"),
            codec::encode_weights(tag ^ 1, &[1.0]),
        );
        let store = WeightStore::new(source);
        assert!(store.fetch("stale").unwrap_err().is_not_found());
    }

    #[test]
    fn fetch_malformed_is_decode_error() {
        let tag = element_version_tag();
        let source = EmbeddedSource::new()
            .with_resource(resource_address(DEFAULT_NAMESPACE, tag, "bad"), vec![0u8; 7]);
        let store = WeightStore::new(source);
        assert!(matches!(store.fetch("bad"), Err(WeightsError::Decode { .. })));
    }

    #[test]
    fn escaping_namespace_resolves_nothing() {
        let tag = element_version_tag();
        for namespace in ["..", ".", "", "a/b", "a\\b"] {
            let source = EmbeddedSource::new().with_resource(
                resource_address(namespace, tag, "w"),
                codec::encode_weights(tag, &[1.0]),
            );
            let store = WeightStore::with_namespace(source, namespace);
            assert!(store.fetch("w").unwrap_err().is_not_found(), "{namespace:?}");
            assert!(!store.contains("w").unwrap(), "{namespace:?}");
        }
    }

    #[test]
    fn contains_checks_presence() {
        let store = embedded_store(&[("present", &[0.0][..])]);
        assert!(store.contains("present").unwrap());
        assert!(!store.contains("absent").unwrap());
        assert!(!store.contains("../present").unwrap());
    }
}
