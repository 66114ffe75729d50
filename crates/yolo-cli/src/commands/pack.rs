//! Writing flat values into a directory store

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use clap::{Args, ValueEnum};
use tracing::info;
use yolo_common::{SourceKind, StoreConfig};
use yolo_weights::{KernelShape, StoreWriter};

/// Pack command arguments
#[derive(Args)]
pub struct PackCommand {
    /// Resource name, relative to the namespace
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Input values: a JSON array, or raw little-endian f32 bytes
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Input format; defaults to json for `.json` files and raw otherwise
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,

    /// Expected kernel width
    #[arg(long, default_value_t = 1)]
    pub width: usize,

    /// Expected kernel height
    #[arg(long, default_value_t = 1)]
    pub height: usize,

    /// Expected input depth
    #[arg(long, default_value_t = 1)]
    pub input_depth: usize,

    /// Expected output depth; enables element count validation
    #[arg(long)]
    pub output_depth: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Json,
    Raw,
}

impl InputFormat {
    fn for_path(path: &Path) -> Self {
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            Self::Json
        } else {
            Self::Raw
        }
    }
}

impl PackCommand {
    pub fn execute(&self, config: &StoreConfig) -> Result<()> {
        if config.source != SourceKind::Directory {
            bail!("pack requires a directory source, configured source is {}", config.source);
        }
        let root = config.root.as_deref().context("No store root configured")?;

        let format = self.format.unwrap_or_else(|| InputFormat::for_path(&self.input));
        let values = read_values(&self.input, format)?;
        if let Some(output_depth) = self.output_depth {
            let shape = KernelShape::new(self.width, self.height, self.input_depth, output_depth);
            let expected = shape.element_count()?;
            ensure!(
                values.len() == expected,
                "{} holds {} values, shape {} needs {}",
                self.input.display(),
                values.len(),
                shape,
                expected
            );
        }

        let path = StoreWriter::with_namespace(root, config.namespace.clone())
            .write(&self.name, &values)
            .with_context(|| format!("Failed to write {}", self.name))?;
        info!("Packed {} values into {}", values.len(), path.display());
        println!("{}", path.display());
        Ok(())
    }
}

/// Read values from a JSON array or a raw little-endian f32 buffer.
fn read_values(path: &Path, format: InputFormat) -> Result<Vec<f32>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    if format == InputFormat::Json {
        return serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {} as a JSON array of numbers", path.display()));
    }

    ensure!(
        bytes.len() % 4 == 0,
        "{} is {} bytes, not a whole number of f32 values",
        path.display(),
        bytes.len()
    );
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yolo_weights::{DirectorySource, WeightStore};

    #[test]
    fn reads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gamma.json");
        std::fs::write(&path, "[1.0, 2.5, -3]").unwrap();
        assert_eq!(read_values(&path, InputFormat::for_path(&path)).unwrap(), vec![1.0, 2.5, -3.0]);
    }

    #[test]
    fn reads_raw_little_endian() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conv.bin");
        let bytes: Vec<u8> = [0.5f32, -1.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(&path, bytes).unwrap();
        assert_eq!(read_values(&path, InputFormat::for_path(&path)).unwrap(), vec![0.5, -1.0]);
    }

    #[test]
    fn raw_value_starting_with_bracket_byte_stays_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conv.bin");
        // little-endian low byte is b'['
        let value = f32::from_bits(0x3f80_005b);
        std::fs::write(&path, value.to_le_bytes()).unwrap();
        assert_eq!(InputFormat::for_path(&path), InputFormat::Raw);
        assert_eq!(read_values(&path, InputFormat::Raw).unwrap(), vec![value]);
    }

    #[test]
    fn explicit_json_format_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gamma.txt");
        std::fs::write(&path, "[4.0]").unwrap();
        assert_eq!(read_values(&path, InputFormat::Json).unwrap(), vec![4.0]);
    }

    #[test]
    fn rejects_partial_raw_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conv.bin");
        std::fs::write(&path, [0u8; 5]).unwrap();
        assert!(read_values(&path, InputFormat::Raw).is_err());
    }

    #[test]
    fn pack_writes_fetchable_resource() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("beta.json");
        std::fs::write(&input, "[0.1, 0.2]").unwrap();
        let store_root = dir.path().join("store");
        let config = StoreConfig::default().with_root(&store_root);

        let cmd = PackCommand {
            name: "bn_0_beta".into(),
            input,
            format: None,
            width: 1,
            height: 1,
            input_depth: 1,
            output_depth: Some(2),
        };
        cmd.execute(&config).unwrap();

        let store = WeightStore::new(DirectorySource::new(&store_root));
        assert_eq!(store.fetch("bn_0_beta").unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn pack_validates_element_count() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("k.json");
        std::fs::write(&input, "[1, 2, 3]").unwrap();
        let config = StoreConfig::default().with_root(dir.path());

        let cmd = PackCommand {
            name: "conv_0".into(),
            input,
            format: None,
            width: 1,
            height: 1,
            input_depth: 2,
            output_depth: Some(2),
        };
        assert!(cmd.execute(&config).is_err());
    }
}
