//! Typed access to pretrained layer parameters.

use tracing::{debug, info};
use yolo_common::{
    BackendMatrix, ConfigError, FormatDescriptor, MatrixBackend, ParameterKind, Result,
    SourceKind, StoreConfig, WeightsError,
};

use crate::reshape::{KernelShape, reshape_kernel, reshape_vector};
use crate::store::{ByteSource, DirectorySource, EmbeddedSource, WeightStore};

/// A loaded parameter tensor with its layout metadata.
#[derive(Debug, Clone)]
pub struct OrientedWeights {
    pub matrix: BackendMatrix,
    pub format: FormatDescriptor,
    pub kind: ParameterKind,
}

impl OrientedWeights {
    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    pub fn cols(&self) -> usize {
        self.matrix.cols()
    }
}

/// The interface a network builder loads pretrained parameters through.
pub trait PretrainedWeightsLoader {
    fn convolutional_layer_weights(
        &self,
        name: &str,
        width: usize,
        height: usize,
        input_depth: usize,
        output_depth: usize,
    ) -> Result<OrientedWeights>;

    fn convolutional_layer_biases(&self, name: &str, output_depth: usize)
    -> Result<OrientedWeights>;

    fn batch_norm_gamma(&self, name: &str, output_depth: usize) -> Result<OrientedWeights>;

    fn batch_norm_beta(&self, name: &str, output_depth: usize) -> Result<OrientedWeights>;

    fn batch_norm_moving_mean(&self, name: &str, output_depth: usize) -> Result<OrientedWeights>;

    fn batch_norm_moving_variance(&self, name: &str, output_depth: usize)
    -> Result<OrientedWeights>;
}

/// Combines a [`WeightStore`] with the reshape transforms and a numeric backend.
#[derive(Debug, Clone)]
pub struct WeightsAccessor<S = DirectorySource> {
    store: WeightStore<S>,
    backend: MatrixBackend,
}

impl<S: ByteSource> WeightsAccessor<S> {
    pub fn new(store: WeightStore<S>, backend: MatrixBackend) -> Self {
        info!(
            "Weights accessor over {} (namespace {}, backend {})",
            store.source().describe(),
            store.namespace(),
            backend.kind()
        );
        Self { store, backend }
    }

    pub fn store(&self) -> &WeightStore<S> {
        &self.store
    }

    pub fn backend(&self) -> &MatrixBackend {
        &self.backend
    }

    /// Load and reorient a convolution kernel.
    pub fn kernel(&self, name: &str, shape: KernelShape) -> Result<OrientedWeights> {
        let flat = self.store.fetch(name)?;
        let (matrix, format) = reshape_kernel(flat, shape)?;
        debug!("Loaded kernel {} as {}x{}", name, matrix.rows(), matrix.cols());
        Ok(OrientedWeights {
            matrix: self.backend.create(matrix)?,
            format: FormatDescriptor::Kernel(format),
            kind: ParameterKind::ConvolutionKernel,
        })
    }

    /// Load a per-channel column vector tagged as `kind`.
    pub fn vector(
        &self,
        name: &str,
        kind: ParameterKind,
        output_depth: usize,
    ) -> Result<OrientedWeights> {
        let unsupported = || WeightsError::UnsupportedKind { kind, operation: "vector load" };
        if !kind.is_vector() {
            return Err(unsupported());
        }
        let format = kind.vector_format().ok_or_else(unsupported)?;
        let flat = self.store.fetch(name)?;
        let matrix = reshape_vector(flat, output_depth)?;
        debug!("Loaded {} {} ({} channels)", kind, name, output_depth);
        Ok(OrientedWeights { matrix: self.backend.create(matrix)?, format, kind })
    }
}

impl WeightsAccessor<Box<dyn ByteSource>> {
    /// Build an accessor from configuration.
    ///
    /// The embedded source has no resources of its own; use
    /// [`WeightsAccessor::from_config_with`] to supply them.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::from_config_with(config, None)
    }

    pub fn from_config_with(config: &StoreConfig, embedded: Option<EmbeddedSource>) -> Result<Self> {
        config.validate()?;
        let source: Box<dyn ByteSource> = match config.source {
            SourceKind::Directory => {
                let root = config.root.clone().ok_or_else(|| {
                    ConfigError::Validation("directory source requires a root".into())
                })?;
                Box::new(DirectorySource::new(root))
            }
            SourceKind::Embedded => Box::new(embedded.ok_or_else(|| {
                ConfigError::Validation("embedded source selected but no resources supplied".into())
            })?),
        };
        let store = WeightStore::with_namespace(source, config.namespace.clone());
        Ok(Self::new(store, MatrixBackend::from(config.backend)))
    }
}

impl<S: ByteSource> PretrainedWeightsLoader for WeightsAccessor<S> {
    fn convolutional_layer_weights(
        &self,
        name: &str,
        width: usize,
        height: usize,
        input_depth: usize,
        output_depth: usize,
    ) -> Result<OrientedWeights> {
        self.kernel(name, KernelShape::new(width, height, input_depth, output_depth))
    }

    fn convolutional_layer_biases(
        &self,
        name: &str,
        output_depth: usize,
    ) -> Result<OrientedWeights> {
        self.vector(name, ParameterKind::ConvolutionBias, output_depth)
    }

    fn batch_norm_gamma(&self, name: &str, output_depth: usize) -> Result<OrientedWeights> {
        self.vector(name, ParameterKind::BatchNormGamma, output_depth)
    }

    fn batch_norm_beta(&self, name: &str, output_depth: usize) -> Result<OrientedWeights> {
        self.vector(name, ParameterKind::BatchNormBeta, output_depth)
    }

    fn batch_norm_moving_mean(&self, name: &str, output_depth: usize) -> Result<OrientedWeights> {
        self.vector(name, ParameterKind::BatchNormMovingMean, output_depth)
    }

    fn batch_norm_moving_variance(
        &self,
        name: &str,
        output_depth: usize,
    ) -> Result<OrientedWeights> {
        self.vector(name, ParameterKind::BatchNormMovingVariance, output_depth)
    }
}
