//! Pretrained convolutional network weights
//!
//! Weights are stored as flat `f32` sequences in serialized tensor order and
//! served back as oriented matrices ready for inference:
//!
//! - [`store`] resolves names to versioned resources and decodes them
//! - [`reshape`] permutes flat kernels and vectors into row/column layout
//! - [`accessor`] ties both together behind [`PretrainedWeightsLoader`]
//!
//! ```no_run
//! use yolo_weights::{DirectorySource, MatrixBackend, PretrainedWeightsLoader, WeightStore, WeightsAccessor};
//!
//! let store = WeightStore::new(DirectorySource::new("weights"));
//! let loader = WeightsAccessor::new(store, MatrixBackend::RowMajor);
//! let kernel = loader.convolutional_layer_weights("conv_0", 3, 3, 3, 32)?;
//! assert_eq!(kernel.matrix.shape(), (32, 27));
//! # Ok::<(), yolo_weights::WeightsError>(())
//! ```

pub mod accessor;
pub mod reshape;
pub mod store;

pub use accessor::{OrientedWeights, PretrainedWeightsLoader, WeightsAccessor};
pub use reshape::{KernelShape, reshape_kernel, reshape_vector};
pub use store::{
    ByteSource, DirectorySource, EmbeddedSource, StoreWriter, WeightStore, resource_address,
};

pub use yolo_common::{
    BackendMatrix, FormatDescriptor, MatrixBackend, ParameterKind, Result, RowMajorMatrix,
    StoreConfig, WeightsError,
};
