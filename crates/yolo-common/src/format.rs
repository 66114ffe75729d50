//! Format descriptors attached to loaded parameter tensors.
//!
//! A descriptor records which logical tensor axes span the rows and columns of
//! a loaded matrix, and in what nesting order (slowest-varying first).

use serde::{Deserialize, Serialize};

/// Logical tensor axis of a convolutional layer parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    OutputDepth,
    InputDepth,
    FilterHeight,
    FilterWidth,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutputDepth => write!(f, "output_depth"),
            Self::InputDepth => write!(f, "input_depth"),
            Self::FilterHeight => write!(f, "filter_height"),
            Self::FilterWidth => write!(f, "filter_width"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightsOrientation {
    RowsSpanOutputDimensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorOrientation {
    ColumnVector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionScope {
    Input,
    Output,
}

/// Layout of a convolution kernel matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelFormat {
    pub row_dimensions: Vec<Dimension>,
    pub column_dimensions: Vec<Dimension>,
    pub orientation: WeightsOrientation,
}

impl KernelFormat {
    /// Rows span output depth; columns nest input depth, filter height, filter width.
    pub fn spatial() -> Self {
        Self {
            row_dimensions: vec![Dimension::OutputDepth],
            column_dimensions: vec![
                Dimension::InputDepth,
                Dimension::FilterHeight,
                Dimension::FilterWidth,
            ],
            orientation: WeightsOrientation::RowsSpanOutputDimensions,
        }
    }

    /// 1x1 kernels collapse the column dimensions to input depth alone.
    pub fn pointwise() -> Self {
        Self {
            row_dimensions: vec![Dimension::OutputDepth],
            column_dimensions: vec![Dimension::InputDepth],
            orientation: WeightsOrientation::RowsSpanOutputDimensions,
        }
    }
}

/// Layout of a per-channel feature vector (gamma, moving mean, moving variance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorFormat {
    pub dimensions: Vec<Dimension>,
    pub orientation: VectorOrientation,
    pub scope: DimensionScope,
}

impl Default for VectorFormat {
    fn default() -> Self {
        Self {
            dimensions: vec![Dimension::OutputDepth],
            orientation: VectorOrientation::ColumnVector,
            scope: DimensionScope::Output,
        }
    }
}

/// Layout of a bias vector (convolution bias, batch-norm beta).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasFormat {
    pub dimension: Dimension,
    pub orientation: VectorOrientation,
}

impl Default for BiasFormat {
    fn default() -> Self {
        Self { dimension: Dimension::OutputDepth, orientation: VectorOrientation::ColumnVector }
    }
}

/// Metadata describing the axis-to-row/column mapping of a loaded tensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormatDescriptor {
    Kernel(KernelFormat),
    Vector(VectorFormat),
    Bias(BiasFormat),
}

impl FormatDescriptor {
    /// Dimensions spanning the matrix rows, slowest first.
    pub fn row_dimensions(&self) -> Vec<Dimension> {
        match self {
            Self::Kernel(k) => k.row_dimensions.clone(),
            Self::Vector(v) => v.dimensions.clone(),
            Self::Bias(b) => vec![b.dimension],
        }
    }

    /// Dimensions spanning the matrix columns, slowest first. Column vectors have none.
    pub fn column_dimensions(&self) -> Vec<Dimension> {
        match self {
            Self::Kernel(k) => k.column_dimensions.clone(),
            Self::Vector(_) | Self::Bias(_) => Vec::new(),
        }
    }
}

/// Kind of learned parameter a loaded tensor represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    ConvolutionKernel,
    ConvolutionBias,
    BatchNormGamma,
    BatchNormBeta,
    BatchNormMovingMean,
    BatchNormMovingVariance,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 6] = [
        Self::ConvolutionKernel,
        Self::ConvolutionBias,
        Self::BatchNormGamma,
        Self::BatchNormBeta,
        Self::BatchNormMovingMean,
        Self::BatchNormMovingVariance,
    ];

    /// Whether this kind is a per-channel column vector.
    pub fn is_vector(self) -> bool {
        !matches!(self, Self::ConvolutionKernel)
    }

    /// Descriptor for vector-shaped kinds; `None` for kernels, whose format depends on shape.
    pub fn vector_format(self) -> Option<FormatDescriptor> {
        match self {
            Self::ConvolutionKernel => None,
            Self::ConvolutionBias | Self::BatchNormBeta => {
                Some(FormatDescriptor::Bias(BiasFormat::default()))
            }
            Self::BatchNormGamma | Self::BatchNormMovingMean | Self::BatchNormMovingVariance => {
                Some(FormatDescriptor::Vector(VectorFormat::default()))
            }
        }
    }
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ConvolutionKernel => "kernel",
            Self::ConvolutionBias => "bias",
            Self::BatchNormGamma => "gamma",
            Self::BatchNormBeta => "beta",
            Self::BatchNormMovingMean => "moving-mean",
            Self::BatchNormMovingVariance => "moving-variance",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ParameterKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kernel" | "weights" => Ok(Self::ConvolutionKernel),
            "bias" | "biases" => Ok(Self::ConvolutionBias),
            "gamma" => Ok(Self::BatchNormGamma),
            "beta" => Ok(Self::BatchNormBeta),
            "moving-mean" | "mean" => Ok(Self::BatchNormMovingMean),
            "moving-variance" | "variance" => Ok(Self::BatchNormMovingVariance),
            other => Err(format!("unknown parameter kind: {other}")),
        }
    }
}
