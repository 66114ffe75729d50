//! Numeric backends for matrices handed back to callers

use crate::config::BackendKind;
use crate::{Result, RowMajorMatrix};
use candle_core::{Device, Tensor as CandleTensor};

/// Factory for the caller-visible matrix representation.
///
/// Reshaping always happens on [`RowMajorMatrix`]; the backend only decides
/// what the finished matrix is converted into.
#[derive(Debug, Clone, Default)]
pub enum MatrixBackend {
    #[default]
    RowMajor,
    Candle(Device),
}

impl MatrixBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::RowMajor => BackendKind::RowMajor,
            Self::Candle(_) => BackendKind::Candle,
        }
    }

    /// Build a matrix from a row-major buffer.
    pub fn create(&self, matrix: RowMajorMatrix) -> Result<BackendMatrix> {
        match self {
            Self::RowMajor => Ok(BackendMatrix::RowMajor(matrix)),
            Self::Candle(device) => {
                let (rows, cols) = (matrix.rows(), matrix.cols());
                let tensor = CandleTensor::from_vec(matrix.into_vec(), (rows, cols), device)?;
                Ok(BackendMatrix::Candle(tensor))
            }
        }
    }
}

impl From<BackendKind> for MatrixBackend {
    fn from(kind: BackendKind) -> Self {
        match kind {
            BackendKind::RowMajor => Self::RowMajor,
            BackendKind::Candle => Self::Candle(Device::Cpu),
        }
    }
}

/// A 2D matrix in the configured backend.
#[derive(Debug, Clone)]
pub enum BackendMatrix {
    RowMajor(RowMajorMatrix),
    Candle(CandleTensor),
}

impl BackendMatrix {
    pub fn rows(&self) -> usize {
        match self {
            Self::RowMajor(m) => m.rows(),
            Self::Candle(t) => t.dims().first().copied().unwrap_or(0),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            Self::RowMajor(m) => m.cols(),
            Self::Candle(t) => t.dims().get(1).copied().unwrap_or(0),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Copy the contents out in row-major order.
    pub fn to_row_major(&self) -> Result<RowMajorMatrix> {
        match self {
            Self::RowMajor(m) => Ok(m.clone()),
            Self::Candle(t) => {
                let (rows, cols) = t.dims2()?;
                let data = t.flatten_all()?.to_vec1::<f32>()?;
                RowMajorMatrix::from_vec(rows, cols, data)
            }
        }
    }

    pub fn as_row_major(&self) -> Option<&RowMajorMatrix> {
        match self {
            Self::RowMajor(m) => Some(m),
            Self::Candle(_) => None,
        }
    }

    pub fn as_candle(&self) -> Option<&CandleTensor> {
        match self {
            Self::Candle(t) => Some(t),
            Self::RowMajor(_) => None,
        }
    }

    pub fn into_candle(self, device: &Device) -> Result<CandleTensor> {
        match self {
            Self::Candle(t) => Ok(t.to_device(device)?),
            Self::RowMajor(m) => {
                let (rows, cols) = (m.rows(), m.cols());
                Ok(CandleTensor::from_vec(m.into_vec(), (rows, cols), device)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RowMajorMatrix {
        RowMajorMatrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn row_major_backend_is_passthrough() {
        let m = MatrixBackend::RowMajor.create(sample()).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.as_row_major(), Some(&sample()));
    }

    #[test]
    fn candle_backend_preserves_row_major_order() {
        let m = MatrixBackend::Candle(Device::Cpu).create(sample()).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert!(m.as_candle().is_some());
        assert_eq!(m.to_row_major().unwrap(), sample());
    }

    #[test]
    fn into_candle_from_either_variant() {
        let from_row_major = MatrixBackend::RowMajor.create(sample()).unwrap();
        let t = from_row_major.into_candle(&Device::Cpu).unwrap();
        assert_eq!(t.dims(), &[2, 3]);
        assert_eq!(t.to_vec2::<f32>().unwrap()[1], vec![4.0, 5.0, 6.0]);

        let from_candle = MatrixBackend::Candle(Device::Cpu).create(sample()).unwrap();
        let t = from_candle.into_candle(&Device::Cpu).unwrap();
        assert_eq!(t.flatten_all().unwrap().to_vec1::<f32>().unwrap(), sample().into_vec());
    }

    #[test]
    fn backend_from_kind() {
        assert_eq!(MatrixBackend::from(BackendKind::Candle).kind(), BackendKind::Candle);
        assert_eq!(MatrixBackend::default().kind(), BackendKind::RowMajor);
    }
}
