//! Burn inference backend for NanoDet models.
//!
//! This module provides a `BurnBackend` that implements `InferenceBackend`
//! for running NanoDet models built with the Burn framework.
//!
//! # Example
//!
//! ```ignore
//! use nanodet_rs::{BurnBackend, BurnModel};
//! use burn::backend::NdArray;
//!
//! // Implement BurnModel for your NanoDet network
//! struct MyNanoDet { /* ... */ }
//!
//! impl BurnModel<NdArray> for MyNanoDet {
//!     fn forward(&self, input: burn::tensor::Tensor<NdArray, 4>) -> Vec<burn::tensor::Tensor<NdArray, 3>> {
//!         // Run inference, returning the six head outputs
//!     }
//! }
//!
//! let model = MyNanoDet::load("nanodet.bin");
//! let backend = BurnBackend::new(model, Default::default());
//! ```

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use ndarray::{Array3, ArrayView4};
use thiserror::Error;
use tracing::debug;

use super::InferenceBackend;

/// Error type for Burn inference failures.
#[derive(Debug, Clone, Error)]
pub enum BurnBackendError {
    /// Input tensor does not match the model input.
    #[error("invalid input dimensions: expected {expected:?}, got {got:?}")]
    InvalidInputDimensions {
        expected: (usize, usize, usize),
        got: (usize, usize, usize, usize),
    },
    /// A model output could not be converted to an ndarray.
    #[error("output {index} could not be converted: {message}")]
    OutputConversion { index: usize, message: String },
}

/// Trait for Burn-based NanoDet models.
///
/// Implement this trait for your specific model architecture.
pub trait BurnModel<B: Backend>: Send + Sync {
    /// Run forward pass on the input tensor.
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape [1, channels, height, width]
    ///
    /// # Returns
    /// The classification heads followed by the displacement heads, each of
    /// shape [1, anchors, channels].
    fn forward(&self, input: Tensor<B, 4>) -> Vec<Tensor<B, 3>>;

    /// Get the expected input size (channels, height, width).
    fn input_size(&self) -> (usize, usize, usize) {
        (3, 416, 416) // NanoDet-m default resolution
    }
}

/// Burn-based backend implementing `InferenceBackend`.
pub struct BurnBackend<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
}

impl<B: Backend, M: BurnModel<B>> BurnBackend<B, M> {
    /// Create a new Burn backend with the given model and device.
    pub fn new(model: M, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Convert a preprocessed ndarray input to a Burn tensor.
    fn to_tensor(&self, input: ArrayView4<'_, f32>) -> Result<Tensor<B, 4>, BurnBackendError> {
        let (channels, height, width) = self.model.input_size();
        let (n, c, h, w) = input.dim();
        if n != 1 || c != channels || h != height || w != width {
            return Err(BurnBackendError::InvalidInputDimensions {
                expected: (channels, height, width),
                got: (n, c, h, w),
            });
        }

        // Logical (row-major) order regardless of the view's strides
        let values: Vec<f32> = input.iter().copied().collect();
        let data = TensorData::new(values, [n, c, h, w]);
        Ok(Tensor::<B, 4>::from_data(data, &self.device))
    }

    /// Convert one Burn output to an ndarray.
    fn to_array(index: usize, tensor: Tensor<B, 3>) -> Result<Array3<f32>, BurnBackendError> {
        let [a, b, c] = tensor.dims();
        let values = tensor
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| BurnBackendError::OutputConversion {
                index,
                message: format!("{e:?}"),
            })?;
        Array3::from_shape_vec((a, b, c), values).map_err(|e| BurnBackendError::OutputConversion {
            index,
            message: e.to_string(),
        })
    }
}

impl<B: Backend, M: BurnModel<B>> InferenceBackend for BurnBackend<B, M> {
    type Error = BurnBackendError;

    fn input_size(&self) -> (usize, usize) {
        let (_, height, width) = self.model.input_size();
        (width, height)
    }

    fn infer(&mut self, input: ArrayView4<'_, f32>) -> Result<Vec<Array3<f32>>, Self::Error> {
        let tensor = self.to_tensor(input)?;
        let outputs = self.model.forward(tensor);
        debug!(outputs = outputs.len(), "burn forward pass complete");
        outputs
            .into_iter()
            .enumerate()
            .map(|(index, tensor)| Self::to_array(index, tensor))
            .collect()
    }
}
