//! Traits for the collaborators around the decoder.

use ndarray::{Array3, ArrayView4};
use tracing::info;

use crate::decode::Detection;

/// Trait for inference backends producing the raw NanoDet head outputs.
///
/// Implement this trait to connect any runtime to the decoder.
///
/// # Example
///
/// ```ignore
/// use nanodet_rs::InferenceBackend;
/// use ndarray::{Array3, ArrayView4};
///
/// struct MyRuntime {
///     // Your session here
/// }
///
/// impl InferenceBackend for MyRuntime {
///     type Error = std::io::Error;
///
///     fn input_size(&self) -> (usize, usize) {
///         (416, 416)
///     }
///
///     fn infer(&mut self, input: ArrayView4<'_, f32>) -> Result<Vec<Array3<f32>>, Self::Error> {
///         // Run the model and return its six outputs
///         Ok(vec![])
///     }
/// }
/// ```
pub trait InferenceBackend {
    /// Error type for inference failures.
    type Error;

    /// Model input (width, height) in pixels.
    fn input_size(&self) -> (usize, usize);

    /// Run the forward pass on a preprocessed `[1, C, H, W]` image tensor.
    ///
    /// # Returns
    /// The classification outputs of every stride followed by the
    /// displacement outputs of every stride, or an error.
    fn infer(&mut self, input: ArrayView4<'_, f32>) -> Result<Vec<Array3<f32>>, Self::Error>;
}

/// Trait for consumers of the final detection list, e.g. an overlay renderer.
pub trait DetectionSink {
    /// Error type for rendering failures.
    type Error;

    fn render(&mut self, detections: &[Detection]) -> Result<(), Self::Error>;
}

/// Keeps the detections of the most recent frame.
impl DetectionSink for Vec<Detection> {
    type Error = std::convert::Infallible;

    fn render(&mut self, detections: &[Detection]) -> Result<(), Self::Error> {
        self.clear();
        self.extend_from_slice(detections);
        Ok(())
    }
}

/// Sink that logs every detection through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DetectionSink for TracingSink {
    type Error = std::convert::Infallible;

    fn render(&mut self, detections: &[Detection]) -> Result<(), Self::Error> {
        for det in detections {
            let [x0, y0, x1, y1] = det.rect.to_min_max();
            info!(x0, y0, x1, y1, "{det}");
        }
        Ok(())
    }
}
