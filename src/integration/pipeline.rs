//! DetectionPipeline for combining inference, decoding and rendering.

use ndarray::ArrayView4;
use thiserror::Error;

use crate::decode::{Detection, NanoDetPredictor, RectTransform};
use crate::error::NanoDetError;

use super::{DetectionSink, InferenceBackend};

/// Error raised by one stage of a [`DetectionPipeline`].
#[derive(Debug, Error)]
pub enum PipelineError<B, S> {
    #[error("inference failed: {0}")]
    Inference(B),
    #[error(transparent)]
    Decode(#[from] NanoDetError),
    #[error("rendering failed: {0}")]
    Render(S),
}

/// Bundles an inference backend, the decoder and a detection sink.
pub struct DetectionPipeline<B: InferenceBackend, S: DetectionSink> {
    backend: B,
    predictor: NanoDetPredictor,
    sink: S,
}

impl<B: InferenceBackend, S: DetectionSink> DetectionPipeline<B, S> {
    /// Create a new pipeline.
    ///
    /// Fails if the backend's input size differs from the predictor's.
    pub fn new(backend: B, predictor: NanoDetPredictor, sink: S) -> Result<Self, NanoDetError> {
        if backend.input_size() != predictor.input_size() {
            return Err(NanoDetError::Configuration(format!(
                "backend input size {:?} does not match predictor input size {:?}",
                backend.input_size(),
                predictor.input_size()
            )));
        }
        Ok(Self {
            backend,
            predictor,
            sink,
        })
    }

    /// Process a single frame.
    ///
    /// Runs inference on the preprocessed input, decodes the head outputs,
    /// hands the detections to the sink and returns them.
    ///
    /// # Arguments
    /// * `input` - Preprocessed `[1, C, H, W]` image tensor
    /// * `transform` - Mapping back to the source image, if preprocessing padded or cropped it
    pub fn process_frame(
        &mut self,
        input: ArrayView4<'_, f32>,
        transform: Option<&dyn RectTransform>,
    ) -> Result<Vec<Detection>, PipelineError<B::Error, S::Error>> {
        let outputs = self
            .backend
            .infer(input)
            .map_err(PipelineError::Inference)?;
        let detections = self.predictor.predict(&outputs, transform)?;
        self.sink
            .render(&detections)
            .map_err(PipelineError::Render)?;
        Ok(detections)
    }

    /// Get a reference to the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get a mutable reference to the underlying backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Get a reference to the decoder.
    pub fn predictor(&self) -> &NanoDetPredictor {
        &self.predictor
    }

    /// Get a reference to the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get a mutable reference to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{AspectMode, ImageTransform, PredictorConfig};
    use ndarray::{Array3, Array4};

    struct MockBackend {
        outputs: Vec<Array3<f32>>,
    }

    impl InferenceBackend for MockBackend {
        type Error = &'static str;

        fn input_size(&self) -> (usize, usize) {
            (64, 64)
        }

        fn infer(&mut self, input: ArrayView4<'_, f32>) -> Result<Vec<Array3<f32>>, Self::Error> {
            if input.dim() != (1, 3, 64, 64) {
                return Err("bad input");
            }
            Ok(self.outputs.clone())
        }
    }

    fn predictor() -> NanoDetPredictor {
        let config = PredictorConfig {
            input_width: 64,
            input_height: 64,
            ..Default::default()
        };
        NanoDetPredictor::new(config, vec!["person".into(), "car".into()]).unwrap()
    }

    fn outputs_with_hit(predictor: &NanoDetPredictor) -> Vec<Array3<f32>> {
        let mut outputs: Vec<Array3<f32>> = predictor
            .expected_shapes()
            .into_iter()
            .map(|[a, b, c]| Array3::zeros((a, b, c)))
            .collect();
        // stride 16 head, anchor 5 -> column 1, row 1
        outputs[1][[0, 5, 1]] = 0.8;
        outputs
    }

    #[test]
    fn test_detection_pipeline() {
        let p = predictor();
        let backend = MockBackend {
            outputs: outputs_with_hit(&p),
        };
        let mut pipeline = DetectionPipeline::new(backend, p, Vec::new()).unwrap();

        let input = Array4::<f32>::zeros((1, 3, 64, 64));
        let detections = pipeline.process_frame(input.view(), None).unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, "car");
        assert_eq!(pipeline.sink().as_slice(), detections.as_slice());
    }

    #[test]
    fn test_transform_is_forwarded() {
        let p = predictor();
        let backend = MockBackend {
            outputs: outputs_with_hit(&p),
        };
        let mut pipeline = DetectionPipeline::new(backend, p, Vec::new()).unwrap();
        let input = Array4::<f32>::zeros((1, 3, 64, 64));

        let plain = pipeline.process_frame(input.view(), None).unwrap();
        let letterbox = ImageTransform::new(AspectMode::ScaleToFit, (128, 64), (64, 64));
        let mapped = pipeline
            .process_frame(input.view(), Some(&letterbox))
            .unwrap();
        assert!((mapped[0].rect.height - plain[0].rect.height * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_inference_error_propagates() {
        let p = predictor();
        let backend = MockBackend { outputs: vec![] };
        let mut pipeline = DetectionPipeline::new(backend, p, Vec::new()).unwrap();
        let input = Array4::<f32>::zeros((1, 3, 32, 32));
        let err = pipeline.process_frame(input.view(), None).unwrap_err();
        assert!(matches!(err, PipelineError::Inference("bad input")));
    }

    #[test]
    fn test_decode_error_propagates() {
        let p = predictor();
        let backend = MockBackend { outputs: vec![] };
        let mut pipeline = DetectionPipeline::new(backend, p, Vec::new()).unwrap();
        let input = Array4::<f32>::zeros((1, 3, 64, 64));
        let err = pipeline.process_frame(input.view(), None).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(NanoDetError::InvalidInput(_))));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let backend = MockBackend { outputs: vec![] };
        let predictor =
            NanoDetPredictor::new(PredictorConfig::default(), vec!["person".into()]).unwrap();
        assert!(DetectionPipeline::new(backend, predictor, Vec::new()).is_err());
    }
}
