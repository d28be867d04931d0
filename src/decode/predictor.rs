//! NanoDet predictor: validates head outputs and runs the decode pipeline.

use std::slice;

use ndarray::{ArrayBase, Axis, Data, Ix3};
use tracing::{debug, trace, warn};

use crate::decode::anchors::AnchorGrid;
use crate::decode::collector::{CandidateBuffer, ScoreActivation, StrideHead, collect_candidates};
use crate::decode::detection::Detection;
use crate::decode::dfl::DISTRIBUTION_WIDTH;
use crate::decode::nms::non_max_suppression;
use crate::decode::transform::RectTransform;
use crate::error::{InvalidInput, NanoDetError, Result};

/// Configuration for the NanoDetPredictor.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    pub input_width: usize,
    pub input_height: usize,
    /// Head strides, in the order the model emits them.
    pub strides: Vec<usize>,
    /// Minimum candidate score.
    pub min_score: f32,
    /// Maximum IoU between kept detections.
    pub max_iou: f32,
    pub score_activation: ScoreActivation,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            input_width: 416,
            input_height: 416,
            strides: vec![8, 16, 32],
            min_score: 0.35,
            max_iou: 0.5,
            score_activation: ScoreActivation::Identity,
        }
    }
}

impl PredictorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(NanoDetError::config(format!(
                "min_score must be in [0, 1], got {}",
                self.min_score
            )));
        }
        if !(0.0..=1.0).contains(&self.max_iou) {
            return Err(NanoDetError::config(format!(
                "max_iou must be in [0, 1], got {}",
                self.max_iou
            )));
        }
        if self.strides.is_empty() {
            return Err(NanoDetError::config("at least one stride is required"));
        }
        if self.strides.contains(&0) {
            return Err(NanoDetError::config("strides must be non-zero"));
        }
        Ok(())
    }
}

/// Decoder for the six-tensor NanoDet head.
///
/// Expects the classification outputs of every stride followed by the
/// displacement outputs of every stride, each shaped `[1, anchors, C]` and
/// `[1, anchors, 32]`. Anchor grids are built once at construction.
///
/// `predict` reuses an internal candidate buffer and therefore takes
/// `&mut self`; use one predictor per thread.
#[derive(Debug, Clone)]
pub struct NanoDetPredictor {
    config: PredictorConfig,
    labels: Vec<String>,
    anchor_grids: Vec<AnchorGrid>,
    candidates: CandidateBuffer,
}

impl NanoDetPredictor {
    pub fn new(config: PredictorConfig, labels: Vec<String>) -> Result<Self> {
        config.validate()?;
        if labels.is_empty() {
            return Err(NanoDetError::config("label table is empty"));
        }

        let anchor_grids: Vec<AnchorGrid> = config
            .strides
            .iter()
            .map(|&stride| AnchorGrid::new(config.input_width, config.input_height, stride))
            .collect();
        for grid in &anchor_grids {
            debug!(
                stride = grid.stride(),
                anchors = grid.len(),
                "generated anchor grid"
            );
        }

        Ok(Self {
            config,
            labels,
            anchor_grids,
            candidates: CandidateBuffer::new(),
        })
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Model input (width, height).
    pub fn input_size(&self) -> (usize, usize) {
        (self.config.input_width, self.config.input_height)
    }

    pub fn anchor_grids(&self) -> &[AnchorGrid] {
        &self.anchor_grids
    }

    /// Total anchors across all heads.
    pub fn anchor_count(&self) -> usize {
        self.anchor_grids.iter().map(AnchorGrid::len).sum()
    }

    /// Expected shape of every output tensor, in input order.
    pub fn expected_shapes(&self) -> Vec<[usize; 3]> {
        self.shapes().collect()
    }

    fn shapes(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let classes = self.labels.len();
        let logits = self.anchor_grids.iter().map(move |g| [1, g.len(), classes]);
        let displacements = self
            .anchor_grids
            .iter()
            .map(|g| [1, g.len(), DISTRIBUTION_WIDTH]);
        logits.chain(displacements)
    }

    fn validate_outputs<S>(&self, outputs: &[ArrayBase<S, Ix3>]) -> Result<()>
    where
        S: Data<Elem = f32>,
    {
        let expected = 2 * self.anchor_grids.len();
        if outputs.len() != expected {
            let err = InvalidInput::TensorCount {
                expected,
                got: outputs.len(),
            };
            warn!("{err}");
            return Err(err.into());
        }
        for (index, (tensor, shape)) in outputs.iter().zip(self.shapes()).enumerate() {
            if tensor.shape() != shape.as_slice() {
                let err = InvalidInput::TensorShape {
                    index,
                    expected: shape,
                    got: tensor.shape().to_vec(),
                };
                warn!("{err}");
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Decode the head outputs into de-duplicated detections.
    ///
    /// `transform` maps rects from model-input space to the source image,
    /// e.g. to undo letterboxing. Detections are returned by descending score.
    pub fn predict<S>(
        &mut self,
        outputs: &[ArrayBase<S, Ix3>],
        transform: Option<&dyn RectTransform>,
    ) -> Result<Vec<Detection>>
    where
        S: Data<Elem = f32>,
    {
        self.validate_outputs(outputs)?;

        let input_size = self.input_size();
        let num_heads = self.anchor_grids.len();
        self.candidates.clear();
        for (k, grid) in self.anchor_grids.iter().enumerate() {
            let head = StrideHead {
                stride: grid.stride(),
                logits: outputs[k].index_axis(Axis(0), 0),
                displacements: outputs[num_heads + k].index_axis(Axis(0), 0),
                anchors: grid.points(),
            };
            collect_candidates(
                slice::from_ref(&head),
                self.config.min_score,
                self.config.score_activation,
                input_size,
                transform,
                &mut self.candidates,
            )?;
        }

        let keep = non_max_suppression(
            self.candidates.boxes(),
            self.candidates.scores(),
            self.config.max_iou,
        );
        trace!(
            candidates = self.candidates.len(),
            kept = keep.len(),
            "decoded detections"
        );

        let detections = keep
            .into_iter()
            .map(|idx| Detection {
                rect: self.candidates.boxes()[idx],
                label: self.labels[self.candidates.labels()[idx]].clone(),
                score: self.candidates.scores()[idx],
            })
            .collect();
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("class{i}")).collect()
    }

    fn zero_outputs(predictor: &NanoDetPredictor) -> Vec<Array3<f32>> {
        predictor
            .expected_shapes()
            .into_iter()
            .map(|[a, b, c]| Array3::zeros((a, b, c)))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = PredictorConfig::default();
        assert_eq!(config.min_score, 0.35);
        assert_eq!(config.max_iou, 0.5);
        assert_eq!(config.strides, vec![8, 16, 32]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_thresholds() {
        for (min_score, max_iou) in [(1.5, 0.5), (-0.1, 0.5), (0.35, 1.01), (f32::NAN, 0.5)] {
            let config = PredictorConfig {
                min_score,
                max_iou,
                ..Default::default()
            };
            let err = NanoDetPredictor::new(config, labels(2)).unwrap_err();
            assert!(matches!(err, NanoDetError::Configuration(_)));
        }
    }

    #[test]
    fn test_rejects_empty_labels_and_strides() {
        let err = NanoDetPredictor::new(PredictorConfig::default(), vec![]).unwrap_err();
        assert!(matches!(err, NanoDetError::Configuration(_)));

        let config = PredictorConfig {
            strides: vec![8, 0],
            ..Default::default()
        };
        let err = NanoDetPredictor::new(config, labels(1)).unwrap_err();
        assert!(matches!(err, NanoDetError::Configuration(_)));
    }

    #[test]
    fn test_expected_shapes() {
        let predictor = NanoDetPredictor::new(PredictorConfig::default(), labels(80)).unwrap();
        assert_eq!(
            predictor.expected_shapes(),
            vec![
                [1, 2704, 80],
                [1, 676, 80],
                [1, 169, 80],
                [1, 2704, 32],
                [1, 676, 32],
                [1, 169, 32],
            ]
        );
        assert_eq!(predictor.anchor_count(), 3549);
    }

    #[test]
    fn test_all_zero_outputs_yield_nothing() {
        let mut predictor = NanoDetPredictor::new(PredictorConfig::default(), labels(4)).unwrap();
        let outputs = zero_outputs(&predictor);
        let detections = predictor.predict(&outputs, None).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn test_tiny_resolution_has_no_anchors() {
        let config = PredictorConfig {
            input_width: 4,
            input_height: 4,
            ..Default::default()
        };
        let mut predictor = NanoDetPredictor::new(config, labels(2)).unwrap();
        assert_eq!(predictor.anchor_count(), 0);
        let outputs = zero_outputs(&predictor);
        assert!(predictor.predict(&outputs, None).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_tensor_count() {
        let mut predictor = NanoDetPredictor::new(PredictorConfig::default(), labels(2)).unwrap();
        let mut outputs = zero_outputs(&predictor);
        outputs.pop();
        let err = predictor.predict(&outputs, None).unwrap_err();
        assert_eq!(
            err,
            NanoDetError::InvalidInput(InvalidInput::TensorCount {
                expected: 6,
                got: 5
            })
        );
    }

    #[test]
    fn test_wrong_tensor_shape() {
        let mut predictor = NanoDetPredictor::new(PredictorConfig::default(), labels(2)).unwrap();
        let mut outputs = zero_outputs(&predictor);
        outputs[4] = Array3::zeros((1, 676, 16));
        let err = predictor.predict(&outputs, None).unwrap_err();
        assert_eq!(
            err,
            NanoDetError::InvalidInput(InvalidInput::TensorShape {
                index: 4,
                expected: [1, 676, 32],
                got: vec![1, 676, 16],
            })
        );
    }

    #[test]
    fn test_expected_shapes_follow_strides() {
        let config = PredictorConfig {
            input_width: 64,
            input_height: 32,
            strides: vec![16],
            ..Default::default()
        };
        let predictor = NanoDetPredictor::new(config, labels(3)).unwrap();
        assert_eq!(predictor.expected_shapes(), vec![[1, 8, 3], [1, 8, 32]]);

        let mut predictor = predictor;
        let outputs = zero_outputs(&predictor);
        assert!(predictor.predict(&outputs[..1], None).is_err());
        assert!(predictor.predict(&outputs, None).unwrap().is_empty());
    }

    #[test]
    fn test_accepts_views() {
        let mut predictor = NanoDetPredictor::new(PredictorConfig::default(), labels(2)).unwrap();
        let outputs = zero_outputs(&predictor);
        let views: Vec<_> = outputs.iter().map(|a| a.view()).collect();
        assert!(predictor.predict(&views, None).unwrap().is_empty());
    }
}
