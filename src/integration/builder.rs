//! Builder for creating a NanoDetPredictor.

use crate::decode::{NanoDetPredictor, PredictorConfig, ScoreActivation};
use crate::error::Result;

/// Fluent builder for [`NanoDetPredictor`].
#[derive(Debug, Clone, Default)]
pub struct PredictorBuilder {
    config: PredictorConfig,
    labels: Vec<String>,
}

impl PredictorBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model input resolution in pixels.
    pub fn input_size(mut self, width: usize, height: usize) -> Self {
        self.config.input_width = width;
        self.config.input_height = height;
        self
    }

    /// Set the head strides, in model output order.
    pub fn strides(mut self, strides: impl IntoIterator<Item = usize>) -> Self {
        self.config.strides = strides.into_iter().collect();
        self
    }

    /// Set the minimum candidate score.
    pub fn min_score(mut self, min_score: f32) -> Self {
        self.config.min_score = min_score;
        self
    }

    /// Set the maximum IoU kept between two detections.
    pub fn max_iou(mut self, max_iou: f32) -> Self {
        self.config.max_iou = max_iou;
        self
    }

    pub fn score_activation(mut self, activation: ScoreActivation) -> Self {
        self.config.score_activation = activation;
        self
    }

    /// Set the label table, one entry per class channel.
    pub fn labels<I, L>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the configuration and build the predictor.
    pub fn build(self) -> Result<NanoDetPredictor> {
        NanoDetPredictor::new(self.config, self.labels)
    }
}
