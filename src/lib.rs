//! Decoder for the NanoDet anchor-free detection head.
//!
//! Turns the raw classification and distribution (DFL) outputs of a NanoDet
//! model into a de-duplicated list of normalized detections: anchor
//! generation, per-anchor scoring, DFL edge decoding, coordinate mapping and
//! greedy non-maximum suppression. Model loading and inference stay outside
//! the crate, behind [`InferenceBackend`].

pub mod decode;
pub mod error;
pub mod integration;

pub use decode::{
    AnchorGrid, AnchorPoint, AspectMode, CandidateBuffer, Detection, IdentityTransform,
    ImageTransform, NanoDetPredictor, PredictorConfig, Rect, RectTransform, ScoreActivation,
    StrideHead,
};
pub use error::{InvalidInput, NanoDetError, Result};
pub use integration::{
    DetectionPipeline, DetectionSink, InferenceBackend, PipelineError, PredictorBuilder,
    TracingSink,
};

#[cfg(feature = "burn-backend")]
pub use integration::{BurnBackend, BurnBackendError, BurnModel};
