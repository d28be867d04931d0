//! Integration module for connecting inference backends and renderers with the decoder.
//!
//! This module provides traits and utilities for running the decoder
//! between an inference runtime (Burn, ONNX Runtime, etc.) and whatever
//! consumes the detections.

mod builder;
mod detector;
mod pipeline;

pub use builder::PredictorBuilder;
pub use detector::{DetectionSink, InferenceBackend, TracingSink};
pub use pipeline::{DetectionPipeline, PipelineError};

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BurnBackend, BurnBackendError, BurnModel};
