mod anchors;
mod assembler;
mod collector;
mod detection;
mod dfl;
mod nms;
mod predictor;
mod rect;
mod transform;

pub use anchors::{AnchorGrid, AnchorPoint, generate_anchors};
pub use assembler::assemble_box;
pub use collector::{CandidateBuffer, ScoreActivation, StrideHead, collect_candidates};
pub use detection::Detection;
pub use dfl::{DISTRIBUTION_WIDTH, REG_BINS, decode_distance, decode_edges, softmax};
pub use nms::non_max_suppression;
pub use predictor::{NanoDetPredictor, PredictorConfig};
pub use rect::Rect;
pub use transform::{AspectMode, IdentityTransform, ImageTransform, RectTransform};
