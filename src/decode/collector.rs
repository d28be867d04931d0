//! Candidate collection across the stride heads.

use ndarray::{ArrayView1, ArrayView2};

use crate::decode::anchors::AnchorPoint;
use crate::decode::assembler::assemble_box;
use crate::decode::dfl::{DISTRIBUTION_WIDTH, decode_edges};
use crate::decode::rect::Rect;
use crate::decode::transform::RectTransform;
use crate::error::{InvalidInput, Result};

/// Activation applied to classification outputs before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreActivation {
    /// Outputs are already probabilities.
    #[default]
    Identity,
    /// Outputs are raw logits; apply the logistic function.
    Sigmoid,
}

impl ScoreActivation {
    #[inline]
    pub fn apply(self, value: f32) -> f32 {
        match self {
            ScoreActivation::Identity => value,
            ScoreActivation::Sigmoid => 1.0 / (1.0 + (-value).exp()),
        }
    }
}

/// Outputs of one detection head together with its anchors.
///
/// `logits` is `(anchors, classes)` and `displacements` is `(anchors, 32)`.
#[derive(Debug, Clone)]
pub struct StrideHead<'a> {
    pub stride: usize,
    pub logits: ArrayView2<'a, f32>,
    pub displacements: ArrayView2<'a, f32>,
    pub anchors: &'a [AnchorPoint],
}

/// Parallel candidate lists reused across predictions.
///
/// Cleared, not reallocated, at the start of each prediction. A buffer
/// must not be shared between concurrent predictions.
#[derive(Debug, Clone, Default)]
pub struct CandidateBuffer {
    boxes: Vec<Rect>,
    scores: Vec<f32>,
    labels: Vec<usize>,
}

impl CandidateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
        self.scores.clear();
        self.labels.clear();
    }

    pub fn push(&mut self, rect: Rect, score: f32, label: usize) {
        self.boxes.push(rect);
        self.scores.push(score);
        self.labels.push(label);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn boxes(&self) -> &[Rect] {
        &self.boxes
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Class indices into the label table.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Resolve the candidate labels through `table`.
    ///
    /// Yields `None` for labels outside the table.
    pub fn label_names<'a>(
        &'a self,
        table: &'a [String],
    ) -> impl Iterator<Item = Option<&'a str>> + 'a {
        self.labels
            .iter()
            .map(move |&label| table.get(label).map(String::as_str))
    }
}

/// Best class of one anchor. On exact ties the first class seen wins.
fn best_class(row: ArrayView1<'_, f32>, activation: ScoreActivation) -> Option<(usize, f32)> {
    let mut iter = row.iter().map(|&v| activation.apply(v)).enumerate();
    let (mut label, mut score) = iter.next()?;
    for (l, s) in iter {
        if s > score {
            label = l;
            score = s;
        }
    }
    Some((label, score))
}

impl StrideHead<'_> {
    /// Check that both views have one row per anchor and a full distribution row.
    fn check_shape(&self, head: usize) -> std::result::Result<(), InvalidInput> {
        let anchors = self.anchors.len();
        if self.logits.nrows() == anchors
            && self.displacements.nrows() == anchors
            && self.displacements.ncols() == DISTRIBUTION_WIDTH
        {
            return Ok(());
        }
        Err(InvalidInput::HeadShape {
            head,
            anchors,
            logits: [self.logits.nrows(), self.logits.ncols()],
            displacements: [self.displacements.nrows(), self.displacements.ncols()],
        })
    }
}

/// Collect every anchor whose best class scores at least `min_score`.
///
/// Candidates are appended in head order, then row-major anchor order.
/// `feature_size` is the model input (width, height) used for normalization.
///
/// Every head is checked before any is decoded; on a malformed head the
/// buffer is left untouched.
pub fn collect_candidates(
    heads: &[StrideHead<'_>],
    min_score: f32,
    activation: ScoreActivation,
    feature_size: (usize, usize),
    transform: Option<&dyn RectTransform>,
    buffer: &mut CandidateBuffer,
) -> Result<()> {
    for (k, head) in heads.iter().enumerate() {
        head.check_shape(k)?;
    }

    let (feature_width, feature_height) = feature_size;
    let mut distribution = [0.0f32; DISTRIBUTION_WIDTH];

    for head in heads {
        for (i, anchor) in head.anchors.iter().enumerate() {
            let Some((label, score)) = best_class(head.logits.row(i), activation) else {
                continue;
            };
            if score.is_nan() || score < min_score {
                continue;
            }

            for (dst, &src) in distribution.iter_mut().zip(head.displacements.row(i)) {
                *dst = src;
            }
            let edges = decode_edges(&distribution);
            let rect = assemble_box(
                anchor,
                head.stride,
                edges,
                feature_width,
                feature_height,
                transform,
            );
            buffer.push(rect, score, label);
        }
    }
    Ok(())
}
