//! Anchor point generation for the detection heads.

use nalgebra::Point2;

/// Anchor center in raw feature-grid pixel units.
pub type AnchorPoint = Point2<f32>;

/// Generate the anchor centers covering a `width` x `height` input at `stride`.
///
/// Anchors are enumerated row-major (rows outer, columns inner) so that
/// anchor `i` lines up with row `i` of the flattened head outputs.
/// Partial cells at the right and bottom edges are dropped.
pub fn generate_anchors(width: usize, height: usize, stride: usize) -> Vec<AnchorPoint> {
    if stride == 0 {
        return Vec::new();
    }
    let grid_width = width / stride;
    let grid_height = height / stride;
    let offset = 0.5 * (stride as f32 - 1.0);

    let mut anchors = Vec::with_capacity(grid_width * grid_height);
    for j in 0..grid_height {
        for i in 0..grid_width {
            let cx = (stride * i) as f32 + offset;
            let cy = (stride * j) as f32 + offset;
            anchors.push(Point2::new(cx, cy));
        }
    }
    anchors
}

/// Cached anchors for one stride level.
#[derive(Debug, Clone)]
pub struct AnchorGrid {
    stride: usize,
    anchors: Vec<AnchorPoint>,
}

impl AnchorGrid {
    pub fn new(width: usize, height: usize, stride: usize) -> Self {
        Self {
            stride,
            anchors: generate_anchors(width, height, stride),
        }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[AnchorPoint] {
        &self.anchors
    }
}
