//! Box assembly from an anchor and its decoded edge distances.

use crate::decode::anchors::AnchorPoint;
use crate::decode::rect::Rect;
use crate::decode::transform::RectTransform;

/// Build the normalized rect for one anchor.
///
/// `distances` are the (left, top, right, bottom) edge distances in grid
/// cells. The result is normalized by the feature (model input) size with
/// the vertical axis flipped to a bottom-left origin, then passed through
/// `transform` when one is given. Rects are not clamped to the unit square.
pub fn assemble_box(
    anchor: &AnchorPoint,
    stride: usize,
    distances: [f32; 4],
    feature_width: usize,
    feature_height: usize,
    transform: Option<&dyn RectTransform>,
) -> Rect {
    let stride = stride as f32;
    let x1 = anchor.x - distances[0] * stride;
    let y1 = anchor.y - distances[1] * stride;
    let x2 = anchor.x + distances[2] * stride;
    let y2 = anchor.y + distances[3] * stride;

    let width_inv = 1.0 / feature_width as f32;
    let height_inv = 1.0 / feature_height as f32;
    let raw = Rect::from_min_max(
        x1 * width_inv,
        1.0 - y2 * height_inv,
        x2 * width_inv,
        1.0 - y1 * height_inv,
    );

    match transform {
        Some(transform) => transform.transform_rect(raw),
        None => raw,
    }
}
