//! Greedy non-maximum suppression.

use crate::decode::rect::Rect;

/// Indices of `scores` sorted by descending score.
///
/// The sort is stable, so equal scores keep their original order.
fn order_by_score_desc(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// Apply greedy non-maximum suppression.
///
/// Repeatedly keeps the highest-scoring remaining box and drops every
/// remaining box whose IoU with it exceeds `max_iou`. Returns the kept
/// indices in keep order (descending score).
pub fn non_max_suppression(boxes: &[Rect], scores: &[f32], max_iou: f32) -> Vec<usize> {
    debug_assert_eq!(boxes.len(), scores.len());
    let n = boxes.len().min(scores.len());
    let order = order_by_score_desc(&scores[..n]);

    let mut suppressed = vec![false; n];
    let mut keep = Vec::new();

    for (pos, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }
        keep.push(i);
        for &j in &order[pos + 1..] {
            if !suppressed[j] && boxes[i].iou(&boxes[j]) > max_iou {
                suppressed[j] = true;
            }
        }
    }

    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_boxes_collapse() {
        let rect = Rect::new(0.1, 0.1, 0.2, 0.2);
        let keep = non_max_suppression(&[rect, rect], &[0.6, 0.9], 0.5);
        assert_eq!(keep, vec![1]);
    }

    #[test]
    fn test_equal_scores_prefer_lower_index() {
        let rect = Rect::new(0.1, 0.1, 0.2, 0.2);
        let keep = non_max_suppression(&[rect, rect, rect], &[0.8, 0.8, 0.8], 0.5);
        assert_eq!(keep, vec![0]);
    }

    #[test]
    fn test_disjoint_boxes_sorted_by_score() {
        let boxes = [
            Rect::new(0.0, 0.0, 0.1, 0.1),
            Rect::new(0.5, 0.5, 0.1, 0.1),
            Rect::new(0.8, 0.0, 0.1, 0.1),
        ];
        let keep = non_max_suppression(&boxes, &[0.4, 0.9, 0.6], 0.5);
        assert_eq!(keep, vec![1, 2, 0]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // IoU of these two is exactly 1/3
        let a = Rect::new(0.0, 0.0, 2.0, 1.0);
        let b = Rect::new(1.0, 0.0, 2.0, 1.0);
        let iou = a.iou(&b);
        assert_eq!(non_max_suppression(&[a, b], &[0.9, 0.8], iou), vec![0, 1]);
        assert_eq!(non_max_suppression(&[a, b], &[0.9, 0.8], 0.3), vec![0]);
    }

    #[test]
    fn test_suppressed_box_does_not_suppress() {
        // b overlaps both a and c, a and c are disjoint
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(0.3, 0.0, 1.0, 1.0);
        let c = Rect::new(0.9, 0.0, 1.0, 1.0);
        let keep = non_max_suppression(&[a, b, c], &[0.9, 0.8, 0.7], 0.3);
        assert_eq!(keep, vec![0, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(non_max_suppression(&[], &[], 0.5).is_empty());
    }
}
