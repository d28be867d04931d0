//! Distribution focal loss (DFL) decoding of box edges.
//!
//! Each box edge is predicted as a discrete distribution over
//! [`REG_BINS`] distances (in grid cells). The edge distance is the
//! expectation of that distribution.

/// Number of distribution bins per box edge.
pub const REG_BINS: usize = 8;

/// Width of the per-anchor displacement vector (4 edges x 8 bins).
pub const DISTRIBUTION_WIDTH: usize = 4 * REG_BINS;

/// Numerically stable softmax over one edge distribution.
#[inline]
pub fn softmax(logits: &[f32; REG_BINS]) -> [f32; REG_BINS] {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut out = [0.0f32; REG_BINS];
    let mut sum = 0.0f32;
    for (dst, &logit) in out.iter_mut().zip(logits) {
        let e = (logit - max).exp();
        *dst = e;
        sum += e;
    }
    let sum_inv = 1.0 / sum;
    for p in &mut out {
        *p *= sum_inv;
    }
    out
}

/// Expected distance, in grid cells, of one edge distribution.
#[inline]
pub fn decode_distance(logits: &[f32; REG_BINS]) -> f32 {
    softmax(logits)
        .iter()
        .enumerate()
        .map(|(d, p)| p * d as f32)
        .sum()
}

/// Decode the four edge distances (left, top, right, bottom) of one anchor.
pub fn decode_edges(distribution: &[f32; DISTRIBUTION_WIDTH]) -> [f32; 4] {
    let mut edges = [0.0f32; 4];
    for (s, edge) in edges.iter_mut().enumerate() {
        let mut bins = [0.0f32; REG_BINS];
        bins.copy_from_slice(&distribution[s * REG_BINS..(s + 1) * REG_BINS]);
        *edge = decode_distance(&bins);
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_distribution_is_midpoint() {
        for x in [0.0f32, 1.0, -3.25, 42.0] {
            assert_eq!(decode_distance(&[x; REG_BINS]), 3.5);
        }
    }

    #[test]
    fn test_peaked_distribution() {
        let mut logits = [0.0f32; REG_BINS];
        logits[5] = 50.0;
        assert!((decode_distance(&logits) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_softmax_large_inputs_stay_finite() {
        let probs = softmax(&[1000.0, 999.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_decode_edges_uses_separate_slices() {
        let mut distribution = [0.0f32; DISTRIBUTION_WIDTH];
        distribution[REG_BINS] = 50.0; // top edge -> 0
        distribution[2 * REG_BINS + 7] = 50.0; // right edge -> 7
        let edges = decode_edges(&distribution);
        assert_eq!(edges[0], 3.5);
        assert!(edges[1].abs() < 1e-4);
        assert!((edges[2] - 7.0).abs() < 1e-4);
        assert_eq!(edges[3], 3.5);
    }
}
