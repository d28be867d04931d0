use std::fmt;

use crate::decode::rect::Rect;

/// A detected object.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Normalized rect, bottom-left origin
    pub rect: Rect,
    /// Class label from the predictor's label table
    pub label: String,
    /// Detection score
    pub score: f32,
}

impl Detection {
    pub fn new(rect: Rect, label: impl Into<String>, score: f32) -> Self {
        Self {
            rect,
            label: label.into(),
            score,
        }
    }
}

/// Caption used when overlaying the detection, e.g. `person: 0.87`.
impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.2}", self.label, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption() {
        let det = Detection::new(Rect::default(), "person", 0.8712);
        assert_eq!(det.to_string(), "person: 0.87");
    }
}
