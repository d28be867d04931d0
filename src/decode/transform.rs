//! Mapping from model-input space back to the source image.
//!
//! Preprocessing may letterbox or crop the source image to fit the model
//! input. A [`RectTransform`] undoes that on each decoded rect.

use nalgebra::Vector2;

use crate::decode::rect::Rect;

/// Maps a normalized rect in model-input space to source-image space.
pub trait RectTransform {
    fn transform_rect(&self, rect: Rect) -> Rect;
}

impl<F> RectTransform for F
where
    F: Fn(Rect) -> Rect,
{
    fn transform_rect(&self, rect: Rect) -> Rect {
        self(rect)
    }
}

/// Transform that leaves rects unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl RectTransform for IdentityTransform {
    #[inline]
    fn transform_rect(&self, rect: Rect) -> Rect {
        rect
    }
}

/// How the source image was fitted into the model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectMode {
    /// Resized to the input size, ignoring aspect ratio.
    #[default]
    Stretch,
    /// Scaled to fit inside the input and padded (letterbox).
    ScaleToFit,
    /// Scaled to cover the input and center-cropped.
    AspectFill,
}

/// Aspect correction between a source image and the model input.
#[derive(Debug, Clone, Copy)]
pub struct ImageTransform {
    mode: AspectMode,
    /// Fraction of the input covered by image content, per axis.
    extent: Vector2<f32>,
}

impl ImageTransform {
    pub fn new(
        mode: AspectMode,
        image_size: (usize, usize),
        input_size: (usize, usize),
    ) -> Self {
        let image = Vector2::new(image_size.0 as f32, image_size.1 as f32);
        let input = Vector2::new(input_size.0 as f32, input_size.1 as f32);
        let ratio = input.component_div(&image);
        let extent = match mode {
            AspectMode::Stretch => Vector2::new(1.0, 1.0),
            AspectMode::ScaleToFit => image.component_div(&input) * ratio.min(),
            AspectMode::AspectFill => image.component_div(&input) * ratio.max(),
        };
        let extent = if extent.iter().all(|e| e.is_finite() && *e > 0.0) {
            extent
        } else {
            Vector2::new(1.0, 1.0)
        };
        Self { mode, extent }
    }

    #[inline]
    pub fn mode(&self) -> AspectMode {
        self.mode
    }
}

impl RectTransform for ImageTransform {
    fn transform_rect(&self, rect: Rect) -> Rect {
        if self.mode == AspectMode::Stretch {
            return rect;
        }
        // Content is centered, so the padding (or crop) is symmetric per axis
        // and the same mapping holds for either vertical origin.
        let pad = (Vector2::new(1.0, 1.0) - self.extent) * 0.5;
        Rect::new(
            (rect.x - pad.x) / self.extent.x,
            (rect.y - pad.y) / self.extent.y,
            rect.width / self.extent.x,
            rect.height / self.extent.y,
        )
    }
}
