/// Axis-aligned rectangle in normalized image space.
///
/// Detections use a bottom-left origin: `(x, y)` is the minimum corner with
/// `y` growing upwards. [`Rect::flip_vertical`] converts to and from the
/// top-left convention used by most raster APIs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Minimum x coordinate
    pub x: f32,
    /// Minimum y coordinate
    pub y: f32,
    /// Width of the rectangle
    pub width: f32,
    /// Height of the rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from its minimum corner and dimensions.
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from its minimum and maximum corners.
    #[inline]
    pub fn from_min_max(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x: x_min,
            y: y_min,
            width: x_max - x_min,
            height: y_max - y_min,
        }
    }

    #[inline]
    pub fn x_max(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn y_max(&self) -> f32 {
        self.y + self.height
    }

    /// Convert to min/max format: (x_min, y_min, x_max, y_max).
    #[inline]
    pub fn to_min_max(&self) -> [f32; 4] {
        [self.x, self.y, self.x_max(), self.y_max()]
    }

    /// Get the center point of the rectangle.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Get the area of the rectangle.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Mirror the rectangle across the horizontal center line of the unit square.
    #[inline]
    pub fn flip_vertical(&self) -> Self {
        Self {
            x: self.x,
            y: 1.0 - self.y_max(),
            width: self.width,
            height: self.height,
        }
    }

    /// Scale a normalized rectangle to pixel units of an image.
    #[inline]
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> Self {
        let (w, h) = (image_width as f32, image_height as f32);
        Self {
            x: self.x * w,
            y: self.y * h,
            width: self.width * w,
            height: self.height * h,
        }
    }

    /// Calculate Intersection over Union (IoU) with another rectangle.
    ///
    /// Returns 0 when the union is empty, so zero-area boxes never overlap.
    pub fn iou(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.x_max().min(other.x_max());
        let y2 = self.y_max().min(other.y_max());

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }
}
