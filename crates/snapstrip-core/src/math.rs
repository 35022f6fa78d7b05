use serde::{Deserialize, Serialize};

/// A 2D size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size2D {
    pub width: f64,
    pub height: f64,
}

impl Size2D {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Compute the aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0.0 {
            return 0.0;
        }
        self.width / self.height
    }
}

/// An axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size2D {
        Size2D::new(self.width, self.height)
    }

    /// Translate by the origin of `parent`.
    pub fn offset(&self, parent: &Rect) -> Rect {
        Rect::new(self.x + parent.x, self.y + parent.y, self.width, self.height)
    }

    /// Scale every component by `factor`.
    pub fn scale(&self, factor: f64) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Shrink by `amount` on every side (never below zero size).
    pub fn inset(&self, amount: f64) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// Overlap of two rectangles, or `None` if they are disjoint.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Point-in-rect test honoring a corner radius.
    pub fn contains_rounded(&self, px: f64, py: f64, radius: f64) -> bool {
        if px < self.x || py < self.y || px >= self.right() || py >= self.bottom() {
            return false;
        }
        let r = radius.min(self.width / 2.0).min(self.height / 2.0);
        if r <= 0.0 {
            return true;
        }
        let cx = px.clamp(self.x + r, self.right() - r);
        let cy = py.clamp(self.y + r, self.bottom() - r);
        let (dx, dy) = (px - cx, py - cy);
        dx * dx + dy * dy <= r * r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_zero_height() {
        assert_eq!(Size2D::new(640.0, 0.0).aspect_ratio(), 0.0);
        assert!((Size2D::new(640.0, 480.0).aspect_ratio() - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersect(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert_eq!(a.intersect(&Rect::new(20.0, 0.0, 1.0, 1.0)), None);
    }

    #[test]
    fn test_rect_inset_and_scale() {
        let r = Rect::new(0.0, 0.0, 185.0, 230.0).inset(6.0);
        assert_eq!(r, Rect::new(6.0, 6.0, 173.0, 218.0));
        assert_eq!(Rect::sized(10.0, 20.0).scale(2.0), Rect::sized(20.0, 40.0));
    }

    #[test]
    fn test_contains_rounded() {
        let r = Rect::sized(10.0, 10.0);
        assert!(r.contains_rounded(0.1, 0.1, 0.0));
        assert!(!r.contains_rounded(0.1, 0.1, 4.0));
        assert!(r.contains_rounded(5.0, 5.0, 4.0));
    }
}
