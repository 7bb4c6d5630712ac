//! Drop-target resolution from element geometry.

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Box with its top-left corner at `(x, y)`.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.width.mul_add(0.5, self.x), self.height.mul_add(0.5, self.y))
    }

    fn center_distance(&self, other: &Self) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        (ax - bx).hypot(ay - by)
    }
}

/// Picks the droppable region a dragged element is over.
pub trait CollisionDetector {
    /// Id of the chosen region, or `None` when nothing qualifies.
    fn resolve(&self, dragged: &Rect) -> Option<&str>;
}

/// Chooses the region whose center is closest to the dragged element's center.
///
/// Ties go to the region registered first.
#[derive(Debug, Clone, Default)]
pub struct ClosestCenter {
    regions: Vec<(String, Rect)>,
}

impl ClosestCenter {
    /// Empty detector.
    #[must_use]
    pub const fn new() -> Self {
        Self { regions: Vec::new() }
    }

    /// Register a region, or move an already registered one without changing
    /// its tie-break position.
    pub fn register(&mut self, id: impl Into<String>, rect: Rect) {
        let id = id.into();
        if let Some(entry) = self.regions.iter_mut().find(|(held, _)| *held == id) {
            entry.1 = rect;
        } else {
            self.regions.push((id, rect));
        }
    }

    /// Forget a region. Returns whether it was registered.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.regions.len();
        self.regions.retain(|(held, _)| held != id);
        self.regions.len() != before
    }

    /// Number of registered regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl CollisionDetector for ClosestCenter {
    fn resolve(&self, dragged: &Rect) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (id, rect) in &self.regions {
            let distance = rect.center_distance(dragged);
            if distance.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, shortest)| distance < shortest) {
                best = Some((id.as_str(), distance));
            }
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ClosestCenter {
        let mut detector = ClosestCenter::new();
        detector.register("not-started", Rect::new(0.0, 0.0, 100.0, 400.0));
        detector.register("in-progress", Rect::new(100.0, 0.0, 100.0, 400.0));
        detector.register("done", Rect::new(200.0, 0.0, 100.0, 400.0));
        detector
    }

    #[test]
    fn picks_the_nearest_center() {
        let detector = columns();
        let card = Rect::new(130.0, 150.0, 60.0, 20.0);
        assert_eq!(detector.resolve(&card), Some("in-progress"));
    }

    #[test]
    fn ties_go_to_the_earliest_registration() {
        let detector = columns();
        // Centered exactly between the first two columns.
        let card = Rect::new(70.0, 190.0, 60.0, 20.0);
        assert_eq!(detector.resolve(&card), Some("not-started"));
    }

    #[test]
    fn reregistering_keeps_position_and_unregister_removes() {
        let mut detector = columns();
        detector.register("not-started", Rect::new(0.0, 0.0, 100.0, 400.0));
        assert_eq!(detector.len(), 3);

        assert!(detector.unregister("done"));
        assert!(!detector.unregister("done"));
        let far_right = Rect::new(400.0, 150.0, 60.0, 20.0);
        assert_eq!(detector.resolve(&far_right), Some("in-progress"));
    }

    #[test]
    fn nothing_registered_resolves_to_none() {
        assert_eq!(ClosestCenter::new().resolve(&Rect::new(0.0, 0.0, 1.0, 1.0)), None);
    }
}
