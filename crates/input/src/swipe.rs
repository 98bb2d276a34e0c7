//! Pointer-to-swipe recognition.
//!
//! Only one pointer is tracked at a time; a pointer-down from a second pointer
//! replaces the first.

use match3_types::{Direction, Vec2, SWIPE_THRESHOLD};

/// A completed gesture in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub start: Vec2,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct SwipeRecognizer {
    threshold: f32,
    active: Option<(u64, Vec2)>,
}

impl Default for SwipeRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SwipeRecognizer {
    pub fn new() -> Self {
        Self::with_threshold(SWIPE_THRESHOLD)
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            active: None,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_tracking(&self) -> bool {
        self.active.is_some()
    }

    pub fn pointer_down(&mut self, pointer: u64, position: Vec2) {
        self.active = Some((pointer, position));
    }

    /// Finish the gesture for `pointer`.
    ///
    /// Returns `None` for an untracked pointer or a travel shorter than the
    /// threshold. Ties between the axes go to the vertical one.
    pub fn pointer_up(&mut self, pointer: u64, position: Vec2) -> Option<Swipe> {
        let (id, start) = self.active?;
        if id != pointer {
            return None;
        }
        self.active = None;

        let delta = position - start;
        if delta.length() < self.threshold {
            return None;
        }

        let direction = if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if delta.y > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };

        Some(Swipe { start, direction })
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_axis_wins() {
        let mut r = SwipeRecognizer::new();
        r.pointer_down(1, Vec2::new(0.0, 0.0));
        let swipe = r.pointer_up(1, Vec2::new(-0.5, 0.2)).unwrap();
        assert_eq!(swipe.direction, Direction::Left);
        assert_eq!(swipe.start, Vec2::new(0.0, 0.0));

        r.pointer_down(1, Vec2::new(1.0, 1.0));
        let swipe = r.pointer_up(1, Vec2::new(1.1, 0.4)).unwrap();
        assert_eq!(swipe.direction, Direction::Down);
    }

    #[test]
    fn test_tie_goes_vertical() {
        let mut r = SwipeRecognizer::new();
        r.pointer_down(0, Vec2::new(0.0, 0.0));
        assert_eq!(
            r.pointer_up(0, Vec2::new(0.3, 0.3)).map(|s| s.direction),
            Some(Direction::Up)
        );
    }

    #[test]
    fn test_short_travel_is_ignored() {
        let mut r = SwipeRecognizer::new();
        r.pointer_down(0, Vec2::new(0.0, 0.0));
        assert_eq!(r.pointer_up(0, Vec2::new(0.05, 0.05)), None);
        assert!(!r.is_tracking());
    }

    #[test]
    fn test_other_pointer_is_ignored() {
        let mut r = SwipeRecognizer::new();
        r.pointer_down(3, Vec2::new(0.0, 0.0));
        assert_eq!(r.pointer_up(4, Vec2::new(1.0, 0.0)), None);
        assert!(r.is_tracking());
        assert!(r.pointer_up(3, Vec2::new(1.0, 0.0)).is_some());
    }

    #[test]
    fn test_up_without_down() {
        let mut r = SwipeRecognizer::new();
        assert_eq!(r.pointer_up(0, Vec2::new(1.0, 0.0)), None);
    }
}
