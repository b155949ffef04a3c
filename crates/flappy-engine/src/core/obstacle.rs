use super::rect::Rect;

/// Which half of a gate an obstacle forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ObstacleHalf {
    Top,
    Bottom,
}

/// One solid half of a gate.
///
/// Obstacles are never destroyed: the track scrolls them left with
/// [`Obstacle::advance`] and moves them back to the right edge once
/// [`Obstacle::is_off_screen`] reports that they have fully left the field.
///
/// # Example
///
/// ```
/// use flappy_engine::{Obstacle, ObstacleHalf};
///
/// let mut obstacle = Obstacle::new(ObstacleHalf::Top, 240.0, -48.0, 20.0, 80.0);
/// obstacle.advance(1.0);
/// assert!((obstacle.x() - 239.0).abs() < f32::EPSILON);
/// assert!(!obstacle.is_off_screen());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    half: ObstacleHalf,
    collider: Rect,
}

impl Obstacle {
    #[must_use]
    pub const fn new(half: ObstacleHalf, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            half,
            collider: Rect::new(x, y, width, height),
        }
    }

    #[must_use]
    pub const fn half(&self) -> ObstacleHalf {
        self.half
    }

    #[must_use]
    pub const fn x(&self) -> f32 {
        self.collider.x
    }

    #[must_use]
    pub const fn y(&self) -> f32 {
        self.collider.y
    }

    #[must_use]
    pub const fn width(&self) -> f32 {
        self.collider.width
    }

    #[must_use]
    pub const fn height(&self) -> f32 {
        self.collider.height
    }

    #[must_use]
    pub const fn collider(&self) -> &Rect {
        &self.collider
    }

    /// Scrolls the obstacle `dx` units to the left.
    pub fn advance(&mut self, dx: f32) {
        self.collider.x -= dx;
    }

    /// Returns `true` once the right edge has passed the left field border.
    #[must_use]
    pub fn is_off_screen(&self) -> bool {
        self.collider.right() < 0.0
    }

    pub fn reset_position(&mut self, origin: f32) {
        self.collider.x = origin;
    }

    pub fn set_vertical_offset(&mut self, y: f32) {
        self.collider.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_screen_requires_full_exit() {
        let mut obstacle = Obstacle::new(ObstacleHalf::Bottom, 0.0, 50.0, 20.0, 80.0);
        obstacle.advance(20.0);
        assert!((obstacle.collider().right()).abs() < f32::EPSILON);
        assert!(!obstacle.is_off_screen());
        obstacle.advance(1.0);
        assert!(obstacle.is_off_screen());
    }

    #[test]
    fn test_reposition_keeps_other_axis() {
        let mut obstacle = Obstacle::new(ObstacleHalf::Top, 10.0, -16.0, 20.0, 80.0);
        obstacle.set_vertical_offset(-32.0);
        assert!((obstacle.x() - 10.0).abs() < f32::EPSILON);
        assert!((obstacle.y() + 32.0).abs() < f32::EPSILON);

        obstacle.reset_position(240.0);
        assert!((obstacle.x() - 240.0).abs() < f32::EPSILON);
        assert!((obstacle.y() + 32.0).abs() < f32::EPSILON);
        assert!(obstacle.half().is_top());
    }
}
