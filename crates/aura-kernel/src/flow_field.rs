//! Ambient flow field.
//!
//! A coarse grid of direction angles covering the canvas. Every particle is
//! nudged along the angle of the cell it is in. The angles are a smooth
//! function of grid position and time, so neighbouring cells and successive
//! refreshes never jump.

use glam::Vec2;

/// Linear weight of grid coordinates in the angle.
const SPATIAL_FREQ: f32 = 0.1;
/// Angular speed of the time-varying cross term (radians per second).
const TIME_FREQ: f32 = 0.4;

/// Grid of direction angles regenerated on a throttled cadence.
#[derive(Debug, Clone)]
pub struct FlowField {
    cols: usize,
    rows: usize,
    resolution: f32,
    magnitude: f32,
    refresh_interval: f32,
    angles: Vec<f32>,
    last_refresh: Option<f32>,
}

impl FlowField {
    /// Creates a field covering `width` x `height` with square cells of
    /// `resolution` units, computed for time zero.
    #[must_use]
    pub fn new(
        width: f32,
        height: f32,
        resolution: f32,
        magnitude: f32,
        refresh_interval: f32,
    ) -> Self {
        let resolution = resolution.max(1.0);
        let cols = Self::cells_along(width, resolution);
        let rows = Self::cells_along(height, resolution);
        let mut field = Self {
            cols,
            rows,
            resolution,
            magnitude,
            refresh_interval,
            angles: vec![0.0; cols * rows],
            last_refresh: None,
        };
        field.refresh(0.0);
        field
    }

    fn cells_along(extent: f32, resolution: f32) -> usize {
        if extent.is_finite() && extent > 0.0 {
            ((extent / resolution).ceil() as usize).max(1)
        } else {
            1
        }
    }

    /// Angle of grid cell (`col`, `row`) at `time` seconds.
    #[must_use]
    pub fn angle_formula(col: usize, row: usize, time: f32) -> f32 {
        let x = col as f32 * SPATIAL_FREQ;
        let y = row as f32 * SPATIAL_FREQ;
        x + y + (x + time * TIME_FREQ).sin() * y.cos()
    }

    /// Recomputes all angles if at least `refresh_interval` seconds passed
    /// since the last refresh. Returns whether a refresh happened.
    pub fn refresh(&mut self, time: f32) -> bool {
        if let Some(last) = self.last_refresh {
            if time - last < self.refresh_interval {
                return false;
            }
        }

        for row in 0..self.rows {
            for col in 0..self.cols {
                self.angles[row * self.cols + col] = Self::angle_formula(col, row, time);
            }
        }
        self.last_refresh = Some(time);
        true
    }

    /// Force at a canvas position. Positions outside the grid use the
    /// nearest edge cell.
    #[must_use]
    pub fn force_at(&self, x: f32, y: f32) -> Vec2 {
        let col = self.clamp_index(x, self.cols);
        let row = self.clamp_index(y, self.rows);
        let angle = self.angles[row * self.cols + col];
        Vec2::new(angle.cos(), angle.sin()) * self.magnitude
    }

    fn clamp_index(&self, coord: f32, count: usize) -> usize {
        let cell = (coord / self.resolution).floor();
        if cell.is_nan() || cell < 0.0 {
            0
        } else {
            (cell as usize).min(count - 1)
        }
    }

    /// Rebuilds the grid for new canvas dimensions. The next refresh is
    /// unthrottled.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.cols = Self::cells_along(width, self.resolution);
        self.rows = Self::cells_along(height, self.resolution);
        self.angles = vec![0.0; self.cols * self.rows];
        let time = self.last_refresh.unwrap_or(0.0);
        self.last_refresh = None;
        self.refresh(time);
    }

    /// Stored angle of a cell, if in range.
    #[must_use]
    pub fn angle(&self, col: usize, row: usize) -> Option<f32> {
        if col < self.cols && row < self.rows {
            self.angles.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Time of the last refresh.
    #[must_use]
    pub const fn last_refresh(&self) -> Option<f32> {
        self.last_refresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn field() -> FlowField {
        FlowField::new(900.0, 600.0, 30.0, 0.2, 0.2)
    }

    #[test]
    fn test_grid_dimensions() {
        let f = field();
        assert_eq!(f.cols(), 30);
        assert_eq!(f.rows(), 20);
        assert_eq!(f.last_refresh(), Some(0.0));
    }

    #[test]
    fn test_corner_forces_are_finite() {
        let f = field();
        for (x, y) in [(0.0, 0.0), (899.0, 599.0)] {
            let force = f.force_at(x, y);
            assert!(force.is_finite());
            assert!((force.length() - 0.2).abs() < 1e-5);
        }
    }

    #[test]
    fn test_out_of_range_positions_clamp() {
        let f = field();
        assert_eq!(f.force_at(-500.0, -500.0), f.force_at(0.0, 0.0));
        assert_eq!(f.force_at(5000.0, 5000.0), f.force_at(899.0, 599.0));
        assert!(f.force_at(f32::NAN, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_refresh_is_throttled() {
        let mut f = field();
        assert!(!f.refresh(0.1));
        assert_eq!(f.last_refresh(), Some(0.0));
        assert!(f.refresh(0.2));
        assert!(!f.refresh(0.3));
        assert!(f.refresh(0.45));
    }

    #[test]
    fn test_refresh_changes_angles_smoothly() {
        let mut f = field();
        let before = f.angle(3, 4).unwrap_or_default();
        f.refresh(0.25);
        let after = f.angle(3, 4).unwrap_or_default();
        assert!(before != after);
        assert!((before - after).abs() <= TIME_FREQ * 0.25 + 1e-5);
    }

    #[test]
    fn test_resize_rebuilds() {
        let mut f = field();
        f.resize(300.0, 90.0);
        assert_eq!(f.cols(), 10);
        assert_eq!(f.rows(), 3);
        assert!(f.angle(9, 2).is_some());
        assert!(f.angle(10, 0).is_none());
    }

    #[test]
    fn test_degenerate_canvas() {
        let f = FlowField::new(0.0, f32::NAN, 30.0, 0.2, 0.2);
        assert_eq!(f.cols(), 1);
        assert_eq!(f.rows(), 1);
        assert!(f.force_at(10.0, 10.0).is_finite());
    }

    proptest! {
        #[test]
        fn prop_force_magnitude(x in -2000.0f32..2000.0, y in -2000.0f32..2000.0) {
            let force = field().force_at(x, y);
            prop_assert!(force.is_finite());
            prop_assert!((force.length() - 0.2).abs() < 1e-4);
        }

        #[test]
        fn prop_adjacent_cells_are_close(
            col in 0usize..60,
            row in 0usize..60,
            t in 0.0f32..1000.0
        ) {
            let here = FlowField::angle_formula(col, row, t);
            let right = FlowField::angle_formula(col + 1, row, t);
            let below = FlowField::angle_formula(col, row + 1, t);
            prop_assert!((here - right).abs() <= 2.0 * SPATIAL_FREQ + 1e-3);
            prop_assert!((here - below).abs() <= 2.0 * SPATIAL_FREQ + 1e-3);
        }

        #[test]
        fn prop_time_is_continuous(
            col in 0usize..60,
            row in 0usize..60,
            t in 0.0f32..100.0,
            dt in 0.0f32..1.0
        ) {
            let a = FlowField::angle_formula(col, row, t);
            let b = FlowField::angle_formula(col, row, t + dt);
            prop_assert!((a - b).abs() <= TIME_FREQ * dt + 1e-3);
        }
    }
}
