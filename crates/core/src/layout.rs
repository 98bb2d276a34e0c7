//! Grid layout - maps grid coordinates to world positions and back
//!
//! The grid is fitted into a viewport: the cell size is the largest that keeps
//! the grid inside both the width budget and the height budget (minus the
//! bottom offset), and the grid is centered horizontally and rests on the
//! bottom offset. Positions refer to cell centers.

use match3_types::{
    GridPos, Vec2, WorldPos, GRID_BOTTOM_OFFSET, GRID_MAX_HEIGHT_RATIO, GRID_MAX_WIDTH_RATIO,
};

/// Fitting parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    pub bottom_offset: f32,
    pub max_width_ratio: f32,
    pub max_height_ratio: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            bottom_offset: GRID_BOTTOM_OFFSET,
            max_width_ratio: GRID_MAX_WIDTH_RATIO,
            max_height_ratio: GRID_MAX_HEIGHT_RATIO,
        }
    }
}

/// Visible world rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub bottom_left: Vec2,
    pub size: Vec2,
}

impl Viewport {
    pub const fn new(bottom_left: Vec2, size: Vec2) -> Self {
        Self { bottom_left, size }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    rows: usize,
    columns: usize,
    cell_size: f32,
    /// Center of cell (0, 0).
    origin: Vec2,
}

impl GridLayout {
    pub fn new(rows: usize, columns: usize, cell_size: f32, origin: Vec2) -> Self {
        Self {
            rows,
            columns,
            cell_size,
            origin,
        }
    }

    /// Fit a `rows x columns` grid into `viewport`.
    pub fn fit(rows: usize, columns: usize, viewport: Viewport, settings: GridSettings) -> Self {
        let rows_f = rows.max(1) as f32;
        let columns_f = columns.max(1) as f32;

        let from_width = viewport.size.x * settings.max_width_ratio / columns_f;
        let from_height =
            (viewport.size.y * settings.max_height_ratio - settings.bottom_offset) / rows_f;
        let cell_size = from_width.min(from_height).max(0.0);

        let grid_width = cell_size * columns_f;
        let origin = Vec2::new(
            viewport.bottom_left.x + (viewport.size.x - grid_width) / 2.0 + cell_size / 2.0,
            viewport.bottom_left.y + settings.bottom_offset + cell_size / 2.0,
        );

        Self::new(rows, columns, cell_size, origin)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// World position of the center of `pos`.
    ///
    /// Depth decreases with row and column so that lower, left cells draw in front.
    pub fn world_position(&self, pos: GridPos) -> WorldPos {
        const ROW_WEIGHT: f32 = -1.0;
        const COLUMN_WEIGHT: f32 = -0.5;

        WorldPos {
            x: self.origin.x + pos.column as f32 * self.cell_size,
            y: self.origin.y + pos.row as f32 * self.cell_size,
            z: pos.row as f32 * ROW_WEIGHT + pos.column as f32 * COLUMN_WEIGHT,
        }
    }

    /// Cell under a world point, or `None` outside the grid.
    pub fn grid_coordinate(&self, point: Vec2) -> Option<GridPos> {
        if self.cell_size <= 0.0 {
            return None;
        }
        let half = self.cell_size / 2.0;
        let column = ((point.x - (self.origin.x - half)) / self.cell_size).floor();
        let row = ((point.y - (self.origin.y - half)) / self.cell_size).floor();

        if row < 0.0 || column < 0.0 {
            return None;
        }
        let (row, column) = (row as usize, column as usize);
        if row >= self.rows || column >= self.columns {
            return None;
        }
        Some(GridPos::new(row, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_fit_width_bound() {
        // 10 wide, 20 tall world; 5x5 grid: width gives 1.8, height gives 2.8.
        let vp = Viewport::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 20.0));
        let layout = GridLayout::fit(5, 5, vp, GridSettings::default());
        assert!(approx(layout.cell_size(), 1.8));
        // Centered: (10 - 9) / 2 + 0.9
        assert!(approx(layout.origin().x, 1.4));
        assert!(approx(layout.origin().y, 1.9));
    }

    #[test]
    fn test_fit_height_bound() {
        // 20 wide, 10 tall; 4 rows x 2 columns: width 9.0, height (7.5 - 1) / 4 = 1.625.
        let vp = Viewport::new(Vec2::new(-10.0, -5.0), Vec2::new(20.0, 10.0));
        let layout = GridLayout::fit(4, 2, vp, GridSettings::default());
        assert!(approx(layout.cell_size(), 1.625));
    }

    #[test]
    fn test_world_position_and_depth() {
        let layout = GridLayout::new(3, 3, 2.0, Vec2::new(1.0, 1.0));
        let p = layout.world_position(GridPos::new(2, 1));
        assert!(approx(p.x, 3.0));
        assert!(approx(p.y, 5.0));
        assert!(approx(p.z, -2.5));
    }

    #[test]
    fn test_grid_coordinate_roundtrip() {
        let layout = GridLayout::new(3, 4, 1.0, Vec2::new(0.5, 0.5));
        for row in 0..3 {
            for column in 0..4 {
                let pos = GridPos::new(row, column);
                let w = layout.world_position(pos);
                assert_eq!(layout.grid_coordinate(Vec2::new(w.x, w.y)), Some(pos));
            }
        }
    }

    #[test]
    fn test_grid_coordinate_outside() {
        let layout = GridLayout::new(2, 2, 1.0, Vec2::new(0.5, 0.5));
        assert_eq!(layout.grid_coordinate(Vec2::new(-0.1, 0.5)), None);
        assert_eq!(layout.grid_coordinate(Vec2::new(0.5, 2.1)), None);
        assert_eq!(layout.grid_coordinate(Vec2::new(2.0, 0.5)), None);
    }
}
