//! Generic grid for per-cell data

use crate::core::types::Cell;

/// Dense 2D grid addressed by `Cell`, origin at (0, 0)
#[derive(Debug, Clone)]
pub struct CellGrid<T: Clone> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone> CellGrid<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    #[inline]
    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
        {
            Some(cell.y as usize * self.width + cell.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.index(cell).map(|i| &self.data[i])
    }

    #[inline]
    pub fn set(&mut self, cell: Cell, value: T) {
        if let Some(i) = self.index(cell) {
            self.data[i] = value;
        }
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| Cell::new(x as i32, y as i32)))
    }
}
