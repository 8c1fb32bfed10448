//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for units (actors) in the host world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Unique identifier for players (controllers and factions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Integer map cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Center of this cell in world units (one cell = 1.0)
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    /// All 8 surrounding cells
    pub fn neighbors(&self) -> [Cell; 8] {
        [
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x + 1, self.y - 1),
            Cell::new(self.x, self.y - 1),
            Cell::new(self.x - 1, self.y - 1),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x - 1, self.y + 1),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x + 1, self.y + 1),
        ]
    }

    /// Chebyshev distance in cells
    pub fn distance(&self, other: &Self) -> u32 {
        (self.x - other.x).abs().max((self.y - other.y).abs()) as u32
    }
}

impl std::ops::Add<CellOffset> for Cell {
    type Output = Cell;
    fn add(self, rhs: CellOffset) -> Cell {
        Cell::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Relative cell displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellOffset {
    pub dx: i32,
    pub dy: i32,
}

impl CellOffset {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// 2D position in world units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Cell containing this position
    pub fn cell(&self) -> Cell {
        Cell::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_center_roundtrips_to_cell() {
        let cell = Cell::new(3, -2);
        assert_eq!(cell.center().cell(), cell);
    }

    #[test]
    fn test_cell_neighbors_are_adjacent() {
        let cell = Cell::new(5, 5);
        let neighbors = cell.neighbors();
        assert_eq!(neighbors.len(), 8);
        for n in neighbors {
            assert_eq!(cell.distance(&n), 1);
        }
    }

    #[test]
    fn test_cell_plus_offset() {
        let cell = Cell::new(2, 2) + CellOffset::new(-1, 1);
        assert_eq!(cell, Cell::new(1, 3));
    }

    #[test]
    fn test_vec2_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
    }
}
