//! Weighted path search to the nearest cell matching a predicate
//!
//! `PathSearch` is the seam to the host's pathfinder. `GridPathSearch` is a
//! plain Dijkstra over the 8-connected cell grid exposed by `WorldQuery`,
//! used by the sandbox and tests.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::types::Cell;
use crate::world::{BlockedBy, MovementProfile, WorldQuery};

/// Extra cost of a diagonal step relative to an orthogonal one
const DIAGONAL_FACTOR: f32 = std::f32::consts::SQRT_2;

/// Parameters of one nearest-goal search
pub struct SearchRequest<'a> {
    pub start: Cell,
    pub locomotor: &'a MovementProfile,
    pub blocked_by: BlockedBy,
    /// Goal test; the search ends at the cheapest cell passing it
    pub is_goal: &'a dyn Fn(Cell) -> bool,
    /// Added to the cumulative cost whenever a cell is entered
    pub custom_cost: &'a dyn Fn(Cell) -> f32,
}

/// Path-search primitive
pub trait PathSearch {
    /// Lowest-cost path from `request.start` to the nearest goal cell,
    /// ordered start to goal. Empty when no goal is reachable.
    fn find_path(&self, world: &dyn WorldQuery, request: &SearchRequest<'_>) -> Vec<Cell>;
}

/// Node in the open set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathNode {
    cell: Cell,
    cost: OrderedFloat<f32>,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Tie-break on cell so expansion order is deterministic
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.cell.cmp(&other.cell))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra search over the world's cell grid
///
/// Unbounded by default: the search floods until the map edge or a goal.
#[derive(Debug, Clone, Default)]
pub struct GridPathSearch {
    /// Give up after expanding this many cells
    pub max_expansions: Option<usize>,
}

impl GridPathSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_expansions(max_expansions: usize) -> Self {
        Self {
            max_expansions: Some(max_expansions),
        }
    }

    fn passable(world: &dyn WorldQuery, request: &SearchRequest<'_>, cell: Cell) -> Option<f32> {
        let terrain = world.terrain_at(cell)?;
        if request.blocked_by == BlockedBy::Immovable && world.is_blocked(cell) {
            return None;
        }
        request.locomotor.step_cost(terrain)
    }
}

impl PathSearch for GridPathSearch {
    fn find_path(&self, world: &dyn WorldQuery, request: &SearchRequest<'_>) -> Vec<Cell> {
        if world.terrain_at(request.start).is_none() {
            return Vec::new();
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: AHashMap<Cell, Cell> = AHashMap::new();
        let mut costs: AHashMap<Cell, f32> = AHashMap::new();

        costs.insert(request.start, 0.0);
        open_set.push(Reverse(PathNode {
            cell: request.start,
            cost: OrderedFloat(0.0),
        }));

        let mut expansions = 0;
        while let Some(Reverse(current)) = open_set.pop() {
            let current_cost = *costs.get(&current.cell).unwrap_or(&f32::INFINITY);
            if current.cost.0 > current_cost {
                continue; // stale entry
            }

            if (request.is_goal)(current.cell) {
                return reconstruct_path(&came_from, current.cell);
            }

            expansions += 1;
            if self.max_expansions.is_some_and(|max| expansions > max) {
                break;
            }

            for neighbor in current.cell.neighbors() {
                let Some(step) = Self::passable(world, request, neighbor) else {
                    continue;
                };

                let diagonal = neighbor.x != current.cell.x && neighbor.y != current.cell.y;
                let step = if diagonal { step * DIAGONAL_FACTOR } else { step };
                let tentative = current_cost + step + (request.custom_cost)(neighbor);

                if tentative < *costs.get(&neighbor).unwrap_or(&f32::INFINITY) {
                    came_from.insert(neighbor, current.cell);
                    costs.insert(neighbor, tentative);
                    open_set.push(Reverse(PathNode {
                        cell: neighbor,
                        cost: OrderedFloat(tentative),
                    }));
                }
            }
        }

        Vec::new()
    }
}

/// Reconstruct path from came_from map
fn reconstruct_path(came_from: &AHashMap<Cell, Cell>, mut current: Cell) -> Vec<Cell> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
