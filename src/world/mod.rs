//! Host world interfaces consumed by the harvester bot
//!
//! The bot never owns world state. Everything it reads or changes goes
//! through these traits, which the host simulation implements:
//! - `WorldQuery` for actors, terrain, relationships and placement rules
//! - `ResourceLayer` to tell whether anything is left to harvest
//! - `OrderSink` to dispatch unit orders
//! - `ProductionControl` for production queues and unit requests
//!
//! `crate::sandbox` provides in-memory implementations of all of them.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Cell, CellOffset, PlayerId, UnitId, Vec2};

/// Diplomatic stance between two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relationship {
    Ally,
    Neutral,
    Enemy,
}

/// Read-only view of one actor at query time
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub unit_type: String,
    pub owner: PlayerId,
    pub cell: Cell,
    pub position: Vec2,
    pub alive: bool,
    /// Not executing any activity
    pub idle: bool,
}

/// Locomotor data: which terrain a unit can stand on and what it costs to enter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementProfile {
    pub name: String,
    /// Cost of entering a cell of each terrain type. Missing types are impassable.
    pub terrain_costs: AHashMap<String, f32>,
}

impl MovementProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            terrain_costs: AHashMap::new(),
        }
    }

    pub fn with_terrain(mut self, terrain: impl Into<String>, cost: f32) -> Self {
        self.terrain_costs.insert(terrain.into(), cost);
        self
    }

    /// Cost of stepping into terrain of this type, `None` when impassable
    pub fn step_cost(&self, terrain: &str) -> Option<f32> {
        self.terrain_costs
            .get(terrain)
            .copied()
            .filter(|cost| cost.is_finite())
    }

    pub fn can_stand_on(&self, terrain: &str) -> bool {
        self.step_cost(terrain).is_some()
    }
}

/// How a mobile unit transforms into a stationary structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployProfile {
    /// Structure type produced by deploying
    pub into_type: String,
    /// Structure footprint origin relative to the unit's cell
    pub offset: CellOffset,
}

/// Whether path search may pass through obstacles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockedBy {
    /// Only terrain restricts movement
    None,
    /// Stationary obstacles (structures, walls) are also impassable
    #[default]
    Immovable,
}

/// World query collaborator
pub trait WorldQuery {
    /// Every actor currently in the world, mobile units and structures alike
    fn units(&self) -> Vec<UnitSnapshot>;

    /// Look up a single actor, `None` once it has left the world
    fn unit(&self, id: UnitId) -> Option<UnitSnapshot>;

    /// Actors whose position lies within `radius` of `center`
    fn units_in_radius(&self, center: Vec2, radius: f32) -> Vec<UnitSnapshot>;

    /// Terrain type name at a cell, `None` outside the map
    fn terrain_at(&self, cell: Cell) -> Option<&str>;

    /// Is the cell occupied by a stationary obstacle?
    fn is_blocked(&self, cell: Cell) -> bool;

    /// Could a structure of this type be placed with its origin at `cell`?
    fn can_place_structure(&self, structure_type: &str, cell: Cell, requester: UnitId) -> bool;

    fn relationship(&self, a: PlayerId, b: PlayerId) -> Relationship;

    /// Locomotor of a unit type, `None` if the type cannot move
    fn movement_profile(&self, unit_type: &str) -> Option<MovementProfile>;

    /// Deploy data of a unit type, `None` if the type cannot deploy
    fn deploy_profile(&self, unit_type: &str) -> Option<DeployProfile>;
}

/// Resource layer collaborator
pub trait ResourceLayer {
    /// Does any harvestable resource remain anywhere in the world?
    fn has_resources(&self) -> bool;
}

/// A named command for one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub name: String,
    pub subject: UnitId,
    pub target: Cell,
    /// Append to the unit's activity queue instead of replacing it
    pub queued: bool,
}

impl Order {
    pub const DEPLOY: &'static str = "Deploy";

    pub fn deploy(subject: UnitId, target: Cell) -> Self {
        Self {
            name: Self::DEPLOY.to_string(),
            subject,
            target,
            queued: false,
        }
    }
}

/// Order dispatch collaborator
pub trait OrderSink {
    fn queue_order(&mut self, order: Order);
}

impl OrderSink for Vec<Order> {
    fn queue_order(&mut self, order: Order) {
        self.push(order);
    }
}

/// Production queue and unit request collaborator
pub trait ProductionControl {
    /// Whether the named queue can currently build `unit_type`,
    /// `None` if the player has no queue with that name
    fn queue_can_build(&self, queue: &str, unit_type: &str) -> Option<bool>;

    /// Is a unit-request collaborator present and enabled?
    fn requests_enabled(&self) -> bool;

    /// Requests for `unit_type` submitted but not yet fulfilled
    fn outstanding_requests(&self, unit_type: &str) -> usize;

    fn request_unit(&mut self, unit_type: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_profile_missing_terrain_impassable() {
        let profile = MovementProfile::new("wheeled").with_terrain("clear", 1.0);
        assert_eq!(profile.step_cost("clear"), Some(1.0));
        assert!(!profile.can_stand_on("water"));
    }

    #[test]
    fn test_movement_profile_infinite_cost_impassable() {
        let profile = MovementProfile::new("wheeled").with_terrain("cliff", f32::INFINITY);
        assert!(!profile.can_stand_on("cliff"));
    }

    #[test]
    fn test_deploy_order_shape() {
        let order = Order::deploy(UnitId(4), Cell::new(1, 2));
        assert_eq!(order.name, "Deploy");
        assert!(!order.queued);
    }

    #[test]
    fn test_vec_collects_orders() {
        let mut sink: Vec<Order> = Vec::new();
        sink.queue_order(Order::deploy(UnitId(1), Cell::new(0, 0)));
        assert_eq!(sink.len(), 1);
    }
}
