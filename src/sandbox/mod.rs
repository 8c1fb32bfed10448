//! In-memory host world
//!
//! Implements every collaborator trait the bot consumes so the module can
//! run headless: a terrain grid, static blockers, actors, player
//! relationships, unit profiles and a resource counter. Production lives in
//! `SandboxProduction` so orders and requests can be borrowed mutably while
//! the world is borrowed shared.

pub mod generate;
pub mod production;

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};

use crate::core::error::{BotError, Result};
use crate::core::types::{Cell, PlayerId, UnitId, Vec2};
use crate::spatial::CellGrid;
use crate::world::{
    DeployProfile, MovementProfile, Relationship, ResourceLayer, UnitSnapshot, WorldQuery,
};

pub use production::SandboxProduction;

/// One actor in the sandbox
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxUnit {
    pub id: UnitId,
    pub unit_type: String,
    pub owner: PlayerId,
    pub cell: Cell,
    pub alive: bool,
    pub idle: bool,
    /// Airborne units hover over a cell without occupying it
    pub airborne: bool,
}

impl SandboxUnit {
    fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            unit_type: self.unit_type.clone(),
            owner: self.owner,
            cell: self.cell,
            position: self.cell.center(),
            alive: self.alive,
            idle: self.idle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SandboxWorld {
    terrain: CellGrid<String>,
    blocked: AHashSet<Cell>,
    units: BTreeMap<UnitId, SandboxUnit>,
    next_id: u32,
    relationships: AHashMap<(PlayerId, PlayerId), Relationship>,
    movement_profiles: AHashMap<String, MovementProfile>,
    deploy_profiles: AHashMap<String, DeployProfile>,
    /// Remaining harvestable resource units
    pub resources: u32,
}

impl SandboxWorld {
    /// Create a map filled with one terrain type
    pub fn new(width: usize, height: usize, terrain: &str) -> Self {
        Self {
            terrain: CellGrid::new(width, height, terrain.to_string()),
            blocked: AHashSet::new(),
            units: BTreeMap::new(),
            next_id: 1,
            relationships: AHashMap::new(),
            movement_profiles: AHashMap::new(),
            deploy_profiles: AHashMap::new(),
            resources: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.terrain.width
    }

    pub fn height(&self) -> usize {
        self.terrain.height
    }

    pub fn set_terrain(&mut self, cell: Cell, terrain: &str) {
        self.terrain.set(cell, terrain.to_string());
    }

    /// Cells whose terrain is of the given type
    pub fn cells_with_terrain<'a>(&'a self, terrain: &'a str) -> impl Iterator<Item = Cell> + 'a {
        self.terrain
            .cells()
            .filter(move |c| self.terrain.get(*c).map(String::as_str) == Some(terrain))
    }

    /// Mark a cell as holding a stationary obstacle
    pub fn block(&mut self, cell: Cell) {
        self.blocked.insert(cell);
    }

    pub fn unblock(&mut self, cell: Cell) {
        self.blocked.remove(&cell);
    }

    pub fn set_relationship(&mut self, a: PlayerId, b: PlayerId, relationship: Relationship) {
        self.relationships.insert((a, b), relationship);
        self.relationships.insert((b, a), relationship);
    }

    pub fn add_movement_profile(&mut self, unit_type: &str, profile: MovementProfile) {
        self.movement_profiles.insert(unit_type.to_string(), profile);
    }

    pub fn add_deploy_profile(&mut self, unit_type: &str, profile: DeployProfile) {
        self.deploy_profiles.insert(unit_type.to_string(), profile);
    }

    /// Spawn an idle, living ground actor
    pub fn spawn_unit(&mut self, unit_type: &str, owner: PlayerId, cell: Cell) -> UnitId {
        self.insert_unit(unit_type, owner, cell, false)
    }

    /// Spawn an idle, living actor that does not occupy its cell
    pub fn spawn_air_unit(&mut self, unit_type: &str, owner: PlayerId, cell: Cell) -> UnitId {
        self.insert_unit(unit_type, owner, cell, true)
    }

    fn insert_unit(
        &mut self,
        unit_type: &str,
        owner: PlayerId,
        cell: Cell,
        airborne: bool,
    ) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        self.units.insert(
            id,
            SandboxUnit {
                id,
                unit_type: unit_type.to_string(),
                owner,
                cell,
                alive: true,
                idle: true,
                airborne,
            },
        );
        id
    }

    pub fn get_unit(&self, id: UnitId) -> Option<&SandboxUnit> {
        self.units.get(&id)
    }

    fn unit_mut(&mut self, id: UnitId) -> Result<&mut SandboxUnit> {
        self.units.get_mut(&id).ok_or(BotError::UnitNotFound(id))
    }

    /// Mark an actor dead; it stays in the world until removed
    pub fn kill(&mut self, id: UnitId) -> Result<()> {
        let unit = self.unit_mut(id)?;
        unit.alive = false;
        unit.idle = false;
        Ok(())
    }

    pub fn remove(&mut self, id: UnitId) -> Result<SandboxUnit> {
        self.units.remove(&id).ok_or(BotError::UnitNotFound(id))
    }

    pub fn transfer(&mut self, id: UnitId, owner: PlayerId) -> Result<()> {
        self.unit_mut(id)?.owner = owner;
        Ok(())
    }

    pub fn set_idle(&mut self, id: UnitId, idle: bool) -> Result<()> {
        self.unit_mut(id)?.idle = idle;
        Ok(())
    }

    pub fn move_unit(&mut self, id: UnitId, cell: Cell) -> Result<()> {
        self.unit_mut(id)?.cell = cell;
        Ok(())
    }

    /// Replace a unit with its deploy structure at its current cell
    ///
    /// The unit leaves the world and the structure is a new actor, as when a
    /// host transforms one actor into another. Returns `None` (leaving the
    /// unit untouched) when it has no deploy profile or the structure cannot
    /// be placed there.
    pub fn deploy(&mut self, id: UnitId) -> Result<Option<UnitId>> {
        let unit = self.get_unit(id).ok_or(BotError::UnitNotFound(id))?;
        let Some(profile) = self.deploy_profiles.get(&unit.unit_type).cloned() else {
            return Ok(None);
        };
        let owner = unit.owner;
        let origin = unit.cell + profile.offset;
        if !self.can_place_structure(&profile.into_type, origin, id) {
            return Ok(None);
        }

        self.units.remove(&id);
        let structure = self.spawn_unit(&profile.into_type, owner, origin);
        self.blocked.insert(origin);
        Ok(Some(structure))
    }

    /// Living actors owned by `owner` with one of the given types
    pub fn count_owned(&self, owner: PlayerId, types: &AHashSet<String>) -> usize {
        self.units
            .values()
            .filter(|u| u.alive && u.owner == owner && types.contains(&u.unit_type))
            .count()
    }

    fn is_structure_type(&self, structure_type: &str) -> bool {
        self.deploy_profiles
            .values()
            .any(|p| p.into_type == structure_type)
    }
}

impl WorldQuery for SandboxWorld {
    fn units(&self) -> Vec<UnitSnapshot> {
        self.units.values().map(SandboxUnit::snapshot).collect()
    }

    fn unit(&self, id: UnitId) -> Option<UnitSnapshot> {
        self.units.get(&id).map(SandboxUnit::snapshot)
    }

    fn units_in_radius(&self, center: Vec2, radius: f32) -> Vec<UnitSnapshot> {
        self.units
            .values()
            .filter(|u| u.cell.center().distance(&center) <= radius)
            .map(SandboxUnit::snapshot)
            .collect()
    }

    fn terrain_at(&self, cell: Cell) -> Option<&str> {
        self.terrain.get(cell).map(String::as_str)
    }

    fn is_blocked(&self, cell: Cell) -> bool {
        self.blocked.contains(&cell)
    }

    fn can_place_structure(&self, structure_type: &str, cell: Cell, requester: UnitId) -> bool {
        self.terrain.contains(cell)
            && !self.blocked.contains(&cell)
            && self.is_structure_type(structure_type)
            && !self
                .units
                .values()
                .any(|u| u.id != requester && u.alive && !u.airborne && u.cell == cell)
    }

    fn relationship(&self, a: PlayerId, b: PlayerId) -> Relationship {
        if a == b {
            return Relationship::Ally;
        }
        self.relationships
            .get(&(a, b))
            .copied()
            .unwrap_or(Relationship::Neutral)
    }

    fn movement_profile(&self, unit_type: &str) -> Option<MovementProfile> {
        self.movement_profiles.get(unit_type).cloned()
    }

    fn deploy_profile(&self, unit_type: &str) -> Option<DeployProfile> {
        self.deploy_profiles.get(unit_type).cloned()
    }
}

impl ResourceLayer for SandboxWorld {
    fn has_resources(&self) -> bool {
        self.resources > 0
    }
}
