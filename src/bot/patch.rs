//! Nearest safe deploy location for an idle harvester
//!
//! A cell is a valid patch when its terrain is eligible, the harvester's
//! locomotor can stand on it, and the deploy structure can be placed at the
//! cell plus the deploy offset. The search runs from the harvester's cell
//! with hostile proximity added to the path cost.

use serde::Serialize;

use crate::bot::cost::hostile_penalty;
use crate::bot::registry::Capability;
use crate::core::config::HarvesterBotConfig;
use crate::core::types::{Cell, PlayerId};
use crate::pathfinding::{PathSearch, SearchRequest};
use crate::world::{BlockedBy, UnitSnapshot, WorldQuery};

/// Outcome of a patch search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeployCandidate {
    /// Cell to send the deploy order to
    Target(Cell),
    /// No valid patch is reachable
    Unreachable,
}

impl DeployCandidate {
    pub fn target(&self) -> Option<Cell> {
        match self {
            DeployCandidate::Target(cell) => Some(*cell),
            DeployCandidate::Unreachable => None,
        }
    }
}

/// Patch search bound to one bot's config and the current world
pub struct PatchSelector<'a> {
    config: &'a HarvesterBotConfig,
    player: PlayerId,
    world: &'a dyn WorldQuery,
    pathfinder: &'a dyn PathSearch,
}

impl<'a> PatchSelector<'a> {
    pub fn new(
        config: &'a HarvesterBotConfig,
        player: PlayerId,
        world: &'a dyn WorldQuery,
        pathfinder: &'a dyn PathSearch,
    ) -> Self {
        Self {
            config,
            player,
            world,
            pathfinder,
        }
    }

    /// Can `unit` deploy at `cell`?
    pub fn is_valid_patch(&self, unit: &UnitSnapshot, capability: &Capability, cell: Cell) -> bool {
        let Some(terrain) = self.world.terrain_at(cell) else {
            return false;
        };

        self.config.eligible_terrain.contains(terrain)
            && capability.movement.can_stand_on(terrain)
            && self.world.can_place_structure(
                &capability.deploy.into_type,
                cell + capability.deploy.offset,
                unit.id,
            )
    }

    /// Hostile-proximity penalty of entering `cell`
    pub fn penalty(&self, cell: Cell) -> f32 {
        hostile_penalty(self.world, self.player, cell, self.config.avoidance_radius)
    }

    /// Search from the unit's cell for the cheapest valid patch
    pub fn find_patch(&self, unit: &UnitSnapshot, capability: &Capability) -> DeployCandidate {
        let is_goal = |cell: Cell| self.is_valid_patch(unit, capability, cell);
        let custom_cost = |cell: Cell| self.penalty(cell);

        let request = SearchRequest {
            start: unit.cell,
            locomotor: &capability.movement,
            blocked_by: BlockedBy::Immovable,
            is_goal: &is_goal,
            custom_cost: &custom_cost,
        };

        let path = self.pathfinder.find_path(self.world, &request);
        match path.last() {
            Some(cell) => DeployCandidate::Target(*cell),
            None => DeployCandidate::Unreachable,
        }
    }
}
