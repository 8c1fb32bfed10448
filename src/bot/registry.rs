//! Tracked harvesters and their cached capabilities
//!
//! Movement and deploy profiles are resolved once when a harvester is
//! discovered and reused on every later pass.

use std::collections::BTreeMap;

use crate::core::config::HarvesterBotConfig;
use crate::core::types::{PlayerId, UnitId};
use crate::world::{DeployProfile, MovementProfile, UnitSnapshot, WorldQuery};

/// Per-unit capability handle cached at discovery time
#[derive(Debug, Clone, PartialEq)]
pub struct Capability {
    pub movement: MovementProfile,
    pub deploy: DeployProfile,
}

impl Capability {
    /// Resolve both profiles for a unit type, `None` if either is missing
    pub fn resolve(world: &dyn WorldQuery, unit_type: &str) -> Option<Self> {
        Some(Self {
            movement: world.movement_profile(unit_type)?,
            deploy: world.deploy_profile(unit_type)?,
        })
    }
}

/// A tracked harvester as seen this pass
#[derive(Debug, Clone)]
pub struct HarvesterUnit<'a> {
    pub unit: UnitSnapshot,
    pub capability: &'a Capability,
}

/// Counts from one `maintain` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintainReport {
    pub pruned: usize,
    pub discovered: usize,
}

/// Tracked harvesters, iterated in ascending `UnitId` order
#[derive(Debug, Clone, Default)]
pub struct HarvesterRegistry {
    entries: BTreeMap<UnitId, Capability>,
}

impl HarvesterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn capability(&self, id: UnitId) -> Option<&Capability> {
        self.entries.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.entries.keys().copied()
    }

    /// Prune stale entries, then discover new harvesters
    pub fn maintain(
        &mut self,
        config: &HarvesterBotConfig,
        player: PlayerId,
        world: &dyn WorldQuery,
    ) -> MaintainReport {
        let pruned = self.prune(player, world);
        let discovered = self.discover(config, player, world);
        MaintainReport { pruned, discovered }
    }

    /// Drop units that left the world, died or changed owner
    pub fn prune(&mut self, player: PlayerId, world: &dyn WorldQuery) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| {
            world
                .unit(*id)
                .is_some_and(|u| u.alive && u.owner == player)
        });
        before - self.entries.len()
    }

    /// Track every living, owned unit of a deployable type not yet known
    ///
    /// Scans all world actors, so cost grows with world size; the scan
    /// cadence keeps it affordable.
    pub fn discover(
        &mut self,
        config: &HarvesterBotConfig,
        player: PlayerId,
        world: &dyn WorldQuery,
    ) -> usize {
        let mut discovered = 0;
        for unit in world.units() {
            if !unit.alive
                || unit.owner != player
                || !config.is_deployable(&unit.unit_type)
                || self.entries.contains_key(&unit.id)
            {
                continue;
            }

            match Capability::resolve(world, &unit.unit_type) {
                Some(capability) => {
                    self.entries.insert(unit.id, capability);
                    discovered += 1;
                }
                None => {
                    tracing::debug!(
                        "Skipping harvester {:?}: no movement or deploy profile for {}",
                        unit.id,
                        unit.unit_type
                    );
                }
            }
        }
        discovered
    }

    /// Tracked harvesters currently reporting idle
    ///
    /// Lazily re-queries the world on every call.
    pub fn idle_units<'a>(
        &'a self,
        world: &'a dyn WorldQuery,
    ) -> impl Iterator<Item = HarvesterUnit<'a>> + 'a {
        self.entries.iter().filter_map(move |(id, capability)| {
            world
                .unit(*id)
                .filter(|u| u.idle)
                .map(|unit| HarvesterUnit { unit, capability })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Cell, CellOffset};
    use crate::sandbox::SandboxWorld;

    const ME: PlayerId = PlayerId(1);
    const OTHER: PlayerId = PlayerId(2);

    fn world() -> SandboxWorld {
        let mut world = SandboxWorld::new(10, 10, "clear");
        world.add_movement_profile(
            "mcv",
            MovementProfile::new("wheeled").with_terrain("clear", 1.0),
        );
        world.add_deploy_profile(
            "mcv",
            DeployProfile {
                into_type: "refinery".into(),
                offset: CellOffset::default(),
            },
        );
        world
    }

    #[test]
    fn test_discovers_owned_deployable_units() {
        let mut world = world();
        let mine = world.spawn_unit("mcv", ME, Cell::new(1, 1));
        let theirs = world.spawn_unit("mcv", OTHER, Cell::new(2, 2));
        let tank = world.spawn_unit("tank", ME, Cell::new(3, 3));

        let mut registry = HarvesterRegistry::new();
        let report = registry.maintain(&HarvesterBotConfig::default(), ME, &world);

        assert_eq!(report, MaintainReport { pruned: 0, discovered: 1 });
        assert!(registry.contains(mine));
        assert!(!registry.contains(theirs));
        assert!(!registry.contains(tank));
    }

    #[test]
    fn test_capability_cached_on_discovery() {
        let mut world = world();
        let mine = world.spawn_unit("mcv", ME, Cell::new(1, 1));
        let mut registry = HarvesterRegistry::new();
        registry.maintain(&HarvesterBotConfig::default(), ME, &world);

        let cap = registry.capability(mine).unwrap();
        assert_eq!(cap.deploy.into_type, "refinery");
        assert!(cap.movement.can_stand_on("clear"));
    }

    #[test]
    fn test_unit_without_profiles_not_tracked() {
        let mut world = SandboxWorld::new(5, 5, "clear");
        world.spawn_unit("mcv", ME, Cell::new(1, 1));
        let mut registry = HarvesterRegistry::new();
        registry.maintain(&HarvesterBotConfig::default(), ME, &world);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_prunes_dead_transferred_and_removed() {
        let mut world = world();
        let dead = world.spawn_unit("mcv", ME, Cell::new(1, 1));
        let traded = world.spawn_unit("mcv", ME, Cell::new(2, 2));
        let gone = world.spawn_unit("mcv", ME, Cell::new(3, 3));
        let kept = world.spawn_unit("mcv", ME, Cell::new(4, 4));

        let config = HarvesterBotConfig::default();
        let mut registry = HarvesterRegistry::new();
        registry.maintain(&config, ME, &world);
        assert_eq!(registry.len(), 4);

        world.kill(dead).unwrap();
        world.transfer(traded, OTHER).unwrap();
        world.remove(gone).unwrap();

        let report = registry.maintain(&config, ME, &world);
        assert_eq!(report.pruned, 3);
        assert_eq!(report.discovered, 0);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![kept]);
    }

    #[test]
    fn test_maintain_is_idempotent() {
        let mut world = world();
        world.spawn_unit("mcv", ME, Cell::new(1, 1));
        world.spawn_unit("mcv", ME, Cell::new(2, 1));

        let config = HarvesterBotConfig::default();
        let mut registry = HarvesterRegistry::new();
        registry.maintain(&config, ME, &world);
        let mut first: Vec<UnitId> = registry.ids().collect();
        first.sort();

        let report = registry.maintain(&config, ME, &world);
        let mut second: Vec<UnitId> = registry.ids().collect();
        second.sort();

        assert_eq!(report, MaintainReport::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_idle_units_in_id_order() {
        let mut world = world();
        let ids: Vec<UnitId> = (0..8)
            .map(|i| world.spawn_unit("mcv", ME, Cell::new(i, 0)))
            .collect();

        let mut registry = HarvesterRegistry::new();
        registry.maintain(&HarvesterBotConfig::default(), ME, &world);

        let idle: Vec<UnitId> = registry.idle_units(&world).map(|h| h.unit.id).collect();
        assert_eq!(idle, ids);
    }

    #[test]
    fn test_idle_units_filters_busy() {
        let mut world = world();
        let idle = world.spawn_unit("mcv", ME, Cell::new(1, 1));
        let busy = world.spawn_unit("mcv", ME, Cell::new(2, 2));
        world.set_idle(busy, false).unwrap();

        let mut registry = HarvesterRegistry::new();
        registry.maintain(&HarvesterBotConfig::default(), ME, &world);

        let ids: Vec<UnitId> = registry.idle_units(&world).map(|h| h.unit.id).collect();
        assert_eq!(ids, vec![idle]);

        // Restartable: a second query sees fresh state
        world.set_idle(busy, true).unwrap();
        assert_eq!(registry.idle_units(&world).count(), 2);
    }
}
