//! Harvester bot: keeps a controller's harvesters deployed on safe patches
//!
//! Architecture:
//! - `schedule` decides on which ticks an evaluation pass runs
//! - `registry` tracks the controller's harvesters and caches their profiles
//! - `patch` finds the cheapest safe deploy cell, using `cost` for hostiles
//! - `production` requests replacements when deployed structures run short
//!
//! A pass is: registry maintenance, a patch search and deploy order for each
//! idle harvester, then the production check. The first failed search backs
//! the schedule off and ends the pass, skipping the remaining harvesters and
//! the production check for that tick.

pub mod cost;
pub mod patch;
pub mod production;
pub mod registry;
pub mod schedule;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::config::HarvesterBotConfig;
use crate::core::error::Result;
use crate::core::types::{Cell, PlayerId, UnitId};
use crate::pathfinding::PathSearch;
use crate::world::{Order, OrderSink, ProductionControl, ResourceLayer, WorldQuery};

pub use patch::{DeployCandidate, PatchSelector};
pub use registry::{Capability, HarvesterRegistry, HarvesterUnit};
pub use schedule::EvaluationSchedule;

/// Collaborators the bot talks to during a tick
pub struct BotContext<'a> {
    pub world: &'a dyn WorldQuery,
    /// `None` when the world has no resource layer
    pub resources: Option<&'a dyn ResourceLayer>,
    pub pathfinder: &'a dyn PathSearch,
    pub orders: &'a mut dyn OrderSink,
    pub production: &'a mut dyn ProductionControl,
}

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Disabled,
    Enabled(EvaluationSchedule),
}

/// Something the bot did during a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BotEvent {
    PassStarted,
    UnitsPruned { count: usize },
    UnitsDiscovered { count: usize },
    DeployOrdered { unit: UnitId, target: Cell },
    SearchFailed { unit: UnitId },
    ProductionRequested { unit_type: String, queue: String },
}

/// One controller's harvester bot
#[derive(Debug)]
pub struct HarvesterBot {
    config: HarvesterBotConfig,
    player: PlayerId,
    state: BotState,
    registry: HarvesterRegistry,
    rng: ChaCha8Rng,
}

impl HarvesterBot {
    /// Create a disabled bot with an entropy-seeded jitter RNG
    pub fn new(config: HarvesterBotConfig, player: PlayerId) -> Result<Self> {
        Self::with_rng(config, player, ChaCha8Rng::from_entropy())
    }

    /// Create a disabled bot with a deterministic jitter RNG
    pub fn with_seed(config: HarvesterBotConfig, player: PlayerId, seed: u64) -> Result<Self> {
        Self::with_rng(config, player, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: HarvesterBotConfig, player: PlayerId, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            player,
            state: BotState::Disabled,
            registry: HarvesterRegistry::new(),
            rng,
        })
    }

    pub fn config(&self) -> &HarvesterBotConfig {
        &self.config
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, BotState::Enabled(_))
    }

    /// Ticks until the next pass, `None` while disabled
    pub fn countdown(&self) -> Option<u32> {
        match &self.state {
            BotState::Enabled(schedule) => Some(schedule.countdown()),
            BotState::Disabled => None,
        }
    }

    pub fn registry(&self) -> &HarvesterRegistry {
        &self.registry
    }

    pub fn tracked_count(&self) -> usize {
        self.registry.len()
    }

    /// Disabled -> Enabled with a jittered countdown. No-op if already enabled.
    pub fn enable(&mut self) {
        if self.is_enabled() {
            return;
        }
        let schedule = EvaluationSchedule::jittered(
            self.config.scan_delay,
            self.config.failure_delay,
            &mut self.rng,
        );
        tracing::debug!(
            "Harvester bot for {:?} enabled, first pass in {} ticks",
            self.player,
            schedule.countdown()
        );
        self.state = BotState::Enabled(schedule);
    }

    /// Enabled -> Disabled. Tracked harvesters are kept.
    pub fn disable(&mut self) {
        self.state = BotState::Disabled;
    }

    /// Per-tick entry point
    pub fn tick(&mut self, ctx: &mut BotContext<'_>) -> Vec<BotEvent> {
        let mut events = Vec::new();

        let BotState::Enabled(schedule) = &mut self.state else {
            return events;
        };

        // Nothing to harvest: freeze the countdown until resources exist
        if !ctx.resources.is_some_and(|r| r.has_resources()) {
            tracing::trace!("No resources for {:?}, skipping tick", self.player);
            return events;
        }

        if !schedule.advance() {
            return events;
        }

        events.push(BotEvent::PassStarted);

        let report = self.registry.maintain(&self.config, self.player, ctx.world);
        if report.pruned > 0 {
            events.push(BotEvent::UnitsPruned { count: report.pruned });
        }
        if report.discovered > 0 {
            events.push(BotEvent::UnitsDiscovered { count: report.discovered });
        }
        tracing::debug!(
            "Harvester pass for {:?}: {} tracked ({} pruned, {} discovered)",
            self.player,
            self.registry.len(),
            report.pruned,
            report.discovered
        );

        let selector = PatchSelector::new(&self.config, self.player, ctx.world, ctx.pathfinder);
        for harvester in self.registry.idle_units(ctx.world) {
            let unit = harvester.unit.id;
            match selector.find_patch(&harvester.unit, harvester.capability) {
                DeployCandidate::Target(target) => {
                    tracing::debug!("Ordering {:?} to deploy at {}", unit, target);
                    ctx.orders.queue_order(Order::deploy(unit, target));
                    events.push(BotEvent::DeployOrdered { unit, target });
                }
                DeployCandidate::Unreachable => {
                    // Abandons the rest of the pass, production check included
                    schedule.back_off();
                    tracing::info!(
                        "No reachable patch for {:?}, backing off {} ticks",
                        unit,
                        self.config.failure_delay
                    );
                    events.push(BotEvent::SearchFailed { unit });
                    return events;
                }
            }
        }

        if let Some(unit_type) =
            production::evaluate(&self.config, self.player, ctx.world, ctx.production)
        {
            events.push(BotEvent::ProductionRequested {
                unit_type: unit_type.to_string(),
                queue: self.config.production_queue.clone(),
            });
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CellOffset;
    use crate::pathfinding::GridPathSearch;
    use crate::sandbox::{SandboxProduction, SandboxWorld};
    use crate::world::{DeployProfile, MovementProfile};

    const ME: PlayerId = PlayerId(1);

    fn config() -> HarvesterBotConfig {
        HarvesterBotConfig {
            scan_delay: 10,
            failure_delay: 200,
            ..Default::default()
        }
    }

    fn world() -> SandboxWorld {
        let mut world = SandboxWorld::new(10, 10, "clear");
        world.add_movement_profile(
            "mcv",
            MovementProfile::new("wheeled")
                .with_terrain("clear", 1.0)
                .with_terrain("resources", 1.0),
        );
        world.add_deploy_profile(
            "mcv",
            DeployProfile {
                into_type: "refinery".into(),
                offset: CellOffset::default(),
            },
        );
        world.resources = 100;
        world
    }

    fn run_tick(
        bot: &mut HarvesterBot,
        world: &SandboxWorld,
        orders: &mut Vec<Order>,
        production: &mut SandboxProduction,
    ) -> Vec<BotEvent> {
        let search = GridPathSearch::new();
        let mut ctx = BotContext {
            world,
            resources: Some(world),
            pathfinder: &search,
            orders,
            production,
        };
        bot.tick(&mut ctx)
    }

    #[test]
    fn test_new_bot_is_disabled() {
        let bot = HarvesterBot::with_seed(config(), ME, 1).unwrap();
        assert_eq!(bot.state(), BotState::Disabled);
        assert_eq!(bot.countdown(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = HarvesterBotConfig {
            scan_delay: 0,
            ..Default::default()
        };
        assert!(HarvesterBot::new(bad, ME).is_err());
    }

    #[test]
    fn test_enable_sets_jittered_countdown() {
        let mut bot = HarvesterBot::with_seed(config(), ME, 9).unwrap();
        bot.enable();
        let countdown = bot.countdown().unwrap();
        assert!(countdown < 10);

        // Enabling again keeps the running schedule
        bot.enable();
        assert_eq!(bot.countdown(), Some(countdown));
    }

    #[test]
    fn test_disabled_bot_does_nothing() {
        let mut world = world();
        world.set_terrain(Cell::new(5, 5), "resources");
        world.spawn_unit("mcv", ME, Cell::new(1, 1));
        let mut bot = HarvesterBot::with_seed(config(), ME, 1).unwrap();
        let mut orders = Vec::new();
        let mut production = SandboxProduction::new().with_queue("vehicle", &["mcv"]);

        for _ in 0..50 {
            assert!(run_tick(&mut bot, &world, &mut orders, &mut production).is_empty());
        }
        assert!(orders.is_empty());
        assert_eq!(bot.tracked_count(), 0);
    }

    #[test]
    fn test_pass_orders_deploy_and_requests_production() {
        let mut world = world();
        world.set_terrain(Cell::new(5, 5), "resources");
        let mcv = world.spawn_unit("mcv", ME, Cell::new(1, 1));
        let mut bot = HarvesterBot::with_seed(config(), ME, 1).unwrap();
        bot.enable();
        let mut orders = Vec::new();
        let mut production = SandboxProduction::new().with_queue("vehicle", &["mcv"]);

        let mut events = Vec::new();
        for _ in 0..10 {
            events.extend(run_tick(&mut bot, &world, &mut orders, &mut production));
        }

        assert_eq!(orders, vec![Order::deploy(mcv, Cell::new(5, 5))]);
        assert!(events.contains(&BotEvent::UnitsDiscovered { count: 1 }));
        assert!(events.contains(&BotEvent::ProductionRequested {
            unit_type: "mcv".into(),
            queue: "vehicle".into(),
        }));
        assert_eq!(bot.countdown().map(|c| c <= 10), Some(true));
    }

    #[test]
    fn test_failed_search_backs_off_and_skips_production() {
        let mut world = world();
        world.spawn_unit("mcv", ME, Cell::new(1, 1));
        let mut bot = HarvesterBot::with_seed(config(), ME, 1).unwrap();
        bot.enable();
        let mut orders = Vec::new();
        let mut production = SandboxProduction::new().with_queue("vehicle", &["mcv"]);

        let mut events = Vec::new();
        while !events.contains(&BotEvent::PassStarted) {
            events = run_tick(&mut bot, &world, &mut orders, &mut production);
        }

        assert!(matches!(events.last(), Some(BotEvent::SearchFailed { .. })));
        assert_eq!(bot.countdown(), Some(200));
        assert!(production.submitted.is_empty());
    }

    #[test]
    fn test_disable_keeps_registry() {
        let mut world = world();
        world.set_terrain(Cell::new(5, 5), "resources");
        world.spawn_unit("mcv", ME, Cell::new(1, 1));
        let mut bot = HarvesterBot::with_seed(config(), ME, 1).unwrap();
        bot.enable();
        let mut orders = Vec::new();
        let mut production = SandboxProduction::new();
        for _ in 0..10 {
            run_tick(&mut bot, &world, &mut orders, &mut production);
        }
        assert_eq!(bot.tracked_count(), 1);

        bot.disable();
        assert!(!bot.is_enabled());
        assert_eq!(bot.tracked_count(), 1);
    }
}
