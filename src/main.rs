//! Headless Harvester Bot Runner
//!
//! Generates a seeded sandbox map, drives one harvester bot per player for a
//! number of ticks and prints a summary. The runner plays the host: it moves
//! units along deploy orders, deploys them on arrival, drains resources into
//! deployed structures and completes production requests.

use std::collections::BTreeMap;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use harvester_bot::bot::{BotContext, BotEvent, HarvesterBot};
use harvester_bot::core::error::Result;
use harvester_bot::core::types::{Cell, PlayerId, UnitId};
use harvester_bot::core::HarvesterBotConfig;
use harvester_bot::pathfinding::{GridPathSearch, PathSearch, SearchRequest};
use harvester_bot::sandbox::generate::{generate_world, random_clear_cell, MapConfig};
use harvester_bot::sandbox::{SandboxProduction, SandboxWorld};
use harvester_bot::world::{BlockedBy, Order, Relationship, WorldQuery};

/// Ticks a requested harvester spends in production
const BUILD_TICKS: u64 = 150;

/// Headless Harvester Bot Runner
#[derive(Parser, Debug)]
#[command(name = "harvester-bot")]
#[command(about = "Run harvester bots on a generated sandbox map and report what they did")]
struct Args {
    /// Bot config TOML (defaults are used when omitted)
    #[arg(long)]
    config: Option<String>,

    /// Map width in cells
    #[arg(long, default_value_t = 64)]
    width: usize,

    /// Map height in cells
    #[arg(long, default_value_t = 64)]
    height: usize,

    /// Ticks to simulate
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of bot-controlled players
    #[arg(long, default_value_t = 2)]
    bots: u32,

    /// Hostile units scattered over the map
    #[arg(long, default_value_t = 6)]
    hostiles: u32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Per-player result
#[derive(Debug, Default, Serialize)]
struct PlayerSummary {
    player: u32,
    tracked_harvesters: usize,
    deploy_orders: usize,
    failed_searches: usize,
    production_requests: usize,
    deployed_structures: usize,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    resources_remaining: u32,
    players: Vec<PlayerSummary>,
}

/// A player slot driven by the runner
struct Slot {
    bot: HarvesterBot,
    production: SandboxProduction,
    /// Tick at which the oldest pending request finishes
    build_done_at: Option<u64>,
    home: Cell,
    summary: PlayerSummary,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "harvester_bot=debug"
    } else {
        "harvester_bot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => HarvesterBotConfig::load(path)?,
        None => HarvesterBotConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    tracing::info!("Starting harvester run: seed {}, {} ticks", seed, args.ticks);

    let map = MapConfig {
        width: args.width,
        height: args.height,
        ..Default::default()
    };
    let mut world = generate_world(&map, &config, &mut rng);

    let hostile = PlayerId(0);
    let mut slots = Vec::new();
    for i in 0..args.bots {
        let player = PlayerId(i + 1);
        world.set_relationship(player, hostile, Relationship::Enemy);

        let home = random_clear_cell(&world, &mut rng).unwrap_or_default();
        for unit_type in config.deployable_types.iter().take(1) {
            world.spawn_unit(unit_type, player, home);
        }

        let mut bot = HarvesterBot::with_seed(config.clone(), player, rng.gen())?;
        bot.enable();

        let buildable: Vec<&str> = config.deployable_types.iter().map(String::as_str).collect();
        slots.push(Slot {
            bot,
            production: SandboxProduction::new().with_queue(&config.production_queue, &buildable),
            build_done_at: None,
            home,
            summary: PlayerSummary {
                player: player.0,
                ..Default::default()
            },
        });
    }

    for _ in 0..args.hostiles {
        if let Some(cell) = random_clear_cell(&world, &mut rng) {
            world.spawn_unit("tank", hostile, cell);
        }
    }

    let search = GridPathSearch::new();
    let mut routes: BTreeMap<UnitId, Vec<Cell>> = BTreeMap::new();

    for tick in 0..args.ticks {
        let mut orders: Vec<Order> = Vec::new();

        for slot in &mut slots {
            let mut ctx = BotContext {
                world: &world,
                resources: Some(&world),
                pathfinder: &search,
                orders: &mut orders,
                production: &mut slot.production,
            };
            for event in slot.bot.tick(&mut ctx) {
                record_event(&mut slot.summary, &event);
            }
        }

        for order in orders {
            if let Some(route) = plan_route(&world, &search, &order) {
                world.set_idle(order.subject, false)?;
                routes.insert(order.subject, route);
            }
        }

        advance_routes(&mut world, &mut routes)?;
        drain_resources(&mut world, &config, &slots);
        run_production(&mut world, &mut slots, tick);
    }

    let mut summary = RunSummary {
        seed,
        ticks: args.ticks,
        resources_remaining: world.resources,
        players: Vec::new(),
    };
    for mut slot in slots {
        slot.summary.tracked_harvesters = slot.bot.tracked_count();
        slot.summary.deployed_structures =
            world.count_owned(slot.bot.player(), &config.deployed_types);
        summary.players.push(slot.summary);
    }

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Seed: {}  Ticks: {}", summary.seed, summary.ticks);
        println!("Resources remaining: {}", summary.resources_remaining);
        for p in &summary.players {
            println!(
                "Player {}: {} tracked, {} deployed, {} orders, {} failed searches, {} requests",
                p.player,
                p.tracked_harvesters,
                p.deployed_structures,
                p.deploy_orders,
                p.failed_searches,
                p.production_requests
            );
        }
    }

    Ok(())
}

fn record_event(summary: &mut PlayerSummary, event: &BotEvent) {
    match event {
        BotEvent::DeployOrdered { .. } => summary.deploy_orders += 1,
        BotEvent::SearchFailed { .. } => summary.failed_searches += 1,
        BotEvent::ProductionRequested { .. } => summary.production_requests += 1,
        _ => {}
    }
}

/// Path from the ordered unit to the order target, without the start cell
fn plan_route(world: &SandboxWorld, search: &GridPathSearch, order: &Order) -> Option<Vec<Cell>> {
    let unit = world.unit(order.subject)?;
    let locomotor = world.movement_profile(&unit.unit_type)?;
    let target = order.target;
    let is_goal = move |c: Cell| c == target;
    let no_cost = |_: Cell| 0.0;
    let request = SearchRequest {
        start: unit.cell,
        locomotor: &locomotor,
        blocked_by: BlockedBy::Immovable,
        is_goal: &is_goal,
        custom_cost: &no_cost,
    };
    let path = search.find_path(world, &request);
    if path.is_empty() {
        return None;
    }
    Some(path.into_iter().skip(1).collect())
}

/// Move each routed unit one cell; deploy on arrival
fn advance_routes(
    world: &mut SandboxWorld,
    routes: &mut BTreeMap<UnitId, Vec<Cell>>,
) -> Result<()> {
    let mut arrived = Vec::new();
    for (id, route) in routes.iter_mut() {
        if world.get_unit(*id).map_or(true, |u| !u.alive) {
            arrived.push(*id);
            continue;
        }
        if route.is_empty() {
            arrived.push(*id);
        } else {
            let next = route.remove(0);
            world.move_unit(*id, next)?;
        }
    }

    for id in arrived {
        routes.remove(&id);
        if world.get_unit(id).is_some_and(|u| u.alive) {
            match world.deploy(id)? {
                Some(structure) => tracing::debug!("Unit {:?} deployed into {:?}", id, structure),
                None => {
                    tracing::debug!("Unit {:?} could not deploy on arrival", id);
                    world.set_idle(id, true)?;
                }
            }
        }
    }
    Ok(())
}

/// Each deployed structure extracts one resource unit per tick
fn drain_resources(world: &mut SandboxWorld, config: &HarvesterBotConfig, slots: &[Slot]) {
    let extracting: usize = slots
        .iter()
        .map(|s| world.count_owned(s.bot.player(), &config.deployed_types))
        .sum();
    world.resources = world.resources.saturating_sub(extracting as u32);
}

/// Finish production requests after `BUILD_TICKS` and spawn the unit at home
fn run_production(world: &mut SandboxWorld, slots: &mut [Slot], tick: u64) {
    for slot in slots.iter_mut() {
        match slot.build_done_at {
            None if slot.production.pending_count() > 0 => {
                slot.build_done_at = Some(tick + BUILD_TICKS);
            }
            Some(done) if tick >= done => {
                if let Some(unit_type) = slot.production.complete_next() {
                    let id = world.spawn_unit(&unit_type, slot.bot.player(), slot.home);
                    tracing::debug!("Produced {} {:?} for {:?}", unit_type, id, slot.bot.player());
                }
                slot.build_done_at = None;
            }
            _ => {}
        }
    }
}
