//! Seeded sandbox map generation for the headless runner

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::HarvesterBotConfig;
use crate::core::types::{Cell, CellOffset};
use crate::sandbox::SandboxWorld;
use crate::world::{DeployProfile, MovementProfile};

pub const CLEAR: &str = "clear";
pub const ROCK: &str = "rock";

/// Shape of a generated map
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub width: usize,
    pub height: usize,
    /// Number of resource patches
    pub patch_count: usize,
    /// Patch radius in cells
    pub patch_radius: i32,
    /// Chance per cell of impassable rock
    pub rock_frequency: f32,
    /// Resource units per patch cell
    pub resources_per_cell: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            patch_count: 6,
            patch_radius: 2,
            rock_frequency: 0.08,
            resources_per_cell: 50,
        }
    }
}

/// Locomotor given to every generated harvester type
pub fn harvester_locomotor(bot: &HarvesterBotConfig) -> MovementProfile {
    let mut profile = MovementProfile::new("wheeled").with_terrain(CLEAR, 1.0);
    for terrain in &bot.eligible_terrain {
        profile = profile.with_terrain(terrain.clone(), 1.0);
    }
    profile
}

/// Generate a map and register unit profiles for the bot's harvester types
pub fn generate_world(
    map: &MapConfig,
    bot: &HarvesterBotConfig,
    rng: &mut ChaCha8Rng,
) -> SandboxWorld {
    let mut world = SandboxWorld::new(map.width, map.height, CLEAR);

    for y in 0..map.height as i32 {
        for x in 0..map.width as i32 {
            if rng.gen::<f32>() < map.rock_frequency {
                world.set_terrain(Cell::new(x, y), ROCK);
            }
        }
    }

    // Resource terrain is the first eligible type in sorted order so maps
    // are stable for a given seed
    let mut eligible: Vec<&String> = bot.eligible_terrain.iter().collect();
    eligible.sort();
    let resource_terrain = eligible.first().map(|t| t.as_str()).unwrap_or("resources");

    let mut patch_cells = 0u32;
    for _ in 0..map.patch_count {
        let center = Cell::new(
            rng.gen_range(0..map.width as i32),
            rng.gen_range(0..map.height as i32),
        );
        for dy in -map.patch_radius..=map.patch_radius {
            for dx in -map.patch_radius..=map.patch_radius {
                let cell = center + CellOffset::new(dx, dy);
                if cell.x >= 0
                    && cell.y >= 0
                    && (cell.x as usize) < map.width
                    && (cell.y as usize) < map.height
                    && dx * dx + dy * dy <= map.patch_radius * map.patch_radius
                {
                    world.set_terrain(cell, resource_terrain);
                    patch_cells += 1;
                }
            }
        }
    }
    world.resources = patch_cells * map.resources_per_cell;

    let mut deployed: Vec<&String> = bot.deployed_types.iter().collect();
    deployed.sort();
    if let Some(into_type) = deployed.first() {
        for unit_type in &bot.deployable_types {
            world.add_movement_profile(unit_type, harvester_locomotor(bot));
            world.add_deploy_profile(
                unit_type,
                DeployProfile {
                    into_type: (*into_type).clone(),
                    offset: CellOffset::default(),
                },
            );
        }
    }

    world
}

/// A random cell whose terrain is passable clear ground
pub fn random_clear_cell(world: &SandboxWorld, rng: &mut ChaCha8Rng) -> Option<Cell> {
    let clear: Vec<Cell> = world.cells_with_terrain(CLEAR).collect();
    if clear.is_empty() {
        return None;
    }
    Some(clear[rng.gen_range(0..clear.len())])
}
