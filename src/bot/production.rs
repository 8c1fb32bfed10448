//! Replacement harvester requests
//!
//! When fewer deployed structures exist than configured, ask production for
//! one more harvester unless a request for it is already outstanding.

use crate::core::config::HarvesterBotConfig;
use crate::core::types::PlayerId;
use crate::world::{ProductionControl, WorldQuery};

/// Living deployed structures owned by `player`
pub fn count_deployed(
    config: &HarvesterBotConfig,
    player: PlayerId,
    world: &dyn WorldQuery,
) -> usize {
    world
        .units()
        .iter()
        .filter(|u| u.alive && u.owner == player && config.deployed_types.contains(&u.unit_type))
        .count()
}

/// First deployable type the configured queue can build right now
fn buildable_type<'c>(
    config: &'c HarvesterBotConfig,
    production: &dyn ProductionControl,
) -> Option<&'c str> {
    config
        .deployable_types
        .iter()
        .find(|t| production.queue_can_build(&config.production_queue, t) == Some(true))
        .map(String::as_str)
}

/// Request a harvester if deployed structures are short.
///
/// Returns the requested unit type, or `None` when nothing was requested
/// (no queue, nothing buildable, requests disabled, enough structures, or
/// a request already pending).
pub fn evaluate<'c>(
    config: &'c HarvesterBotConfig,
    player: PlayerId,
    world: &dyn WorldQuery,
    production: &mut dyn ProductionControl,
) -> Option<&'c str> {
    let unit_type = buildable_type(config, production)?;

    if !production.requests_enabled() {
        return None;
    }

    let deployed = count_deployed(config, player, world);
    if deployed >= config.minimum_deployed || production.outstanding_requests(unit_type) > 0 {
        return None;
    }

    tracing::debug!(
        "Requesting {} from {}: {} deployed, {} required",
        unit_type,
        config.production_queue,
        deployed,
        config.minimum_deployed
    );
    production.request_unit(unit_type);
    Some(unit_type)
}
