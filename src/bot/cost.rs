//! Hostile-proximity cost for candidate cells
//!
//! Each hostile within the avoidance radius adds `radius - distance`,
//! so a hostile standing on the cell costs the full radius and one at the
//! edge costs nothing. The result is added to the path search's cumulative
//! cost: dangerous cells are avoided when something cheaper exists but are
//! never excluded outright.

use crate::core::types::{Cell, PlayerId, Vec2};
use crate::world::{Relationship, WorldQuery};

/// Penalty from a single hostile at `distance`
#[inline]
pub fn falloff(distance: f32, radius: f32) -> f32 {
    (radius - distance).max(0.0)
}

/// Sum of falloff penalties from hostiles at the given positions
pub fn penalty(candidate: Cell, hostiles: impl IntoIterator<Item = Vec2>, radius: f32) -> f32 {
    let center = candidate.center();
    hostiles
        .into_iter()
        .map(|pos| falloff(center.distance(&pos), radius))
        .sum()
}

/// Penalty of `candidate` from living units of players hostile to `player`
pub fn hostile_penalty(
    world: &dyn WorldQuery,
    player: PlayerId,
    candidate: Cell,
    radius: f32,
) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }

    let hostiles = world
        .units_in_radius(candidate.center(), radius)
        .into_iter()
        .filter(|u| u.alive && world.relationship(player, u.owner) == Relationship::Enemy)
        .map(|u| u.position);

    penalty(candidate, hostiles, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::SandboxWorld;
    use proptest::prelude::*;

    const ME: PlayerId = PlayerId(1);
    const ENEMY: PlayerId = PlayerId(2);
    const NEUTRAL: PlayerId = PlayerId(3);

    fn world() -> SandboxWorld {
        let mut world = SandboxWorld::new(20, 20, "clear");
        world.set_relationship(ME, ENEMY, Relationship::Enemy);
        world
    }

    #[test]
    fn test_no_hostiles_no_penalty() {
        let world = world();
        assert_eq!(hostile_penalty(&world, ME, Cell::new(5, 5), 3.0), 0.0);
    }

    #[test]
    fn test_hostile_on_cell_costs_full_radius() {
        let mut world = world();
        world.spawn_unit("tank", ENEMY, Cell::new(5, 5));
        assert_eq!(hostile_penalty(&world, ME, Cell::new(5, 5), 3.0), 3.0);
    }

    #[test]
    fn test_only_enemies_count() {
        let mut world = world();
        world.spawn_unit("tank", ME, Cell::new(5, 5));
        world.spawn_unit("tank", NEUTRAL, Cell::new(5, 5));
        assert_eq!(hostile_penalty(&world, ME, Cell::new(5, 5), 3.0), 0.0);
    }

    #[test]
    fn test_dead_enemies_ignored() {
        let mut world = world();
        let tank = world.spawn_unit("tank", ENEMY, Cell::new(5, 5));
        world.kill(tank).unwrap();
        assert_eq!(hostile_penalty(&world, ME, Cell::new(5, 5), 3.0), 0.0);
    }

    #[test]
    fn test_penalty_decays_linearly() {
        let mut world = world();
        world.spawn_unit("tank", ENEMY, Cell::new(7, 5));
        let p = hostile_penalty(&world, ME, Cell::new(5, 5), 3.0);
        assert!((p - 1.0).abs() < 1e-5);
        assert_eq!(hostile_penalty(&world, ME, Cell::new(2, 5), 3.0), 0.0);
    }

    #[test]
    fn test_zero_radius_disables_avoidance() {
        let mut world = world();
        world.spawn_unit("tank", ENEMY, Cell::new(5, 5));
        assert_eq!(hostile_penalty(&world, ME, Cell::new(5, 5), 0.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_falloff_non_increasing(
            a in 0.0f32..50.0,
            b in 0.0f32..50.0,
            radius in 0.0f32..20.0,
        ) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(falloff(near, radius) >= falloff(far, radius));
        }

        #[test]
        fn prop_falloff_zero_beyond_radius(radius in 0.0f32..20.0, extra in 0.0f32..20.0) {
            prop_assert_eq!(falloff(radius + extra, radius), 0.0);
        }

        #[test]
        fn prop_coincident_hostiles_scale_linearly(
            k in 1usize..8,
            dx in -4.0f32..4.0,
            dy in -4.0f32..4.0,
            radius in 0.5f32..10.0,
        ) {
            let cell = Cell::new(10, 10);
            let center = cell.center();
            let pos = Vec2::new(center.x + dx, center.y + dy);

            let single = penalty(cell, [pos], radius);
            let many = penalty(cell, std::iter::repeat(pos).take(k), radius);
            prop_assert!((many - single * k as f32).abs() <= 1e-3 * k as f32);
        }
    }
}
