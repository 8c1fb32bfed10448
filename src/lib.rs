//! Harvester Bot - keeps resource harvesters deployed on safe patches

pub mod bot;
pub mod core;
pub mod pathfinding;
pub mod sandbox;
pub mod spatial;
pub mod world;
