//! Simulation core for a side-scrolling platform shooter.
//!
//! The library owns every rule of the game and nothing else: the binary
//! samples keys, calls [`compute::tick`] once per logical step, and renders
//! the resulting [`compute::Snapshot`].

pub mod ai;
pub mod camera;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod level;
pub mod physics;
pub mod weapon;
