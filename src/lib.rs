//! pokeduel - roster battles against the CPU
//!
//! The library exposes the battle core and the presentation modules so they
//! can be exercised from integration tests.

pub mod action;
pub mod battle;
pub mod catalog;
pub mod config;
pub mod creature;
pub mod effect;
pub mod error;
pub mod logging;
pub mod persist;
pub mod reducer;
pub mod roster;
pub mod state;
pub mod ui;
