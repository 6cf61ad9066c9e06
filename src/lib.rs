//! PokéArena - Pokédex browser and battle arena built on tui-dispatch
//!
//! The library exposes every module so the binary and the integration tests
//! share one implementation.

pub mod action;
pub mod api;
pub mod battle;
pub mod catalog;
pub mod effect;
pub mod error;
pub mod evolution;
pub mod logging;
pub mod lookup;
pub mod palette;
pub mod pokemon;
pub mod prefs;
pub mod reducer;
pub mod state;
pub mod ui;
