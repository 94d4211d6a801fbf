//! # Minigame Rules
//!
//! Value types and pure rules for the story minigames: arena geometry and
//! stroke scoring, session entities, difficulty and damage mechanics, and the
//! tuning that balances them. This crate holds no timers and no session state;
//! the engines in `minigame_core` build on it.

pub mod config;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod mechanics;

pub use config::*;
pub use entities::*;
pub use error::*;
pub use geometry::*;
pub use mechanics::*;
