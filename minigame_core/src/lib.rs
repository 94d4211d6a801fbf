//! # Minigame Core
//!
//! Real-time engines for the story minigames and the session host that runs
//! them. A scene choice becomes a [`SessionHandle`]; the host pumps it from a
//! [`Clock`], feeds it queued input and receives exactly one
//! [`minigame_rules::MinigameResult`] when it ends.
//!
//! ## Core Components
//!
//! - **scheduler**: Frame and countdown ticks driven by an injectable clock
//! - **duel**: Turn-based gesture duel against an opponent
//! - **repair**: Tool-matching repair puzzle under a countdown
//! - **infiltration**: Top-down stealth run past patrolling guards
//! - **session**: The host contract and the completion callback
//! - **events**: Input types accepted by the engines

pub mod duel;
pub mod events;
pub mod infiltration;
pub mod repair;
pub mod scheduler;
pub mod session;

pub use duel::*;
pub use events::*;
pub use infiltration::*;
pub use repair::*;
pub use scheduler::*;
pub use session::*;
