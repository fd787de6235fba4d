//! Game world simulation and its read-only views.
//!
//! - [`World`] - The simulation capability controllers play against
//! - [`GpacWorld`] - Grid world with walls, pills, fruit, pac-men and ghosts
//! - [`GameState`] - Borrowed per-tick snapshot handed to controllers
//! - [`GhostController`] - Ghost movement policy
//! - [`Transcript`] - Per-tick playback record
//!
//! # Game Flow
//!
//! 1. Build a [`GpacWorld`] from a [`GpacWorldConfig`] and a random source
//! 2. Each tick, roll for fruit and snapshot the world
//! 3. Ask controllers for pac-man and ghost directions, then apply them
//! 4. Advance the clock, consume pills and fruit, update the score
//! 5. Repeat until the game is over (time exhausted, all pills eaten, or caught)

pub use self::{game_state::*, ghost::*, gpac_world::*, transcript::*, world::*};

mod game_state;
mod ghost;
mod gpac_world;
mod transcript;
mod world;
