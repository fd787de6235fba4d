//! Grid world simulation for the GPac game.
//!
//! This crate provides the game collaborators that the evolved controllers play
//! against:
//!
//! - [`core`] - Grid coordinates and movement directions
//! - [`engine`] - The [`World`] capability, the concrete [`GpacWorld`], the
//!   read-only [`GameState`] snapshot, ghost policies, and playback transcripts
//!
//! # Example
//!
//! ```
//! use gpac_engine::{GameState, GpacWorldConfig, World as _};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let config = GpacWorldConfig {
//!     width: 10,
//!     height: 10,
//!     pill_density: 0.5,
//!     wall_density: 0.1,
//!     fruit_spawn_probability: 0.01,
//!     fruit_score: 10,
//!     time_multiplier: 2,
//!     pacmen: 1,
//!     ghosts: 3,
//! };
//! let mut rng = Pcg32::seed_from_u64(7);
//! let world = config.build(&mut rng);
//! let state = GameState::snapshot(&world);
//! assert_eq!(state.pacman_coords().len(), 1);
//! assert!(!world.check_game_over());
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
