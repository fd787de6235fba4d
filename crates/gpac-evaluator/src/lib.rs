//! State evaluators for GPac: expression trees that score candidate moves.
//!
//! This crate implements the genome of the genetic programming system and the
//! controller that plays with it:
//!
//! 1. **Node Catalog** ([`node`]) - Function kinds (binary operators) and
//!    terminal kinds (distances, wall counts, constants) a tree is built from.
//!
//! 2. **Expression Tree** ([`tree`]) - Binary tree genome supporting random
//!    growth, breadth-first addressing, subtree replacement, and evaluation
//!    against a game state.
//!
//! 3. **Controller** ([`controller`]) - Owns one tree and picks, for every
//!    pac-man, the legal move whose resulting position scores highest.
//!
//! # Architecture
//!
//! ```text
//! PacmanController (select best move per pac-man)
//!     ↓ uses
//! ExpressionTree (score one hypothetical position)
//!     ↓ reads
//! GameState (distances, wall counts)
//! ```
//!
//! # Example
//!
//! ```
//! use gpac_engine::{GameState, GpacWorldConfig};
//! use gpac_evaluator::controller::{ControllerConfig, PacmanController};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let mut rng = Pcg32::seed_from_u64(3);
//! let world_config = GpacWorldConfig {
//!     width: 8,
//!     height: 8,
//!     pill_density: 0.5,
//!     wall_density: 0.1,
//!     fruit_spawn_probability: 0.0,
//!     fruit_score: 10,
//!     time_multiplier: 2,
//!     pacmen: 1,
//!     ghosts: 2,
//! };
//! let world = world_config.build(&mut rng);
//! let controller = PacmanController::random(ControllerConfig::default(), &mut rng);
//!
//! let state = GameState::snapshot(&world);
//! let moves = controller.best_moves(&world, &state, &mut rng);
//! assert_eq!(moves.len(), 1);
//! println!("{}", controller.visualize());
//! ```

pub mod controller;
pub mod node;
pub mod tree;
