//! Genetic programming driver for evolving GPac state evaluators.
//!
//! # How Training Works
//!
//! 1. **Population** - `mu` individuals, each a fresh world plus a controller
//!    with a randomly grown expression tree
//! 2. **Evaluation** - each individual plays one game; its final score is its
//!    fitness
//! 3. **Parent Selection** - fitness-proportional or over-selection draws a
//!    parent pool with replacement
//! 4. **Recombination** - `lambda` children, each a copy of one parent with a
//!    subtree replaced by a copy of a subtree of another
//! 5. **Mutation** - a child's random subtree is regrown with some probability
//! 6. **Survival** - truncation or k-tournament picks `mu` survivors from the
//!    children (comma) or from parents and children (plus)
//! 7. **Repeat** - until the run's fitness evaluation budget is used up
//!
//! # Architecture
//!
//! ```text
//! GpDriver (evolutionary loop)
//!     ↓ evolves
//! Individual (world + PacmanController)
//!     ↓ plays
//! GpacWorld (gpac-engine)
//!     ↓ final score
//! Fitness
//!     ↓ reported to
//! RunObserver (log file, console)
//! ```
//!
//! See the [`driver`] module for the run cycle and an example.

pub mod config;
pub mod driver;
pub mod individual;
pub mod observer;
pub mod selection;
pub mod stats;
