//! Grid primitives shared by the world and the controllers.

pub use self::coord::*;

mod coord;
