use serde::{Deserialize, Serialize};

use crate::{core::Coord, engine::world::World};

/// Actor positions and score after one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub pacmen: Vec<Coord>,
    pub ghosts: Vec<Coord>,
    pub fruit: Vec<Coord>,
    pub time_remaining: u32,
    pub score: u32,
}

impl Frame {
    fn capture<W>(world: &W) -> Self
    where
        W: World + ?Sized,
    {
        Self {
            pacmen: world.pacman_coords().to_vec(),
            ghosts: world.ghost_coords().to_vec(),
            fruit: world.fruit_coords().iter().copied().collect(),
            time_remaining: world.time_remaining(),
            score: world.score(),
        }
    }
}

/// Tick-by-tick playback record of one game.
///
/// The first frame is the starting position; each subsequent frame is the
/// world after one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub width: i32,
    pub height: i32,
    pub walls: Vec<Coord>,
    pub pills: Vec<Coord>,
    pub frames: Vec<Frame>,
}

impl Transcript {
    /// Starts a transcript from the world's initial layout.
    #[must_use]
    pub fn start<W>(world: &W) -> Self
    where
        W: World + ?Sized,
    {
        Self {
            width: world.width(),
            height: world.height(),
            walls: world.wall_coords().iter().copied().collect(),
            pills: world.pill_coords().iter().copied().collect(),
            frames: vec![Frame::capture(world)],
        }
    }

    pub fn record<W>(&mut self, world: &W)
    where
        W: World + ?Sized,
    {
        self.frames.push(Frame::capture(world));
    }

    /// Score of the last recorded frame.
    #[must_use]
    pub fn final_score(&self) -> u32 {
        self.frames.last().map_or(0, |f| f.score)
    }
}
