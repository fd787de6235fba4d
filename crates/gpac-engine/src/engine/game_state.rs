use std::collections::BTreeSet;

use crate::{core::Coord, engine::world::World};

/// Read-only view of a world at the start of a tick.
///
/// Controllers score hypothetical positions against this view. It borrows the
/// world, so every decision for a tick is made before any actor moves.
#[derive(Debug, Clone, Copy)]
pub struct GameState<'a> {
    pacman_coords: &'a [Coord],
    ghost_coords: &'a [Coord],
    pill_coords: &'a BTreeSet<Coord>,
    fruit_coords: &'a BTreeSet<Coord>,
    wall_coords: &'a BTreeSet<Coord>,
}

impl<'a> GameState<'a> {
    #[must_use]
    pub fn new(
        pacman_coords: &'a [Coord],
        ghost_coords: &'a [Coord],
        pill_coords: &'a BTreeSet<Coord>,
        fruit_coords: &'a BTreeSet<Coord>,
        wall_coords: &'a BTreeSet<Coord>,
    ) -> Self {
        Self {
            pacman_coords,
            ghost_coords,
            pill_coords,
            fruit_coords,
            wall_coords,
        }
    }

    #[must_use]
    pub fn snapshot<W>(world: &'a W) -> Self
    where
        W: World + ?Sized,
    {
        Self::new(
            world.pacman_coords(),
            world.ghost_coords(),
            world.pill_coords(),
            world.fruit_coords(),
            world.wall_coords(),
        )
    }

    #[must_use]
    pub fn pacman_coords(&self) -> &'a [Coord] {
        self.pacman_coords
    }

    #[must_use]
    pub fn ghost_coords(&self) -> &'a [Coord] {
        self.ghost_coords
    }

    #[must_use]
    pub fn pill_coords(&self) -> &'a BTreeSet<Coord> {
        self.pill_coords
    }

    #[must_use]
    pub fn fruit_coords(&self) -> &'a BTreeSet<Coord> {
        self.fruit_coords
    }

    #[must_use]
    pub fn wall_coords(&self) -> &'a BTreeSet<Coord> {
        self.wall_coords
    }

    /// Distance from `coord` to the closest ghost, `None` if there are no ghosts.
    #[must_use]
    pub fn nearest_ghost_distance(&self, coord: Coord) -> Option<u32> {
        nearest_distance(coord, self.ghost_coords)
    }

    /// Distance from `coord` to the closest pill, `None` if all pills are eaten.
    #[must_use]
    pub fn nearest_pill_distance(&self, coord: Coord) -> Option<u32> {
        nearest_distance(coord, self.pill_coords)
    }

    /// Distance from `coord` to the closest fruit, `None` if no fruit is present.
    #[must_use]
    pub fn nearest_fruit_distance(&self, coord: Coord) -> Option<u32> {
        nearest_distance(coord, self.fruit_coords)
    }

    /// Number of walls orthogonally adjacent to `coord`.
    #[must_use]
    pub fn adjacent_wall_count(&self, coord: Coord) -> usize {
        coord
            .neighbors()
            .iter()
            .filter(|c| self.wall_coords.contains(*c))
            .count()
    }
}

fn nearest_distance<'c, I>(coord: Coord, targets: I) -> Option<u32>
where
    I: IntoIterator<Item = &'c Coord>,
{
    targets.into_iter().map(|t| coord.manhattan(*t)).min()
}
