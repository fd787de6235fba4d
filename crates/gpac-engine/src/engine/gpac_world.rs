use std::collections::{BTreeSet, VecDeque};

use rand::{Rng, seq::IteratorRandom as _, seq::SliceRandom as _};
use serde::{Deserialize, Serialize};

use crate::{
    core::{Coord, Direction},
    engine::world::World,
};

/// Invalid world parameter.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum WorldConfigError {
    #[display("world.{key} must be at least {min}, got {value}")]
    TooSmall {
        key: &'static str,
        min: u32,
        value: u32,
    },
    #[display("world.{key} must be a probability in [0, 1], got {value}")]
    NotProbability { key: &'static str, value: f64 },
    #[display("world.{key} is too large for a {width}x{height} world")]
    TooLarge {
        key: &'static str,
        width: u32,
        height: u32,
    },
}

/// Parameters for generating a [`GpacWorld`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpacWorldConfig {
    pub width: u32,
    pub height: u32,
    /// Chance that an open cell starts with a pill.
    pub pill_density: f64,
    /// Chance that a cell is turned into a wall (connectivity permitting).
    pub wall_density: f64,
    /// Per-tick chance of a fruit appearing while none is present.
    pub fruit_spawn_probability: f64,
    pub fruit_score: u32,
    /// Total ticks are `time_multiplier × width × height`.
    pub time_multiplier: u32,
    pub pacmen: u32,
    pub ghosts: u32,
}

impl GpacWorldConfig {
    pub fn validate(&self) -> Result<(), WorldConfigError> {
        let at_least = |key, min, value| {
            if value < min {
                Err(WorldConfigError::TooSmall { key, min, value })
            } else {
                Ok(())
            }
        };
        let probability = |key, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(WorldConfigError::NotProbability { key, value })
            }
        };
        at_least("width", 2, self.width)?;
        at_least("height", 2, self.height)?;
        at_least("time_multiplier", 1, self.time_multiplier)?;
        at_least("pacmen", 1, self.pacmen)?;
        probability("pill_density", self.pill_density)?;
        probability("wall_density", self.wall_density)?;
        probability("fruit_spawn_probability", self.fruit_spawn_probability)?;

        // scores are percentages of the pill count and of the tick count
        let too_large = |key| WorldConfigError::TooLarge {
            key,
            width: self.width,
            height: self.height,
        };
        let total_time = self
            .time_multiplier
            .checked_mul(self.width)
            .and_then(|t| t.checked_mul(self.height))
            .filter(|t| t.checked_mul(100).is_some())
            .ok_or_else(|| too_large("time_multiplier"))?;
        total_time
            .checked_mul(self.fruit_score)
            .and_then(|f| f.checked_add(200))
            .ok_or_else(|| too_large("fruit_score"))?;
        Ok(())
    }

    /// Generates a fresh random world.
    ///
    /// The config is expected to have passed [`Self::validate`].
    #[must_use]
    pub fn build<R>(&self, rng: &mut R) -> GpacWorld
    where
        R: Rng + ?Sized,
    {
        GpacWorld::generate(self, rng)
    }
}

/// The standard GPac grid world.
///
/// Pac-men start in the top-left cell and ghosts in the bottom-right cell.
/// Walls never disconnect the open cells, so every pill is reachable.
#[derive(Debug, Clone)]
pub struct GpacWorld {
    width: i32,
    height: i32,
    pacmen: Vec<Coord>,
    prev_pacmen: Vec<Coord>,
    ghosts: Vec<Coord>,
    prev_ghosts: Vec<Coord>,
    pills: BTreeSet<Coord>,
    fruit: BTreeSet<Coord>,
    walls: BTreeSet<Coord>,
    total_pills: u32,
    pills_eaten: u32,
    fruit_eaten: u32,
    fruit_spawn_probability: f64,
    fruit_score: u32,
    total_time: u32,
    time_remaining: u32,
    score: u32,
}

impl GpacWorld {
    #[expect(clippy::cast_possible_wrap)]
    fn generate<R>(config: &GpacWorldConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let width = config.width as i32;
        let height = config.height as i32;
        let pacman_start = Coord::new(0, height - 1);
        let ghost_start = Coord::new(width - 1, 0);

        let mut cells = (0..width)
            .flat_map(|x| (0..height).map(move |y| Coord::new(x, y)))
            .collect::<Vec<_>>();
        cells.shuffle(rng);

        let mut walls = BTreeSet::new();
        for &cell in &cells {
            if cell == pacman_start || cell == ghost_start {
                continue;
            }
            if !rng.random_bool(config.wall_density) {
                continue;
            }
            walls.insert(cell);
            if !is_connected(width, height, &walls, pacman_start) {
                walls.remove(&cell);
            }
        }

        let mut pills = cells
            .iter()
            .copied()
            .filter(|c| *c != pacman_start && !walls.contains(c))
            .filter(|_| rng.random_bool(config.pill_density))
            .collect::<BTreeSet<_>>();
        if pills.is_empty() {
            // the ghost start is always open, so a candidate exists
            let candidate = cells
                .iter()
                .copied()
                .filter(|c| *c != pacman_start && !walls.contains(c))
                .choose(rng)
                .unwrap_or(ghost_start);
            pills.insert(candidate);
        }

        let total_time = config.time_multiplier * config.width * config.height;
        let pacmen = vec![pacman_start; config.pacmen as usize];
        let ghosts = vec![ghost_start; config.ghosts as usize];
        log::trace!(
            "generated {width}x{height} world with {} walls and {} pills",
            walls.len(),
            pills.len()
        );

        #[expect(clippy::cast_possible_truncation)]
        let total_pills = pills.len() as u32;
        Self {
            width,
            height,
            prev_pacmen: pacmen.clone(),
            pacmen,
            prev_ghosts: ghosts.clone(),
            ghosts,
            pills,
            fruit: BTreeSet::new(),
            walls,
            total_pills,
            pills_eaten: 0,
            fruit_eaten: 0,
            fruit_spawn_probability: config.fruit_spawn_probability,
            fruit_score: config.fruit_score,
            total_time,
            time_remaining: total_time,
            score: 0,
        }
    }

    #[must_use]
    pub fn pills_eaten(&self) -> u32 {
        self.pills_eaten
    }

    #[must_use]
    pub fn fruit_eaten(&self) -> u32 {
        self.fruit_eaten
    }

    #[must_use]
    pub fn total_time(&self) -> u32 {
        self.total_time
    }

    /// Returns `true` if a pac-man shares a cell with a ghost or the two
    /// swapped cells during the last tick.
    #[must_use]
    pub fn is_pacman_caught(&self) -> bool {
        self.pacmen
            .iter()
            .zip(&self.prev_pacmen)
            .any(|(pacman, prev_pacman)| {
                self.ghosts
                    .iter()
                    .zip(&self.prev_ghosts)
                    .any(|(ghost, prev_ghost)| {
                        pacman == ghost || (pacman == prev_ghost && prev_pacman == ghost)
                    })
            })
    }

    fn step(&self, from: Coord, direction: Direction) -> Coord {
        let to = from.moved(direction);
        if self.is_legal_move(to) { to } else { from }
    }
}

impl World for GpacWorld {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn pacman_coords(&self) -> &[Coord] {
        &self.pacmen
    }

    fn ghost_coords(&self) -> &[Coord] {
        &self.ghosts
    }

    fn pill_coords(&self) -> &BTreeSet<Coord> {
        &self.pills
    }

    fn fruit_coords(&self) -> &BTreeSet<Coord> {
        &self.fruit
    }

    fn wall_coords(&self) -> &BTreeSet<Coord> {
        &self.walls
    }

    fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn move_pacmen(&mut self, directions: &[Direction]) {
        assert_eq!(
            directions.len(),
            self.pacmen.len(),
            "one direction per pac-man is required"
        );
        self.prev_pacmen.clone_from(&self.pacmen);
        for i in 0..self.pacmen.len() {
            self.pacmen[i] = self.step(self.pacmen[i], directions[i]);
        }
    }

    fn move_ghost(&mut self, id: usize, direction: Direction) {
        self.prev_ghosts[id] = self.ghosts[id];
        self.ghosts[id] = self.step(self.ghosts[id], direction);
    }

    fn randomly_spawn_fruit<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        if !self.fruit.is_empty() || !rng.random_bool(self.fruit_spawn_probability) {
            return;
        }
        let candidate = (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| Coord::new(x, y)))
            .filter(|c| {
                !self.walls.contains(c) && !self.pills.contains(c) && !self.pacmen.contains(c)
            })
            .choose(rng);
        if let Some(coord) = candidate {
            self.fruit.insert(coord);
        }
    }

    fn advance_clock(&mut self) {
        self.time_remaining = self.time_remaining.saturating_sub(1);
    }

    fn consume_items(&mut self) {
        for pacman in &self.pacmen {
            if self.pills.remove(pacman) {
                self.pills_eaten += 1;
            }
            if self.fruit.remove(pacman) {
                self.fruit_eaten += 1;
            }
        }
    }

    fn update_score(&mut self) {
        let mut score =
            100 * self.pills_eaten / self.total_pills + self.fruit_eaten * self.fruit_score;
        if self.pills.is_empty() {
            score += 100 * self.time_remaining / self.total_time;
        }
        self.score = score;
    }

    fn check_game_over(&self) -> bool {
        self.time_remaining == 0 || self.pills.is_empty() || self.is_pacman_caught()
    }
}

fn is_connected(width: i32, height: i32, walls: &BTreeSet<Coord>, start: Coord) -> bool {
    #[expect(clippy::cast_sign_loss)]
    let open_cells = (width * height) as usize - walls.len();
    let is_open =
        |c: Coord| (0..width).contains(&c.x) && (0..height).contains(&c.y) && !walls.contains(&c);

    let mut visited = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(coord) = queue.pop_front() {
        for next in coord.neighbors() {
            if is_open(next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited.len() == open_cells
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn config() -> GpacWorldConfig {
        GpacWorldConfig {
            width: 8,
            height: 6,
            pill_density: 0.5,
            wall_density: 0.3,
            fruit_spawn_probability: 1.0,
            fruit_score: 10,
            time_multiplier: 2,
            pacmen: 1,
            ghosts: 2,
        }
    }

    #[test]
    fn test_generated_world_is_connected_and_playable() {
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let world = config().build(&mut rng);
            assert!(is_connected(8, 6, world.wall_coords(), Coord::new(0, 5)));
            assert!(!world.pill_coords().is_empty());
            assert!(world.pill_coords().is_disjoint(world.wall_coords()));
            assert!(!world.pill_coords().contains(&Coord::new(0, 5)));
            assert_eq!(world.time_remaining(), 2 * 8 * 6);
            assert_eq!(world.pacman_coords(), &[Coord::new(0, 5)]);
            assert_eq!(world.ghost_coords(), &[Coord::new(7, 0); 2]);
            assert!(!world.check_game_over());
        }
    }

    #[test]
    fn test_illegal_moves_leave_actor_in_place() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut world = config().build(&mut rng);
        // top-left corner: up and left leave the grid
        world.move_pacmen(&[Direction::Up]);
        assert_eq!(world.pacman_coords(), &[Coord::new(0, 5)]);
        world.move_pacmen(&[Direction::Left]);
        assert_eq!(world.pacman_coords(), &[Coord::new(0, 5)]);
    }

    #[test]
    fn test_adjacent_coords_stay_in_grid() {
        let mut rng = Pcg32::seed_from_u64(7);
        let world = config().build(&mut rng);
        assert_eq!(world.adjacent_coords(Coord::new(0, 5)).len(), 2);
        assert_eq!(world.adjacent_coords(Coord::new(7, 2)).len(), 3);
        assert_eq!(world.adjacent_coords(Coord::new(3, 3)).len(), 4);
        assert!(!world.is_legal_move(Coord::new(8, 0)));
        assert!(!world.is_legal_move(Coord::new(0, -1)));
    }

    #[test]
    fn test_consuming_pills_updates_score() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut world = config().build(&mut rng);
        let pill = *world.pill_coords().first().unwrap();
        let total = world.pill_coords().len() as u32;
        world.pacmen[0] = pill;
        world.consume_items();
        world.update_score();
        assert_eq!(world.pills_eaten(), 1);
        assert_eq!(world.score(), 100 / total);
    }

    #[test]
    fn test_all_pills_eaten_awards_time_bonus_and_ends_game() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut world = config().build(&mut rng);
        let pills = world.pill_coords().iter().copied().collect::<Vec<_>>();
        for pill in pills {
            world.pacmen[0] = pill;
            world.consume_items();
        }
        world.advance_clock();
        world.update_score();
        let bonus = 100 * world.time_remaining() / world.total_time();
        assert_eq!(world.score(), 100 + bonus);
        assert!(world.check_game_over());
    }

    #[test]
    fn test_ghost_collision_and_swap_end_game() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut world = config().build(&mut rng);
        world.walls.clear();

        world.pacmen[0] = Coord::new(3, 3);
        world.ghosts[0] = Coord::new(4, 3);
        world.move_pacmen(&[Direction::Right]);
        world.move_ghost(0, Direction::Left);
        assert!(world.is_pacman_caught());

        world.pacmen[0] = Coord::new(1, 1);
        world.prev_pacmen[0] = Coord::new(1, 1);
        world.ghosts[0] = Coord::new(1, 1);
        assert!(world.check_game_over());
    }

    #[test]
    fn test_fruit_spawns_on_free_cell_once() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut world = config().build(&mut rng);
        world.randomly_spawn_fruit(&mut rng);
        world.randomly_spawn_fruit(&mut rng);
        assert!(world.fruit_coords().len() <= 1);
        for fruit in world.fruit_coords() {
            assert!(world.is_legal_move(*fruit));
            assert!(!world.pill_coords().contains(fruit));
        }
    }

    #[test]
    fn test_time_runs_out() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut world = config().build(&mut rng);
        for _ in 0..world.total_time() {
            world.advance_clock();
        }
        assert_eq!(world.time_remaining(), 0);
        assert!(world.check_game_over());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut c = config();
        c.width = 1;
        assert!(matches!(
            c.validate(),
            Err(WorldConfigError::TooSmall { key: "width", .. })
        ));
        let mut c = config();
        c.pill_density = 1.5;
        assert!(matches!(
            c.validate(),
            Err(WorldConfigError::NotProbability {
                key: "pill_density",
                ..
            })
        ));
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overflowing_tick_count() {
        let mut c = config();
        c.width = 10;
        c.height = 10;
        c.time_multiplier = 50_000_000;
        assert_eq!(
            c.validate(),
            Err(WorldConfigError::TooLarge {
                key: "time_multiplier",
                width: 10,
                height: 10
            })
        );

        // the tick count fits but the time bonus would not
        c.time_multiplier = 10_000_000;
        assert!(matches!(
            c.validate(),
            Err(WorldConfigError::TooLarge {
                key: "time_multiplier",
                ..
            })
        ));

        c.time_multiplier = 2;
        c.fruit_score = u32::MAX / 100;
        assert!(matches!(
            c.validate(),
            Err(WorldConfigError::TooLarge {
                key: "fruit_score",
                ..
            })
        ));

        c.fruit_score = 10;
        assert!(c.validate().is_ok());
        let mut rng = Pcg32::seed_from_u64(0);
        assert_eq!(c.build(&mut rng).time_remaining(), 2 * 10 * 10);
    }
}
