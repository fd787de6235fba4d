use serde::{Deserialize, Serialize};

/// A cell on the game grid.
///
/// `x` grows to the right and `y` grows upwards, so the top-left cell of a
/// `width × height` grid is `(0, height - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("({x}, {y})")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate reached by moving one cell in `direction`.
    ///
    /// The result may lie outside the grid; legality is the world's concern.
    #[must_use]
    pub const fn moved(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance between two cells.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonal neighbours, in `UP`, `DOWN`, `LEFT`, `RIGHT` order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 4] {
        Direction::MOVES.map(|d| self.moved(d))
    }
}

impl Serialize for Coord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "x,y" (e.g., "3,17")
        serializer.serialize_str(&format!("{},{}", self.x, self.y))
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let (x, y) = s.split_once(',').ok_or_else(|| {
            serde::de::Error::custom(format!("expected format 'x,y', got '{s}'"))
        })?;
        let x = x
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid x coordinate '{x}': {e}")))?;
        let y = y
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid y coordinate '{y}': {e}")))?;
        Ok(Self { x, y })
    }
}

/// A movement choice for a single actor during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Every choice available to an actor, in the fixed evaluation order.
    ///
    /// Move selection relies on this order for tie-breaking.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
    ];

    /// The choices that actually change position.
    pub const MOVES: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    const fn delta(self) -> (i32, i32) {
        match self {
            Self::None => (0, 0),
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}
