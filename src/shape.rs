//! Directions and the connection sets cells expose.

use std::fmt::{Debug, Formatter};

use itertools::Itertools;
use strum::VariantArray;

use crate::location::{Dimension, Location};

/// One of the four sides of a square cell.
///
/// Variants are declared in clockwise order starting from [`Up`](Direction::Up), so that a quarter turn
/// clockwise moves one step forward through [`VARIANTS`](VariantArray::VARIANTS).
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Direction {
    /// Toward row 0.
    Up,
    /// Toward higher columns.
    Right,
    /// Toward higher rows.
    Down,
    /// Toward column 0.
    Left,
}

impl Direction {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Attempt the step from `location` in the direction specified by `self` and return the resultant [`Location`].
    ///
    /// The result is not bounds-checked; see [`Self::step_within`].
    pub fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((0, 1)),
            Self::Down => location.offset_by((1, 0)),
            Self::Left => location.offset_by((0, -1)),
        }
    }

    /// Step from `location`, returning [`None`] if the destination is off a board of `dims`.
    pub fn step_within(&self, location: Location, dims: (Dimension, Dimension)) -> Option<Location> {
        Some(self.attempt_from(location)).filter(|dest| dest.within(dims))
    }

    /// Invert the direction specified by `self`.
    pub fn invert(&self) -> Self {
        self.rotated(2)
    }

    /// Turn `self` clockwise by `turns` quarter turns.
    pub fn rotated(&self, turns: u8) -> Self {
        Self::VARIANTS[(self.index() + turns as usize) % Self::VARIANTS.len()]
    }

    /// Determine the direction from `a` to `b`, or [`None`] if they are not orthogonally adjacent.
    pub fn direction_to(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().find(|dir| dir.attempt_from(a) == b).copied()
    }

    /// All in-bounds neighbors of `location`, in [`VARIANTS`](VariantArray::VARIANTS) order.
    pub fn neighbors_of(location: Location, dims: (Dimension, Dimension)) -> Vec<(Self, Location)> {
        Self::VARIANTS.iter()
            .filter_map(|dir| dir.step_within(location, dims).map(|dest| (*dir, dest)))
            .collect_vec()
    }
}

/// The set of sides a cell exposes a pipe toward.
///
/// Stored as a four bit mask, one bit per [`Direction`].
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Connections(u8);

impl Connections {
    /// No connections at all.
    pub const NONE: Self = Self(0);

    #[inline]
    fn bit(direction: Direction) -> u8 {
        1 << direction.index()
    }

    /// Whether a pipe leaves toward `direction`.
    pub fn contains(&self, direction: Direction) -> bool {
        self.0 & Self::bit(direction) != 0
    }

    /// Add `direction`, returning whether it was absent before.
    pub fn insert(&mut self, direction: Direction) -> bool {
        let absent = !self.contains(direction);
        self.0 |= Self::bit(direction);
        absent
    }

    /// Remove `direction`, returning whether it was present before.
    pub fn remove(&mut self, direction: Direction) -> bool {
        let present = self.contains(direction);
        self.0 &= !Self::bit(direction);
        present
    }

    /// The degree of the cell holding these connections.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether no pipe leaves at all.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate in Up, Right, Down, Left order.
    pub fn iter(&self) -> impl Iterator<Item=Direction> + '_ {
        Direction::VARIANTS.iter().copied().filter(move |dir| self.contains(*dir))
    }

    /// Turn every connection clockwise by `turns` quarter turns.
    pub fn rotated(&self, turns: u8) -> Self {
        self.iter().map(|dir| dir.rotated(turns)).collect()
    }

    /// The raw mask, bit `n` set for the `n`th direction in clockwise order from [`Direction::Up`].
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// The box-drawing glyph for a pipe joint with these exits.
    pub fn glyph(&self) -> char {
        // indexed by mask: Up = 1, Right = 2, Down = 4, Left = 8
        const GLYPHS: [char; 16] = [
            '·', '╵', '╶', '└', '╷', '│', '┌', '├',
            '╴', '┘', '─', '┴', '┐', '┤', '┬', '┼',
        ];
        GLYPHS[self.0 as usize]
    }
}

impl FromIterator<Direction> for Connections {
    fn from_iter<T: IntoIterator<Item=Direction>>(iter: T) -> Self {
        let mut connections = Self::NONE;
        iter.into_iter().for_each(|dir| { connections.insert(dir); });
        connections
    }
}

impl<const N: usize> From<[Direction; N]> for Connections {
    fn from(value: [Direction; N]) -> Self {
        value.into_iter().collect()
    }
}

impl Debug for Connections {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
