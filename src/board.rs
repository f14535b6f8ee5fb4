use std::fmt::{Display, Formatter};

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use rand::Rng;

use crate::cell::{Cell, CellKind, FrozenCell};
use crate::evaluate;
use crate::location::{Dimension, Location};
use crate::shape::Direction;

/// Ways a board can break the rules every freshly generated level must obey.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    /// A cell exposes a connection the neighbor on that side does not return.
    #[error("{from} links toward {to}, which does not link back")]
    DanglingLink {
        /// The cell exposing the connection.
        from: Location,
        /// The neighbor it points at.
        to: Location,
    },
    /// A cell exposes a connection toward the outside of the board.
    #[error("{location} links {direction:?}, off the board")]
    OffGrid {
        /// The offending cell.
        location: Location,
        /// The side facing off the board.
        direction: Direction,
    },
    /// A start or end cell with other than exactly one connection.
    #[error("endpoint {location} has {degree} connections")]
    EndpointDegree {
        /// The offending endpoint.
        location: Location,
        /// How many connections it has.
        degree: usize,
    },
    /// A pipe cell with more than three connections, or fewer than two when two were reachable.
    #[error("pipe {location} has {degree} connections")]
    PipeDegree {
        /// The offending pipe.
        location: Location,
        /// How many connections it has.
        degree: usize,
    },
    /// The unrotated network does not connect start to end.
    #[error("no unrotated path leads from start to end")]
    Unsolvable,
}

/// A board of rotatable pipe cells with one start and one end.
///
/// Boards are generated with a [`LevelBuilder`](crate::LevelBuilder) and played through a [`Level`](crate::Level).
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) cells: Array2<Cell>,
    // rows, cols
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) start: Location,
    pub(crate) end: Location,
}

impl Board {
    /// A board with no connections and every rotation at zero.
    pub(crate) fn new(dims: (Dimension, Dimension), start: Location, end: Location) -> Self {
        let mut cells = Array2::from_shape_simple_fn((dims.0.get(), dims.1.get()), Cell::default);
        cells[start.as_index()].kind = CellKind::Start;
        cells[end.as_index()].kind = CellKind::End;

        Self { cells, dims, start, end }
    }

    /// `(rows, cols)`.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// The start cell.
    pub fn start(&self) -> Location {
        self.start
    }

    /// The end cell.
    pub fn end(&self) -> Location {
        self.end
    }

    pub(crate) fn cell_at(&self, location: Location) -> Option<&Cell> {
        self.cells.get(location.as_index())
    }

    pub(crate) fn cell_at_mut(&mut self, location: Location) -> Option<&mut Cell> {
        self.cells.get_mut(location.as_index())
    }

    /// The neighbor of `location` in `direction`, or [`None`] if that is off the board.
    pub fn step(&self, location: Location, direction: Direction) -> Option<Location> {
        direction.step_within(location, self.dims)
    }

    /// A frozen view of the cell at `location`, if it is on the board.
    pub fn view(&self, location: Location) -> Option<FrozenCell> {
        self.cell_at(location).map(|cell| FrozenCell::new(location, cell))
    }

    /// Freeze every cell for a renderer, indexed by `(row, col)`.
    pub fn freeze(&self) -> Array2<FrozenCell> {
        Array2::from_shape_fn(self.cells.raw_dim(), |index| FrozenCell::new(Location::from(index), &self.cells[index]))
    }

    /// Join two adjacent cells in both directions. Does nothing if they are not adjacent.
    pub(crate) fn link(&mut self, a: Location, b: Location) {
        let Some(direction) = Direction::direction_to(a, b) else {
            return;
        };
        if !a.within(self.dims) || !b.within(self.dims) {
            return;
        }

        self.cells[a.as_index()].base.insert(direction);
        self.cells[b.as_index()].base.insert(direction.invert());
    }

    /// Give every pipe a uniformly random rotation; endpoints are reset to zero.
    pub(crate) fn scramble<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in self.cells.iter_mut() {
            cell.rotation = match cell.kind.is_endpoint() {
                true => 0,
                false => rng.gen_range(0..4),
            };
        }
    }

    // pipes next to `location` plus endpoints already pointing at it
    fn linkable_neighbors(&self, location: Location) -> usize {
        Direction::neighbors_of(location, self.dims).into_iter()
            .filter(|(dir, neighbor)| {
                let cell = &self.cells[neighbor.as_index()];
                !cell.kind.is_endpoint() || cell.base.contains(dir.invert())
            })
            .count()
    }

    /// Check the invariants every freshly generated board obeys, returning the first violation found.
    ///
    /// A pipe cell is held to at least two connections only when at least two of its neighbors could link to it.
    pub fn audit(&self) -> Result<(), InvariantViolation> {
        for (index, cell) in self.cells.indexed_iter() {
            let location = Location::from(index);

            for direction in cell.base.iter() {
                let Some(neighbor) = self.step(location, direction) else {
                    return Err(InvariantViolation::OffGrid { location, direction });
                };
                if !self.cells[neighbor.as_index()].base.contains(direction.invert()) {
                    return Err(InvariantViolation::DanglingLink { from: location, to: neighbor });
                }
            }

            let degree = cell.base.len();
            if cell.kind.is_endpoint() {
                if degree != 1 {
                    return Err(InvariantViolation::EndpointDegree { location, degree });
                }
            } else if degree > 3 || degree < self.linkable_neighbors(location).min(2) {
                return Err(InvariantViolation::PipeDegree { location, degree });
            }
        }

        match evaluate::base_trace(self).reaches(self.end) {
            true => Ok(()),
            false => Err(InvariantViolation::Unsolvable),
        }
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let frozen = self.freeze();
        let mut out = String::with_capacity(frozen.len() + frozen.nrows());

        for row in frozen.rows() {
            for cell in row {
                out.push(cell.display());
            }
            out.push('\n');
        }

        write!(f, "{}", out)
    }
}

/// The full orthogonal adjacency graph of a board of `dims`, every edge starting out as `weight`.
pub(crate) fn grid_graph<E: Copy>(dims: (Dimension, Dimension), weight: E) -> UnGraphMap<Location, E> {
    let (rows, cols) = (dims.0.get(), dims.1.get());
    let mut graph = UnGraphMap::with_capacity(
        rows * cols,
        // "horizontal" edges
        (cols - 1) * rows
            // "vertical" edges
            + (rows - 1) * cols,
    );

    for row in 0..rows {
        for col in 0..cols {
            let location = Location(row, col);
            graph.add_node(location);
            // add edges down and to the right, if possible
            for direction in [Direction::Down, Direction::Right] {
                if let Some(other) = direction.step_within(location, dims) {
                    graph.add_edge(location, other, weight);
                }
            }
        }
    }

    graph
}
