use std::collections::{HashMap, HashSet, VecDeque};

use log::trace;

use crate::board::Board;
use crate::cell::Cell;
use crate::location::Location;
use crate::shape::Connections;

/// Everything reachable from the start cell, with the breadth-first parent of each reached cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trace {
    origin: Location,
    reached: HashSet<Location>,
    parents: HashMap<Location, Location>,
}

impl Trace {
    /// Whether the search reached `location`.
    pub fn reaches(&self, location: Location) -> bool {
        self.reached.contains(&location)
    }

    /// Every reached cell, the origin included.
    pub fn reached(&self) -> &HashSet<Location> {
        &self.reached
    }

    /// The cell that first discovered `location`. The origin has no parent.
    pub fn parent_of(&self, location: Location) -> Option<Location> {
        self.parents.get(&location).copied()
    }

    /// Walk parents back from `target`, returning the path in origin-to-target order.
    ///
    /// Returns [`None`] if `target` was not reached.
    pub fn path_to(&self, target: Location) -> Option<Vec<Location>> {
        if !self.reaches(target) {
            return None;
        }

        let mut path = vec![target];
        let mut cursor = target;
        while cursor != self.origin {
            cursor = self.parent_of(cursor)?;
            path.push(cursor);
        }
        path.reverse();

        Some(path)
    }
}

// an edge A -> B is traversable when A exposes d toward B and B exposes the inverse of d, both as seen through `view`
fn search(board: &Board, view: impl Fn(&Cell) -> Connections) -> Trace {
    let origin = board.start;
    let mut reached = HashSet::from([origin]);
    let mut parents = HashMap::new();
    let mut queue = VecDeque::from([origin]);

    while let Some(current) = queue.pop_front() {
        let Some(cell) = board.cell_at(current) else {
            continue;
        };

        for direction in view(cell).iter() {
            let Some(neighbor) = board.step(current, direction) else {
                continue;
            };
            let Some(neighbor_cell) = board.cell_at(neighbor) else {
                continue;
            };
            if !view(neighbor_cell).contains(direction.invert()) {
                continue;
            }

            if reached.insert(neighbor) {
                parents.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }
    }

    trace!("traced {} of {} cells from {}", reached.len(), board.cells.len(), origin);
    Trace { origin, reached, parents }
}

/// Search from the start cell along connections as currently rotated.
///
/// The board is solved exactly when the returned [`Trace`] reaches the end cell.
pub fn evaluate(board: &Board) -> Trace {
    search(board, Cell::effective)
}

/// Search from the start cell along unrotated connections, as if every rotation were zero.
pub fn base_trace(board: &Board) -> Trace {
    search(board, |cell| cell.base)
}
