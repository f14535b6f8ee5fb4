use std::collections::HashSet;

use log::{error, trace, warn};
use petgraph::algo::astar;
use rand::seq::SliceRandom;
use rand::Rng;
use strum::VariantArray;

use crate::board::grid_graph;
use crate::location::{Dimension, Location};
use crate::shape::Direction;

// one level of the depth-first search: where we are and which ways are left to try
struct Frame {
    location: Location,
    untried: Vec<Direction>,
}

impl Frame {
    fn enter<R: Rng + ?Sized>(location: Location, rng: &mut R) -> Self {
        let mut untried = Direction::VARIANTS.to_vec();
        untried.shuffle(rng);
        Self { location, untried }
    }
}

/// Randomized depth-first search from `start` to `end` with an explicit stack.
///
/// A cell is visited at most once, even after it is backtracked out of, so the search touches each cell once.
pub(crate) fn random_walk<R: Rng + ?Sized>(
    dims: (Dimension, Dimension),
    start: Location,
    end: Location,
    rng: &mut R,
) -> Option<Vec<Location>> {
    let mut visited = HashSet::from([start]);
    let mut stack = vec![Frame::enter(start, rng)];

    while let Some(top) = stack.last_mut() {
        if top.location == end {
            return Some(stack.iter().map(|frame| frame.location).collect());
        }

        match top.untried.pop() {
            Some(direction) => {
                let Some(next) = direction.step_within(top.location, dims) else {
                    continue;
                };
                if visited.insert(next) {
                    trace!("walk {:?} into {}", direction, next);
                    stack.push(Frame::enter(next, rng));
                }
            }
            None => {
                trace!("backtrack out of {}", top.location);
                stack.pop();
            }
        }
    }

    None
}

/// Breadth-first shortest path over the full grid.
pub(crate) fn shortest_path(dims: (Dimension, Dimension), start: Location, end: Location) -> Option<Vec<Location>> {
    if !start.within(dims) || !end.within(dims) {
        return None;
    }

    let graph = grid_graph(dims, ());
    // unit weights and no heuristic make this a plain breadth-first search
    astar(&graph, start, |location| location == end, |_| 1usize, |_| 0)
        .map(|(_, path)| path)
}

/// Produce a random simple path of orthogonally adjacent cells from `start` to `end`.
///
/// Falls back to a shortest path, and as a last resort to the two endpoints alone.
/// Neither fallback fires on a well formed grid.
pub(crate) fn generate_path<R: Rng + ?Sized>(
    dims: (Dimension, Dimension),
    start: Location,
    end: Location,
    rng: &mut R,
) -> Vec<Location> {
    random_walk(dims, start, end, rng)
        .or_else(|| {
            warn!("random walk from {} never reached {}, falling back to a shortest path", start, end);
            shortest_path(dims, start, end)
        })
        .unwrap_or_else(|| {
            error!("no path from {} to {} exists on a {}x{} grid", start, end, dims.0, dims.1);
            vec![start, end]
        })
}
