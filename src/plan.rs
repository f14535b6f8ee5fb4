use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use log::{debug, trace, warn};
use petgraph::graphmap::UnGraphMap;
use rand::seq::SliceRandom;
use rand::Rng;
use unordered_pair::UnorderedPair;

use crate::board::{grid_graph, Board};
use crate::location::{Dimension, Location};
use crate::shape::Direction;
use crate::solver::{GenerationFailure, LinkSolver};

/// The planned fate of the connection between two adjacent cells.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum Link {
    Open,
    Joined,
    Severed,
}

// a cell that can no longer meet its degree limits
#[derive(Copy, Clone, Debug)]
struct Contradiction(Location);

/// Canonical identity of the link between `a` and `b`, lower location first.
pub(crate) fn pair(a: Location, b: Location) -> UnorderedPair<Location> {
    UnorderedPair::from((a.min(b), a.max(b)))
}

/// Staged connections for a board under construction.
///
/// Every link between adjacent cells is a single edge, so a joined link is always mutual.
/// Nothing reaches a [`Board`] until [`apply`](LinkPlan::apply) commits the whole plan at once.
///
/// Degree limits: an endpoint takes exactly one link; a pipe takes at most three and at least its floor.
/// The floor is two unless endpoints and the board edge leave the pipe fewer linkable neighbors than that.
pub(crate) struct LinkPlan {
    graph: UnGraphMap<Location, Link>,
    endpoints: [Location; 2],
    // the base path and the endpoint seals, which completion must keep
    fixed: HashMap<UnorderedPair<Location>, Link>,
    floors: HashMap<Location, usize>,
}

impl LinkPlan {
    pub(crate) fn new(dims: (Dimension, Dimension), start: Location, end: Location) -> Self {
        Self {
            graph: grid_graph(dims, Link::Open),
            endpoints: [start, end],
            fixed: HashMap::new(),
            floors: HashMap::new(),
        }
    }

    pub(crate) fn is_endpoint(&self, location: Location) -> bool {
        self.endpoints.contains(&location)
    }

    pub(crate) fn cap(&self, location: Location) -> usize {
        match self.is_endpoint(location) {
            true => 1,
            false => 3,
        }
    }

    pub(crate) fn floor(&self, location: Location) -> usize {
        match self.is_endpoint(location) {
            true => 1,
            false => self.floors.get(&location).copied().unwrap_or(2),
        }
    }

    pub(crate) fn locations(&self) -> impl Iterator<Item=Location> + '_ {
        self.graph.nodes()
    }

    pub(crate) fn links(&self) -> impl Iterator<Item=(Location, Location, Link)> + '_ {
        self.graph.all_edges().map(|(a, b, link)| (a, b, *link))
    }

    pub(crate) fn fixed(&self) -> &HashMap<UnorderedPair<Location>, Link> {
        &self.fixed
    }

    pub(crate) fn state(&self, a: Location, b: Location) -> Option<Link> {
        self.graph.edge_weight(a, b).copied()
    }

    /// Neighbors of `location` together with the state of the link toward each.
    pub(crate) fn incident(&self, location: Location) -> Vec<(Location, Link)> {
        self.graph.edges(location)
            .map(|(n1, n2, link)| (if n1 == location { n2 } else { n1 }, *link))
            .collect_vec()
    }

    fn count(&self, location: Location, state: Link) -> usize {
        self.graph.edges(location).filter(|(_, _, link)| **link == state).count()
    }

    fn neighbors_with(&self, location: Location, state: Link) -> Vec<Location> {
        self.incident(location).into_iter()
            .filter(|(_, link)| *link == state)
            .map(|(other, _)| other)
            .collect_vec()
    }

    pub(crate) fn degree(&self, location: Location) -> usize {
        self.count(location, Link::Joined)
    }

    pub(crate) fn set(&mut self, a: Location, b: Location, state: Link) {
        if let Some(link) = self.graph.edge_weight_mut(a, b) {
            *link = state;
        }
    }

    fn fix(&mut self, a: Location, b: Location, state: Link) {
        self.set(a, b, state);
        self.fixed.insert(pair(a, b), state);
    }

    /// Join every consecutive pair of `path`. Non-adjacent pairs, which only a degenerate path holds, are skipped.
    pub(crate) fn lay_path(&mut self, path: &[Location]) {
        for (a, b) in path.iter().tuple_windows() {
            match self.state(*a, *b) {
                Some(_) => self.fix(*a, *b, Link::Joined),
                None => warn!("path steps from {} to {}, which are not adjacent", a, b),
            }
        }
    }

    /// Seal `endpoint` so that its only link leads to its neighbor along `path`.
    ///
    /// If no path neighbor is adjacent, the first in-bounds neighbor in clockwise order from up is used instead.
    pub(crate) fn constrain_endpoint(&mut self, endpoint: Location, path: &[Location]) {
        let incident = self.incident(endpoint);
        let along_path = path.iter().position(|location| *location == endpoint)
            .into_iter()
            .flat_map(|index| [index.checked_sub(1), Some(index + 1)])
            .flatten()
            .filter_map(|index| path.get(index).copied())
            .find(|location| incident.iter().any(|(other, _)| other == location));

        let keep = along_path.or_else(|| {
            let arbitrary = incident.iter()
                .map(|(other, _)| *other)
                .min_by_key(|other| Direction::direction_to(endpoint, *other));
            warn!("endpoint {} has no adjacent path neighbor, linking {:?} instead", endpoint, arbitrary);
            arbitrary
        });

        for (other, _) in incident {
            match Some(other) == keep {
                true => self.fix(endpoint, other, Link::Joined),
                false => self.fix(endpoint, other, Link::Severed),
            }
        }
    }

    /// Pipes that can never reach two links: too few neighbors are still open or joined toward them.
    pub(crate) fn boxed_cells(&self) -> Vec<Location> {
        self.locations()
            .filter(|location| !self.is_endpoint(*location))
            .filter(|location| self.count(*location, Link::Joined) + self.count(*location, Link::Open) < 2)
            .collect_vec()
    }

    /// Decide every open link so that all degree limits hold.
    ///
    /// Cells are visited in random order. Each keeps the links already joined toward it and picks a target degree,
    /// three with probability `junction_chance` (or when three links are already forced) and two otherwise,
    /// then joins random open links until it gets there and severs the rest.
    /// Constraint propagation runs after every decision; should greedy planning still paint itself into a corner,
    /// the plan is completed by a SAT solver instead.
    pub(crate) fn fill<R: Rng + ?Sized>(&mut self, rng: &mut R, junction_chance: f64) -> Result<(), GenerationFailure> {
        self.floors = self.locations()
            .filter(|location| !self.is_endpoint(*location))
            .map(|location| (location, (self.count(location, Link::Joined) + self.count(location, Link::Open)).min(2)))
            .collect();

        if let Err(Contradiction(location)) = self.plan_greedily(rng, junction_chance) {
            debug!("greedy planning stuck at {}, completing with the solver", location);
            self.complete()?;
        }

        Ok(())
    }

    fn plan_greedily<R: Rng + ?Sized>(&mut self, rng: &mut R, junction_chance: f64) -> Result<(), Contradiction> {
        self.propagate(self.locations().collect_vec())?;

        let mut order = self.locations().collect_vec();
        order.shuffle(rng);

        for location in order {
            if self.is_endpoint(location) {
                continue;
            }

            let forced = self.degree(location);
            let target = match forced >= 3 || rng.gen_bool(junction_chance) {
                true => 3,
                false => 2,
            };

            let mut candidates = self.neighbors_with(location, Link::Open);
            candidates.shuffle(rng);
            for other in candidates {
                if self.degree(location) >= target {
                    break;
                }
                // propagation may already have decided this one
                if self.state(location, other) != Some(Link::Open) {
                    continue;
                }

                trace!("join {} and {}", location, other);
                self.set(location, other, Link::Joined);
                self.propagate(vec![location, other])?;
            }

            for other in self.neighbors_with(location, Link::Open) {
                if self.state(location, other) != Some(Link::Open) {
                    continue;
                }

                trace!("sever {} and {}", location, other);
                self.set(location, other, Link::Severed);
                self.propagate(vec![location, other])?;
            }
        }

        self.check()
    }

    // apply forced moves until nothing changes:
    // a cell at its cap severs every open link, a cell that needs every open link joins them all
    fn propagate(&mut self, mut queue: Vec<Location>) -> Result<(), Contradiction> {
        let mut queued: HashSet<Location> = queue.iter().copied().collect();

        while let Some(location) = queue.pop() {
            queued.remove(&location);

            let joined = self.count(location, Link::Joined);
            let open = self.count(location, Link::Open);
            if joined > self.cap(location) || joined + open < self.floor(location) {
                return Err(Contradiction(location));
            }
            if open == 0 {
                continue;
            }

            let settle = if joined == self.cap(location) {
                Link::Severed
            } else if joined + open == self.floor(location) {
                Link::Joined
            } else {
                continue;
            };

            for other in self.neighbors_with(location, Link::Open) {
                trace!("{} forces {:?} toward {}", location, settle, other);
                self.set(location, other, settle);
                if queued.insert(other) {
                    queue.push(other);
                }
            }
        }

        Ok(())
    }

    fn check(&self) -> Result<(), Contradiction> {
        match self.locations().find(|location| {
            let degree = self.degree(*location);
            self.count(*location, Link::Open) > 0 || degree > self.cap(*location) || degree < self.floor(*location)
        }) {
            Some(location) => Err(Contradiction(location)),
            None => Ok(()),
        }
    }

    /// Decide every link with the SAT solver, keeping only the fixed ones from before.
    pub(crate) fn complete(&mut self) -> Result<(), GenerationFailure> {
        let solution = LinkSolver::from(&*self).solve()?;

        let decided = self.links()
            .map(|(a, b, _)| {
                let joined = solution.get(&pair(a, b)).copied().unwrap_or(false);
                (a, b, if joined { Link::Joined } else { Link::Severed })
            })
            .collect_vec();
        decided.into_iter().for_each(|(a, b, state)| self.set(a, b, state));

        self.check().map_err(|_| GenerationFailure::NoModel)
    }

    /// Commit every joined link to `board`, both directions at once.
    pub(crate) fn apply(&self, board: &mut Board) {
        for (a, b, link) in self.links() {
            if link == Link::Joined {
                board.link(a, b);
            }
        }
    }
}
