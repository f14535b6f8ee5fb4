//! Level configuration and generation.

use std::num::NonZero;

use log::debug;
use rand::Rng;

use crate::board::Board;
use crate::level::Level;
use crate::location::{Dimension, Location};
use crate::path::generate_path;
use crate::plan::LinkPlan;

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BuilderInvalidReason {
    /// Either side of the board is shorter than two cells.
    #[error("boards need at least two rows and two columns")]
    DimsTooSmall,
    /// An endpoint was placed outside the bounds specified by `dims` on a builder.
    #[error("endpoint lies outside the board")]
    FeatureOutOfBounds,
    /// The start and end were placed on the same cell.
    #[error("start and end must be distinct cells")]
    EndpointsCoincide,
    /// The junction chance is not a probability.
    #[error("junction chance must lie within [0, 1]")]
    JunctionChanceOutOfRange,
    /// Generation was allowed zero attempts.
    #[error("at least one generation attempt is required")]
    NoAttempts,
}

/// Reasons [`LevelBuilder::build`] may fail.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BuildFailure {
    /// The builder is in an invalid state; the reasons explain why.
    #[error("invalid builder: {0:?}")]
    Invalid(Vec<BuilderInvalidReason>),
    /// No attempt produced a board meeting every invariant.
    #[error("no valid board after {attempts} attempts")]
    Exhausted {
        /// How many attempts were made.
        attempts: usize,
    },
}

/// Builds [`Level`]s: picks endpoints, lays a guaranteed path between them, fills in the rest of the network
/// and scrambles the rotations.
///
/// Builders mutate themselves while configuring but can be [`Clone`]d to save their state at some point.
/// The randomness source is passed to [`build`](Self::build), so a seeded generator reproduces a level exactly.
#[derive(Clone, Debug)]
pub struct LevelBuilder {
    // rows, cols
    dims: (Dimension, Dimension),
    endpoints: Option<(Location, Location)>,
    junction_chance: f64,
    attempts: usize,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl Default for LevelBuilder {
    fn default() -> Self {
        Self::with_dims((NonZero::new(6).unwrap(), NonZero::new(6).unwrap()))
    }
}

impl LevelBuilder {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(rows, cols)` order.
    ///
    /// Causes a [`DimsTooSmall`](BuilderInvalidReason::DimsTooSmall) invalid state if either is below two.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        let mut invalid_reasons = Vec::new();
        if dims.0.get() < 2 || dims.1.get() < 2 {
            invalid_reasons.push(BuilderInvalidReason::DimsTooSmall);
        }

        Self {
            dims,
            endpoints: None,
            junction_chance: 0.3,
            attempts: 64,
            invalid_reasons,
        }
    }

    /// `(rows, cols)` of every level this builds.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// Pin the start and end cells instead of picking them at random for every level.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state
    /// if either location is out of bounds, or [`EndpointsCoincide`](BuilderInvalidReason::EndpointsCoincide) if they are equal.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn endpoints(&mut self, start: Location, end: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !start.within(self.dims) || !end.within(self.dims) {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return self;
        }
        if start == end {
            self.invalid_reasons.push(BuilderInvalidReason::EndpointsCoincide);
            return self;
        }

        self.endpoints = Some((start, end));
        self
    }

    /// The probability that a cell with fewer than three forced links aims for three links rather than two.
    ///
    /// Defaults to `0.3`. Values outside `[0, 1]` cause a [`JunctionChanceOutOfRange`](BuilderInvalidReason::JunctionChanceOutOfRange) invalid state.
    pub fn junction_chance(&mut self, chance: f64) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !(0.0..=1.0).contains(&chance) {
            self.invalid_reasons.push(BuilderInvalidReason::JunctionChanceOutOfRange);
            return self;
        }

        self.junction_chance = chance;
        self
    }

    /// How many paths (and, with random endpoints, placements) to try before giving up. Defaults to 64.
    pub fn attempts(&mut self, attempts: usize) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if attempts == 0 {
            self.invalid_reasons.push(BuilderInvalidReason::NoAttempts);
            return self;
        }

        self.attempts = attempts;
        self
    }

    /// Check the validity of this builder, ensuring no [`BuilderInvalidReason`] condition has arisen.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    fn pick_endpoints<R: Rng + ?Sized>(&self, rng: &mut R) -> (Location, Location) {
        let (rows, cols) = (self.dims.0.get(), self.dims.1.get());
        let cells = rows * cols;

        let start = rng.gen_range(0..cells);
        // skip over the start so the two never coincide
        let mut end = rng.gen_range(0..cells - 1);
        if end >= start {
            end += 1;
        }

        (Location(start / cols, start % cols), Location(end / cols, end % cols))
    }

    /// Generate a fresh level, consuming randomness from `rng`.
    ///
    /// A path that would box a pipe in below two links is re-rolled, along with the endpoints unless they are pinned.
    /// Only the last attempt accepts one, which is unavoidable when every path between pinned endpoints boxes a pipe,
    /// as on a 2x2 board with diagonal endpoints.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Level, BuildFailure> {
        if !self.invalid_reasons.is_empty() {
            return Err(BuildFailure::Invalid(self.invalid_reasons.clone()));
        }

        for attempt in 1..=self.attempts {
            let (start, end) = match self.endpoints {
                Some(endpoints) => endpoints,
                None => self.pick_endpoints(rng),
            };

            let path = generate_path(self.dims, start, end, rng);
            debug!("attempt {}: path of {} cells from {} to {}", attempt, path.len(), start, end);

            let mut plan = LinkPlan::new(self.dims, start, end);
            plan.lay_path(&path);
            plan.constrain_endpoint(start, &path);
            plan.constrain_endpoint(end, &path);

            let boxed = plan.boxed_cells();
            if !boxed.is_empty() {
                debug!("attempt {}: {} pipe(s) boxed in, first at {}", attempt, boxed.len(), boxed[0]);
                if attempt < self.attempts {
                    continue;
                }
            }

            if let Err(failure) = plan.fill(rng, self.junction_chance) {
                debug!("attempt {}: {}", attempt, failure);
                continue;
            }

            let mut board = Board::new(self.dims, start, end);
            plan.apply(&mut board);
            debug_assert_eq!(board.audit(), Ok(()));
            board.scramble(rng);

            return Ok(Level::new(board));
        }

        Err(BuildFailure::Exhausted { attempts: self.attempts })
    }
}
