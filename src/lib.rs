#![warn(missing_docs)]

//! # `pipewright`
//!
//! A generator and evaluator for rotation-based pipe connection puzzles.
//! A board is a grid of pipe joints, each exposing pipes on some of its four sides. Two cells are the start and the end.
//! Every other cell is scrambled to a random rotation, and the player turns cells a quarter at a time until
//! the pipes lead from start to end.
//!
//! Configure a [`LevelBuilder`], then call [`build()`](LevelBuilder::build) with any [`rand::Rng`] to get a [`Level`].
//! Play it with [`rotate()`](Level::rotate) and ask for a [`hint()`](Level::hint) along the way.
//! A [`Session`] bundles the randomness source, the configuration and the level in play.
//!
//! # Internals
//! Generation guarantees a solution before anything is scrambled:
//!
//! 1. A randomized depth-first search lays a simple path from start to end.
//! Each endpoint is sealed to exactly one link, toward its neighbor along that path.
//! 2. Every other link between adjacent cells is planned on a graph whose edges are open, joined or severed.
//! Cells are visited in random order and join random open links until they reach two, or sometimes three, links;
//! constraint propagation after every decision keeps each pipe between two and three links.
//! If greedy planning still runs into a dead end, the links are handed to a SAT solver with the path assumed,
//! one variable per link and cardinality clauses per cell.
//! 3. The finished plan is committed to the board in one go. Because a link is a single edge in the plan,
//! every connection on the board is mutual and no cell ever passes through an invalid intermediate state.
//! 4. Every pipe gets a random rotation; endpoints stay unrotated.
//!
//! Connectivity is a breadth-first search from the start that crosses between two cells only when both expose,
//! as currently rotated, the sides facing one another.

pub use board::{Board, InvariantViolation};
pub use builder::{BuildFailure, BuilderInvalidReason, LevelBuilder};
pub use cell::{CellKind, FrozenCell};
pub use evaluate::{base_trace, evaluate, Trace};
pub use hint::locate_hint;
pub use level::{Level, RotateOutcome, Session};
pub use location::{Dimension, Location};
pub use shape::{Connections, Direction};
pub use solver::GenerationFailure;

pub(crate) mod board;
pub mod builder;
pub(crate) mod cell;
pub(crate) mod evaluate;
pub(crate) mod hint;
pub(crate) mod level;
pub(crate) mod location;
pub(crate) mod logic;
pub(crate) mod path;
pub(crate) mod plan;
pub mod shape;
pub(crate) mod solver;
mod tests;
#[cfg(feature = "wasm")]
pub mod wasm;
