use log::debug;
use rand::Rng;

use crate::board::Board;
use crate::builder::{BuildFailure, LevelBuilder};
use crate::evaluate::evaluate;
use crate::hint::locate_hint;
use crate::location::Location;

/// What became of a rotate request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RotateOutcome {
    /// The cell is an endpoint, off the board, or the level is already solved; nothing changed.
    Locked,
    /// The cell turned a quarter clockwise. `solved` tells whether that connected start to end.
    Rotated {
        /// Whether start and end are now connected.
        solved: bool,
    },
}

/// One generated board being played.
///
/// The level is checked for a connection when created, since scrambling may leave it connected already,
/// and after every rotation. Once solved, every cell is locked.
#[derive(Clone, Debug)]
pub struct Level {
    board: Board,
    solved: bool,
}

impl Level {
    pub(crate) fn new(board: Board) -> Self {
        let solved = evaluate(&board).reaches(board.end());
        Self { board, solved }
    }

    /// The board in play, for rendering.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Whether the current rotations connect start to end.
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Turn the cell at `location` a quarter clockwise and re-check the connection.
    pub fn rotate(&mut self, location: Location) -> RotateOutcome {
        if self.solved {
            return RotateOutcome::Locked;
        }
        let Some(cell) = self.board.cell_at_mut(location) else {
            return RotateOutcome::Locked;
        };
        if cell.kind.is_endpoint() {
            return RotateOutcome::Locked;
        }

        cell.rotate();
        self.solved = evaluate(&self.board).reaches(self.board.end());
        if self.solved {
            debug!("solved by rotating {}", location);
        }

        RotateOutcome::Rotated { solved: self.solved }
    }

    /// See [`locate_hint`].
    pub fn hint(&self) -> Vec<Location> {
        locate_hint(&self.board)
    }
}

/// A player's session: the randomness source, the level configuration, the level in play and the hint toggle.
pub struct Session<R: Rng> {
    rng: R,
    builder: LevelBuilder,
    level: Level,
    hints: bool,
}

impl<R: Rng> Session<R> {
    /// Start a session with a first level built from `builder`.
    pub fn new(builder: LevelBuilder, mut rng: R) -> Result<Self, BuildFailure> {
        let level = builder.build(&mut rng)?;
        Ok(Self { rng, builder, level, hints: false })
    }

    /// Discard the current level and build a fresh one.
    ///
    /// On failure the current level stays in play.
    pub fn new_level(&mut self) -> Result<&Level, BuildFailure> {
        self.level = self.builder.build(&mut self.rng)?;
        Ok(&self.level)
    }

    /// The level in play.
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// See [`Level::rotate`].
    pub fn rotate(&mut self, location: Location) -> RotateOutcome {
        self.level.rotate(location)
    }

    /// Whether the level in play is solved.
    pub fn is_solved(&self) -> bool {
        self.level.is_solved()
    }

    /// Show or hide the hint path.
    pub fn set_hints(&mut self, enabled: bool) {
        self.hints = enabled;
    }

    /// Whether hints are shown.
    pub fn hints(&self) -> bool {
        self.hints
    }

    /// The hint path while hints are enabled; empty otherwise.
    pub fn visible_hint(&self) -> Vec<Location> {
        match self.hints {
            true => self.level.hint(),
            false => Vec::new(),
        }
    }
}
