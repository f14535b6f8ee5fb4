//! Bindings for a browser front-end.

use std::num::NonZero;

use js_sys::Array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::builder::{BuilderInvalidReason, LevelBuilder};
use crate::cell::CellKind;
use crate::level::{RotateOutcome, Session};
use crate::location::Location;

/// A pipe puzzle session for a browser front-end.
#[wasm_bindgen]
pub struct PipeGame {
    session: Session<StdRng>,
}

#[wasm_bindgen]
impl PipeGame {
    /// Start a session on a `rows` by `cols` board with a first level ready.
    #[wasm_bindgen(constructor)]
    pub fn new(rows: usize, cols: usize) -> Result<PipeGame, JsError> {
        let (Some(rows), Some(cols)) = (NonZero::new(rows), NonZero::new(cols)) else {
            return Err(BuilderInvalidReason::DimsTooSmall.into());
        };

        let session = Session::new(LevelBuilder::with_dims((rows, cols)), StdRng::from_entropy())?;
        Ok(Self { session })
    }

    /// Replace the level in play with a fresh one.
    #[wasm_bindgen(js_name = newLevel)]
    pub fn new_level(&mut self) -> Result<(), JsError> {
        self.session.new_level()?;
        Ok(())
    }

    /// Returns whether the cell turned.
    pub fn rotate(&mut self, row: usize, col: usize) -> bool {
        matches!(self.session.rotate(Location(row, col)), RotateOutcome::Rotated { .. })
    }

    /// Whether the level in play is solved, and therefore locked.
    pub fn solved(&self) -> bool {
        self.session.is_solved()
    }

    #[wasm_bindgen(js_name = setHints)]
    pub fn set_hints(&mut self, enabled: bool) {
        self.session.set_hints(enabled);
    }

    /// One byte per cell in row-major order: unrotated exits in the low nibble, then bit 4 for the start and bit 5 for the end.
    pub fn cells(&self) -> Vec<u8> {
        self.session.level().board().freeze().iter()
            .map(|cell| cell.base.bits() | match cell.kind {
                CellKind::Start => 1 << 4,
                CellKind::End => 1 << 5,
                CellKind::Pipe => 0,
            })
            .collect()
    }

    /// One byte per cell in row-major order: quarter turns clockwise to draw the cell with.
    pub fn rotations(&self) -> Vec<u8> {
        self.session.level().board().freeze().iter().map(|cell| cell.rotation).collect()
    }

    /// The visible hint as an array of `[row, col]` pairs, start first.
    pub fn hint(&self) -> Array {
        self.session.visible_hint().into_iter()
            .map(|Location(row, col)| Array::of2(&JsValue::from(row), &JsValue::from(col)))
            .collect()
    }
}
