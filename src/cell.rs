use crate::location::Location;
use crate::shape::Connections;

/// What a cell is for. Exactly one [`Start`](CellKind::Start) and one [`End`](CellKind::End) exist per board.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CellKind {
    /// Where the flow enters.
    Start,
    /// Where the flow must arrive.
    End,
    /// An ordinary rotatable joint.
    #[default]
    Pipe,
}

impl CellKind {
    /// Endpoints are never rotated and always expose exactly one connection.
    pub fn is_endpoint(&self) -> bool {
        matches!(self, Self::Start | Self::End)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Cell {
    pub(crate) kind: CellKind,
    // exits when unrotated
    pub(crate) base: Connections,
    // quarter turns clockwise, 0..4
    pub(crate) rotation: u8,
}

impl Cell {
    pub(crate) fn effective(&self) -> Connections {
        self.base.rotated(self.rotation)
    }

    pub(crate) fn rotate(&mut self) {
        self.rotation = (self.rotation + 1) % 4;
    }
}

/// Cells, frozen for output or printing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrozenCell {
    /// Where this cell sits.
    pub location: Location,
    /// Exits as currently rotated.
    pub exits: Connections,
    /// Exits when unrotated.
    pub base: Connections,
    /// Quarter turns clockwise applied to `base`, in `0..4`.
    pub rotation: u8,
    /// Start, end or pipe.
    pub kind: CellKind,
}

impl FrozenCell {
    pub(crate) fn new(location: Location, cell: &Cell) -> Self {
        Self {
            location,
            exits: cell.effective(),
            base: cell.base,
            rotation: cell.rotation,
            kind: cell.kind,
        }
    }

    /// The character used when printing a board.
    pub fn display(&self) -> char {
        match self.kind {
            CellKind::Start => 'S',
            CellKind::End => 'E',
            CellKind::Pipe => self.exits.glyph(),
        }
    }
}
