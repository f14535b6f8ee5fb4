use log::{debug, warn};

use crate::board::Board;
use crate::evaluate::{base_trace, evaluate};
use crate::location::Location;

/// The cells to highlight as a hint, in start-to-end order.
///
/// If the board is already connected, this is the live path through the current rotations.
/// Otherwise it is the path the unrotated network guarantees, which the player may steer toward.
/// Empty only if that guarantee was broken during generation.
pub fn locate_hint(board: &Board) -> Vec<Location> {
    if let Some(path) = evaluate(board).path_to(board.end) {
        return path;
    }

    debug!("end unreachable as rotated, hinting the unrotated path");
    base_trace(board).path_to(board.end).unwrap_or_else(|| {
        warn!("no unrotated path from {} to {}", board.start, board.end);
        Vec::new()
    })
}
