//! Assembled board state and its textual record.

use crate::grid::GridSquare;
use serde::{Deserialize, Serialize};

/// Everything the solver needs to reconstruct one board: its dimensions,
/// the advertised mine total, the already-opened starting square and the
/// detected mine squares.
///
/// `mines` keeps detection order (strongest match first) and is not sorted
/// spatially. Its length normally equals `mine_count`; a shortfall is
/// surfaced as an integrity warning by the detector, never hidden here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDescriptor {
    pub width: i32,
    pub height: i32,
    pub mine_count: u32,
    pub start_square: Option<GridSquare>,
    pub mines: Vec<GridSquare>,
}

impl BoardDescriptor {
    /// Render the line-oriented record consumed by the solver.
    ///
    /// One `key: value` pair per line, squares as `(x, y)` tuples and the
    /// mine list in bracket notation (`[]` when empty). A missing starting
    /// square renders as `None`. The field order is part of the format.
    pub fn render_record(&self) -> String {
        let start = match self.start_square {
            Some(square) => square.to_string(),
            None => "None".to_string(),
        };
        let mines = self
            .mines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Board Width: {}\nBoard Height: {}\nNumber of Mines: {}\nStarting Square: {}\nMines: [{}]\n",
            self.width, self.height, self.mine_count, start, mines
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_full_record() {
        let board = BoardDescriptor {
            width: 30,
            height: 16,
            mine_count: 3,
            start_square: Some(GridSquare::new(12, 4)),
            mines: vec![
                GridSquare::new(0, 15),
                GridSquare::new(5, 12),
                GridSquare::new(29, 0),
            ],
        };
        assert_eq!(
            board.render_record(),
            "Board Width: 30\n\
             Board Height: 16\n\
             Number of Mines: 3\n\
             Starting Square: (12, 4)\n\
             Mines: [(0, 15), (5, 12), (29, 0)]\n"
        );
    }

    #[test]
    fn renders_empty_mine_list_as_bare_brackets() {
        let board = BoardDescriptor {
            width: 30,
            height: 16,
            mine_count: 99,
            start_square: Some(GridSquare::new(0, 0)),
            mines: vec![],
        };
        assert!(board.render_record().contains("Mines: []\n"));
    }

    #[test]
    fn renders_missing_start_square_as_none() {
        let board = BoardDescriptor {
            width: 30,
            height: 20,
            mine_count: 130,
            start_square: None,
            mines: vec![GridSquare::new(1, 1)],
        };
        assert!(board.render_record().contains("Starting Square: None\n"));
    }

    #[test]
    fn single_mine_has_no_trailing_separator() {
        let board = BoardDescriptor {
            width: 30,
            height: 16,
            mine_count: 1,
            start_square: None,
            mines: vec![GridSquare::new(7, 3)],
        };
        assert!(board.render_record().contains("Mines: [(7, 3)]\n"));
    }

    #[test]
    fn preserves_mine_order() {
        let board = BoardDescriptor {
            width: 30,
            height: 16,
            mine_count: 2,
            start_square: None,
            mines: vec![GridSquare::new(9, 9), GridSquare::new(1, 1)],
        };
        // Detection order, not spatial order.
        assert!(board.render_record().contains("Mines: [(9, 9), (1, 1)]\n"));
    }
}
