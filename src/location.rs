use crate::constants::*;
use serde::*;

/// Convert a list coordinate to the engine-native board coordinate.
///
/// Pure arithmetic with no bounds checking: callers that may hold an
/// off-diamond coordinate must clip the result themselves (see
/// [`ListLocation::from_board`]). Signed math keeps off-diamond inputs from
/// wrapping.
pub fn list_to_board(row: i32, col: i32) -> (i32, i32) {
    let board_row = 27 - row;
    let board_col = if row < HALF_ROWS as i32 {
        13 + col - row
    } else {
        13 + col - board_row
    };
    (board_col, board_row)
}

/// Inverse of [`list_to_board`]. Same contract: pure, no bounds checking.
pub fn board_to_list(board_col: i32, board_row: i32) -> (i32, i32) {
    let row = 27 - board_row;
    let col = if row < HALF_ROWS as i32 {
        board_col - 13 + row
    } else {
        board_col - 13 + board_row
    };
    (row, col)
}

/// Engine-native diamond-grid address, packed into a `u16`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct BoardLocation {
    packed: u16,
}

impl BoardLocation {
    pub fn new(col: u8, row: u8) -> Self {
        BoardLocation {
            packed: ((col as u16) << 8) | row as u16,
        }
    }

    #[inline]
    pub fn col(self) -> u8 {
        ((self.packed >> 8) & 0xFF) as u8
    }

    #[inline]
    pub fn row(self) -> u8 {
        (self.packed & 0xFF) as u8
    }

    #[inline]
    pub fn packed_repr(self) -> u16 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u16) -> Self {
        BoardLocation { packed }
    }

    /// Chebyshev distance, the metric used for patch neighborhoods.
    pub fn distance_to(self, other: Self) -> u8 {
        let dc = (self.col() as i8) - (other.col() as i8);
        let dr = (self.row() as i8) - (other.row() as i8);
        dc.abs().max(dr.abs()) as u8
    }

    /// Convert to the internal list address. Caller must hold an in-diamond
    /// coordinate; no bounds checking is performed.
    pub fn to_list(self) -> ListLocation {
        let (row, col) = board_to_list(self.col() as i32, self.row() as i32);
        ListLocation::new(row as u8, col as u8)
    }
}

impl Serialize for BoardLocation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BoardLocation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u16::deserialize(deserializer).map(BoardLocation::from_packed)
    }
}

/// Address into the jagged 28-row scoring grid: `(row, col)` with
/// `col < row_width(row)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct ListLocation {
    row: u8,
    col: u8,
}

impl ListLocation {
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < GRID_ROWS && col < row_width(row));
        ListLocation { row, col }
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.col
    }

    /// Index into a flattened 420-cell buffer.
    #[inline]
    pub fn index(self) -> usize {
        row_offset(self.row) + self.col as usize
    }

    /// Convert to the engine-native board address.
    pub fn to_board(self) -> BoardLocation {
        let (col, row) = list_to_board(self.row as i32, self.col as i32);
        BoardLocation::new(col as u8, row as u8)
    }

    /// Checked conversion from a board coordinate that may lie outside the
    /// diamond. Returns `None` for off-diamond coordinates; this is the clip
    /// that patching relies on near the arena edges.
    pub fn from_board(board_col: i32, board_row: i32) -> Option<ListLocation> {
        let (row, col) = board_to_list(board_col, board_row);
        if (0..GRID_ROWS as i32).contains(&row) && (0..row_width(row as u8) as i32).contains(&col) {
            Some(ListLocation::new(row as u8, col as u8))
        } else {
            None
        }
    }
}

/// Iterate every valid list coordinate in row-major, ascending order.
pub fn all_cells() -> impl Iterator<Item = ListLocation> {
    (0..GRID_ROWS).flat_map(|row| (0..row_width(row)).map(move |col| ListLocation::new(row, col)))
}
