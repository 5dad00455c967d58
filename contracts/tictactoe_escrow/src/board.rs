//! The 3×3 grid. Each cell is empty or holds the account that claimed it.

use ink::primitives::AccountId;

use crate::constants::BOARD_SIZE;

const N: usize = BOARD_SIZE as usize;

/// Raw grid as exposed to read-only callers, indexed `[row][col]`.
pub type Cells = [[Option<AccountId>; N]; N];

/// A completed line of three identical marks.
#[derive(Debug, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Line {
    Column(u8),
    Row(u8),
    /// Top-left to bottom-right.
    MainDiagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Board {
    cells: Cells,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_bounds(row: u8, col: u8) -> bool {
        row < BOARD_SIZE && col < BOARD_SIZE
    }

    /// Occupant of a cell. Out-of-bounds coordinates read as empty.
    pub fn get(&self, row: u8, col: u8) -> Option<AccountId> {
        if !Self::in_bounds(row, col) {
            return None;
        }
        self.cells[row as usize][col as usize]
    }

    pub fn is_free(&self, row: u8, col: u8) -> bool {
        Self::in_bounds(row, col) && self.cells[row as usize][col as usize].is_none()
    }

    /// Marks a free cell. Returns `false` and leaves the board untouched if
    /// the cell is out of bounds or already claimed; a claimed cell is never
    /// overwritten.
    pub fn claim(&mut self, row: u8, col: u8, player: AccountId) -> bool {
        if !self.is_free(row, col) {
            return false;
        }
        self.cells[row as usize][col as usize] = Some(player);
        true
    }

    /// Number of claimed cells.
    pub fn occupied(&self) -> u8 {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_some())
            .count() as u8
    }

    pub fn is_full(&self) -> bool {
        self.occupied() == BOARD_SIZE * BOARD_SIZE
    }

    pub fn cells(&self) -> Cells {
        self.cells
    }

    /// Checks only the lines running through `(row, col)`, in the order
    /// column, row, main diagonal, anti-diagonal, and stops at the first one
    /// fully owned by `player`. Each scan bails on the first foreign or
    /// empty cell.
    pub fn completed_line(&self, row: u8, col: u8, player: AccountId) -> Option<Line> {
        if !Self::in_bounds(row, col) {
            return None;
        }
        let last = BOARD_SIZE - 1;

        if self.owns_line(player, |i| (i, col)) {
            return Some(Line::Column(col));
        }
        if self.owns_line(player, |i| (row, i)) {
            return Some(Line::Row(row));
        }
        if row == col && self.owns_line(player, |i| (i, i)) {
            return Some(Line::MainDiagonal);
        }
        if row + col == last && self.owns_line(player, |i| (i, last - i)) {
            return Some(Line::AntiDiagonal);
        }
        None
    }

    fn owns_line(&self, player: AccountId, cell_at: impl Fn(u8) -> (u8, u8)) -> bool {
        (0..BOARD_SIZE).all(|i| {
            let (row, col) = cell_at(i);
            self.cells[row as usize][col as usize] == Some(player)
        })
    }
}
