// =========================================================================
// ERRORS
// =========================================================================

/// Protocol violations. Any of these aborts the whole call; the ink!
/// dispatcher reverts storage when a message returns `Err`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    /// Attached value does not equal the entry fee.
    WrongStake,
    /// The requested player slot is already occupied.
    SlotTaken,
    /// Caller already occupies the other slot.
    AlreadyJoined,
    /// No game is in progress.
    GameNotActive,
    /// A game is in progress; it must finish first.
    GameStillActive,
    /// Row or column lies outside the board.
    OutOfBounds,
    /// Caller is not the player whose turn it is.
    NotYourTurn,
    /// The target cell is already claimed.
    CellTaken,
    /// The reaction window has lapsed; only the timeout path remains.
    DeadlineExpired,
    /// The reaction window is still open.
    DeadlineNotReached,
    /// Caller is neither player 1 nor player 2.
    NotAPlayer,
    /// Caller has no withdrawable credit.
    NothingToWithdraw,
    /// The withdrawal transfer was rejected; the credit is kept.
    WithdrawalFailed,
    /// Arithmetic overflow.
    Overflow,
}

pub type Result<T> = core::result::Result<T, Error>;
