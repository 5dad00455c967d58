//! The escrowed game: registration, turns, resolution and reset.
//!
//! `Game` is chain-agnostic. Call context arrives as a [`Call`], value and
//! notices leave through a [`Host`]. Every operation checks all of its
//! preconditions before the first write.

use ink::primitives::AccountId;

use crate::board::{Board, Cells, Line};
use crate::constants::{CELL_COUNT, DEFAULT_ENTRY_FEE, DEFAULT_REACTION_WINDOW_MS};
use crate::error::{Error, Result};
use crate::settlement::{attempt_payout, split_pot, Host, Notice};
use crate::{Balance, BlockNumber, Timestamp};

// =========================================================================
// TYPES
// =========================================================================

/// One of the two player seats.
#[derive(Debug, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

/// What happens when the reaction window lapses mid-game.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub enum TimeoutPolicy {
    /// Treat it as a draw and split the pot.
    #[default]
    SplitPot,
    /// The player who was due to move forfeits; the opponent takes the pot.
    ForfeitIdle,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum DrawReason {
    BoardFull,
    Timeout,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub enum GameResult {
    Won(AccountId),
    Drawn,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Phase {
    /// Waiting for one or both players to stake.
    Registration,
    Playing,
    /// Resolved and waiting for a reset.
    Finished,
}

/// Result of a successful move.
#[derive(Debug, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum MoveOutcome {
    Continue { next: AccountId },
    Won { line: Line },
    Drawn,
}

/// Instantiation-time configuration.
#[derive(Debug, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Rules {
    /// Exact stake required to take a seat.
    pub entry_fee: Balance,
    /// Milliseconds a player has to react after a join or move.
    pub reaction_window: Timestamp,
    pub timeout_policy: TimeoutPolicy,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            entry_fee: DEFAULT_ENTRY_FEE,
            reaction_window: DEFAULT_REACTION_WINDOW_MS,
            timeout_policy: TimeoutPolicy::SplitPot,
        }
    }
}

/// Per-call context supplied by the chain.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Call {
    pub caller: AccountId,
    /// Value attached to the call.
    pub value: Balance,
    pub now: Timestamp,
    pub block: BlockNumber,
}

/// Seat that moves first, from the parity of the block the join lands in.
///
/// Block producers can influence this bit; it is not a fair coin.
pub fn starting_slot(block: BlockNumber) -> Slot {
    if block % 2 == 0 {
        Slot::One
    } else {
        Slot::Two
    }
}

// =========================================================================
// GAME
// =========================================================================

#[derive(Debug, Default, PartialEq, Eq, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Game {
    board: Board,
    player1: Option<AccountId>,
    player2: Option<AccountId>,
    /// Whose turn it is. Always one of the seated players while active.
    active_player: Option<AccountId>,
    /// Marks placed since the last reset; equals the occupied cell count.
    moves_counter: u8,
    game_active: bool,
    /// Moves are accepted up to and including this instant.
    game_valid_until: Timestamp,
    /// Stakes held for the current round.
    pot: Balance,
    last_result: Option<GameResult>,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cells(&self) -> Cells {
        self.board.cells()
    }

    pub fn player1(&self) -> Option<AccountId> {
        self.player1
    }

    pub fn player2(&self) -> Option<AccountId> {
        self.player2
    }

    pub fn active_player(&self) -> Option<AccountId> {
        self.active_player
    }

    pub fn moves_counter(&self) -> u8 {
        self.moves_counter
    }

    pub fn is_active(&self) -> bool {
        self.game_active
    }

    pub fn valid_until(&self) -> Timestamp {
        self.game_valid_until
    }

    pub fn pot(&self) -> Balance {
        self.pot
    }

    pub fn last_result(&self) -> Option<GameResult> {
        self.last_result
    }

    pub fn phase(&self) -> Phase {
        if self.game_active {
            Phase::Playing
        } else if self.last_result.is_some() {
            Phase::Finished
        } else {
            Phase::Registration
        }
    }

    pub fn seat(&self, slot: Slot) -> Option<AccountId> {
        match slot {
            Slot::One => self.player1,
            Slot::Two => self.player2,
        }
    }

    fn seat_mut(&mut self, slot: Slot) -> &mut Option<AccountId> {
        match slot {
            Slot::One => &mut self.player1,
            Slot::Two => &mut self.player2,
        }
    }

    pub fn is_player(&self, account: AccountId) -> bool {
        self.player1 == Some(account) || self.player2 == Some(account)
    }

    pub fn opponent_of(&self, account: AccountId) -> Option<AccountId> {
        if self.player1 == Some(account) {
            self.player2
        } else if self.player2 == Some(account) {
            self.player1
        } else {
            None
        }
    }

    /// The reaction window has lapsed strictly before `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.game_valid_until
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Seats the caller in `slot` against an exact stake. The game goes live
    /// once both seats are filled.
    pub fn join<H: Host + ?Sized>(
        &mut self,
        slot: Slot,
        call: &Call,
        rules: &Rules,
        host: &mut H,
    ) -> Result<()> {
        if call.value != rules.entry_fee {
            return Err(Error::WrongStake);
        }
        if self.seat(slot).is_some() {
            return Err(Error::SlotTaken);
        }
        if self.seat(slot.other()) == Some(call.caller) {
            return Err(Error::AlreadyJoined);
        }
        let pot = self.pot.checked_add(call.value).ok_or(Error::Overflow)?;

        self.pot = pot;
        *self.seat_mut(slot) = Some(call.caller);
        self.game_active = self.player1.is_some() && self.player2.is_some();

        let starter = self.seat(starting_slot(call.block)).unwrap_or(call.caller);
        self.active_player = Some(starter);
        self.game_valid_until = call.now.saturating_add(rules.reaction_window);

        host.notify(Notice::PlayerJoined {
            player: call.caller,
            slot,
        });
        host.notify(Notice::NextPlayer { player: starter });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Play
    // ---------------------------------------------------------------------

    /// Places the caller's mark and resolves the game if it completes a line
    /// or fills the board.
    pub fn set_stone<H: Host + ?Sized>(
        &mut self,
        row: u8,
        col: u8,
        call: &Call,
        rules: &Rules,
        host: &mut H,
    ) -> Result<MoveOutcome> {
        if !self.game_active {
            return Err(Error::GameNotActive);
        }
        if !Board::in_bounds(row, col) {
            return Err(Error::OutOfBounds);
        }
        let player = call.caller;
        if self.active_player != Some(player) {
            return Err(Error::NotYourTurn);
        }
        if self.is_expired(call.now) {
            return Err(Error::DeadlineExpired);
        }
        if !self.board.is_free(row, col) {
            return Err(Error::CellTaken);
        }
        let next = self.opponent_of(player).ok_or(Error::NotAPlayer)?;

        self.board.claim(row, col, player);
        self.moves_counter += 1;
        self.game_valid_until = call.now.saturating_add(rules.reaction_window);

        if let Some(line) = self.board.completed_line(row, col, player) {
            self.declare_winner(player, Some(line), host)?;
            return Ok(MoveOutcome::Won { line });
        }
        if self.moves_counter == CELL_COUNT {
            self.declare_draw(DrawReason::BoardFull, host)?;
            return Ok(MoveOutcome::Drawn);
        }

        self.active_player = Some(next);
        host.notify(Notice::NextPlayer { player: next });
        Ok(MoveOutcome::Continue { next })
    }

    // ---------------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------------

    /// Pays the round's pot to `winner`. The pot holds only this round's
    /// stakes, never outstanding credits from earlier rounds.
    fn declare_winner<H: Host + ?Sized>(
        &mut self,
        winner: AccountId,
        line: Option<Line>,
        host: &mut H,
    ) -> Result<()> {
        self.game_active = false;
        self.last_result = Some(GameResult::Won(winner));
        let pot = core::mem::take(&mut self.pot);

        host.notify(Notice::GameOverWithWin { winner, line });
        attempt_payout(host, winner, pot)?;
        Ok(())
    }

    /// Splits the round's pot, which excludes outstanding credits. Both shares
    /// settle independently: a refused transfer to one player does not affect
    /// the other's.
    fn declare_draw<H: Host + ?Sized>(&mut self, reason: DrawReason, host: &mut H) -> Result<()> {
        self.game_active = false;
        self.last_result = Some(GameResult::Drawn);
        let (first, second) = split_pot(core::mem::take(&mut self.pot));

        host.notify(Notice::GameOverWithDraw { reason });
        if let Some(player1) = self.player1 {
            attempt_payout(host, player1, first)?;
        }
        if let Some(player2) = self.player2 {
            attempt_payout(host, player2, second)?;
        }
        Ok(())
    }

    /// Forces resolution of a game whose reaction window has lapsed. Anyone
    /// may call it.
    pub fn emergency_cashout<H: Host + ?Sized>(
        &mut self,
        call: &Call,
        rules: &Rules,
        host: &mut H,
    ) -> Result<GameResult> {
        if !self.game_active {
            return Err(Error::GameNotActive);
        }
        if !self.is_expired(call.now) {
            return Err(Error::DeadlineNotReached);
        }

        match rules.timeout_policy {
            TimeoutPolicy::SplitPot => {
                self.declare_draw(DrawReason::Timeout, host)?;
                Ok(GameResult::Drawn)
            }
            TimeoutPolicy::ForfeitIdle => {
                let idle = self.active_player.ok_or(Error::GameNotActive)?;
                let winner = self.opponent_of(idle).ok_or(Error::NotAPlayer)?;
                self.declare_winner(winner, None, host)?;
                Ok(GameResult::Won(winner))
            }
        }
    }

    // ---------------------------------------------------------------------
    // Reset
    // ---------------------------------------------------------------------

    /// Returns the game to registration. Withdrawable credits are untouched.
    /// A player still waiting alone for an opponent gets their stake back.
    pub fn reset<H: Host + ?Sized>(&mut self, call: &Call, host: &mut H) -> Result<()> {
        if !self.is_player(call.caller) {
            return Err(Error::NotAPlayer);
        }
        if self.game_active {
            return Err(Error::GameStillActive);
        }

        let refund = match (self.player1, self.player2) {
            (Some(lone), None) | (None, Some(lone)) => Some((lone, self.pot)),
            _ => None,
        };
        *self = Self::default();

        host.notify(Notice::GameReset { by: call.caller });
        if let Some((lone, stake)) = refund {
            attempt_payout(host, lone, stake)?;
        }
        Ok(())
    }
}
