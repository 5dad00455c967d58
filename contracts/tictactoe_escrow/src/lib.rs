#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub type Balance = u128;
pub type Timestamp = u64;
pub type BlockNumber = u32;

pub mod constants {
    use super::{Balance, Timestamp};

    pub const BOARD_SIZE: u8 = 3;
    pub const CELL_COUNT: u8 = BOARD_SIZE * BOARD_SIZE;

    /// 0.1 of an 18-decimal native unit.
    pub const DEFAULT_ENTRY_FEE: Balance = 100_000_000_000_000_000;

    /// 3 minutes.
    pub const DEFAULT_REACTION_WINDOW_MS: Timestamp = 3 * 60 * 1_000;
}

pub mod board;
pub mod error;
pub mod game;
pub mod settlement;

#[cfg(test)]
mod testing;

/// # TicTacToe Escrow
///
/// Two players each stake the entry fee, alternate marks on a 3×3 board, and
/// the contract pays the pot to the winner or splits it on a draw.
///
/// ```text
///   join_as_player1 ─┐
///                    ├──► Playing ──set_stone──► Won / Drawn ──reset──► Registration
///   join_as_player2 ─┘       │                       ▲
///                            └──emergency_cashout────┘  (reaction window lapsed)
/// ```
///
/// Payouts are pushed once. A refused transfer never blocks resolution: the
/// amount is credited to `balance_to_withdraw` and pulled later through
/// `withdraw`.
#[ink::contract]
mod tictactoe_escrow {
    use ink::prelude::vec::Vec;
    use ink::storage::traits::StorageKey;
    use ink::storage::Mapping;

    use crate::board::{Cells, Line};
    use crate::constants::BOARD_SIZE;
    use crate::error::Result;
    use crate::game::{
        Call, DrawReason, Game, GameResult, MoveOutcome, Phase, Rules, Slot, TimeoutPolicy,
    };
    use crate::settlement::{self, Host, Notice, TransferRejected};

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct TicTacToeEscrow {
        game: Game,
        rules: Rules,
        /// Payouts that could not be pushed, claimable via `withdraw`.
        /// Survives resets.
        balance_to_withdraw: Mapping<AccountId, Balance>,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct PlayerJoined {
        #[ink(topic)]
        player: AccountId,
        slot: Slot,
    }

    /// Whose turn it is now.
    #[ink(event)]
    pub struct NextPlayer {
        #[ink(topic)]
        player: AccountId,
    }

    /// `line` is `None` when the win came from a timeout forfeit.
    #[ink(event)]
    pub struct GameOverWithWin {
        #[ink(topic)]
        winner: AccountId,
        line: Option<Line>,
    }

    #[ink(event)]
    pub struct GameOverWithDraw {
        reason: DrawReason,
    }

    #[ink(event)]
    pub struct PayoutSuccess {
        #[ink(topic)]
        receiver: AccountId,
        amount: Balance,
    }

    /// A direct payout was refused and moved to `balance_to_withdraw`.
    #[ink(event)]
    pub struct PayoutCredited {
        #[ink(topic)]
        receiver: AccountId,
        amount: Balance,
    }

    #[ink(event)]
    pub struct GameReset {
        #[ink(topic)]
        by: AccountId,
    }

    // =========================================================================
    // CHAIN HOST
    // =========================================================================

    /// Settlement against the contract's own balance and credit ledger.
    /// Notices are buffered and emitted once the operation has succeeded.
    ///
    /// Generic over the storage key so it can borrow the ledger field that
    /// `#[ink(storage)]` re-keys.
    struct ChainHost<'a, K: StorageKey> {
        credits: &'a mut Mapping<AccountId, Balance, K>,
        notices: Vec<Notice>,
    }

    impl<K: StorageKey> Host for ChainHost<'_, K> {
        fn send(
            &mut self,
            to: AccountId,
            amount: Balance,
        ) -> core::result::Result<(), TransferRejected> {
            ink::env::transfer::<Environment>(to, amount).map_err(|_| {
                ink::env::debug_println!("transfer of {} to {:?} refused", amount, to);
                TransferRejected
            })
        }

        fn credit_of(&self, account: AccountId) -> Balance {
            self.credits.get(account).unwrap_or(0)
        }

        fn set_credit(&mut self, account: AccountId, amount: Balance) {
            if amount == 0 {
                self.credits.remove(account);
            } else {
                self.credits.insert(account, &amount);
            }
        }

        fn notify(&mut self, notice: Notice) {
            self.notices.push(notice);
        }
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl TicTacToeEscrow {
        // ---------------------------------------------------------------------
        // Constructors
        // ---------------------------------------------------------------------

        /// # Parameters
        /// - `entry_fee`: exact stake each player attaches to join.
        /// - `reaction_window`: milliseconds allowed between moves.
        /// - `timeout_policy`: how `emergency_cashout` resolves a stalled game.
        #[ink(constructor)]
        pub fn new(
            entry_fee: Balance,
            reaction_window: Timestamp,
            timeout_policy: TimeoutPolicy,
        ) -> Self {
            Self::with_rules(Rules {
                entry_fee,
                reaction_window,
                timeout_policy,
            })
        }

        /// 0.1 unit stake, 3 minute window, pot split on timeout.
        #[ink(constructor)]
        pub fn new_default() -> Self {
            Self::with_rules(Rules::default())
        }

        fn with_rules(rules: Rules) -> Self {
            Self {
                game: Game::new(),
                rules,
                balance_to_withdraw: Mapping::default(),
            }
        }

        // ---------------------------------------------------------------------
        // Registration
        // ---------------------------------------------------------------------

        #[ink(message, payable)]
        pub fn join_as_player1(&mut self) -> Result<()> {
            self.join(Slot::One)
        }

        #[ink(message, payable)]
        pub fn join_as_player2(&mut self) -> Result<()> {
            self.join(Slot::Two)
        }

        fn join(&mut self, slot: Slot) -> Result<()> {
            let call = self.call_context();
            self.with_host(|game, rules, host| game.join(slot, &call, rules, host))
        }

        // ---------------------------------------------------------------------
        // Play
        // ---------------------------------------------------------------------

        /// Places the caller's mark at `(row, col)`.
        #[ink(message)]
        pub fn set_stone(&mut self, row: u8, col: u8) -> Result<MoveOutcome> {
            let call = self.call_context();
            self.with_host(|game, rules, host| game.set_stone(row, col, &call, rules, host))
        }

        /// Resolves a game whose reaction window has lapsed. Callable by anyone.
        #[ink(message)]
        pub fn emergency_cashout(&mut self) -> Result<GameResult> {
            let call = self.call_context();
            self.with_host(|game, rules, host| game.emergency_cashout(&call, rules, host))
        }

        /// Clears board and seats once the game is over. Only a seated player
        /// may reset.
        #[ink(message)]
        pub fn reset(&mut self) -> Result<()> {
            let call = self.call_context();
            self.with_host(|game, _, host| game.reset(&call, host))
        }

        // ---------------------------------------------------------------------
        // Withdrawal
        // ---------------------------------------------------------------------

        /// Pays out the caller's whole credit.
        #[ink(message)]
        pub fn withdraw(&mut self) -> Result<Balance> {
            let caller = self.env().caller();
            self.with_host(|_, _, host| settlement::withdraw(host, caller))
        }

        // ---------------------------------------------------------------------
        // Views
        // ---------------------------------------------------------------------

        /// Board indexed `[row][col]`.
        #[ink(message)]
        pub fn get_board(&self) -> Cells {
            self.game.cells()
        }

        #[ink(message)]
        pub fn board_size(&self) -> u8 {
            BOARD_SIZE
        }

        #[ink(message)]
        pub fn player1(&self) -> Option<AccountId> {
            self.game.player1()
        }

        #[ink(message)]
        pub fn player2(&self) -> Option<AccountId> {
            self.game.player2()
        }

        #[ink(message)]
        pub fn active_player(&self) -> Option<AccountId> {
            self.game.active_player()
        }

        #[ink(message)]
        pub fn moves_counter(&self) -> u8 {
            self.game.moves_counter()
        }

        #[ink(message)]
        pub fn is_game_active(&self) -> bool {
            self.game.is_active()
        }

        #[ink(message)]
        pub fn game_valid_until(&self) -> Timestamp {
            self.game.valid_until()
        }

        #[ink(message)]
        pub fn phase(&self) -> Phase {
            self.game.phase()
        }

        #[ink(message)]
        pub fn last_result(&self) -> Option<GameResult> {
            self.game.last_result()
        }

        /// Stakes held for the current round.
        #[ink(message)]
        pub fn pot(&self) -> Balance {
            self.game.pot()
        }

        #[ink(message)]
        pub fn balance_to_withdraw(&self, account: AccountId) -> Balance {
            self.balance_to_withdraw.get(account).unwrap_or(0)
        }

        #[ink(message)]
        pub fn entry_fee(&self) -> Balance {
            self.rules.entry_fee
        }

        #[ink(message)]
        pub fn reaction_window(&self) -> Timestamp {
            self.rules.reaction_window
        }

        #[ink(message)]
        pub fn timeout_policy(&self) -> TimeoutPolicy {
            self.rules.timeout_policy
        }

        // ---------------------------------------------------------------------
        // Internal
        // ---------------------------------------------------------------------

        fn call_context(&self) -> Call {
            Call {
                caller: self.env().caller(),
                value: self.env().transferred_value(),
                now: self.env().block_timestamp(),
                block: self.env().block_number(),
            }
        }

        /// Runs a game operation against the chain and emits its notices if
        /// it succeeds.
        fn with_host<T>(
            &mut self,
            op: impl FnOnce(&mut Game, &Rules, &mut dyn Host) -> Result<T>,
        ) -> Result<T> {
            let mut host = ChainHost {
                credits: &mut self.balance_to_withdraw,
                notices: Vec::new(),
            };
            let value = op(&mut self.game, &self.rules, &mut host)?;
            let notices = host.notices;

            for notice in notices {
                self.publish(notice);
            }
            Ok(value)
        }

        fn publish(&self, notice: Notice) {
            match notice {
                Notice::PlayerJoined { player, slot } => {
                    self.env().emit_event(PlayerJoined { player, slot })
                }
                Notice::NextPlayer { player } => self.env().emit_event(NextPlayer { player }),
                Notice::GameOverWithWin { winner, line } => {
                    self.env().emit_event(GameOverWithWin { winner, line })
                }
                Notice::GameOverWithDraw { reason } => {
                    self.env().emit_event(GameOverWithDraw { reason })
                }
                Notice::PayoutSuccess { receiver, amount } => {
                    self.env().emit_event(PayoutSuccess { receiver, amount })
                }
                Notice::PayoutCredited { receiver, amount } => {
                    self.env().emit_event(PayoutCredited { receiver, amount })
                }
                Notice::GameReset { by } => self.env().emit_event(GameReset { by }),
            }
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
