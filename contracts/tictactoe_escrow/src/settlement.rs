//! Moving value out of the escrow.
//!
//! Payouts are pushed first and fall back to a withdrawable credit when the
//! recipient refuses the transfer. The game state transition that triggered
//! the payout is never rolled back by a refused transfer.

use ink::primitives::AccountId;

use crate::board::Line;
use crate::error::{Error, Result};
use crate::game::{DrawReason, Slot};
use crate::Balance;

/// A native transfer that the chain refused.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TransferRejected;

/// How a payout reached its recipient.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Payout {
    /// Transferred directly.
    Delivered,
    /// Transfer refused; the amount now sits in the recipient's credit.
    Credited,
}

/// Something observers may want to react to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Notice {
    PlayerJoined { player: AccountId, slot: Slot },
    NextPlayer { player: AccountId },
    GameOverWithWin { winner: AccountId, line: Option<Line> },
    GameOverWithDraw { reason: DrawReason },
    PayoutSuccess { receiver: AccountId, amount: Balance },
    PayoutCredited { receiver: AccountId, amount: Balance },
    GameReset { by: AccountId },
}

/// Everything the game needs from the chain besides call context: value
/// transfer out of the contract, the withdrawable-credit ledger, and an
/// outlet for notices.
pub trait Host {
    /// One synchronous transfer attempt from the contract to `to`.
    fn send(
        &mut self,
        to: AccountId,
        amount: Balance,
    ) -> core::result::Result<(), TransferRejected>;

    fn credit_of(&self, account: AccountId) -> Balance;

    fn set_credit(&mut self, account: AccountId, amount: Balance);

    fn notify(&mut self, notice: Notice);
}

/// Splits a pot into two shares. The second share takes the odd unit.
pub fn split_pot(pot: Balance) -> (Balance, Balance) {
    let first = pot / 2;
    (first, pot - first)
}

/// Pushes `amount` to `to`, crediting it instead if the push is refused.
///
/// Only a credit overflow is an error; a refused transfer is not.
pub fn attempt_payout<H: Host + ?Sized>(
    host: &mut H,
    to: AccountId,
    amount: Balance,
) -> Result<Payout> {
    if amount == 0 {
        return Ok(Payout::Delivered);
    }

    match host.send(to, amount) {
        Ok(()) => {
            host.notify(Notice::PayoutSuccess {
                receiver: to,
                amount,
            });
            Ok(Payout::Delivered)
        }
        Err(TransferRejected) => {
            let credit = host
                .credit_of(to)
                .checked_add(amount)
                .ok_or(Error::Overflow)?;
            host.set_credit(to, credit);
            host.notify(Notice::PayoutCredited {
                receiver: to,
                amount,
            });
            Ok(Payout::Credited)
        }
    }
}

/// Pays out `caller`'s whole credit.
///
/// The credit is zeroed before the transfer. If the transfer is refused the
/// credit is restored and the call fails, so nothing is lost.
pub fn withdraw<H: Host + ?Sized>(host: &mut H, caller: AccountId) -> Result<Balance> {
    let amount = host.credit_of(caller);
    if amount == 0 {
        return Err(Error::NothingToWithdraw);
    }

    host.set_credit(caller, 0);
    if host.send(caller, amount).is_err() {
        host.set_credit(caller, amount);
        return Err(Error::WithdrawalFailed);
    }

    host.notify(Notice::PayoutSuccess {
        receiver: caller,
        amount,
    });
    Ok(amount)
}
