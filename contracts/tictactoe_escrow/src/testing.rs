//! Off-chain stand-ins used by the unit tests.

use std::collections::{BTreeMap, BTreeSet};

use ink::primitives::AccountId;

use crate::settlement::{Host, Notice, TransferRejected};
use crate::Balance;

pub fn account(seed: u8) -> AccountId {
    AccountId::from([seed; 32])
}

/// Records every transfer, credit and notice. Transfers fail for accounts
/// marked with [`MockHost::reject`] or when the contract balance is short.
#[derive(Debug, Default)]
pub struct MockHost {
    pub contract_balance: Balance,
    pub sent: Vec<(AccountId, Balance)>,
    pub notices: Vec<Notice>,
    /// Recipient's credit as observed at the moment of each transfer.
    pub credit_at_send: Vec<(AccountId, Balance)>,
    credits: BTreeMap<AccountId, Balance>,
    rejecting: BTreeSet<AccountId>,
}

impl MockHost {
    pub fn funded(contract_balance: Balance) -> Self {
        Self {
            contract_balance,
            ..Self::default()
        }
    }

    pub fn reject(&mut self, account: AccountId) {
        self.rejecting.insert(account);
    }

    pub fn accept(&mut self, account: AccountId) {
        self.rejecting.remove(&account);
    }

    /// Simulates value attached to an incoming call.
    pub fn deposit(&mut self, amount: Balance) {
        self.contract_balance += amount;
    }

    pub fn received(&self, account: AccountId) -> Balance {
        self.sent
            .iter()
            .filter(|(to, _)| *to == account)
            .map(|(_, amount)| amount)
            .sum()
    }

    pub fn total_sent(&self) -> Balance {
        self.sent.iter().map(|(_, amount)| amount).sum()
    }

    pub fn total_credited(&self) -> Balance {
        self.credits.values().sum()
    }
}

impl Host for MockHost {
    fn send(&mut self, to: AccountId, amount: Balance) -> Result<(), TransferRejected> {
        self.credit_at_send.push((to, self.credit_of(to)));
        if self.rejecting.contains(&to) || amount > self.contract_balance {
            return Err(TransferRejected);
        }
        self.contract_balance -= amount;
        self.sent.push((to, amount));
        Ok(())
    }

    fn credit_of(&self, account: AccountId) -> Balance {
        self.credits.get(&account).copied().unwrap_or(0)
    }

    fn set_credit(&mut self, account: AccountId, amount: Balance) {
        if amount == 0 {
            self.credits.remove(&account);
        } else {
            self.credits.insert(account, amount);
        }
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
