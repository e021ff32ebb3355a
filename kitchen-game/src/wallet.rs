//! Soft and premium currency balances.
use serde::{Deserialize, Serialize};

/// Currency collaborator used by a cooking session. Sessions only ever pay out.
pub trait CoinSink {
    fn add_coins(&mut self, amount: u32);
}

impl<T: CoinSink + ?Sized> CoinSink for &mut T {
    fn add_coins(&mut self, amount: u32) {
        (**self).add_coins(amount);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wallet {
    pub coins: u32,
    pub gems: u32,
}

impl Wallet {
    #[must_use]
    pub const fn new(coins: u32, gems: u32) -> Self {
        Self { coins, gems }
    }

    /// Deduct coins if the balance covers `amount`. Zero amounts are refused.
    pub fn spend_coins(&mut self, amount: u32) -> bool {
        if amount == 0 || self.coins < amount {
            return false;
        }
        self.coins -= amount;
        true
    }

    pub fn add_gems(&mut self, amount: u32) {
        self.gems = self.gems.saturating_add(amount);
    }

    pub fn spend_gems(&mut self, amount: u32) -> bool {
        if amount == 0 || self.gems < amount {
            return false;
        }
        self.gems -= amount;
        true
    }
}

impl CoinSink for Wallet {
    fn add_coins(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }
}
