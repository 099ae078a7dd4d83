//! Events emitted by the passkey lock.

#![allow(deprecated)] // events().publish until the contractevent migration

use soroban_sdk::{symbol_short, Address, Env, Symbol};

pub const WITHDRAWAL: Symbol = symbol_short!("WITHDRAW");

/// Publishes `("WITHDRAW", owner) -> amount` once the transfer has happened.
pub fn publish_withdrawal(env: &Env, owner: &Address, amount: i128) {
    env.events().publish((WITHDRAWAL, owner.clone()), amount);
}
