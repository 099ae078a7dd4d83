#![no_std]
#![allow(clippy::too_many_arguments)]

pub mod assertion;
pub mod client_data;
pub mod events;
pub mod secp256r1;


pub use assertion::AssertionHasher;
pub use client_data::{base64url, Challenge, ClientDataBuilder};
pub use secp256r1::{P256Verifier, PublicKey};

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, panic_with_error, symbol_short,
    token, Address, Bytes, BytesN, Env, String, Symbol,
};

const LOCK: Symbol = symbol_short!("LOCK");

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum LockError {
    NotInitialized = 1,
    UnlockTimeNotInFuture = 2,
    InvalidDeposit = 3,
    TooEarly = 4,
    NotOwner = 5,
    InvalidSignature = 6,
}

/// Everything fixed at construction. Never rewritten.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockRecord {
    pub owner: Address,
    pub token: Address,
    pub unlock_time: u64,
    pub public_key: PublicKey,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LockState {
    /// Ledger time is before the unlock time.
    Locked,
    /// Unlock time reached and funds are still held.
    Unlocked,
    /// Unlock time reached and nothing is left to release.
    Drained,
}

#[contract]
pub struct PasskeyLockContract;

#[contractimpl]
impl PasskeyLockContract {
    /// Lock `amount` of `token` for `owner` until `unlock_time`, releasable
    /// only with a signature from the passkey behind `public_key`.
    pub fn __constructor(
        env: Env,
        owner: Address,
        token: Address,
        unlock_time: u64,
        public_key: PublicKey,
        amount: i128,
    ) {
        owner.require_auth();

        let now = env.ledger().timestamp();
        if unlock_time <= now {
            log!(&env, "unlock time is not in the future", unlock_time, now);
            panic_with_error!(&env, LockError::UnlockTimeNotInFuture);
        }
        if amount < 0 {
            panic_with_error!(&env, LockError::InvalidDeposit);
        }

        let record = LockRecord {
            owner: owner.clone(),
            token,
            unlock_time,
            public_key,
        };
        env.storage().instance().set(&LOCK, &record);

        if amount > 0 {
            token::Client::new(&env, &record.token).transfer(
                &owner,
                &env.current_contract_address(),
                &amount,
            );
        }
    }

    /// Release the full balance against a precomputed assertion digest.
    ///
    /// `hash` is taken as given. It is not bound to this contract, to the
    /// amount, or to a call counter, so a `(hash, r, s)` triple that verified
    /// once stays valid for later calls.
    pub fn withdraw(
        env: Env,
        caller: Address,
        hash: BytesN<32>,
        r: BytesN<32>,
        s: BytesN<32>,
    ) -> Result<i128, LockError> {
        Self::release(&env, &caller, &hash, &r, &s)
    }

    /// Release against raw assertion parts with an already base64url-encoded
    /// challenge.
    pub fn withdraw_with_client_data_json(
        env: Env,
        caller: Address,
        authenticator_data: Bytes,
        left: String,
        challenge_base64: String,
        right: String,
        r: BytesN<32>,
        s: BytesN<32>,
    ) -> Result<i128, LockError> {
        let client_data_json =
            ClientDataBuilder::build(&env, &left, &Challenge::Encoded(challenge_base64), &right);
        let digest = AssertionHasher::hash(&env, &authenticator_data, &client_data_json);
        Self::release(&env, &caller, &digest, &r, &s)
    }

    /// Same as [`Self::withdraw_with_client_data_json`], but the contract
    /// base64url-encodes the raw `challenge` itself.
    pub fn withdraw_with_raw_challenge(
        env: Env,
        caller: Address,
        authenticator_data: Bytes,
        left: String,
        challenge: String,
        right: String,
        r: BytesN<32>,
        s: BytesN<32>,
    ) -> Result<i128, LockError> {
        let client_data_json =
            ClientDataBuilder::build(&env, &left, &Challenge::Raw(challenge.to_bytes()), &right);
        let digest = AssertionHasher::hash(&env, &authenticator_data, &client_data_json);
        Self::release(&env, &caller, &digest, &r, &s)
    }

    pub fn unlock_time(env: Env) -> Result<u64, LockError> {
        Ok(Self::load(&env)?.unlock_time)
    }

    pub fn owner(env: Env) -> Result<Address, LockError> {
        Ok(Self::load(&env)?.owner)
    }

    pub fn public_key(env: Env) -> Result<PublicKey, LockError> {
        Ok(Self::load(&env)?.public_key)
    }

    pub fn token(env: Env) -> Result<Address, LockError> {
        Ok(Self::load(&env)?.token)
    }

    /// Amount of the locked token the contract currently holds.
    pub fn balance(env: Env) -> Result<i128, LockError> {
        let record = Self::load(&env)?;
        Ok(Self::held(&env, &record))
    }

    pub fn state(env: Env) -> Result<LockState, LockError> {
        let record = Self::load(&env)?;
        if env.ledger().timestamp() < record.unlock_time {
            return Ok(LockState::Locked);
        }
        if Self::held(&env, &record) > 0 {
            Ok(LockState::Unlocked)
        } else {
            Ok(LockState::Drained)
        }
    }

    fn load(env: &Env) -> Result<LockRecord, LockError> {
        env.storage()
            .instance()
            .get(&LOCK)
            .ok_or(LockError::NotInitialized)
    }

    fn held(env: &Env, record: &LockRecord) -> i128 {
        token::Client::new(env, &record.token).balance(&env.current_contract_address())
    }

    /// The only mutating path. Checks run time, then owner, then signature;
    /// any failure returns before the transfer.
    fn release(
        env: &Env,
        caller: &Address,
        digest: &BytesN<32>,
        r: &BytesN<32>,
        s: &BytesN<32>,
    ) -> Result<i128, LockError> {
        caller.require_auth();
        let record = Self::load(env)?;

        let now = env.ledger().timestamp();
        if now < record.unlock_time {
            log!(env, "withdrawal before unlock time", now, record.unlock_time);
            return Err(LockError::TooEarly);
        }
        if *caller != record.owner {
            log!(env, "withdrawal from non-owner", caller.clone());
            return Err(LockError::NotOwner);
        }
        if !P256Verifier::verify(digest, r, s, &record.public_key) {
            log!(env, "passkey signature rejected", digest.clone());
            return Err(LockError::InvalidSignature);
        }

        let amount = Self::held(env, &record);
        if amount > 0 {
            token::Client::new(env, &record.token).transfer(
                &env.current_contract_address(),
                &record.owner,
                &amount,
            );
        }
        events::publish_withdrawal(env, &record.owner, amount);
        Ok(amount)
    }
}
