#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use p256::ecdsa::{signature::hazmat::PrehashSigner, Signature, SigningKey};
use passkey_lock::{LockError, PasskeyLockContract, PasskeyLockContractClient, PublicKey};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token::StellarAssetClient,
    Address, Bytes, BytesN, Env, String,
};

const LEFT: &str = "{\"type\":\"webauthn.get\",\"challenge\":\"";
const RIGHT: &str = "\",\"origin\":\"https://toddchapman.io\",\"crossOrigin\":false}";
const DEPOSIT: i128 = 1_000_000_000;

/// Withdrawal attempts across all three entry points plus clock movement.
///
/// `Forged` carries attacker-chosen digest and scalars; with overwhelming
/// probability they do not form a valid signature under the lock's key.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Signed { challenge: Vec<u8>, via: u8 },
    Stranger { challenge: Vec<u8> },
    Forged { digest: [u8; 32], r: [u8; 32], s: [u8; 32] },
    AdvanceTime { delta: u32 },
}

fn scalar(env: &Env, bytes: &[u8]) -> BytesN<32> {
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    BytesN::from_array(env, &out)
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_000);

    let key = match SigningKey::from_slice(&[0x2a; 32]) {
        Ok(key) => key,
        Err(_) => return,
    };
    let point = key.verifying_key().to_encoded_point(false);
    let (Some(x), Some(y)) = (point.x(), point.y()) else {
        return;
    };
    let public_key = PublicKey::new(scalar(&env, x), scalar(&env, y));

    let owner = Address::generate(&env);
    let stranger = Address::generate(&env);
    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    StellarAssetClient::new(&env, &token).mint(&owner, &DEPOSIT);

    let unlock_time = 1_000 + 86_400u64;
    let contract_id = env.register(
        PasskeyLockContract,
        (owner.clone(), token, unlock_time, public_key, DEPOSIT),
    );
    let client = PasskeyLockContractClient::new(&env, &contract_id);
    let left = String::from_str(&env, LEFT);
    let right = String::from_str(&env, RIGHT);

    for action in actions {
        let before = client.balance();
        let unlocked = env.ledger().timestamp() >= unlock_time;

        match action {
            FuzzAction::Signed { challenge, via } => {
                let raw = Bytes::from_slice(&env, &challenge);
                let json = passkey_lock::ClientDataBuilder::build(
                    &env,
                    &left,
                    &passkey_lock::Challenge::Raw(raw.clone()),
                    &right,
                );
                let auth = Bytes::from_slice(&env, &[0x05; 37]);
                let digest = passkey_lock::AssertionHasher::hash(&env, &auth, &json);
                let signature: Signature = match key.sign_prehash(&digest.to_array()) {
                    Ok(sig) => sig,
                    Err(_) => continue,
                };
                let (r, s) = signature.split_bytes();
                let (r, s) = (scalar(&env, &r), scalar(&env, &s));

                let res = match via % 3 {
                    0 => client.try_withdraw(&owner, &digest, &r, &s),
                    1 => {
                        let encoded: Vec<u8> = passkey_lock::base64url(&env, &raw).iter().collect();
                        client.try_withdraw_with_client_data_json(
                            &owner,
                            &auth,
                            &left,
                            &String::from_bytes(&env, &encoded),
                            &right,
                            &r,
                            &s,
                        )
                    }
                    _ => client.try_withdraw_with_raw_challenge(
                        &owner,
                        &auth,
                        &left,
                        &String::from_bytes(&env, &challenge),
                        &right,
                        &r,
                        &s,
                    ),
                };
                if unlocked {
                    assert!(
                        matches!(res, Ok(Ok(amount)) if amount == before),
                        "INVARIANT VIOLATION: owner refused after unlock: {:?}",
                        res
                    );
                } else {
                    assert!(matches!(res, Err(Ok(LockError::TooEarly))));
                }
            }
            FuzzAction::Stranger { challenge } => {
                let digest: BytesN<32> = env.crypto().sha256(&Bytes::from_slice(&env, &challenge)).into();
                let zero = BytesN::from_array(&env, &[0u8; 32]);
                let res = client.try_withdraw(&stranger, &digest, &zero, &zero);
                let expected = if unlocked { LockError::NotOwner } else { LockError::TooEarly };
                assert!(matches!(res, Err(Ok(e)) if e == expected));
            }
            FuzzAction::Forged { digest, r, s } => {
                let res = client.try_withdraw(
                    &owner,
                    &BytesN::from_array(&env, &digest),
                    &BytesN::from_array(&env, &r),
                    &BytesN::from_array(&env, &s),
                );
                let expected = if unlocked { LockError::InvalidSignature } else { LockError::TooEarly };
                assert!(
                    matches!(res, Err(Ok(e)) if e == expected),
                    "INVARIANT VIOLATION: forged signature accepted: {:?}",
                    res
                );
            }
            FuzzAction::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(delta as u64);
                env.ledger().set_timestamp(ts);
            }
        }

        // ── Post-action invariant checks ──
        let after = client.balance();
        assert!(after >= 0, "INVARIANT VIOLATION: balance went negative: {}", after);
        assert!(after <= before, "INVARIANT VIOLATION: balance grew");
        if after < before {
            assert!(unlocked, "INVARIANT VIOLATION: funds left before unlock");
            assert_eq!(after, 0, "INVARIANT VIOLATION: partial withdrawal");
        }
    }
});
