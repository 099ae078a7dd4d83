use soroban_sdk::{Bytes, BytesN, Env};

/// Digest a WebAuthn authenticator signs during an assertion.
pub struct AssertionHasher;

impl AssertionHasher {
    /// `SHA-256(authenticator_data ‖ SHA-256(client_data_json))`.
    pub fn hash(env: &Env, authenticator_data: &Bytes, client_data_json: &Bytes) -> BytesN<32> {
        let client_data_hash: BytesN<32> = env.crypto().sha256(client_data_json).into();
        let mut signed = authenticator_data.clone();
        signed.append(&Bytes::from_slice(env, &client_data_hash.to_array()));
        env.crypto().sha256(&signed).into()
    }
}
