//! Signed transaction envelope.
//!
//! A transaction body is serialized to JSON, hashed with SHA-256 and signed
//! with the account's ed25519 key. The signature and verifying key travel
//! base64-encoded next to the body.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use dmarket_types::{Address, Coins, Msg};

use crate::error::DeliverError;

/// Gas limit attached to generated transactions.
pub const DEFAULT_GEN_TX_GAS: u64 = 10_000_000;

/// The signed portion of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    pub chain_id: String,
    pub msgs: Vec<Msg>,
    pub fee: Coins,
    pub gas: u64,
    /// Account number of the signer, captured when the body was built.
    pub account_number: u64,
    /// Sequence of the signer, captured when the body was built.
    pub sequence: u64,
}

impl TxBody {
    /// SHA-256 of the JSON encoding; this is what gets signed.
    pub fn sign_bytes(&self) -> Result<[u8; 32], TxError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(Sha256::digest(&bytes).into())
    }

    /// The account expected to sign: the signer of the first message.
    pub fn signer(&self) -> Option<&Address> {
        self.msgs.first().map(Msg::signer)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TxError {
    #[error("transaction carries no messages")]
    NoMessages,

    #[error("failed to encode transaction body: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub body: TxBody,
    /// Base64 ed25519 signature over `body.sign_bytes()`.
    pub signature: String,
    /// Base64 ed25519 verifying key of the signer.
    pub public_key: String,
}

/// Sign `body` with `key`.
pub fn gen_tx(body: TxBody, key: &SigningKey) -> Result<SignedTx, TxError> {
    if body.msgs.is_empty() {
        return Err(TxError::NoMessages);
    }
    let digest = body.sign_bytes()?;
    let signature = key.sign(&digest);
    Ok(SignedTx {
        body,
        signature: BASE64.encode(signature.to_bytes()),
        public_key: BASE64.encode(key.verifying_key().to_bytes()),
    })
}

impl SignedTx {
    /// Check the signature and return the verifying key it was made with.
    pub fn verify(&self) -> Result<VerifyingKey, DeliverError> {
        let key_bytes: [u8; 32] = BASE64
            .decode(&self.public_key)
            .map_err(|e| DeliverError::InvalidSignature(format!("public key: {}", e)))?
            .try_into()
            .map_err(|_| DeliverError::InvalidSignature("public key must be 32 bytes".into()))?;
        let key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| DeliverError::InvalidSignature(e.to_string()))?;

        let sig_bytes: [u8; 64] = BASE64
            .decode(&self.signature)
            .map_err(|e| DeliverError::InvalidSignature(format!("signature: {}", e)))?
            .try_into()
            .map_err(|_| DeliverError::InvalidSignature("signature must be 64 bytes".into()))?;
        let signature = Signature::from_bytes(&sig_bytes);

        let digest = self
            .body
            .sign_bytes()
            .map_err(|e| DeliverError::InvalidSignature(e.to_string()))?;
        key.verify(&digest, &signature)
            .map_err(|e| DeliverError::InvalidSignature(e.to_string()))?;
        Ok(key)
    }
}
