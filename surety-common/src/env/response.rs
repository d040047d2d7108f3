use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{
    address::Address,
    env::{request::RequestKey, status::StatusCode},
    error::{Result, SuretyError},
    flight::FlightCode,
};

/// One oracle's opinion on a routed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub oracle: Address,
    pub index: u8,
    pub airline: Address,
    pub flight: FlightCode,
    pub timestamp: u64,
    pub status: StatusCode,
}

impl StatusResponse {
    pub fn new(oracle: Address, key: &RequestKey, status: StatusCode) -> Self {
        Self {
            oracle,
            index: key.index,
            airline: key.airline,
            flight: key.flight,
            timestamp: key.timestamp,
            status,
        }
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.index, self.airline, self.flight, self.timestamp)
    }
}

/// A response as submitted to the ledger: the payload plus the oracle's ed25519 signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedResponse {
    pub response: StatusResponse,
    #[serde(with = "hex::serde")]
    pub signature: [u8; 64],
    pub public_key: Vec<u8>,
}

impl SignedResponse {
    /// Checks the signature and that the signing key owns `response.oracle`.
    pub fn verify(&self) -> Result<()> {
        let pk: [u8; 32] = self
            .public_key
            .as_slice()
            .try_into()
            .map_err(|_| SuretyError::InvalidSignature("public key must be 32 bytes".to_string()))?;
        let verifying_key = VerifyingKey::from_bytes(&pk)
            .map_err(|e| SuretyError::InvalidSignature(e.to_string()))?;

        let signer = Address::from_public_key(&verifying_key);
        if signer != self.response.oracle {
            return Err(SuretyError::InvalidSignature(format!(
                "signed by {} but claims oracle {}",
                signer, self.response.oracle
            )));
        }

        let msg = response_signing_bytes(&self.response)?;
        let signature = Signature::from_bytes(&self.signature);
        verifying_key
            .verify(&msg, &signature)
            .map_err(|e| SuretyError::InvalidSignature(e.to_string()))
    }
}

#[derive(Serialize)]
struct ResponseSignView<'a> {
    oracle: &'a Address,
    index: u8,
    airline: &'a Address,
    flight: &'a FlightCode,
    timestamp: u64,
    status: u8,
}

/// Canonical bytes an oracle signs. Signers and the ledger must both use this.
pub fn response_signing_bytes(r: &StatusResponse) -> Result<Vec<u8>> {
    bincode::serialize(&ResponseSignView {
        oracle: &r.oracle,
        index: r.index,
        airline: &r.airline,
        flight: &r.flight,
        timestamp: r.timestamp,
        status: r.status.code(),
    })
    .map_err(|e| SuretyError::InvalidSignature(format!("encode response: {e}")))
}
