use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::{
    address::Address,
    env::response::{response_signing_bytes, SignedResponse, StatusResponse},
    error::{Result, SuretyError},
};

/// Signing identity of an off-ledger oracle worker.
pub struct OracleSigner {
    keypair: SigningKey,
    address: Address,
}

impl OracleSigner {
    pub fn new(keypair: SigningKey) -> Self {
        let address = Address::from_public_key(&keypair.verifying_key());
        Self { keypair, address }
    }

    /// Fresh random identity.
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        Self::new(SigningKey::generate(&mut csprng))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SuretyError::InvalidSignature("Invalid key length".to_string()))?;
        Ok(Self::new(SigningKey::from_bytes(&secret)))
    }

    /// Reproducible key for the `n`-th simulated oracle of a run.
    pub fn derive(seed: u64, n: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"surety-oracle");
        hasher.update(seed.to_be_bytes());
        hasher.update(n.to_be_bytes());
        let secret: [u8; 32] = hasher.finalize().into();
        Self::new(SigningKey::from_bytes(&secret))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> Vec<u8> {
        self.keypair.verifying_key().to_bytes().to_vec()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.keypair.sign(message).to_bytes()
    }

    pub fn sign_response(&self, response: StatusResponse) -> Result<SignedResponse> {
        let msg = response_signing_bytes(&response)?;
        Ok(SignedResponse {
            signature: self.sign(&msg),
            public_key: self.public_key(),
            response,
        })
    }
}

impl std::fmt::Debug for OracleSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleSigner").field("address", &self.address).finish()
    }
}
