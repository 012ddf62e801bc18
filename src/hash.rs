//! Session ID hashing
//!
//! When enabled, documents are addressed by `hex(digest(salt + sid))` instead
//! of the raw session ID. The same hasher is applied by every store operation
//! so reads, writes and deletes agree on the document URI.

use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::config::HashConfig;
use crate::error::SessionError;

/// Supported digest algorithms
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Parse a digest name as accepted by Node's `crypto.createHash`
    pub fn from_name(name: &str) -> Result<Self, SessionError> {
        match name.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(SessionError::ConfigurationError(format!(
                "unsupported hash algorithm: {}",
                name
            ))),
        }
    }

    fn digest(self, input: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha1 => Sha1::digest(input).to_vec(),
            HashAlgorithm::Sha224 => Sha224::digest(input).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(input).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(input).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(input).to_vec(),
        }
    }
}

/// Salted session ID hasher
#[derive(Clone, Debug)]
pub struct SidHasher {
    salt: String,
    algorithm: HashAlgorithm,
}

impl SidHasher {
    pub fn new<S: Into<String>>(salt: S, algorithm: HashAlgorithm) -> Self {
        Self {
            salt: salt.into(),
            algorithm,
        }
    }

    /// Build a hasher from configuration, applying the default salt and algorithm
    pub fn from_config(config: &HashConfig) -> Result<Self, SessionError> {
        let algorithm = HashAlgorithm::from_name(config.algorithm())?;
        Ok(Self::new(config.salt(), algorithm))
    }

    /// Hex-encoded digest of salt followed by the session ID
    pub fn hash(&self, sid: &str) -> String {
        let mut input = Vec::with_capacity(self.salt.len() + sid.len());
        input.extend_from_slice(self.salt.as_bytes());
        input.extend_from_slice(sid.as_bytes());
        hex::encode(self.algorithm.digest(&input))
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}
