use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// The two first-class signature schemes. Selected per entry, never mixed
/// within a single signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SigScheme {
    RsaPssSha256,
    EcdsaP256Sha256,
}

impl SigScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            SigScheme::RsaPssSha256 => "rsa-pss-sha256",
            SigScheme::EcdsaP256Sha256 => "ecdsa-p256-sha256",
        }
    }
}

impl std::str::FromStr for SigScheme {
    type Err = crate::error::ImgChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rsa-pss-sha256" => Ok(SigScheme::RsaPssSha256),
            "ecdsa-p256-sha256" => Ok(SigScheme::EcdsaP256Sha256),
            other => Err(crate::error::ImgChainError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl std::fmt::Display for SigScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated or imported key pair, PEM-encoded for export. The private
/// half is held as a `SecretString` so it zeroizes on drop and doesn't
/// accidentally end up in a `Debug` dump.
pub struct KeyPair {
    pub scheme: SigScheme,
    pub private_pem: SecretString,
    pub public_pem: String,
}
