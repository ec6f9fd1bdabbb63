use crate::crypto::{KeyPair, SigScheme};
use crate::error::{ImgChainError, Result};

use super::model::ChainedPayload;

/// Session lifecycle, exactly the three states from spec.md §4.5. A
/// session is a value, not a singleton: the editor (an external
/// collaborator, out of scope here) owns one and passes it by value/
/// reference — there is no ambient global session state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Configured,
    Initialized,
}

/// Owns the signing key pair exclusively (read-only for signing) and the
/// current payload. Reset discards all of it; nothing here is persisted
/// except through an exported image or key file.
pub struct Session {
    pub state: SessionState,
    pub signer: Option<String>,
    pub scheme: Option<SigScheme>,
    pub keys: Option<KeyPair>,
    pub chain_id: Option<String>,
    pub payload: Option<ChainedPayload>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: SessionState::Idle,
            signer: None,
            scheme: None,
            keys: None,
            chain_id: None,
            payload: None,
        }
    }

    /// Idle -> Configured: set signer identity and scheme, generate keys.
    pub fn configure(&mut self, signer: impl Into<String>, scheme: SigScheme) -> Result<()> {
        let keys = crate::crypto::generate_keys(scheme)?;
        self.signer = Some(signer.into());
        self.scheme = Some(scheme);
        self.keys = Some(keys);
        self.state = SessionState::Configured;
        Ok(())
    }

    /// Configured -> Initialized: ingest an image. `chain_id` is computed
    /// by the caller from the canonical pixel encoding of the original
    /// upload; `existing_payload` is whatever was already embedded in that
    /// image, if any (adopted as-is, never mutated by this call).
    pub fn initialize(&mut self, chain_id: String, existing_payload: Option<ChainedPayload>) -> Result<()> {
        if self.state == SessionState::Idle {
            return Err(ImgChainError::internal(
                "session must be configured (signer + scheme set) before it can be initialized",
            ));
        }
        self.chain_id = Some(chain_id.clone());
        self.payload = Some(existing_payload.unwrap_or_else(|| ChainedPayload::new(chain_id)));
        self.state = SessionState::Initialized;
        Ok(())
    }

    /// -> Idle: discard the in-memory key pair, signer, and payload.
    pub fn reset(&mut self) {
        *self = Session::new();
    }
}
