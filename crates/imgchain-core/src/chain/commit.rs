use chrono::Utc;
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::crypto::{canonicalize_signable, sha256_hex};
use crate::dct;
use crate::error::{ImgChainError, Result};
use crate::image::{snapshot, Canvas};
use crate::lsb;

use super::model::{ChainedPayload, EditOp, HistoryEntry};
use super::session::{Session, SessionState};

pub struct CommitOutcome {
    pub canvas: Canvas,
    pub payload: ChainedPayload,
    /// false when the canvas was too small for the DCT layer (spec.md B2):
    /// the commit still succeeds, the DCT write is just skipped.
    pub dct_embedded: bool,
}

/// Append exactly one entry and re-embed the whole history into the
/// canvas. DCT write strictly precedes LSB write (spec.md §4.5/§5): the
/// LSB layer operates on the already DCT-adjusted pixels and must be the
/// last writer.
pub async fn append_commit(
    session: &mut Session,
    canvas: &Canvas,
    edit_log: Vec<EditOp>,
) -> Result<CommitOutcome> {
    if session.state != SessionState::Initialized {
        return Err(ImgChainError::internal(
            "session must be initialized (image ingested) before a commit",
        ));
    }
    let signer = session.signer.clone().expect("configured session has a signer");
    let scheme = session.scheme.expect("configured session has a scheme");
    let keys = session
        .keys
        .as_ref()
        .expect("configured session has a key pair");
    let mut payload = session.payload.clone().expect("initialized session has a payload");

    // 1. render canvas (given); compute canonical pixel hash.
    let current_hash = sha256_hex(&canvas.canonical_pixel_encoding()?);
    debug!(hash = %current_hash, "computed pre-embedding canvas hash");

    // 2. build the new entry.
    let (version, parent_hash) = match payload.last() {
        Some(prev) => (prev.version + 1, Some(prev.sha256.clone())),
        None => (1u64, None),
    };
    let wants_snapshot = HistoryEntry::wants_snapshot(version, &edit_log);
    let snap = if wants_snapshot {
        Some(snapshot::snapshot(
            canvas,
            snapshot::DEFAULT_SNAPSHOT_WIDTH,
            snapshot::DEFAULT_SNAPSHOT_QUALITY,
        )?)
    } else {
        None
    };

    let mut entry = HistoryEntry {
        version,
        sha256: current_hash,
        parent_hash,
        timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        signer,
        sig_scheme: scheme,
        edit_log,
        snapshot: snap,
        signature: String::new(),
    };

    // 3. canonicalize (sans signature), sign, attach.
    let canonical_bytes = canonicalize_signable(&entry);
    let signature = crate::crypto::sign(&canonical_bytes, keys.private_pem.expose_secret(), scheme)?;
    entry.signature = signature;

    // 4. append.
    payload.history.push(entry);

    // 5. build critical metadata, embed DCT then LSB on a fresh render.
    let last_hash = payload.last().expect("just pushed").sha256.clone();
    let metadata = dct::CriticalMetadata::new(
        payload.chain_id.clone(),
        payload.history.len() as u64,
        last_hash,
    );

    let (after_dct, dct_embedded) = match dct::try_embed(canvas, &metadata) {
        Some(c) => (c, true),
        None => {
            tracing::warn!("image too small for DCT layer; skipping and flagging");
            (canvas.clone(), false)
        }
    };
    payload.dct_metadata = if dct_embedded { Some(metadata) } else { None };

    let lsb_payload = payload.without_dct_metadata();
    let lsb_json = crate::crypto::canonicalize(&serde_json::to_value(&lsb_payload)?);
    let final_canvas = lsb::embed(&after_dct, &lsb_json)?;

    session.payload = Some(payload.clone());
    info!(version = payload.history.len(), dct_embedded, "commit appended");

    Ok(CommitOutcome {
        canvas: final_canvas,
        payload,
        dct_embedded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::session::Session;
    use crate::crypto::SigScheme;

    fn gradient(w: u32, h: u32) -> Canvas {
        let mut c = Canvas::new(w, h);
        for y in 0..h {
            for x in 0..w {
                c.set_rgb(x, y, [(x % 256) as u8, (y % 256) as u8, 128]);
                let i = c.pixel_index(x, y);
                c.pixels[i + 3] = 255;
            }
        }
        c
    }

    #[tokio::test]
    async fn first_commit_has_version_one_and_no_parent() {
        let mut session = Session::new();
        session.configure("Studio", SigScheme::EcdsaP256Sha256).unwrap();
        let canvas = gradient(256, 256);
        let chain_id = sha256_hex(&canvas.canonical_pixel_encoding().unwrap());
        session.initialize(chain_id, None).unwrap();

        let outcome = append_commit(&mut session, &canvas, vec![]).await.unwrap();
        assert_eq!(outcome.payload.history.len(), 1);
        assert_eq!(outcome.payload.history[0].version, 1);
        assert!(outcome.payload.history[0].parent_hash.is_none());
        assert!(outcome.payload.history[0].snapshot.is_some());
    }

    #[tokio::test]
    async fn second_commit_links_to_first() {
        let mut session = Session::new();
        session.configure("Studio", SigScheme::EcdsaP256Sha256).unwrap();
        let canvas = gradient(256, 256);
        let chain_id = sha256_hex(&canvas.canonical_pixel_encoding().unwrap());
        session.initialize(chain_id, None).unwrap();

        let first = append_commit(&mut session, &canvas, vec![]).await.unwrap();
        let second = append_commit(&mut session, &first.canvas, vec![EditOp::Brightness { delta: 1.3 }])
            .await
            .unwrap();

        assert_eq!(second.payload.history.len(), 2);
        assert_eq!(second.payload.history[1].version, 2);
        assert_eq!(
            second.payload.history[1].parent_hash.as_deref(),
            Some(second.payload.history[0].sha256.as_str())
        );
    }
}
