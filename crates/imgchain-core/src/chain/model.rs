use serde::{Deserialize, Serialize};

use crate::crypto::SigScheme;
use crate::dct::CriticalMetadata;
use crate::image::Snapshot;

/// One descriptive edit operation. Operations are never re-applied during
/// verification — they are a log entry, not a replayable transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditOp {
    Brightness { delta: f64 },
    Contrast { delta: f64 },
    Crop { x: i64, y: i64, w: i64, h: i64 },
    Rotate { angle: f64 },
    Compress { quality: f64 },
    Filter { filter: FilterKind },
    Text { text: String, x: i64, y: i64, font: String, color: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    None,
    Grayscale,
    Sepia,
    Invert,
}

impl EditOp {
    /// Crop, rotate, compress, filter, and text edits are destructive —
    /// they can change geometry or irreversibly quantize pixels, so they
    /// gate whether a snapshot is captured for this version.
    pub fn is_destructive(&self) -> bool {
        !matches!(self, EditOp::Brightness { .. } | EditOp::Contrast { .. })
    }
}

/// One immutable, signed step in a chain's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub version: u64,
    pub sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_hash: Option<String>,
    pub timestamp: String,
    pub signer: String,
    pub sig_scheme: SigScheme,
    pub edit_log: Vec<EditOp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
    pub signature: String,
}

impl HistoryEntry {
    /// True iff at least one op in the edit log is destructive, or this is
    /// the first version — the exact snapshot-presence rule from spec.md
    /// §3/§4.5 (Q2 resolved in favor of "v1 always, v2+ only if
    /// destructive").
    pub fn wants_snapshot(version: u64, edit_log: &[EditOp]) -> bool {
        version == 1 || edit_log.iter().any(EditOp::is_destructive)
    }
}

/// The whole thing that rides inside the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainedPayload {
    pub chain_id: String,
    pub history: Vec<HistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dct_metadata: Option<CriticalMetadata>,
}

impl ChainedPayload {
    pub fn new(chain_id: String) -> Self {
        ChainedPayload {
            chain_id,
            history: Vec::new(),
            dct_metadata: None,
        }
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// The `ChainedPayload` shape that actually rides through the LSB
    /// layer: `dct_metadata` is never round-tripped through it (spec.md
    /// §4.4), so this is what gets canonicalized and compressed there.
    pub fn without_dct_metadata(&self) -> ChainedPayload {
        ChainedPayload {
            chain_id: self.chain_id.clone(),
            history: self.history.clone(),
            dct_metadata: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_and_contrast_are_not_destructive() {
        assert!(!EditOp::Brightness { delta: 1.0 }.is_destructive());
        assert!(!EditOp::Contrast { delta: 1.0 }.is_destructive());
    }

    #[test]
    fn crop_rotate_compress_filter_text_are_destructive() {
        assert!(EditOp::Crop { x: 0, y: 0, w: 1, h: 1 }.is_destructive());
        assert!(EditOp::Rotate { angle: 90.0 }.is_destructive());
        assert!(EditOp::Compress { quality: 0.5 }.is_destructive());
        assert!(EditOp::Filter { filter: FilterKind::Sepia }.is_destructive());
        assert!(EditOp::Text {
            text: "hi".into(),
            x: 0,
            y: 0,
            font: "sans".into(),
            color: "#000".into()
        }
        .is_destructive());
    }

    #[test]
    fn snapshot_wanted_on_v1_regardless_of_edits() {
        assert!(HistoryEntry::wants_snapshot(1, &[]));
    }

    #[test]
    fn snapshot_not_wanted_on_v2_with_only_nondestructive_edits() {
        let edits = vec![EditOp::Brightness { delta: 1.2 }];
        assert!(!HistoryEntry::wants_snapshot(2, &edits));
    }

    #[test]
    fn snapshot_wanted_on_v2_with_a_destructive_edit() {
        let edits = vec![EditOp::Brightness { delta: 1.2 }, EditOp::Filter { filter: FilterKind::Sepia }];
        assert!(HistoryEntry::wants_snapshot(2, &edits));
    }
}
