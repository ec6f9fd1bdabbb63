use imgchain_core::chain::{append_commit, EditOp, Session};
use imgchain_core::crypto::{sha256_hex, SigScheme};
use imgchain_core::error::ImgChainError;
use imgchain_core::image::Canvas;

fn solid(w: u32, h: u32) -> Canvas {
    let mut c = Canvas::new(w, h);
    for y in 0..h {
        for x in 0..w {
            c.set_rgb(x, y, [10, 20, 30]);
            let i = c.pixel_index(x, y);
            c.pixels[i + 3] = 255;
        }
    }
    c
}

/// B1: an image too small to fit the LSB frame fails commit with
/// CapacityExceeded.
#[tokio::test]
async fn b1_tiny_image_reports_capacity_exceeded() {
    let mut session = Session::new();
    session.configure("Studio", SigScheme::EcdsaP256Sha256).unwrap();
    let canvas = solid(2, 2);
    let chain_id = sha256_hex(&canvas.canonical_pixel_encoding().unwrap());
    session.initialize(chain_id, None).unwrap();

    let err = append_commit(&mut session, &canvas, vec![]).await.unwrap_err();
    assert!(matches!(err, ImgChainError::CapacityExceeded { .. }));
}

/// B2: an image too small for the DCT frame still commits, but the DCT
/// layer is flagged as skipped; the LSB payload is still present.
#[tokio::test]
async fn b2_small_canvas_skips_dct_but_keeps_lsb_payload() {
    let mut session = Session::new();
    session.configure("Studio", SigScheme::EcdsaP256Sha256).unwrap();
    // 64x64 carries plenty of LSB capacity but too few 8x8 blocks for the
    // DCT-framed metadata record (ICMETA1 + length + json + checksum).
    let canvas = solid(64, 64);
    let chain_id = sha256_hex(&canvas.canonical_pixel_encoding().unwrap());
    session.initialize(chain_id, None).unwrap();

    let outcome = append_commit(&mut session, &canvas, vec![]).await.unwrap();
    assert!(!outcome.dct_embedded);

    let details = imgchain_core::extract_with_details(&outcome.canvas);
    assert!(details.critical_metadata.is_none());
    assert!(details.payload.is_some());
}

/// B3: a chain with exactly one entry round-trips; parent_hash absent,
/// version = 1.
#[tokio::test]
async fn b3_single_entry_chain_round_trips() {
    let mut session = Session::new();
    session.configure("Studio", SigScheme::EcdsaP256Sha256).unwrap();
    let canvas = solid(256, 256);
    let chain_id = sha256_hex(&canvas.canonical_pixel_encoding().unwrap());
    session.initialize(chain_id.clone(), None).unwrap();

    let outcome = append_commit(&mut session, &canvas, vec![]).await.unwrap();
    assert_eq!(outcome.payload.history.len(), 1);
    assert_eq!(outcome.payload.history[0].version, 1);
    assert!(outcome.payload.history[0].parent_hash.is_none());
    assert_eq!(outcome.payload.chain_id, chain_id);

    let details = imgchain_core::extract_with_details(&outcome.canvas);
    let recovered = details.payload.unwrap();
    assert_eq!(recovered.history.len(), 1);
}

/// B4 (Q1 resolution): an entry with an empty edit_log on a non-initial
/// version is legal and may share its pre-embedding `sha256` with its
/// parent, since `sha256` is hashed from the canvas *handed in* to that
/// commit, before this call's own embedding touches it. Re-committing the
/// same pre-embedding canvas twice (not its embedded output) is the case
/// this covers: an empty edit log on an unchanged canvas reproduces the
/// same pre-embedding hash.
#[tokio::test]
async fn b4_duplicate_hash_on_empty_edit_log_is_legal() {
    let mut session = Session::new();
    session.configure("Studio", SigScheme::EcdsaP256Sha256).unwrap();
    let canvas = solid(256, 256);
    let chain_id = sha256_hex(&canvas.canonical_pixel_encoding().unwrap());
    session.initialize(chain_id, None).unwrap();

    append_commit(&mut session, &canvas, vec![]).await.unwrap();
    let second = append_commit(&mut session, &canvas, vec![] as Vec<EditOp>).await.unwrap();

    assert_eq!(second.payload.history.len(), 2);
    assert_eq!(second.payload.history[0].sha256, second.payload.history[1].sha256);
}
