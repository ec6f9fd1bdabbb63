use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imgchain_core::chain::{ChainedPayload, EditOp, Session};
use imgchain_core::crypto::SigScheme;
use imgchain_core::image::Canvas;
use secrecy::ExposeSecret;

/// imgchain - chained, signed version history embedded in an image's own pixels.
#[derive(Parser)]
#[command(name = "imgchain", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a fresh key pair and write it to two PEM files.
    Keygen {
        #[arg(long, value_enum)]
        scheme: SchemeArg,
        #[arg(long)]
        out_private: PathBuf,
        #[arg(long)]
        out_public: PathBuf,
    },
    /// Append one signed entry to an image's embedded chain.
    Commit {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        signer: String,
        #[arg(long, value_enum)]
        scheme: SchemeArg,
        /// JSON array of edit ops, e.g. '[{"type":"brightness","delta":1.3}]'.
        #[arg(long, default_value = "[]")]
        edit_log: String,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        public_key_out: PathBuf,
    },
    /// Verify every entry in an image's embedded chain.
    Verify {
        #[arg(long)]
        image: PathBuf,
        /// signer=path/to/public.pem, repeatable.
        #[arg(long = "key", value_parser = parse_key_arg)]
        keys: Vec<(String, PathBuf)>,
        /// Also cross-check the head entry's hash against this image's rendered pixels.
        #[arg(long)]
        uploaded: bool,
    },
    /// Run the bounded rotation-search extraction pipeline on an image.
    Extract {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out_json: Option<PathBuf>,
    },
}

#[derive(Clone, clap::ValueEnum)]
enum SchemeArg {
    RsaPss,
    EcdsaP256,
}

impl From<SchemeArg> for SigScheme {
    fn from(value: SchemeArg) -> Self {
        match value {
            SchemeArg::RsaPss => SigScheme::RsaPssSha256,
            SchemeArg::EcdsaP256 => SigScheme::EcdsaP256Sha256,
        }
    }
}

fn parse_key_arg(s: &str) -> Result<(String, PathBuf), String> {
    let (signer, path) = s
        .split_once('=')
        .ok_or_else(|| "expected signer=path/to/key.pem".to_string())?;
    Ok((signer.to_string(), PathBuf::from(path)))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {e:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Keygen { scheme, out_private, out_public } => keygen(scheme, out_private, out_public),
        Command::Commit { image, signer, scheme, edit_log, out, public_key_out } => {
            commit(image, signer, scheme, edit_log, out, public_key_out).await
        }
        Command::Verify { image, keys, uploaded } => verify(image, keys, uploaded),
        Command::Extract { image, out_json } => extract(image, out_json),
    }
}

fn keygen(scheme: SchemeArg, out_private: PathBuf, out_public: PathBuf) -> Result<i32> {
    let keys = imgchain_core::generate_keys(scheme.into()).context("key generation failed")?;
    std::fs::write(&out_private, keys.private_pem.expose_secret()).context("writing private key")?;
    std::fs::write(&out_public, &keys.public_pem).context("writing public key")?;
    eprintln!("✅ generated {} key pair", keys.scheme);
    Ok(0)
}

async fn commit(
    image: PathBuf,
    signer: String,
    scheme: SchemeArg,
    edit_log_json: String,
    out: PathBuf,
    public_key_out: PathBuf,
) -> Result<i32> {
    let bytes = std::fs::read(&image).with_context(|| format!("reading {}", image.display()))?;
    let canvas = Canvas::decode(&bytes).context("decoding image")?;

    let edit_log: Vec<EditOp> = serde_json::from_str(&edit_log_json).context("parsing --edit-log")?;

    let existing = imgchain_core::extract_with_details(&canvas);
    let (chain_id, existing_payload): (String, Option<ChainedPayload>) = match existing.payload {
        Some(payload) => (payload.chain_id.clone(), Some(payload)),
        None => (
            imgchain_core::sha256(&canvas.canonical_pixel_encoding().context("hashing canvas")?),
            None,
        ),
    };

    let mut session = Session::new();
    session.configure(signer, scheme.into()).context("configuring session")?;
    session.initialize(chain_id, existing_payload).context("initializing session")?;

    let outcome = imgchain_core::append_commit(&mut session, &canvas, edit_log)
        .await
        .context("appending commit")?;

    let encoded = outcome.canvas.encode_lossless().context("encoding output image")?;
    std::fs::write(&out, encoded).with_context(|| format!("writing {}", out.display()))?;
    let public_pem = session.keys.as_ref().expect("configured").public_pem.clone();
    std::fs::write(&public_key_out, public_pem).context("writing public key")?;

    if !outcome.dct_embedded {
        eprintln!("⚠️  image too small for the DCT layer; critical metadata was skipped");
    }
    eprintln!("✅ committed version {} ({} total)", outcome.payload.history.len(), outcome.payload.history.len());
    Ok(0)
}

fn verify(image: PathBuf, key_args: Vec<(String, PathBuf)>, uploaded: bool) -> Result<i32> {
    let bytes = std::fs::read(&image).with_context(|| format!("reading {}", image.display()))?;
    let canvas = Canvas::decode(&bytes).context("decoding image")?;

    let details = imgchain_core::extract_with_details(&canvas);
    let Some(payload) = details.payload else {
        eprintln!("⚠️  no embedded chain found in this image");
        return Ok(3);
    };

    let mut keys = Vec::with_capacity(key_args.len());
    for (signer, path) in key_args {
        let pem = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        keys.push((signer, pem));
    }

    let live_hash = imgchain_core::sha256(&canvas.canonical_pixel_encoding().context("hashing canvas")?);
    let (results, live_hash_matches) = imgchain_core::verify_chain(&payload, &keys, Some(&live_hash), uploaded);

    let mut all_valid = true;
    for r in &results {
        if r.signature_valid && r.chain_link_valid {
            eprintln!("✅ version {} valid", r.version);
        } else {
            all_valid = false;
            eprintln!(
                "❌ version {} invalid: {}",
                r.version,
                r.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    if let Some(false) = live_hash_matches {
        all_valid = false;
        eprintln!("❌ rendered pixels do not match the head entry's recorded hash");
    }

    if all_valid {
        Ok(0)
    } else {
        Ok(2)
    }
}

fn extract(image: PathBuf, out_json: Option<PathBuf>) -> Result<i32> {
    let bytes = std::fs::read(&image).with_context(|| format!("reading {}", image.display()))?;
    let result = imgchain_core::extract_with_rotations(&bytes).context("running extraction pipeline")?;

    match (&result.payload, &result.critical_metadata) {
        (None, None) => {
            eprintln!("⚠️  nothing recoverable from this image at any rotation");
            return Ok(3);
        }
        (Some(_), _) => {
            eprintln!("✅ full payload recovered at rotation {}°", result.rotation.unwrap_or(0));
        }
        (None, Some(_)) => {
            eprintln!(
                "⚠️  only critical metadata recovered (at rotation {}°); full payload unavailable",
                result.rotation.unwrap_or(0)
            );
        }
    }

    let json = serde_json::to_string_pretty(&result).context("serializing extraction result")?;
    match out_json {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        }
        None => println!("{json}"),
    }

    Ok(0)
}
