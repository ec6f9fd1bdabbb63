use imgchain_core::crypto::SigScheme;
use imgchain_core::dct::CriticalMetadata;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Deserialize)]
struct Kat {
    canonical: Option<CanonicalKat>,
    signature: Option<SignatureKat>,
    dct_metadata: Option<DctKat>,
}

#[derive(Deserialize)]
struct CanonicalKat {
    record: serde_json::Value,
    expected_hex: String,
}

#[derive(Deserialize)]
struct SignatureKat {
    scheme: String,
    canonical_hex: String,
    public_pem: String,
    expected_signature_b64: String,
}

#[derive(Deserialize)]
struct DctKat {
    chain_id: String,
    version_count: u64,
    last_version_hash: String,
    expected_checksum: String,
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).expect("usage: verify-kat file.json");
    let data = std::fs::read_to_string(path)?;
    let kat: Kat = serde_json::from_str(&data)?;

    if let Some(c) = &kat.canonical {
        let got = hex::encode(imgchain_core::canonicalize(&c.record));
        if got != c.expected_hex {
            anyhow::bail!("canonical encoding mismatch: got {got}, expected {}", c.expected_hex);
        }
    }

    if let Some(s) = &kat.signature {
        let scheme = SigScheme::from_str(&s.scheme)?;
        let canonical_bytes = hex::decode(&s.canonical_hex)?;
        let ok = imgchain_core::verify(&canonical_bytes, &s.expected_signature_b64, &s.public_pem, scheme)?;
        if !ok {
            anyhow::bail!("signature fixture does not verify under its declared scheme");
        }
    }

    if let Some(d) = &kat.dct_metadata {
        let metadata = CriticalMetadata::new(d.chain_id.clone(), d.version_count, d.last_version_hash.clone());
        if metadata.checksum != d.expected_checksum {
            anyhow::bail!(
                "dct metadata checksum mismatch: got {}, expected {}",
                metadata.checksum,
                d.expected_checksum
            );
        }
        if !metadata.checksum_is_valid() {
            anyhow::bail!("dct metadata checksum does not self-validate");
        }
    }

    println!("KAT OK");
    Ok(())
}
