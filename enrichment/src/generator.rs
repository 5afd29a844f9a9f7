use sha2::{Digest, Sha256};

use crate::model::EnrichRequest;

/// First 6 bytes of the SHA-256 digest of the seed, as an unsigned integer.
/// Stable across calls and process restarts; uniformity is all that matters
/// here, this is not a security primitive.
pub fn hash(seed: &str) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    digest[..6]
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

/// Integer in [0, 100].
pub fn score(seed: &str) -> i64 {
    (hash(seed) % 101) as i64
}

/// True with probability `threshold_pct` percent over the seed space.
pub fn chance(seed: &str, threshold_pct: u64) -> bool {
    hash(seed) % 100 < threshold_pct
}

/// One element of `options`; an empty slice yields the empty string.
pub fn pick<'a>(seed: &str, options: &[&'a str]) -> &'a str {
    if options.is_empty() {
        return "";
    }
    options[(hash(seed) % options.len() as u64) as usize]
}

/// Base seed for all per-service mock derivations. The same logical request
/// always produces the same seed, hence the same mock outputs.
pub fn request_seed(req: &EnrichRequest) -> String {
    let bin = req
        .payment
        .as_ref()
        .and_then(|p| p.card.as_ref())
        .and_then(|c| c.bin.as_deref())
        .filter(|b| !b.is_empty());

    identity_seed(&req.transaction_id, &req.data.email, req.data.ip.as_deref(), bin)
}

/// Seed for the simplified endpoints, which carry no transaction id or card.
pub fn simple_seed(email: &str, ip: Option<&str>) -> String {
    identity_seed("", email, ip, None)
}

fn identity_seed(transaction_id: &str, email: &str, ip: Option<&str>, bin: Option<&str>) -> String {
    let ip = ip.filter(|s| !s.is_empty()).unwrap_or("0.0.0.0");
    let bin = bin.unwrap_or("000000");
    format!("{transaction_id}|{email}|{ip}|{bin}")
}

/// Base seed for the full mock transaction, intentionally narrower than
/// [`request_seed`] so the synthesized transaction does not vary with ip or
/// card fields.
pub fn transaction_seed(req: &EnrichRequest) -> String {
    format!("{}|{}", req.transaction_id, req.data.email)
}
