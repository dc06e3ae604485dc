use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

pub const SIGNATURE_HEADER: &str = "x-gitlab-token";
pub const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

const DIGEST_HEX_LEN: usize = 64;

/// Only the exact form `sign` produces is accepted: 64 lowercase hex digits.
fn is_canonical_digest(hex_digest: &str) -> bool {
    hex_digest.len() == DIGEST_HEX_LEN
        && hex_digest
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Checks `sha256=<hex>` HMAC signatures of webhook bodies.
///
/// Without a secret every request is accepted, which keeps local development
/// working without GitLab-side configuration.
#[derive(Clone, Default)]
pub struct SignatureVerifier {
    secret: Option<String>,
}

impl SignatureVerifier {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(str::to_owned),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            warn!("No webhook secret configured");
            return true;
        };

        let Some(digest) = signature
            .strip_prefix(SIGNATURE_PREFIX)
            .filter(|hex_digest| is_canonical_digest(hex_digest))
            .and_then(|hex_digest| hex::decode(hex_digest).ok())
        else {
            return false;
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(body);
        // verify_slice compares in constant time
        mac.verify_slice(&digest).is_ok()
    }

    /// Produces the header value a sender holding the same secret would
    /// attach to `body`. `None` when no secret is configured.
    pub fn sign(&self, body: &[u8]) -> Option<String> {
        let secret = self.secret.as_deref()?;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(body);
        Some(format!(
            "{SIGNATURE_PREFIX}{}",
            hex::encode(mac.finalize().into_bytes())
        ))
    }
}
