//! Shared-password access gate for the HTTP surface.
//!
//! The gate keeps only an HMAC-SHA256 tag derived from the configured
//! password, never the password itself. A candidate is checked by
//! recomputing the tag under the candidate and verifying it against the
//! stored one in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Fixed message the tag is computed over; the password is the key.
const ACCESS_CONTEXT: &[u8] = b"mealprep-access-v1";

/// Errors returned by [`AccessGate::check`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("access password required")]
    Missing,

    #[error("incorrect access password")]
    Denied,
}

/// Password gate. A gate built without a password admits everyone.
#[derive(Clone, Default)]
pub struct AccessGate {
    tag: Option<Vec<u8>>,
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl AccessGate {
    /// Build a gate. `None` or an empty password disables it.
    pub fn new(password: Option<&str>) -> Self {
        let tag = password
            .filter(|p| !p.is_empty())
            .and_then(|p| compute_tag(p.as_bytes()));
        Self { tag }
    }

    /// A gate that admits every request.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.tag.is_some()
    }

    /// Check a candidate password.
    pub fn check(&self, candidate: Option<&str>) -> Result<(), GateError> {
        let Some(tag) = &self.tag else {
            return Ok(());
        };
        let candidate = candidate.filter(|c| !c.is_empty()).ok_or(GateError::Missing)?;

        let mut mac =
            HmacSha256::new_from_slice(candidate.as_bytes()).map_err(|_| GateError::Denied)?;
        mac.update(ACCESS_CONTEXT);
        mac.verify_slice(tag).map_err(|_| GateError::Denied)
    }
}

fn compute_tag(key: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(ACCESS_CONTEXT);
    Some(mac.finalize().into_bytes().to_vec())
}
