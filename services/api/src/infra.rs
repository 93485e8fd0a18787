use metrics_exporter_prometheus::PrometheusHandle;
use mangrove_watch::triage::{ModeratorAuthorizer, ModeratorGrant};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Accepts a bearer token whose BLAKE3 digest matches the configured one.
///
/// Only the digest is held in memory; with no digest configured every credential is refused.
#[derive(Debug, Clone)]
pub(crate) struct TokenDigestAuthorizer {
    digest: Option<blake3::Hash>,
}

impl TokenDigestAuthorizer {
    pub(crate) fn new(digest: Option<blake3::Hash>) -> Self {
        Self { digest }
    }

    pub(crate) fn from_hex(hex: Option<&str>) -> Result<Self, blake3::HexError> {
        let digest = hex.map(blake3::Hash::from_hex).transpose()?;
        Ok(Self::new(digest))
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }
}

impl ModeratorAuthorizer for TokenDigestAuthorizer {
    fn authorize(&self, credential: &str) -> Option<ModeratorGrant> {
        let expected = self.digest.as_ref()?;
        // blake3::Hash equality is constant time.
        if blake3::hash(credential.as_bytes()) == *expected {
            Some(ModeratorGrant::new("moderator"))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorizes_only_the_matching_token() {
        let digest = blake3::hash(b"mudflat-patrol");
        let authorizer = TokenDigestAuthorizer::from_hex(Some(digest.to_hex().as_str()))
            .expect("digest parses");

        assert!(authorizer.is_enabled());
        let grant = authorizer
            .authorize("mudflat-patrol")
            .expect("matching token is accepted");
        assert_eq!(grant.moderator(), "moderator");
        assert!(authorizer.authorize("mudflat-patrol ").is_none());
        assert!(authorizer.authorize("").is_none());
    }

    #[test]
    fn refuses_everything_without_a_digest() {
        let authorizer = TokenDigestAuthorizer::from_hex(None).expect("no digest is valid");
        assert!(!authorizer.is_enabled());
        assert!(authorizer.authorize("anything").is_none());
    }

    #[test]
    fn rejects_malformed_digests() {
        assert!(TokenDigestAuthorizer::from_hex(Some("zz")).is_err());
    }
}
