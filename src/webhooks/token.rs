//! GitLab webhook token verification.
//!
//! GitLab authenticates webhook deliveries with a plain shared secret sent in
//! the `X-Gitlab-Token` header (there is no HMAC signature scheme). This
//! module checks the presented token against the configured secret. Token
//! verification is the first step in webhook processing; invalid tokens
//! should be rejected before parsing.
//!
//! An empty configured secret disables verification, matching GitLab's own
//! behavior when no secret token is set on the hook.

use sha2::{Digest, Sha256};

/// Verifies a GitLab webhook token against the configured secret.
///
/// Returns `true` if the secret is empty (verification disabled) or if the
/// presented token matches. A missing header is treated as an empty token.
///
/// The comparison is done on SHA-256 digests of the two strings, so the
/// number of compared bytes never depends on either input's length.
///
/// # Examples
///
/// ```
/// use gitlab_relay::webhooks::verify_token;
///
/// assert!(verify_token(Some("s3cret"), "s3cret"));
/// assert!(!verify_token(Some("wrong"), "s3cret"));
/// assert!(!verify_token(None, "s3cret"));
///
/// // Empty secret disables verification
/// assert!(verify_token(None, ""));
/// assert!(verify_token(Some("anything"), ""));
/// ```
pub fn verify_token(presented: Option<&str>, secret: &str) -> bool {
    if secret.is_empty() {
        return true;
    }

    let presented = presented.unwrap_or("");
    digest(presented) == digest(secret)
}

fn digest(s: &str) -> [u8; 32] {
    Sha256::digest(s.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn matching_token_verifies() {
        assert!(verify_token(Some("token-123"), "token-123"));
    }

    #[test]
    fn mismatched_token_fails() {
        assert!(!verify_token(Some("token-123"), "token-456"));
    }

    #[test]
    fn missing_header_fails_when_secret_configured() {
        assert!(!verify_token(None, "token-123"));
    }

    #[test]
    fn empty_token_fails_when_secret_configured() {
        assert!(!verify_token(Some(""), "token-123"));
    }

    #[test]
    fn empty_secret_accepts_anything() {
        assert!(verify_token(None, ""));
        assert!(verify_token(Some(""), ""));
        assert!(verify_token(Some("whatever"), ""));
    }

    proptest! {
        /// A token always verifies against itself.
        #[test]
        fn prop_token_verifies_against_itself(token in ".{0,64}") {
            prop_assume!(!token.is_empty());
            prop_assert!(verify_token(Some(&token), &token));
        }

        /// Distinct tokens never verify against each other.
        #[test]
        fn prop_distinct_tokens_fail(a in ".{1,64}", b in ".{1,64}") {
            prop_assume!(a != b);
            prop_assert!(!verify_token(Some(&a), &b));
        }

        /// Verification never panics on arbitrary input.
        #[test]
        fn prop_no_panic(presented in proptest::option::of(".{0,128}"), secret in ".{0,128}") {
            let _ = verify_token(presented.as_deref(), &secret);
        }
    }
}
