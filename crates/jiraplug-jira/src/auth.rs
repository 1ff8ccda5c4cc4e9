//! JIRA authentication

use base64::Engine;
use std::fmt;

/// Basic-auth credential derived from a user and a password or API token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Base64 of `user:secret` (UTF-8).
    pub fn build(user: &str, secret: &str) -> Self {
        let credentials = format!("{}:{}", user, secret);
        Self(base64::engine::general_purpose::STANDARD.encode(credentials))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_basic_auth(&self) -> String {
        format!("Basic {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_token() {
        let token = AccessToken::build("alice", "secret");
        assert_eq!(token.as_str(), "YWxpY2U6c2VjcmV0");
        assert_eq!(token.to_basic_auth(), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_build_is_deterministic_and_utf8() {
        let a = AccessToken::build("jürgen", "pässword");
        let b = AccessToken::build("jürgen", "pässword");
        assert_eq!(a, b);

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(a.as_str())
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "jürgen:pässword");
    }

    #[test]
    fn test_debug_does_not_leak() {
        let token = AccessToken::build("alice", "secret");
        assert!(!format!("{:?}", token).contains(token.as_str()));
    }
}
