//! Request authorization used to decide whether a caller may exceed the page size limit.

use std::collections::HashSet;
use tracing::warn;

/// Environment variable holding a JSON array of accepted bearer tokens.
pub const API_AUTH_TOKENS_ENV: &str = "API_AUTH_TOKENS";

/// Decides whether a request is authorized from its `Authorization` header.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, authorization_header: Option<&str>) -> bool;
}

/// Accepts requests carrying one of a fixed set of bearer tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenAuthorizer {
    tokens: HashSet<String>,
}

impl TokenAuthorizer {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .map(|token: String| token.trim().to_string())
                .filter(|token| !token.is_empty())
                .collect(),
        }
    }

    /// Parse a JSON array of tokens. A malformed list is logged and accepts nothing.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(tokens) => Self::new(tokens),
            Err(e) => {
                warn!(error = %e, "Invalid {} format; no tokens accepted", API_AUTH_TOKENS_ENV);
                Self::default()
            }
        }
    }

    /// Tokens from `API_AUTH_TOKENS`, or none when unset.
    pub fn from_env() -> Self {
        std::env::var(API_AUTH_TOKENS_ENV)
            .map(|raw| Self::from_json(&raw))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Authorizer for TokenAuthorizer {
    fn is_authorized(&self, authorization_header: Option<&str>) -> bool {
        let header = match authorization_header {
            Some(header) if !header.trim().is_empty() => header,
            _ => return false,
        };

        let token = header.replace("Bearer ", "");
        self.tokens.contains(token.trim())
    }
}
