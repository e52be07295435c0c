use crate::error::{TsiError, TsiResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// Supplies the `Authorization` header value for TSI calls.
///
/// Implementations are asked once per operation; caching and refreshing
/// tokens is their own business.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return the full header value, e.g. `"Bearer eyJ0..."`
    async fn get_token(&self) -> TsiResult<String>;
}

/// Fixed bearer token, for short-lived tools and tests
#[derive(Debug, Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    /// Accepts either a raw access token or an already prefixed
    /// `"Bearer ..."` value.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for BearerToken {
    async fn get_token(&self) -> TsiResult<String> {
        if self.token.trim().is_empty() {
            return Err(TsiError::auth_error("empty bearer token"));
        }
        if self.token.starts_with("Bearer ") {
            Ok(self.token.clone())
        } else {
            Ok(format!("Bearer {}", self.token))
        }
    }
}

/// Fetch a token and place it in `headers`
pub(crate) async fn apply_token(
    provider: &dyn TokenProvider,
    headers: &mut HeaderMap,
) -> TsiResult<()> {
    let token = provider.get_token().await?;
    let mut value: HeaderValue = token
        .parse()
        .map_err(|e| TsiError::auth_error(format!("Invalid auth header: {}", e)))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);

    Ok(())
}
