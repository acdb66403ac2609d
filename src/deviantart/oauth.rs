//! OAuth2 helpers for the DeviantArt authorization code flow

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use serde_json::Value;
use url::Url;

use super::errors::{ApiError, ApiResult};
use crate::config::{DA_ACCESS_TOKEN, DA_OAUTH_SCOPE, DA_REFRESH_TOKEN};

pub const AUTHORIZE_ENDPOINT: &str = "https://www.deviantart.com/oauth2/authorize";
pub const TOKEN_ENDPOINT: &str = "https://www.deviantart.com/oauth2/token";
pub const DEFAULT_SCOPES: &str = "browse user.manage";

/// Authorization URL the user opens in a browser
pub fn build_authorize_url(
    client_id: &str,
    redirect_uri: &str,
    scopes: &str,
    state: &str,
) -> ApiResult<String> {
    let url = Url::parse_with_params(
        AUTHORIZE_ENDPOINT,
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", scopes),
            ("state", state),
        ],
    )
    .map_err(|e| ApiError::Config(format!("Could not build authorize URL: {}", e)))?;
    Ok(url.into())
}

/// Random URL-safe state value
pub fn generate_state() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Tokens returned by the token endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Empty when the response did not say
    pub scope: String,
}

impl TokenSet {
    /// Parse a token endpoint response; both tokens are required
    pub fn from_response(payload: &Value) -> ApiResult<Self> {
        let field = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or("")
                .to_string()
        };

        let access_token = field("access_token");
        let refresh_token = field("refresh_token");
        if access_token.is_empty() || refresh_token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "OAuth token response was missing access_token or refresh_token.".to_string(),
            ));
        }
        Ok(Self {
            access_token,
            refresh_token,
            scope: field("scope"),
        })
    }

    /// `.env` updates persisting these tokens
    pub fn env_updates(&self) -> Vec<(&'static str, &str)> {
        let mut updates = vec![
            (DA_ACCESS_TOKEN, self.access_token.as_str()),
            (DA_REFRESH_TOKEN, self.refresh_token.as_str()),
        ];
        if !self.scope.is_empty() {
            updates.push((DA_OAUTH_SCOPE, self.scope.as_str()));
        }
        updates
    }
}

/// What a stored scope string allows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeCheck {
    pub has_browse: bool,
    pub has_user_manage: bool,
}

impl ScopeCheck {
    pub fn from_scope(scope: &str) -> Self {
        let tokens: Vec<&str> = scope.split_whitespace().collect();
        Self {
            has_browse: tokens.contains(&"browse"),
            has_user_manage: tokens.contains(&"user.manage"),
        }
    }

    /// Both read and write operations are allowed
    pub fn is_sufficient(&self) -> bool {
        self.has_browse && self.has_user_manage
    }
}

/// Whether an error response means the access token was rejected
pub fn looks_like_invalid_token(status: u16, body: &str) -> bool {
    if status != 401 && status != 403 {
        return false;
    }
    let text = body.to_lowercase();
    if text.contains("invalid_token") || text.contains("expired") {
        return true;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(payload) => {
            let lowered = |key: &str| {
                payload
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_lowercase()
            };
            lowered("error").contains("invalid_token")
                || lowered("error_description").contains("expired")
        }
        Err(_) => false,
    }
}
