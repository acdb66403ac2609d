//! DeviantArt REST client
//!
//! - One request at a time, driven through a tokio runtime handle
//! - Rejected access tokens are refreshed once and the request replayed once
//! - 429 and 5xx responses are retried with linear backoff
//! - Listing responses go through the `ResponseCache`; bodies never do

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::runtime::Handle;

use super::cache::ResponseCache;
use super::errors::{ApiError, ApiResult};
use super::gallery::{
    extract_gallery_deviation_urls, literature_sequence, match_folder, normalize_url,
    parse_folders, parse_gallery_results, parse_gallery_target, DeviationSummary, GalleryFolder,
    GalleryTarget, ListingOrder,
};
use super::oauth::{looks_like_invalid_token, TokenSet, TOKEN_ENDPOINT};
use crate::config::Config;
use crate::navigation::DocumentSequence;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::sync::{
    CollaboratorResult, ContentSink, ContentSource, FetchedDocument, PreservedFields,
};

pub const API_BASE: &str = "https://www.deviantart.com/api/v1/oauth2";
pub const USER_AGENT: &str = "da-story-edit/0.1.0 (+https://github.com/zoec98/da-story-edit)";

/// Gallery page size
pub const PAGE_LIMIT: usize = 24;

/// Metadata fields resent unchanged with every literature update
pub const PRESERVED_KEYS: &[&str] = &[
    "title",
    "is_mature",
    "mature_level",
    "mature_classification",
    "allow_comments",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SNIPPET_LEN: usize = 300;

/// Tunables for the client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Retries after the first attempt for 429 and 5xx responses
    pub max_retries: u32,
    /// Delay unit; attempt `n` waits `n * backoff`
    pub backoff: Duration,
    pub order: ListingOrder,
    pub cache: Option<ResponseCache>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(500),
            order: ListingOrder::default(),
            cache: None,
        }
    }
}

/// Gallery input resolved to an API listing
#[derive(Debug, Clone)]
pub struct ResolvedGallery {
    pub target: GalleryTarget,
    pub folder_id: Option<String>,
    /// Every entry, in listing API order
    pub deviations: Vec<DeviationSummary>,
}

#[derive(Debug, Clone)]
enum Body {
    None,
    Form(Vec<(String, String)>),
}

/// One API call, replayable after a token refresh
#[derive(Debug, Clone)]
struct ApiRequest {
    path: String,
    query: Vec<(String, String)>,
    body: Body,
    cacheable: bool,
}

impl ApiRequest {
    fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            body: Body::None,
            cacheable: false,
        }
    }

    fn post_form(path: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            body: Body::Form(form),
            cacheable: false,
        }
    }

    fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    fn cached(mut self) -> Self {
        self.cacheable = true;
        self
    }
}

/// Error snippet: first characters of the body on one line
fn snippet(text: &str) -> String {
    text.chars()
        .take(SNIPPET_LEN)
        .collect::<String>()
        .replace(['\n', '\r'], " ")
}

/// Offset of the page after one read at `offset`, `None` when done
///
/// Stops on `has_more: false`, on an empty page without `next_offset`, and
/// on a `next_offset` that does not move forward.
fn next_page_offset(payload: &Value, offset: usize, page_len: usize) -> Option<usize> {
    if !payload.get("has_more").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    match payload.get("next_offset").and_then(Value::as_u64) {
        Some(next) if next as usize > offset => Some(next as usize),
        Some(_) => None,
        None if page_len == 0 => None,
        None => Some(offset + page_len),
    }
}

/// Form value for a preserved metadata field; `None` for nulls
fn form_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Fields of `metadata` that must survive an update
pub fn preserved_from_metadata(metadata: &Value) -> PreservedFields {
    PRESERVED_KEYS
        .iter()
        .filter_map(|key| {
            metadata
                .get(*key)
                .filter(|value| !value.is_null())
                .map(|value| (key.to_string(), value.clone()))
        })
        .collect()
}

/// Form body of a literature update
pub fn update_form(body: &str, preserved: &PreservedFields) -> Vec<(String, String)> {
    let mut form = vec![("text".to_string(), body.to_string())];
    form.extend(
        preserved
            .iter()
            .filter_map(|(key, value)| form_value(value).map(|v| (key.clone(), v))),
    );
    form
}

/// DeviantArt API client holding the current tokens
pub struct DeviantArtClient {
    http: Client,
    runtime: Handle,
    config: Mutex<Config>,
    options: ClientOptions,
}

impl std::fmt::Debug for DeviantArtClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviantArtClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DeviantArtClient {
    pub fn new(config: Config, runtime: Handle, options: ClientOptions) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Config(format!("Could not build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            runtime,
            config: Mutex::new(config),
            options,
        })
    }

    pub fn order(&self) -> ListingOrder {
        self.options.order
    }

    fn config(&self) -> MutexGuard<'_, Config> {
        self.config.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the current configuration, tokens included
    pub fn current_config(&self) -> Config {
        self.config().clone()
    }

    fn access_token(&self) -> ApiResult<String> {
        self.config().access_token().map(str::to_string).ok_or_else(|| {
            ApiError::Config(
                "DA_ACCESS_TOKEN is not set. Run `da-story-edit auth exchange` or `auth refresh` first."
                    .to_string(),
            )
        })
    }

    /// Run a request, refreshing a rejected token once
    fn call(&self, request: &ApiRequest) -> ApiResult<Value> {
        let token = self.access_token()?;
        match self.runtime.block_on(self.send(request, &token)) {
            Err(ApiError::AuthTokenExpired(_)) => {
                if !self.config().can_refresh() {
                    return Err(ApiError::AuthTokenExpired(
                        "Access token is invalid or expired and automatic refresh is not configured.\n\
                         Set DA_CLIENT_ID, DA_CLIENT_SECRET, and DA_REFRESH_TOKEN in .env,\n\
                         then run `da-story-edit auth refresh`."
                            .to_string(),
                    ));
                }
                let tokens = self.refresh_tokens(None)?;
                self.runtime
                    .block_on(self.send(request, &tokens.access_token))
                    .map_err(|e| match e {
                        ApiError::AuthTokenExpired(_) => ApiError::AuthTokenExpired(
                            "Automatic token refresh was attempted once but the token is still rejected.\n\
                             Run `da-story-edit auth refresh` manually and retry the command."
                                .to_string(),
                        ),
                        other => other,
                    })
            }
            other => other,
        }
    }

    async fn send(&self, request: &ApiRequest, token: &str) -> ApiResult<Value> {
        let cache_key = match (&self.options.cache, request.cacheable) {
            (Some(_), true) => Some(ResponseCache::key(&request.path, &request.query)),
            _ => None,
        };
        if let (Some(cache), Some(key)) = (&self.options.cache, &cache_key) {
            if let Some(payload) = cache.get(key) {
                return Ok(payload);
            }
        }

        let url = format!("{}{}", API_BASE, request.path);
        let mut attempt = 0;
        loop {
            let builder = match &request.body {
                Body::None => self.http.get(&url).query(&request.query),
                Body::Form(form) => self.http.post(&url).query(&request.query).form(form),
            };
            let response = builder
                .query(&[("access_token", token)])
                .send()
                .await
                .map_err(|e| ApiError::transport(&request.path, e))?;

            let status = response.status();
            if (status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error())
                && attempt < self.options.max_retries
            {
                attempt += 1;
                let attempt_text = attempt.to_string();
                let status_text = status.as_u16().to_string();
                Logger::warn(
                    Event::HttpRetry.as_str(),
                    &[
                        ("attempt", &attempt_text),
                        ("path", &request.path),
                        ("status", &status_text),
                    ],
                );
                tokio::time::sleep(self.options.backoff * attempt).await;
                continue;
            }

            let text = response
                .text()
                .await
                .map_err(|e| ApiError::transport(&request.path, e))?;
            if !status.is_success() {
                if looks_like_invalid_token(status.as_u16(), &text) {
                    return Err(ApiError::AuthTokenExpired(
                        "Access token is invalid or expired.".to_string(),
                    ));
                }
                return Err(ApiError::Http {
                    status: status.as_u16(),
                    path: request.path.clone(),
                    snippet: snippet(&text),
                });
            }

            let payload: Value = serde_json::from_str(&text).map_err(|_| {
                ApiError::InvalidResponse(format!(
                    "API response for {} was not valid JSON.",
                    request.path
                ))
            })?;
            if !payload.is_object() {
                return Err(ApiError::InvalidResponse(format!(
                    "API response for {} had unexpected shape.",
                    request.path
                )));
            }

            if let (Some(cache), Some(key)) = (&self.options.cache, &cache_key) {
                cache.put(key, &payload);
            }
            return Ok(payload);
        }
    }

    async fn token_request(&self, form: Vec<(&str, String)>) -> ApiResult<TokenSet> {
        let path = "/oauth2/token";
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::transport(path, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::transport(path, e))?;
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                path: path.to_string(),
                snippet: snippet(&text),
            });
        }
        let payload: Value = serde_json::from_str(&text).map_err(|_| {
            ApiError::InvalidResponse("OAuth token response was not valid JSON.".to_string())
        })?;
        TokenSet::from_response(&payload)
    }

    fn persist_tokens(&self, tokens: &TokenSet) -> ApiResult<()> {
        self.config()
            .persist(&tokens.env_updates())
            .map_err(|e| ApiError::Config(e.to_string()))
    }

    fn credentials(&self) -> ApiResult<(String, String)> {
        let config = self.config();
        match (config.client_id(), config.client_secret()) {
            (Some(id), Some(secret)) => Ok((id.to_string(), secret.to_string())),
            _ => Err(ApiError::Config(
                "DA_CLIENT_ID and DA_CLIENT_SECRET are required for token requests.".to_string(),
            )),
        }
    }

    /// Trade an authorization code for tokens and persist them
    pub fn exchange_code(&self, code: &str) -> ApiResult<TokenSet> {
        let (client_id, client_secret) = self.credentials()?;
        let redirect_uri = self
            .config()
            .redirect_uri()
            .map(str::to_string)
            .ok_or_else(|| ApiError::Config("DA_REDIRECT_URI is not set.".to_string()))?;

        let tokens = self.runtime.block_on(self.token_request(vec![
            ("grant_type", "authorization_code".to_string()),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("code", code.to_string()),
        ]))?;
        self.persist_tokens(&tokens)?;
        Ok(tokens)
    }

    /// Mint new tokens from `refresh_token` (default: the configured one)
    /// and persist them
    pub fn refresh_tokens(&self, refresh_token: Option<&str>) -> ApiResult<TokenSet> {
        let (client_id, client_secret) = self.credentials()?;
        let refresh_token = match refresh_token {
            Some(token) => token.to_string(),
            None => self
                .config()
                .refresh_token()
                .map(str::to_string)
                .ok_or_else(|| ApiError::Config("DA_REFRESH_TOKEN is not set.".to_string()))?,
        };

        let tokens = self.runtime.block_on(self.token_request(vec![
            ("grant_type", "refresh_token".to_string()),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ]))?;
        self.persist_tokens(&tokens)?;

        log_event_with_fields(Event::TokenRefreshed, &[("scope", &tokens.scope)]);
        Ok(tokens)
    }

    /// Check the access token against the placebo endpoint
    pub fn validate_access_token(&self) -> ApiResult<()> {
        self.call(&ApiRequest::get("/placebo")).map(|_| ())
    }

    /// Every entry of a gallery or folder, following pagination
    pub fn list_gallery(&self, username: &str, folder_id: Option<&str>) -> ApiResult<Vec<DeviationSummary>> {
        let path = match folder_id {
            Some(folder) => format!("/gallery/{}", folder),
            None => "/gallery/all".to_string(),
        };

        let mut items = Vec::new();
        let mut offset = 0usize;
        loop {
            let request = ApiRequest::get(path.as_str())
                .param("username", username)
                .param("offset", offset)
                .param("limit", PAGE_LIMIT)
                .param("mature_content", "true")
                .cached();
            let payload = self.call(&request)?;
            let page = parse_gallery_results(&payload)?;
            let page_len = page.len();
            items.extend(page);

            match next_page_offset(&payload, offset, page_len) {
                Some(next) => offset = next,
                None => break,
            }
        }
        Ok(items)
    }

    /// Gallery folders of `username`
    pub fn list_folders(&self, username: &str) -> ApiResult<Vec<GalleryFolder>> {
        let mut folders = Vec::new();
        let mut offset = 0usize;
        loop {
            let request = ApiRequest::get("/gallery/folders")
                .param("username", username)
                .param("offset", offset)
                .param("limit", PAGE_LIMIT)
                .cached();
            let payload = self.call(&request)?;
            let page = parse_folders(&payload)?;
            let page_len = page.len();
            folders.extend(page);

            match next_page_offset(&payload, offset, page_len) {
                Some(next) => offset = next,
                None => break,
            }
        }
        Ok(folders)
    }

    /// Deviation metadata
    pub fn get_deviation(&self, deviation_id: &str) -> ApiResult<Value> {
        self.call(&ApiRequest::get(format!("/deviation/{}", deviation_id)))
    }

    /// HTML body of a literature deviation
    pub fn get_deviation_content(&self, deviation_id: &str) -> ApiResult<String> {
        let payload = self.call(&ApiRequest::get("/deviation/content").param("deviationid", deviation_id))?;
        match payload.get("html") {
            Some(Value::String(html)) => Ok(html.clone()),
            Some(Value::Null) | None => Err(ApiError::InvalidResponse(format!(
                "Deviation {} has no HTML content.",
                deviation_id
            ))),
            Some(_) => Err(ApiError::InvalidResponse(format!(
                "Deviation {} content had unexpected shape.",
                deviation_id
            ))),
        }
    }

    /// Replace the body of a literature deviation
    pub fn update_literature(
        &self,
        deviation_id: &str,
        body: &str,
        preserved: &PreservedFields,
    ) -> ApiResult<()> {
        let request = ApiRequest::post_form(
            format!("/deviation/literature/update/{}", deviation_id),
            update_form(body, preserved),
        );
        self.call(&request).map(|_| ())
    }

    async fn fetch_gallery_page(&self, gallery_url: &str) -> ApiResult<String> {
        let failed = || {
            ApiError::InvalidGallery("Failed to fetch gallery HTML fallback for URL parsing.".to_string())
        };
        let response = self
            .http
            .get(gallery_url)
            .header(ACCEPT, "text/html")
            .send()
            .await
            .map_err(|_| failed())?;
        if !response.status().is_success() {
            return Err(failed());
        }
        response.text().await.map_err(|_| failed())
    }

    /// Resolve gallery input to its listing
    ///
    /// A folder UUID is used directly. A numeric folder id is matched by slug
    /// against the folder names; when that fails the gallery page itself is
    /// fetched and its deviation URLs are mapped onto `/gallery/all`.
    pub fn resolve_gallery(&self, input: &str) -> ApiResult<ResolvedGallery> {
        let target = parse_gallery_target(input)?;

        let mut folder_id = target.folder_uuid().map(str::to_string);
        if folder_id.is_none() && target.folder_ref.is_some() {
            if let Some(slug) = &target.folder_slug {
                let folders = self.list_folders(&target.username)?;
                folder_id = match_folder(&folders, slug).map(|f| f.folder_id.clone());
            }
        }

        let deviations = if let Some(folder) = &folder_id {
            self.list_gallery(&target.username, Some(folder))?
        } else if target.folder_ref.is_some() && input.contains("://") {
            log_event_with_fields(Event::GalleryHtmlFallback, &[("username", &target.username)]);
            let html = self.runtime.block_on(self.fetch_gallery_page(input.trim()))?;
            let urls = extract_gallery_deviation_urls(&html, &target.username);
            if urls.is_empty() {
                return Err(ApiError::InvalidGallery(
                    "Gallery HTML fallback could not find deviation URLs for this user.".to_string(),
                ));
            }

            let all = self.list_gallery(&target.username, None)?;
            let mapped: Vec<DeviationSummary> = urls
                .iter()
                .filter_map(|url| {
                    all.iter()
                        .find(|item| normalize_url(&item.url) == normalize_url(url))
                        .cloned()
                })
                .collect();
            if mapped.is_empty() {
                return Err(ApiError::InvalidGallery(
                    "Could not map folder URLs from gallery HTML to API UUID entries.".to_string(),
                ));
            }
            mapped
        } else {
            self.list_gallery(&target.username, None)?
        };

        let count = deviations.len().to_string();
        log_event_with_fields(
            Event::GalleryResolved,
            &[
                ("entries", &count),
                ("folder", folder_id.as_deref().unwrap_or("all")),
                ("username", &target.username),
            ],
        );

        Ok(ResolvedGallery {
            target,
            folder_id,
            deviations,
        })
    }
}

impl ContentSource for DeviantArtClient {
    fn list_ordered_literature(&self, gallery_handle: &str) -> CollaboratorResult<DocumentSequence> {
        let resolved = self.resolve_gallery(gallery_handle)?;
        let sequence = literature_sequence(&resolved.deviations, self.options.order);

        let count = sequence.len().to_string();
        log_event_with_fields(
            Event::SequenceSnapshot,
            &[("documents", &count), ("order", self.options.order.as_str())],
        );
        Ok(sequence)
    }

    fn fetch_body(&self, id: &str) -> CollaboratorResult<FetchedDocument> {
        let metadata = self.get_deviation(id)?;
        let body = self.get_deviation_content(id)?;
        Ok(FetchedDocument {
            body,
            preserved: preserved_from_metadata(&metadata),
        })
    }
}

impl ContentSink for DeviantArtClient {
    fn submit(&self, id: &str, new_body: &str, preserved: &PreservedFields) -> CollaboratorResult<()> {
        self.update_literature(id, new_body, preserved)?;
        Ok(())
    }
}
