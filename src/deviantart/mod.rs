//! DeviantArt collaborator
//!
//! Implements `ContentSource` and `ContentSink` over the DeviantArt REST API.
//!
//! - Gallery URL or username parsing and folder resolution
//! - Paginated listings with an on-disk response cache
//! - OAuth2 code exchange and token refresh persisted to `.env`

mod cache;
mod client;
mod errors;
mod gallery;
mod oauth;

pub use cache::ResponseCache;
pub use client::{
    preserved_from_metadata, update_form, ClientOptions, DeviantArtClient, ResolvedGallery,
    API_BASE, PAGE_LIMIT, PRESERVED_KEYS, USER_AGENT,
};
pub use errors::{ApiError, ApiResult};
pub use gallery::{
    extract_gallery_deviation_urls, literature_sequence, match_folder, normalize_url,
    parse_folders, parse_gallery_results, parse_gallery_target, slugify_name, DeviationSummary,
    GalleryFolder, GalleryTarget, ListingOrder, GALLERY_HOST,
};
pub use oauth::{
    build_authorize_url, generate_state, looks_like_invalid_token, ScopeCheck, TokenSet,
    AUTHORIZE_ENDPOINT, DEFAULT_SCOPES, TOKEN_ENDPOINT,
};
