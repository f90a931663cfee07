//! Hour-scoped entity tags for gallery pages.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::models::CategoryFilter;
use crate::models::PageRequest;

const ETAG_LEN: usize = 16;

/// First 16 characters of base64(SHA-256("{page}_{pageSize}_{category}_{yyyyMMddHH}")).
/// The tag changes at the top of every UTC hour.
pub fn compute_etag(request: PageRequest, filter: CategoryFilter, now: DateTime<Utc>) -> String {
    let input = format!(
        "{}_{}_{}_{}",
        request.page,
        request.page_size,
        filter.as_str(),
        now.format("%Y%m%d%H")
    );
    let digest = Sha256::digest(input.as_bytes());
    let mut encoded = STANDARD.encode(digest);
    encoded.truncate(ETAG_LEN);
    encoded
}

/// Compares an `If-None-Match` value against `etag`, ignoring quotes and a
/// weak-validator prefix. Accepts comma-separated lists and `*`.
pub fn if_none_match_matches(header: &str, etag: &str) -> bool {
    header.split(',').any(|candidate| {
        let candidate = candidate.trim();
        let candidate = candidate.strip_prefix("W/").unwrap_or(candidate);
        let candidate = candidate.trim_matches('"');
        candidate == "*" || candidate == etag
    })
}
