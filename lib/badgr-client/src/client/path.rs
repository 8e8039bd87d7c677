//! Badgr endpoint paths, relative to the API base URL.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

/// Characters escaped in an id used as a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// OAuth2 token endpoint.
pub const TOKEN: &str = "/o/token";

/// Issuer collection.
pub const ISSUERS: &str = "/v2/issuers";

/// Badge class collection.
pub const BADGE_CLASSES: &str = "/v2/badgeclasses";

/// Assertion collection.
pub const ASSERTIONS: &str = "/v2/assertions";

/// Bulk assertion revocation.
pub const ASSERTIONS_REVOKE: &str = "/v2/assertions/revoke";

/// Assertions held in the authenticated user's backpack.
pub const BACKPACK_ASSERTIONS: &str = "/v2/backpack/assertions";

/// Collections in the authenticated user's backpack.
pub const BACKPACK_COLLECTIONS: &str = "/v2/backpack/collections";

/// Access tokens of the authenticated user.
pub const AUTH_TOKENS: &str = "/v2/auth/tokens";

/// Legacy user registration (unauthenticated).
pub const V1_USER_PROFILE: &str = "/v1/user/profile";

fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// `<collection>/<eid>`, with `eid` percent-encoded.
pub fn entity(collection: &str, eid: &str) -> String {
    format!("{collection}/{}", segment(eid))
}

/// `<collection>` when `eid` is `None`, `<collection>/<eid>` otherwise.
pub fn collection_or_entity(collection: &str, eid: Option<&str>) -> String {
    match eid {
        Some(eid) => entity(collection, eid),
        None => collection.to_string(),
    }
}

/// `<collection>/<eid>/<child>`, with `eid` percent-encoded.
pub fn children(collection: &str, eid: &str, child: &str) -> String {
    format!("{collection}/{}/{child}", segment(eid))
}

/// Legacy staff endpoint of an issuer, keyed by its entity id used as slug.
pub fn v1_issuer_staff(slug: &str) -> String {
    format!("/v1/issuer/issuers/{}/staff", segment(slug))
}

/// Joins a base URL and an absolute path.
///
/// Any path already present on the base URL is kept as a prefix.
pub(crate) fn absolute_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Url::parse(&format!("{base}/{path}"))
}
