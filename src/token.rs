//! Session token decoding and validation
//!
//! Tokens are three-segment signed strings issued by the backend. The client
//! never verifies the signature; it only reads the claims segment to learn
//! the expiry, role and display name. Nothing here touches storage.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Literal strings that a broken persistence write can leave behind in
/// place of a missing token.
const PLACEHOLDER_TOKENS: [&str; 2] = ["null", "undefined"];

/// Roles the storefront knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Parse a role string, accepting only the recognized set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Route a freshly signed-in user lands on.
    pub fn landing_route(&self) -> &'static str {
        match self {
            Role::Admin => "/adminpage",
            Role::User => "/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated claims extracted from a session token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    /// Token expiration time
    pub expires_at: DateTime<Utc>,

    /// Raw role claim, not necessarily a recognized role
    pub role: String,

    /// Display name (`name`, or `full_name` on older tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Claims {
    /// The role claim if it belongs to the recognized set.
    pub fn recognized_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Display name with the storefront's fallback.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("User")
    }
}

#[derive(Deserialize)]
struct RawClaims {
    /// Seconds since the epoch; fractional values are allowed
    exp: f64,
    role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    user_id: Option<String>,
}

/// Display-only claims never invalidate a token: numbers are kept in their
/// text form and any other shape is dropped.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Convert a numeric `exp` claim to a timestamp.
fn expiry_from_claim(exp: f64) -> Option<DateTime<Utc>> {
    if !exp.is_finite() {
        return None;
    }
    let secs = exp.floor();
    let nanos = ((exp - secs) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
}

/// Whether a stored value is one of the serialization artifacts that stand in
/// for "no token".
pub fn is_placeholder(raw: &str) -> bool {
    PLACEHOLDER_TOKENS.contains(&raw)
}

/// Decode and validate a token against the current wall-clock time.
pub fn decode(raw: &str) -> Result<Claims, TokenError> {
    decode_at(raw, Utc::now())
}

/// Decode and validate a token against `now`.
pub fn decode_at(raw: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
    let segments: Vec<&str> = raw.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(TokenError::MalformedToken);
    }

    // Some issuers keep the base64 padding even though JWTs should not
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::MalformedToken)?;
    let raw_claims: RawClaims =
        serde_json::from_slice(&bytes).map_err(|_| TokenError::MalformedToken)?;

    let expires_at = expiry_from_claim(raw_claims.exp).ok_or(TokenError::MalformedToken)?;
    if expires_at <= now {
        return Err(TokenError::Expired);
    }

    Ok(Claims {
        expires_at,
        role: raw_claims.role,
        name: raw_claims.name.or(raw_claims.full_name),
        email: raw_claims.email,
        user_id: raw_claims.user_id,
    })
}

/// Build an unsigned token around `claims`, for tests.
#[cfg(test)]
pub(crate) fn unsigned_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Unsigned token with the given role expiring `ttl` from now, for tests.
#[cfg(test)]
pub(crate) fn token_for(role: &str, ttl: chrono::Duration) -> String {
    unsigned_token(&serde_json::json!({
        "exp": (Utc::now() + ttl).timestamp(),
        "role": role,
        "name": "Sari",
        "email": "sari@example.com",
        "user_id": "0b6e3f3a-4c1e-4d2b-9a57-3b3f6f1c2d10",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_decode_valid_token() {
        let token = token_for("admin", Duration::hours(1));
        let claims = decode(&token).unwrap();

        assert_eq!(claims.role, "admin");
        assert_eq!(claims.recognized_role(), Some(Role::Admin));
        assert_eq!(claims.display_name(), "Sari");
        assert_eq!(claims.email.as_deref(), Some("sari@example.com"));
        assert!(claims.expires_at > Utc::now());
    }

    #[test]
    fn test_segment_count_is_checked_before_decoding() {
        for raw in ["", "abc", "a.b", "a.b.c.d", "null", "undefined", "...."] {
            assert_eq!(decode(raw), Err(TokenError::MalformedToken), "{raw:?}");
        }
    }

    #[test]
    fn test_empty_segments_are_malformed() {
        let token = token_for("user", Duration::hours(1));
        let parts: Vec<&str> = token.split('.').collect();

        assert_eq!(
            decode(&format!(".{}.{}", parts[1], parts[2])),
            Err(TokenError::MalformedToken)
        );
        assert_eq!(
            decode(&format!("{}..{}", parts[0], parts[2])),
            Err(TokenError::MalformedToken)
        );
        assert_eq!(
            decode(&format!("{}.{}.", parts[0], parts[1])),
            Err(TokenError::MalformedToken)
        );
    }

    #[test]
    fn test_undecodable_payload_is_malformed() {
        assert_eq!(decode("aaa.!!!.ccc"), Err(TokenError::MalformedToken));

        let not_json = format!("aaa.{}.ccc", URL_SAFE_NO_PAD.encode("not json"));
        assert_eq!(decode(&not_json), Err(TokenError::MalformedToken));

        let missing_exp = unsigned_token(&json!({ "role": "user" }));
        assert_eq!(decode(&missing_exp), Err(TokenError::MalformedToken));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let exp = now.timestamp() + 60;
        let token = unsigned_token(&json!({ "exp": exp, "role": "user" }));
        let at = DateTime::from_timestamp(exp, 0).unwrap();

        assert_eq!(decode_at(&token, at), Err(TokenError::Expired));
        assert_eq!(
            decode_at(&token, at + Duration::seconds(1)),
            Err(TokenError::Expired)
        );
        assert!(decode_at(&token, at - Duration::seconds(1)).is_ok());
    }

    #[test]
    fn test_expired_is_distinct_from_malformed() {
        let token = token_for("user", Duration::hours(-1));
        assert_eq!(decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_full_name_alias() {
        let token = unsigned_token(&json!({
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
            "role": "user",
            "full_name": "Budi Santoso",
        }));
        let claims = decode(&token).unwrap();
        assert_eq!(claims.display_name(), "Budi Santoso");
    }

    #[test]
    fn test_display_name_fallback() {
        let token = unsigned_token(&json!({
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
            "role": "user",
        }));
        assert_eq!(decode(&token).unwrap().display_name(), "User");
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let token = token_for("user", Duration::hours(1));
        let parts: Vec<&str> = token.split('.').collect();
        let padded = format!("{}.{}==.{}", parts[0], parts[1], parts[2]);
        assert!(decode(&padded).is_ok());
    }

    #[test]
    fn test_unrecognized_role_still_decodes() {
        let token = token_for("guest", Duration::hours(1));
        let claims = decode(&token).unwrap();
        assert_eq!(claims.recognized_role(), None);
    }

    #[test]
    fn test_role_parse_and_landing_route() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::Admin.landing_route(), "/adminpage");
        assert_eq!(Role::User.landing_route(), "/dashboard");
    }

    #[test]
    fn test_fractional_exp_is_accepted() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp() as f64 + 0.5;
        let token = unsigned_token(&json!({ "exp": exp, "role": "user" }));

        let claims = decode(&token).unwrap();
        assert_eq!(claims.expires_at.timestamp_subsec_millis(), 500);

        let at = DateTime::from_timestamp(exp.floor() as i64, 0).unwrap();
        assert!(decode_at(&token, at).is_ok());
        assert_eq!(
            decode_at(&token, at + Duration::seconds(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_out_of_range_exp_is_malformed() {
        let token = unsigned_token(&json!({ "exp": 1e300, "role": "user" }));
        assert_eq!(decode(&token), Err(TokenError::MalformedToken));

        let token = unsigned_token(&json!({ "exp": "tomorrow", "role": "user" }));
        assert_eq!(decode(&token), Err(TokenError::MalformedToken));
    }

    #[test]
    fn test_optional_claims_with_other_types_do_not_invalidate() {
        let token = unsigned_token(&json!({
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
            "role": "user",
            "user_id": 42,
            "email": null,
            "name": { "first": "Sari" },
        }));

        let claims = decode(&token).unwrap();
        assert_eq!(claims.user_id.as_deref(), Some("42"));
        assert_eq!(claims.email, None);
        assert_eq!(claims.display_name(), "User");
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder("null"));
        assert!(is_placeholder("undefined"));
        assert!(!is_placeholder("a.b.c"));
        assert!(!is_placeholder(""));
    }
}
