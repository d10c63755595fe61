use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use std::convert::Infallible;

pub const ACTOR_HEADER: &str = "x-user-id";

/// Id of the user performing the request, taken from the optional `X-User-Id`
/// header. Fills the `created_by`/`updated_by` audit columns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Actor(pub Option<i64>);

impl Actor {
    pub fn id(&self) -> Option<i64> {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Actor(extract_actor_from_headers(&parts.headers)))
    }
}

/// Malformed values are ignored rather than rejected.
fn extract_actor_from_headers(headers: &HeaderMap) -> Option<i64> {
    let raw = headers.get(ACTOR_HEADER)?.to_str().ok()?;
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            tracing::debug!("Ignoring invalid {} header: {:?}", ACTOR_HEADER, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_positive_integer_ids() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_HEADER, HeaderValue::from_static(" 42 "));
        assert_eq!(extract_actor_from_headers(&headers), Some(42));
    }

    #[test]
    fn ignores_missing_or_malformed_values() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_actor_from_headers(&headers), None);
        headers.insert(ACTOR_HEADER, HeaderValue::from_static("admin"));
        assert_eq!(extract_actor_from_headers(&headers), None);
        headers.insert(ACTOR_HEADER, HeaderValue::from_static("-3"));
        assert_eq!(extract_actor_from_headers(&headers), None);
    }
}
