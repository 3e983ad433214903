use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue},
    response::Response,
};
use std::convert::Infallible;
use uuid::Uuid;

pub const VISITOR_COOKIE: &str = "user_id";

/// One year, in seconds.
const VISITOR_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

/// Anonymous visitor identity carried in the `user_id` cookie.
///
/// A request without the cookie gets a freshly minted id; handlers decide whether to hand it
/// back with [`Visitor::attach_cookie`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visitor {
    pub id: String,
    pub is_new: bool,
}

impl Visitor {
    pub fn mint() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            is_new: true,
        }
    }

    pub fn set_cookie_value(&self, secure: bool) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            VISITOR_COOKIE, self.id, VISITOR_COOKIE_MAX_AGE
        );
        if secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Adds `Set-Cookie` to `response` when the id was minted for this request.
    pub fn attach_cookie(&self, mut response: Response, secure: bool) -> Response {
        if self.is_new {
            if let Ok(value) = HeaderValue::from_str(&self.set_cookie_value(secure)) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

fn extract_cookie_from_parts(parts: &Parts, cookie_name: &str) -> Option<String> {
    let prefix = format!("{}=", cookie_name);
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(|pair| pair.trim())
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .map(|value| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match extract_cookie_from_parts(parts, VISITOR_COOKIE) {
            Some(id) => Visitor { id, is_new: false },
            None => Visitor::mint(),
        })
    }
}
