//! Request context: the pseudo-identity courses are scoped by.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::web::error::WebError;

pub static ANONYMOUS: &str = "anonymous";

/// Opaque caller-supplied token. Not authenticated, only used to keep one
/// browser's courses apart from another's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visitor {
    id: String,
}

impl Visitor {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into() }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS)
    }

    /// Header value to visitor. Blank values fall back to [`Visitor::anonymous`].
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(id) if !id.is_empty() => Self::new(id),
            _ => Self::anonymous(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS
    }
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Visitor>()
            .cloned()
            .unwrap_or_else(Visitor::anonymous))
    }
}
