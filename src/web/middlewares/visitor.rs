use axum::{extract::Request, middleware::Next, response::Response};

use crate::web::Visitor;

pub static VISITOR_HEADER: &str = "x-demo-user";

/// Puts the caller's [`Visitor`] into the request extensions.
pub async fn extract_visitor_fn(mut req: Request, next: Next) -> Response {
    let header = req
        .headers()
        .get(VISITOR_HEADER)
        .and_then(|v| v.to_str().ok());
    let visitor = Visitor::from_header(header);

    tracing::trace!("request from visitor {}", visitor.id());
    req.extensions_mut().insert(visitor);
    next.run(req).await
}
