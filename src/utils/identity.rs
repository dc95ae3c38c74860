// src/utils/identity.rs

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Resolved caller identity, injected into request extensions by
/// `require_user` for handlers to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Header carrying the caller's user id. Verifying it is the perimeter's job
/// (gateway/auth service); this service only resolves and forwards it.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Axum Middleware: caller identity.
///
/// Rejects requests without a well-formed user id; handlers downstream can
/// rely on the `UserId` extension being present.
pub async fn require_user(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let header = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok());

    let user_id = match header.and_then(|value| Uuid::parse_str(value).ok()) {
        Some(id) => id,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    req.extensions_mut().insert(UserId(user_id));
    Ok(next.run(req).await)
}
