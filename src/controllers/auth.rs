use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::errors::AppError;
use crate::types::AppState;

/// Runs before body extraction so a bad credential never reaches validation
/// or the store.
pub(super) async fn require_api_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    state.services.auth.authorize(request.headers())?;
    Ok(next.run(request).await)
}
