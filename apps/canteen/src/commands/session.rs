//! # Session Commands
//!
//! Signing in and out, and the once-per-run intro splash.

use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::{DbState, SessionState};
use canteen_core::User;

/// Signs in as an existing user.
///
/// ## Errors
/// `NOT_FOUND` for an unknown user id.
pub async fn sign_in(db: &DbState, session: &SessionState, user_id: &str) -> ApiResult<User> {
    debug!(user_id, "sign_in command");
    let user = db
        .inner()
        .wallet()
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", user_id))?;

    session.sign_in(user.clone()).await;
    info!(user_id = %user.id, role = ?user.role, "Signed in");
    Ok(user)
}

/// Signs out. Signing out twice is harmless.
pub async fn sign_out(session: &SessionState) {
    if let Some(user) = session.sign_out().await {
        info!(user_id = %user.id, "Signed out");
    }
}

/// The signed-in user, if any.
pub async fn current_user(session: &SessionState) -> Option<User> {
    session.current_user().await
}

/// Records that the intro splash was shown.
///
/// ## Returns
/// `true` the first time in this run, i.e. when the splash should play.
pub fn mark_intro_seen(session: &SessionState) -> bool {
    !session.mark_intro_seen()
}
