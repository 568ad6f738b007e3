//! # Session State
//!
//! Who is signed in, and whether the intro splash has been shown during
//! this run. Neither survives a restart.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{ApiError, ApiResult};
use canteen_core::User;

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    user: Arc<RwLock<Option<User>>>,
    intro_seen: Arc<AtomicBool>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, user: User) {
        *self.user.write().await = Some(user);
    }

    /// Returns the user that was signed in, if any.
    pub async fn sign_out(&self) -> Option<User> {
        self.user.write().await.take()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    /// The signed-in user's id.
    ///
    /// ## Errors
    /// `AUTHENTICATION_REQUIRED` when nobody is signed in.
    pub async fn require_user_id(&self) -> ApiResult<String> {
        self.user
            .read()
            .await
            .as_ref()
            .map(|user| user.id.clone())
            .ok_or_else(ApiError::auth_required)
    }

    /// Replaces the cached user (e.g. after a balance change).
    pub async fn refresh(&self, user: User) {
        let mut guard = self.user.write().await;
        if guard.as_ref().is_some_and(|current| current.id == user.id) {
            *guard = Some(user);
        }
    }

    pub fn intro_seen(&self) -> bool {
        self.intro_seen.load(Ordering::Relaxed)
    }

    /// Marks the intro as shown. Returns whether it had already been seen.
    pub fn mark_intro_seen(&self) -> bool {
        self.intro_seen.swap(true, Ordering::Relaxed)
    }
}
