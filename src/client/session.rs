//! The session context: one explicit object with a defined init (login)
//! and teardown (logout), read by every view that needs the current user.

use crate::{
    client::{ApiClient, ClientError},
    models::wire::LoginResponse,
};

#[derive(Debug, Default)]
pub struct Session {
    user: Option<LoginResponse>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let user = api.login(email, password).await?;
        self.user = Some(user.clone());
        Ok(user)
    }

    pub fn logout(&mut self) {
        self.user = None;
    }

    pub fn current(&self) -> Option<&LoginResponse> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|user| user.user_id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn require(&self) -> Result<&LoginResponse, ClientError> {
        self.user.as_ref().ok_or(ClientError::NoSession)
    }

    /// Keeps the stored record in step after the one-time survey, so the
    /// community views unlock without a fresh login.
    pub fn mark_profile_completed(&mut self) {
        if let Some(user) = self.user.as_mut() {
            user.profile_completed = true;
        }
    }
}
