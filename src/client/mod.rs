//! Typed client for the tripcrew HTTP API.
//!
//! The server's word is final: any non-2xx response is decoded into a
//! [`ClientError::Api`] carrying the server's detail message, and callers
//! surface that instead of trusting their own gating. Client-side checks
//! (hiding leader controls, disabling a vote button) are conveniences
//! only.

pub mod chat;
pub mod session;

pub use chat::{ChatMessage, ChatTranscript, Sender};
pub use session::Session;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::wire::{
    ActionResponse, ChatRequest, ChatResponse, CompleteProfileRequest, ConfirmedDetailsResponse,
    CreateTripRequest, CreateTripResponse, ErrorBody, FinalizeResponse, GenerateResponse,
    ItineraryStateResponse, JoinTripRequest, JoinTripResponse, LoginRequest, LoginResponse,
    ProfileResponse, PublicTripCard, SignupRequest, TripDetailResponse, UserResponse, VoteResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the request; `detail` is its own message.
    #[error("{detail}")]
    Api { status: StatusCode, detail: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("no active session")]
    NoSession,
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Base URL from `TRIPCREW_API_URL`, falling back to a local server.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("TRIPCREW_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        Self::new(base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<UserResponse, ClientError> {
        decode(self.http.post(self.url("/signup")).json(req).send().await?).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let req = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        decode(self.http.post(self.url("/login")).json(&req).send().await?).await
    }

    pub async fn create_trip(
        &self,
        req: &CreateTripRequest,
    ) -> Result<CreateTripResponse, ClientError> {
        decode(
            self.http
                .post(self.url("/trips/create"))
                .json(req)
                .send()
                .await?,
        )
        .await
    }

    pub async fn join_trip(&self, req: &JoinTripRequest) -> Result<JoinTripResponse, ClientError> {
        decode(
            self.http
                .post(self.url("/trips/join"))
                .json(req)
                .send()
                .await?,
        )
        .await
    }

    pub async fn trip_detail(&self, trip_id: i64) -> Result<TripDetailResponse, ClientError> {
        decode(
            self.http
                .get(self.url(&format!("/trips/{trip_id}")))
                .send()
                .await?,
        )
        .await
    }

    pub async fn lock_trip(
        &self,
        trip_id: i64,
        user_id: i64,
    ) -> Result<ActionResponse, ClientError> {
        decode(
            self.http
                .post(self.url(&format!("/trips/{trip_id}/lock")))
                .query(&[("user_id", user_id)])
                .send()
                .await?,
        )
        .await
    }

    pub async fn delete_trip(
        &self,
        trip_id: i64,
        user_id: i64,
    ) -> Result<ActionResponse, ClientError> {
        decode(
            self.http
                .delete(self.url(&format!("/trips/{trip_id}")))
                .query(&[("user_id", user_id)])
                .send()
                .await?,
        )
        .await
    }

    pub async fn leave_trip(
        &self,
        trip_id: i64,
        user_id: i64,
    ) -> Result<ActionResponse, ClientError> {
        decode(
            self.http
                .delete(self.url(&format!("/trips/{trip_id}/leave")))
                .query(&[("user_id", user_id)])
                .send()
                .await?,
        )
        .await
    }

    /// Long-running on the server side; callers should show an
    /// indeterminate progress state and disable the control while the
    /// request is in flight.
    pub async fn generate_itinerary(
        &self,
        trip_id: i64,
        user_id: i64,
    ) -> Result<GenerateResponse, ClientError> {
        decode(
            self.http
                .post(self.url(&format!("/trips/{trip_id}/generate")))
                .query(&[("user_id", user_id)])
                .send()
                .await?,
        )
        .await
    }

    pub async fn itinerary(
        &self,
        trip_id: i64,
        user_id: Option<i64>,
    ) -> Result<ItineraryStateResponse, ClientError> {
        let mut request = self
            .http
            .get(self.url(&format!("/trips/{trip_id}/itinerary")));
        if let Some(user_id) = user_id {
            request = request.query(&[("user_id", user_id)]);
        }
        decode(request.send().await?).await
    }

    pub async fn vote(
        &self,
        trip_id: i64,
        user_id: i64,
        option_id: i64,
    ) -> Result<VoteResponse, ClientError> {
        decode(
            self.http
                .post(self.url(&format!("/trips/{trip_id}/vote")))
                .query(&[("user_id", user_id), ("option_id", option_id)])
                .send()
                .await?,
        )
        .await
    }

    pub async fn finalize(
        &self,
        trip_id: i64,
        user_id: i64,
        option_id: i64,
    ) -> Result<FinalizeResponse, ClientError> {
        decode(
            self.http
                .post(self.url(&format!("/trips/{trip_id}/finalize")))
                .query(&[("user_id", user_id), ("option_id", option_id)])
                .send()
                .await?,
        )
        .await
    }

    pub async fn confirmed_details(
        &self,
        trip_id: i64,
    ) -> Result<ConfirmedDetailsResponse, ClientError> {
        decode(
            self.http
                .get(self.url(&format!("/trips/{trip_id}/confirmed-details")))
                .send()
                .await?,
        )
        .await
    }

    pub async fn chat(&self, trip_id: i64, message: &str) -> Result<ChatResponse, ClientError> {
        let req = ChatRequest {
            message: message.into(),
        };
        decode(
            self.http
                .post(self.url(&format!("/trips/{trip_id}/chat")))
                .json(&req)
                .send()
                .await?,
        )
        .await
    }

    pub async fn profile(&self, user_id: i64) -> Result<ProfileResponse, ClientError> {
        decode(
            self.http
                .get(self.url(&format!("/users/{user_id}/profile")))
                .send()
                .await?,
        )
        .await
    }

    pub async fn complete_profile(
        &self,
        user_id: i64,
        req: &CompleteProfileRequest,
    ) -> Result<ActionResponse, ClientError> {
        decode(
            self.http
                .put(self.url(&format!("/users/{user_id}/complete-profile")))
                .json(req)
                .send()
                .await?,
        )
        .await
    }

    pub async fn public_trips(&self) -> Result<Vec<PublicTripCard>, ClientError> {
        decode(self.http.get(self.url("/trips/public")).send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let detail = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.detail)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    Err(ClientError::Api { status, detail })
}
