//! Backend collaborator: credential exchange, draw creation, tournament retrieval and downloads.

use crate::models::{DrawRequest, SessionGrant, TournamentListing, TournamentRecord};
use async_trait::async_trait;
use chrono::{NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure talking to the backend.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BackendError {
    /// Non-success HTTP status.
    #[error("Backend answered with status {0}")]
    Status(u16),
    /// Connection, TLS or other transport failure.
    #[error("Backend not reachable: {0}")]
    Transport(String),
    /// Success status but the body was not what we expected.
    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            BackendError::Status(status.as_u16())
        } else {
            BackendError::Transport(e.to_string())
        }
    }
}

/// Operations the draw wizard and the pages around it need from the backend.
#[async_trait]
pub trait DrawBackend: Send + Sync {
    /// Trade the host's launch credential for a bearer token.
    async fn exchange_credential(&self, credential: &str) -> Result<SessionGrant, BackendError>;

    /// Ask the backend to build and store a draw.
    async fn create_draw(&self, token: &str, request: &DrawRequest) -> Result<(), BackendError>;

    /// Tournaments created on `date`.
    async fn tournaments_by_date(
        &self,
        token: &str,
        date: NaiveDate,
    ) -> Result<TournamentListing, BackendError>;

    /// Short-lived token that unlocks the artifact for `record`.
    async fn download_token(
        &self,
        token: &str,
        record: &TournamentRecord,
    ) -> Result<String, BackendError>;

    /// Where the artifact behind `download_token` can be fetched.
    fn download_url(&self, download_token: &str) -> String;
}

#[derive(Debug, Serialize)]
struct CredentialRequest<'a> {
    #[serde(rename = "initDataRaw")]
    credential: &'a str,
}

#[derive(Debug, Deserialize)]
struct DownloadTokenResponse {
    token: String,
}

/// [`DrawBackend`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BackendError::Status(status.as_u16()))
    }
}

#[async_trait]
impl DrawBackend for HttpBackend {
    async fn exchange_credential(&self, credential: &str) -> Result<SessionGrant, BackendError> {
        let response = self
            .client
            .post(format!("{}/auth", self.base_url))
            .json(&CredentialRequest { credential })
            .send()
            .await?;
        let grant = check_status(response)?.json::<SessionGrant>().await?;
        Ok(grant)
    }

    async fn create_draw(&self, token: &str, request: &DrawRequest) -> Result<(), BackendError> {
        let date_start = request
            .date_start
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let total_rounds = request.total_rounds.to_string();
        let available_courts = request.available_courts.to_string();
        let response = self
            .client
            .post(format!("{}/api/create-tournament", self.base_url))
            .bearer_auth(token)
            .query(&[
                ("tournamentType", request.draw_type.as_str()),
                ("dateStart", date_start.as_str()),
                ("totalRounds", total_rounds.as_str()),
                ("availableCourts", available_courts.as_str()),
            ])
            .json(&request.teams)
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn tournaments_by_date(
        &self,
        token: &str,
        date: NaiveDate,
    ) -> Result<TournamentListing, BackendError> {
        let date = date.format("%Y-%m-%d").to_string();
        let response = self
            .client
            .get(format!("{}/api/tournaments", self.base_url))
            .bearer_auth(token)
            .query(&[("date", date.as_str())])
            .send()
            .await?;
        let listing = check_status(response)?.json::<TournamentListing>().await?;
        Ok(listing)
    }

    async fn download_token(
        &self,
        token: &str,
        record: &TournamentRecord,
    ) -> Result<String, BackendError> {
        let response = self
            .client
            .post(format!("{}/api/tournament/generate-link", self.base_url))
            .bearer_auth(token)
            .json(record)
            .send()
            .await?;
        let body = check_status(response)?
            .json::<DownloadTokenResponse>()
            .await?;
        Ok(body.token)
    }

    fn download_url(&self, download_token: &str) -> String {
        // Tokens are hex, no escaping needed.
        format!(
            "{}/api/tournament/download?token={}",
            self.base_url, download_token
        )
    }
}
