//! In-memory backend for driving the session gate and the wizard without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use padel_draw::{
    BackendError, Category, DrawBackend, DrawRequest, Person, SessionGrant, Team,
    TournamentListing, TournamentRecord,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Answers with canned results and records every call it receives.
pub struct FakeBackend {
    exchange: Result<SessionGrant, BackendError>,
    create: Mutex<Vec<Result<(), BackendError>>>,
    exchange_calls: AtomicUsize,
    create_calls: AtomicUsize,
    release: Option<Arc<Notify>>,
    pub submitted: Mutex<Vec<(String, DrawRequest)>>,
}

impl FakeBackend {
    /// Grants token "tok-1" and accepts every draw.
    pub fn accepting() -> Self {
        Self::with_exchange(Ok(SessionGrant {
            token: "tok-1".to_string(),
            id: "42".to_string(),
        }))
    }

    pub fn with_exchange(exchange: Result<SessionGrant, BackendError>) -> Self {
        Self {
            exchange,
            create: Mutex::new(Vec::new()),
            exchange_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            release: None,
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Draw submissions wait until `release` is notified before answering.
    pub fn held_until(mut self, release: Arc<Notify>) -> Self {
        self.release = Some(release);
        self
    }

    /// Queue answers for the next draw submissions; once drained, draws are accepted.
    pub fn then_create(self, results: Vec<Result<(), BackendError>>) -> Self {
        *self.create.lock().unwrap() = results.into_iter().rev().collect();
        self
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DrawBackend for FakeBackend {
    async fn exchange_credential(&self, _credential: &str) -> Result<SessionGrant, BackendError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.exchange.clone()
    }

    async fn create_draw(&self, token: &str, request: &DrawRequest) -> Result<(), BackendError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(release) = &self.release {
            release.notified().await;
        }
        self.submitted
            .lock()
            .unwrap()
            .push((token.to_string(), request.clone()));
        self.create.lock().unwrap().pop().unwrap_or(Ok(()))
    }

    async fn tournaments_by_date(
        &self,
        _token: &str,
        date: NaiveDate,
    ) -> Result<TournamentListing, BackendError> {
        Ok(TournamentListing {
            date,
            tournaments: Vec::new(),
        })
    }

    async fn download_token(
        &self,
        _token: &str,
        _record: &TournamentRecord,
    ) -> Result<String, BackendError> {
        Ok("abc123".to_string())
    }

    fn download_url(&self, download_token: &str) -> String {
        format!("http://backend/api/tournament/download?token={download_token}")
    }
}

pub fn team(a: &str, b: &str, category: Category) -> Team {
    Team::new(Person::new(a), Person::new(b), category)
}

/// `n` distinct mixed teams.
pub fn teams(n: usize) -> Vec<Team> {
    (0..n)
        .map(|i| team(&format!("p{}", 2 * i), &format!("p{}", 2 * i + 1), Category::Mixed))
        .collect()
}
