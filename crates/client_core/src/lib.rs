//! Client-side core for the Vedan answer service: the HTTP client that
//! speaks the `/query` contract, and the session layer that drives it.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::Source,
    protocol::{HealthResponse, QueryRequest, QueryResponse, StatsResponse},
};
use thiserror::Error;
use tracing::debug;

pub mod config;
pub mod render;
pub mod session;

pub use config::{load_settings, validate_server_url, Settings, Theme};
pub use render::Renderer;
pub use session::{
    OverlapPolicy, Session, SessionController, SessionEvent, SessionPhase, Transition,
    GENERIC_FAILURE_TEXT,
};

/// A normalized answer-service response: the answer text plus its cited
/// snippets in response order, ordinals assigned 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<Source>,
}

/// Transport errors, non-success statuses and undecodable bodies all fold
/// into this one shape; the cause survives only for logging.
#[derive(Debug, Error)]
#[error("answer service request failed: {0}")]
pub struct AnswerError(#[from] reqwest::Error);

#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, question: &str, result_count: u32) -> Result<Answer>;
}

#[async_trait]
impl<T: AnswerService + ?Sized> AnswerService for Arc<T> {
    async fn ask(&self, question: &str, result_count: u32) -> Result<Answer> {
        (**self).ask(question, result_count).await
    }
}

pub struct AnswerClient {
    http: Client,
    server_url: String,
}

impl AnswerClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
        }
    }

    pub async fn ask(&self, question: &str, result_count: u32) -> Result<Answer, AnswerError> {
        let response: QueryResponse = self
            .http
            .post(format!("{}/query", self.server_url))
            .json(&QueryRequest {
                question: question.to_string(),
                k: result_count,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(
            sources = response.sources.len(),
            "answer service returned a response"
        );

        let sources = response
            .sources
            .into_iter()
            .enumerate()
            .map(|(index, payload)| Source {
                ordinal: index as u32 + 1,
                content: payload.content,
            })
            .collect();

        Ok(Answer {
            text: response.answer,
            sources,
        })
    }

    pub async fn health(&self) -> Result<HealthResponse, AnswerError> {
        let response = self
            .http
            .get(format!("{}/health", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }

    pub async fn stats(&self) -> Result<StatsResponse, AnswerError> {
        let response = self
            .http
            .get(format!("{}/stats", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl AnswerService for AnswerClient {
    async fn ask(&self, question: &str, result_count: u32) -> Result<Answer> {
        // Inherent method; resolves before the trait method.
        Ok(self.ask(question, result_count).await?)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
