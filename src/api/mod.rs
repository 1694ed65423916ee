//! Menstra backend REST client.
//!
//! Every call is authorised with the session's bearer token. Failures are
//! returned as-is; the app layer decides what the user sees.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::calendar::{parse_iso_date, to_iso_timestamp, Interval};
use crate::config::BackendConfig;
use crate::prediction::ForecastDto;

// ─── API types ────────────────────────────────────────────────────────────────

/// A recorded period as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menstruation {
    pub start: String,
    pub end:   String,
}

impl Menstruation {
    pub fn from_interval(iv: &Interval) -> Self {
        Self { start: to_iso_timestamp(iv.start()), end: to_iso_timestamp(iv.end()) }
    }

    /// `None` when either bound is unparseable or the range is inverted.
    pub fn to_interval(&self) -> Option<Interval> {
        let start = parse_iso_date(&self.start)?;
        let end   = parse_iso_date(&self.end)?;
        Interval::new(start, end).ok()
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

pub struct BackendClient {
    http:  Client,
    base:  String,
    token: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig, session: &Session) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_seconds))
                .user_agent("Menstra/0.1")
                .build()
                .context("building backend http client")?,
            base:  config.url.trim_end_matches('/').to_owned(),
            token: session.token.clone(),
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    // ── Menstruation ──────────────────────────────────────────────────────────

    pub async fn prediction(&self) -> Result<ForecastDto> {
        Ok(self.http.get(self.url("menstruation/prediction"))
            .header("Authorization", self.bearer())
            .send().await?.error_for_status()?.json().await?)
    }

    pub async fn menstruations(&self) -> Result<Vec<Menstruation>> {
        Ok(self.http.get(self.url("menstruation"))
            .header("Authorization", self.bearer())
            .send().await?.error_for_status()?.json().await?)
    }

    pub async fn create_menstruation(&self, iv: &Interval) -> Result<Menstruation> {
        let created: Menstruation = self.http.post(self.url("menstruation"))
            .header("Authorization", self.bearer())
            .json(&Menstruation::from_interval(iv))
            .send().await?.error_for_status()?.json().await?;
        tracing::info!("recorded period {} – {}", iv.start(), iv.end());
        Ok(created)
    }

    // ── Account ───────────────────────────────────────────────────────────────

    /// Detaches all period data from the account.
    pub async fn unlink_data(&self) -> Result<()> {
        self.http.post(self.url("user/unlink"))
            .header("Authorization", self.bearer())
            .send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn delete_data(&self) -> Result<()> {
        self.http.delete(self.url("user/data"))
            .header("Authorization", self.bearer())
            .send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn delete_account(&self) -> Result<()> {
        self.http.delete(self.url("user"))
            .header("Authorization", self.bearer())
            .send().await?.error_for_status()?;
        Ok(())
    }
}
