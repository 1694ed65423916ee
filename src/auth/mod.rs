//! Identity provider client and the signed-in session.
//!
//! Registration, confirmation and sign-in are delegated to an external
//! identity service. A successful sign-in yields a bearer token and the
//! user's identity claims, which are kept in the local database until
//! `menstra logout` or account deletion.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Identity claims of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdToken {
    pub name:           String,
    pub email:          String,
    pub email_verified: bool,
    pub sub:            String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user:  IdToken,
}

pub struct AuthClient {
    http: Client,
    url:  String,
}

impl AuthClient {
    pub fn new(config: &AuthConfig, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_seconds))
                .user_agent("Menstra/0.1")
                .build()
                .context("building auth http client")?,
            url: config.url.trim_end_matches('/').to_owned(),
        })
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Session> {
        let session: Session = self.http.post(format!("{}/login", self.url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send().await?.error_for_status()?.json().await?;
        tracing::info!(sub = %session.user.sub, "signed in");
        Ok(session)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        self.http.post(format!("{}/register", self.url))
            .json(&serde_json::json!({ "name": name, "email": email, "password": password }))
            .send().await?.error_for_status()?;
        tracing::info!("registration submitted for {email}");
        Ok(())
    }

    pub async fn confirm(&self, email: &str, code: &str) -> Result<()> {
        self.http.post(format!("{}/confirm", self.url))
            .json(&serde_json::json!({ "email": email, "code": code }))
            .send().await?.error_for_status()?;
        tracing::info!("account confirmed for {email}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve_once;

    fn client(url: String) -> AuthClient {
        AuthClient::new(&AuthConfig { url }, 5).unwrap()
    }

    #[tokio::test]
    async fn authenticate_returns_session() {
        let body = r#"{"token":"abc","user":{"name":"foo bar","email":"foo@bar.com","email_verified":true,"sub":"foo-000"}}"#;
        let (url, request) = serve_once("200 OK", body).await;

        let session = client(url).authenticate("foo@bar.com", "password").await.unwrap();
        assert_eq!(session.token, "abc");
        assert_eq!(session.user.sub, "foo-000");

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /login "));
        assert!(request.contains(r#""email":"foo@bar.com""#));
        assert!(request.contains(r#""password":"password""#));
    }

    #[tokio::test]
    async fn rejected_login_is_an_error() {
        let (url, _request) = serve_once("401 Unauthorized", "{}").await;
        assert!(client(url).authenticate("foo@bar.com", "wrong").await.is_err());
    }

    #[tokio::test]
    async fn confirm_posts_code() {
        let (url, request) = serve_once("204 No Content", "").await;
        client(url).confirm("foo@bar.com", "123456").await.unwrap();
        let request = request.await.unwrap();
        assert!(request.starts_with("POST /confirm "));
        assert!(request.contains(r#""code":"123456""#));
    }
}
