use anyhow::Result;
use sqlx::{sqlite::{SqlitePool, SqlitePoolOptions}, Row};
use std::path::PathBuf;

use crate::auth::{IdToken, Session};

// ─── Database ─────────────────────────────────────────────────────────────────

/// Local store. Holds nothing but the signed-in session; period data lives
/// on the backend.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect() -> Result<Self> {
        let dir = data_dir();
        std::fs::create_dir_all(&dir)?;
        let url = format!("sqlite://{}?mode=rwc", dir.join("menstra.db").display());
        Self::connect_url(&url).await
    }

    pub async fn connect_url(url: &str) -> Result<Self> {
        // One connection: a single user, and `sqlite::memory:` stays one database.
        let pool = SqlitePoolOptions::new().max_connections(1).connect(url).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                token TEXT NOT NULL, sub TEXT NOT NULL, name TEXT NOT NULL,
                email TEXT NOT NULL, email_verified INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )"
        ).execute(&self.pool).await?;

        tracing::info!("DB migrations complete");
        Ok(())
    }

    // ── Session ───────────────────────────────────────────────────────────────

    /// Replaces any stored session.
    pub async fn save_session(&self, s: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO session (id,token,sub,name,email,email_verified,created_at)
             VALUES (1,?,?,?,?,?,?)
             ON CONFLICT(id) DO UPDATE SET
                token=excluded.token, sub=excluded.sub, name=excluded.name,
                email=excluded.email, email_verified=excluded.email_verified,
                created_at=excluded.created_at"
        )
        .bind(&s.token).bind(&s.user.sub).bind(&s.user.name)
        .bind(&s.user.email).bind(s.user.email_verified as i32)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool).await?;
        Ok(())
    }

    /// The current authenticated identity, if any.
    pub async fn session(&self) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT token, sub, name, email, email_verified FROM session WHERE id=1"
        ).fetch_optional(&self.pool).await?;

        Ok(row.map(|r| Session {
            token: r.get("token"),
            user:  IdToken {
                sub:            r.get("sub"),
                name:           r.get("name"),
                email:          r.get("email"),
                email_verified: r.get::<i32, _>("email_verified") != 0,
            },
        }))
    }

    pub async fn clear_session(&self) -> Result<()> {
        sqlx::query("DELETE FROM session").execute(&self.pool).await?;
        Ok(())
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("menstra")
}

pub fn log_dir() -> PathBuf { data_dir() }

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> Session {
        Session {
            token: token.into(),
            user:  IdToken {
                name:           "foo bar".into(),
                email:          "foo@bar.com".into(),
                email_verified: true,
                sub:            "foo-bar-000".into(),
            },
        }
    }

    async fn memory_db() -> Database {
        let db = Database::connect_url("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn session_round_trips_and_clears() {
        let db = memory_db().await;
        assert_eq!(db.session().await.unwrap(), None);

        db.save_session(&session("first")).await.unwrap();
        db.save_session(&session("second")).await.unwrap();
        assert_eq!(db.session().await.unwrap(), Some(session("second")));

        db.clear_session().await.unwrap();
        assert_eq!(db.session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn migrate_is_repeatable() {
        let db = memory_db().await;
        db.migrate().await.unwrap();
    }
}
