mod api;
mod app;
mod auth;
mod calendar;
mod config;
mod db;
mod prediction;
mod theme;
mod ui;

#[cfg(test)]
mod testing;

use anyhow::{anyhow, bail, Result};
use api::BackendClient;
use app::App;
use auth::AuthClient;
use config::AppConfig;
use db::Database;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::Write;
use theme::ThemeConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "\
usage:
  menstra                          open the calendar
  menstra register <name> <email>  create an account
  menstra confirm <email> <code>   confirm a new account
  menstra login <email>            sign in
  menstra logout                   sign out";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str>   = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        []                         => run_tui().await,
        ["login", email]           => cmd_login(email).await,
        ["register", name, email]  => cmd_register(name, email).await,
        ["confirm", email, code]   => cmd_confirm(email, code).await,
        ["logout"]                 => cmd_logout().await,
        ["help" | "-h" | "--help"] => { println!("{USAGE}"); Ok(()) }
        _ => bail!("unrecognised arguments\n\n{USAGE}"),
    }
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;

    // Raw mode keeps the terminal from echoing what is typed.
    enable_raw_mode()?;
    let read = read_secret();
    disable_raw_mode()?;
    println!();

    let value = read?;
    if value.is_empty() {
        bail!("{label} must not be empty");
    }
    Ok(value)
}

fn read_secret() -> Result<String> {
    let mut value = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if feed_secret(&mut value, key)? {
                return Ok(value);
            }
        }
    }
}

/// Applies one key press to a hidden input. Returns `true` once Enter ends it.
fn feed_secret(value: &mut String, key: KeyEvent) -> Result<bool> {
    if key.kind != KeyEventKind::Press {
        return Ok(false);
    }
    match key.code {
        KeyCode::Enter => return Ok(true),
        KeyCode::Esc => bail!("cancelled"),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => bail!("cancelled"),
        KeyCode::Backspace => { value.pop(); }
        KeyCode::Char(c) => value.push(c),
        _ => {}
    }
    Ok(false)
}

// ─── Account commands ────────────────────────────────────────────────────────

async fn cmd_register(name: &str, email: &str) -> Result<()> {
    init_stderr_logging();
    let cfg      = AppConfig::load()?;
    let password = prompt_secret("Password")?;
    AuthClient::new(&cfg.auth, cfg.backend.timeout_seconds)?
        .register(name, email, &password).await?;

    println!("\nAlmost there! Check {email} for a confirmation code, then run:");
    println!("  menstra confirm {email} <code>");
    Ok(())
}

async fn cmd_confirm(email: &str, code: &str) -> Result<()> {
    init_stderr_logging();
    let cfg = AppConfig::load()?;
    AuthClient::new(&cfg.auth, cfg.backend.timeout_seconds)?
        .confirm(email, code).await?;

    println!("Account confirmed. Run  menstra login {email}  to sign in.");
    Ok(())
}

async fn cmd_login(email: &str) -> Result<()> {
    init_stderr_logging();
    let cfg      = AppConfig::load()?;
    let password = prompt_secret("Password")?;
    let session  = AuthClient::new(&cfg.auth, cfg.backend.timeout_seconds)?
        .authenticate(email, &password).await
        .map_err(|e| anyhow!("Sign in failed: {e}"))?;

    let db = Database::connect().await?;
    db.migrate().await?;
    db.save_session(&session).await?;

    println!("Signed in as {}. Run  menstra  to open your calendar.", session.user.name);
    Ok(())
}

async fn cmd_logout() -> Result<()> {
    init_stderr_logging();
    let db = Database::connect().await?;
    db.migrate().await?;
    db.clear_session().await?;
    println!("Signed out.");
    Ok(())
}

// ─── TUI ─────────────────────────────────────────────────────────────────────

async fn run_tui() -> Result<()> {
    let log_dir = db::log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "menstra.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    tracing::info!("Starting Menstra");

    let cfg   = AppConfig::load().unwrap_or_default();
    let theme = ThemeConfig::load()?;
    let db    = Database::connect().await?;
    db.migrate().await?;

    let Some(session) = db.session().await? else {
        println!("Not signed in. Run  menstra login <email>  first.");
        return Ok(());
    };

    let api   = BackendClient::new(&cfg.backend, &session)?;
    let today = chrono::Local::now().date_naive();
    let mut app = App::new(cfg, db, api, theme, today);
    app.run().await?;

    if app.notice == Some(app::Notice::Success(app::DELETE_ACCOUNT_OK.into())) {
        println!("{}", app::DELETE_ACCOUNT_OK);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn secret_input_collects_until_enter() {
        let mut value = String::new();
        for c in "hunter2x".chars() {
            assert!(!feed_secret(&mut value, press(KeyCode::Char(c))).unwrap());
        }
        assert!(!feed_secret(&mut value, press(KeyCode::Backspace)).unwrap());
        assert!(feed_secret(&mut value, press(KeyCode::Enter)).unwrap());
        assert_eq!(value, "hunter2");
    }

    #[test]
    fn secret_input_ignores_releases_and_can_be_cancelled() {
        let mut value = String::new();
        let mut release = press(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert!(!feed_secret(&mut value, release).unwrap());
        assert!(value.is_empty());

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(feed_secret(&mut value, ctrl_c).is_err());
        assert!(feed_secret(&mut value, press(KeyCode::Esc)).is_err());
    }
}
