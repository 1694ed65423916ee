use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::{
    api::BackendClient,
    calendar::{shift_month, Calendar, SelectionMode},
    config::AppConfig,
    db::Database,
    prediction::{predict, EventSummary, Forecast, PredictionError},
    theme::ThemeConfig,
    ui::draw,
};

// ─── User-facing messages ─────────────────────────────────────────────────────

pub const NO_INTERVAL:        &str = "Please select a time interval.";
pub const CREATE_FAILED:      &str =
    "There was an error creating that period. Please refresh and try again or check back later.";
pub const LOAD_FAILED:        &str =
    "There was an error loading your periods. Please refresh and try again or check back later.";
pub const PREDICTION_FAILED:  &str =
    "There was an error loading your prediction. Please refresh and try again or check back later.";
pub const SIGNED_OUT:         &str = "You are signed out. Run `menstra login <email>` to continue.";
pub const UNLINK_OK:          &str =
    "Successfully unlinked all your data. Your calendar should be empty now.";
pub const UNLINK_FAILED:      &str =
    "There was an error while anonymizing your data. Please try again.";
pub const DELETE_DATA_OK:     &str =
    "Successfully deleted all your data. Your calendar should be empty now.";
pub const DELETE_DATA_FAILED: &str =
    "There was an error while deleting your data. Please try again.";
pub const DELETE_ACCOUNT_OK:  &str =
    "Successfully deleted all your account. You will need to login now.";
pub const DELETE_ACCOUNT_FAILED: &str =
    "There was an error while deleting your account. Please try again.";

// ─── View model ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    /// "Insert Period": pick a range and save it.
    Create,
    /// Anonymise data, delete data, or delete the account.
    Account,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    UnlinkData,
    DeleteData,
    DeleteAccount,
}

impl AccountAction {
    pub const ALL: [AccountAction; 3] =
        [AccountAction::UnlinkData, AccountAction::DeleteData, AccountAction::DeleteAccount];

    pub fn label(&self) -> &'static str {
        match self {
            AccountAction::UnlinkData    => "Anonymize Data",
            AccountAction::DeleteData    => "Delete Data",
            AccountAction::DeleteAccount => "Delete Account",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AccountAction::UnlinkData =>
                "Disconnect your period data from your account. The data stays and \
                 helps predictions, but can no longer be traced back to you.",
            AccountAction::DeleteData =>
                "Delete all period data you have entered. Your account stays.",
            AccountAction::DeleteAccount =>
                "Delete your account and sign out. Period data is kept unlinked \
                 unless you delete it first.",
        }
    }
}

/// Info box shown under the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

// ─── App state ────────────────────────────────────────────────────────────────

pub struct App {
    pub config:         AppConfig,
    pub db:             Database,
    pub api:            BackendClient,
    pub theme:          ThemeConfig,
    pub theme_idx:      usize,
    pub today:          NaiveDate,
    pub view:           View,
    /// Recorded periods, read-only.
    pub dashboard:      Calendar,
    /// Range picker of the Create view; rebuilt each time the view opens.
    pub create:         Calendar,
    pub cursor:         NaiveDate,
    pub summary:        Option<EventSummary>,
    pub notice:         Option<Notice>,
    pub account_cursor: usize,
    pub running:        bool,
}

impl App {
    pub fn new(
        config: AppConfig,
        db:     Database,
        api:    BackendClient,
        theme:  ThemeConfig,
        today:  NaiveDate,
    ) -> Self {
        let all = ThemeConfig::all_themes();
        let idx = all.iter().position(|t| t.name == theme.name).unwrap_or(0);
        let cal = &config.calendar;
        let dashboard = Calendar::new(
            today, cal.dashboard_previous_months, cal.dashboard_upcoming_months,
            today, SelectionMode::Display(vec![]),
        );
        let create = Calendar::new(
            today, cal.create_previous_months, cal.create_upcoming_months,
            today, SelectionMode::range(),
        );

        Self {
            config, db, api, theme,
            theme_idx:      idx,
            today,
            view:           View::Dashboard,
            dashboard, create,
            cursor:         today,
            summary:        None,
            notice:         None,
            account_cursor: 0,
            running:        true,
        }
    }

    /// The calendar the current view renders.
    pub fn calendar(&self) -> &Calendar {
        match self.view {
            View::Create => &self.create,
            _            => &self.dashboard,
        }
    }

    // ── TUI loop ──────────────────────────────────────────────────────────────

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend  = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;

        let result = self.event_loop(&mut term).await;

        disable_raw_mode()?;
        execute!(term.backend_mut(), LeaveAlternateScreen)?;
        term.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        term: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        self.refresh().await;

        let tick = std::time::Duration::from_millis(50);
        while self.running {
            term.draw(|f| draw(f, self))?;
            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    self.on_key(key).await?;
                }
            }
        }
        Ok(())
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub async fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => { self.running = false; return Ok(()); }
            (KeyCode::Char('q'), _) => { self.running = false; return Ok(()); }
            (KeyCode::Char('?'), _) => { self.view = View::Help; return Ok(()); }
            (KeyCode::Esc, _) => { self.show_dashboard(); return Ok(()); }
            // T (Shift+T): cycle through themes
            (KeyCode::Char('T'), _) => {
                let themes = ThemeConfig::all_themes();
                self.theme_idx = (self.theme_idx + 1) % themes.len();
                self.theme     = themes[self.theme_idx].clone();
                if let Err(e) = self.theme.save() {
                    tracing::warn!("saving theme: {e}");
                }
                return Ok(());
            }
            _ => {}
        }

        match self.view {
            View::Dashboard => self.key_dashboard(key).await,
            View::Create    => self.key_create(key).await,
            View::Account   => self.key_account(key).await,
            View::Help      => self.show_dashboard(),
        }
        Ok(())
    }

    async fn key_dashboard(&mut self, key: KeyEvent) {
        if self.key_cursor(key) { return; }
        match key.code {
            KeyCode::Char('n') => self.open_create(),
            KeyCode::Char('a') => {
                self.notice         = None;
                self.account_cursor = 0;
                self.view           = View::Account;
            }
            KeyCode::Char('r') => self.refresh().await,
            _ => {}
        }
    }

    async fn key_create(&mut self, key: KeyEvent) {
        if self.key_cursor(key) { return; }
        match key.code {
            KeyCode::Char(' ') => { self.create.click_date(self.cursor); }
            KeyCode::Enter | KeyCode::Char('s') => self.submit_create().await,
            KeyCode::Char('c') => self.show_dashboard(),
            _ => {}
        }
    }

    async fn key_account(&mut self, key: KeyEvent) {
        let n = AccountAction::ALL.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.account_cursor = (self.account_cursor + 1) % n,
            KeyCode::Up   | KeyCode::Char('k') => self.account_cursor = (self.account_cursor + n - 1) % n,
            KeyCode::Enter => self.run_account_action(AccountAction::ALL[self.account_cursor]).await,
            _ => {}
        }
    }

    /// Cursor movement shared by both calendar views. Returns true when the
    /// key was a movement key.
    fn key_cursor(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(Duration::days(1)),
            KeyCode::Left  | KeyCode::Char('h') => self.move_cursor(Duration::days(-1)),
            KeyCode::Down  | KeyCode::Char('j') => self.move_cursor(Duration::days(7)),
            KeyCode::Up    | KeyCode::Char('k') => self.move_cursor(Duration::days(-7)),
            KeyCode::Char(']') => self.jump_month(1),
            KeyCode::Char('[') => self.jump_month(-1),
            KeyCode::Char('t') => self.cursor = self.today,
            _ => return false,
        }
        true
    }

    fn move_cursor(&mut self, by: Duration) {
        let target = self.cursor + by;
        if let Some(span) = self.calendar().span() {
            self.cursor = target.clamp(span.start(), span.end());
        }
    }

    fn jump_month(&mut self, delta: i32) {
        let (y, m) = shift_month(self.cursor.year(), self.cursor.month(), delta);
        let day    = crate::calendar::days_in_month(y, m)
            .map(|last| self.cursor.day().min(last))
            .unwrap_or(1);
        if let Some(target) = NaiveDate::from_ymd_opt(y, m, day) {
            if self.calendar().locate(target).is_some() {
                self.cursor = target;
            }
        }
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    fn show_dashboard(&mut self) {
        if self.view == View::Create {
            self.cursor = self.today;
        }
        self.view = View::Dashboard;
    }

    fn open_create(&mut self) {
        let cal = &self.config.calendar;
        self.create = Calendar::new(
            self.today, cal.create_previous_months, cal.create_upcoming_months,
            self.today, SelectionMode::range(),
        );
        self.cursor = self.today;
        self.notice = None;
        self.view   = View::Create;
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    pub async fn submit_create(&mut self) {
        self.notice = None;
        let Some(interval) = self.create.selection() else {
            self.notice = Some(Notice::Error(NO_INTERVAL.into()));
            return;
        };
        match self.api.create_menstruation(&interval).await {
            Ok(_) => {
                self.show_dashboard();
                self.refresh().await;
            }
            Err(e) => {
                tracing::error!("Was not able to create period: {e:#}");
                self.notice = Some(Notice::Error(CREATE_FAILED.into()));
            }
        }
    }

    pub async fn run_account_action(&mut self, action: AccountAction) {
        let result = match action {
            AccountAction::UnlinkData    => self.api.unlink_data().await,
            AccountAction::DeleteData    => self.api.delete_data().await,
            AccountAction::DeleteAccount => self.api.delete_account().await,
        };
        let notice = match (action, result) {
            (AccountAction::UnlinkData, Ok(()))    => Notice::Success(UNLINK_OK.into()),
            (AccountAction::DeleteData, Ok(()))    => Notice::Success(DELETE_DATA_OK.into()),
            (AccountAction::DeleteAccount, Ok(())) => {
                if let Err(e) = self.db.clear_session().await {
                    tracing::error!("Was not able to sign out: {e:#}");
                }
                self.running = false;
                Notice::Success(DELETE_ACCOUNT_OK.into())
            }
            (action, Err(e)) => {
                tracing::error!("Was not able to {}: {e:#}", action.label().to_lowercase());
                Notice::Error(match action {
                    AccountAction::UnlinkData    => UNLINK_FAILED,
                    AccountAction::DeleteData    => DELETE_DATA_FAILED,
                    AccountAction::DeleteAccount => DELETE_ACCOUNT_FAILED,
                }.into())
            }
        };
        self.notice = Some(notice);
    }

    /// Reloads recorded periods and the prediction.
    pub async fn refresh(&mut self) {
        self.today = Local::now().date_naive();
        self.notice = None;

        let cal = &self.config.calendar;
        let (prev, next) = (cal.dashboard_previous_months, cal.dashboard_upcoming_months);
        match self.api.menstruations().await {
            Ok(list) => {
                let intervals = list.iter().filter_map(|m| m.to_interval()).collect();
                self.dashboard = Calendar::new(
                    self.today, prev, next, self.today, SelectionMode::Display(intervals),
                );
            }
            Err(e) => {
                tracing::error!("Was not able to load periods: {e:#}");
                self.notice = Some(Notice::Error(LOAD_FAILED.into()));
            }
        }

        match self.load_summary().await {
            Ok(summary) => self.summary = Some(summary),
            Err(e) => {
                self.summary = None;
                let message = match e.downcast_ref::<PredictionError>() {
                    Some(PredictionError::UserNotFound) => SIGNED_OUT,
                    _ => PREDICTION_FAILED,
                };
                tracing::error!("Was not able to load prediction: {e:#}");
                if self.notice.is_none() {
                    self.notice = Some(Notice::Error(message.into()));
                }
            }
        }
    }

    async fn load_summary(&self) -> Result<EventSummary> {
        // Checked before the request so a signed-out user never hits the backend.
        let session = self.db.session().await?;
        if session.is_none() {
            return Err(PredictionError::UserNotFound.into());
        }
        let forecast = Forecast::try_from(self.api.prediction().await?)?;
        Ok(predict(session.as_ref(), &forecast, self.today)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{IdToken, Session};
    use crate::calendar::Interval;
    use crate::config::BackendConfig;
    use crate::testing::serve_once;

    fn session() -> Session {
        Session {
            token: "tok".into(),
            user:  IdToken {
                name:           "foo bar".into(),
                email:          "foo@bar.com".into(),
                email_verified: true,
                sub:            "foo-bar-000".into(),
            },
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn app(url: &str) -> App {
        let db = Database::connect_url("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let backend = BackendConfig { url: url.to_owned(), timeout_seconds: 5 };
        let api = BackendClient::new(&backend, &session()).unwrap();
        App::new(AppConfig::default(), db, api, ThemeConfig::default(), today())
    }

    #[tokio::test]
    async fn saving_without_selection_asks_for_one() {
        let mut app = app("http://127.0.0.1:9").await;
        app.on_key(key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.view, View::Create);

        app.on_key(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.notice, Some(Notice::Error(NO_INTERVAL.into())));
        assert_eq!(app.view, View::Create);
    }

    #[tokio::test]
    async fn cursor_and_space_pick_a_range() {
        let mut app = app("http://127.0.0.1:9").await;
        app.on_key(key(KeyCode::Char('n'))).await.unwrap();
        app.on_key(key(KeyCode::Char(' '))).await.unwrap();
        app.on_key(key(KeyCode::Char('l'))).await.unwrap();
        app.on_key(key(KeyCode::Char('l'))).await.unwrap();
        app.on_key(key(KeyCode::Char(' '))).await.unwrap();

        let expected = Interval::new(today(), today() + Duration::days(2)).unwrap();
        assert_eq!(app.create.selection(), Some(expected));
    }

    #[tokio::test]
    async fn cursor_stays_inside_the_shown_months() {
        let mut app = app("http://127.0.0.1:9").await;
        // Dashboard shows August to November 2026 by default.
        for _ in 0..30 {
            app.on_key(key(KeyCode::Char('k'))).await.unwrap();
        }
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());

        app.on_key(key(KeyCode::Char('t'))).await.unwrap();
        app.on_key(key(KeyCode::Char(']'))).await.unwrap();
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2026, 11, 16).unwrap());
        app.on_key(key(KeyCode::Char(']'))).await.unwrap();
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2026, 11, 16).unwrap());
    }

    #[tokio::test]
    async fn failed_save_keeps_the_form_open() {
        let (url, request) = serve_once("500 Internal Server Error", "{}").await;
        let mut app = app(&url).await;
        app.on_key(key(KeyCode::Char('n'))).await.unwrap();
        app.on_key(key(KeyCode::Char(' '))).await.unwrap();
        app.submit_create().await;

        assert_eq!(app.notice, Some(Notice::Error(CREATE_FAILED.into())));
        assert_eq!(app.view, View::Create);
        assert!(request.await.unwrap().starts_with("POST /menstruation "));
    }

    #[tokio::test]
    async fn signed_out_user_never_reaches_the_backend() {
        let mut app = app("http://127.0.0.1:9").await;
        let err = app.load_summary().await.unwrap_err();
        assert_eq!(err.downcast_ref::<PredictionError>(), Some(&PredictionError::UserNotFound));

        app.refresh().await;
        assert_eq!(app.summary, None);
        assert!(app.notice.is_some());
    }

    #[tokio::test]
    async fn account_action_reports_success() {
        let (url, request) = serve_once("204 No Content", "").await;
        let mut app = app(&url).await;
        app.run_account_action(AccountAction::UnlinkData).await;
        assert_eq!(app.notice, Some(Notice::Success(UNLINK_OK.into())));
        assert!(request.await.unwrap().starts_with("POST /user/unlink "));
        assert!(app.running);
    }

    #[tokio::test]
    async fn deleting_the_account_signs_out() {
        let (url, _request) = serve_once("204 No Content", "").await;
        let mut app = app(&url).await;
        app.db.save_session(&session()).await.unwrap();

        app.run_account_action(AccountAction::DeleteAccount).await;
        assert_eq!(
            app.notice,
            Some(Notice::Success(
                "Successfully deleted all your account. You will need to login now.".into()
            ))
        );
        assert_eq!(app.db.session().await.unwrap(), None);
        assert!(!app.running);
    }
}
