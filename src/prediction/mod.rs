//! Cycle forecast interpretation.
//!
//! The backend predicts the next ovulation and menstruation windows. This
//! module reduces that forecast to the single event worth showing on the
//! dashboard together with a day count.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::auth::Session;
use crate::calendar::parse_iso_date;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error("User not found")]
    UserNotFound,
    #[error("invalid {field} date in forecast: {value:?}")]
    InvalidDate { field: &'static str, value: String },
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvulationDto {
    pub start_date: String,
    pub is_active:  bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenstruationDto {
    pub start_date: String,
    pub is_active:  bool,
    pub duration:   u32,
}

/// Forecast as served by `GET /menstruation/prediction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastDto {
    pub ovulation:    OvulationDto,
    #[serde(alias = "period")]
    pub menstruation: MenstruationDto,
}

// ─── Domain types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OvulationForecast {
    pub start_date: NaiveDate,
    pub is_active:  bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenstruationForecast {
    pub start_date: NaiveDate,
    pub is_active:  bool,
    pub duration:   u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forecast {
    pub ovulation:    OvulationForecast,
    pub menstruation: MenstruationForecast,
}

impl TryFrom<ForecastDto> for Forecast {
    type Error = PredictionError;

    fn try_from(dto: ForecastDto) -> Result<Self, Self::Error> {
        let date = |field: &'static str, value: String| {
            parse_iso_date(&value).ok_or(PredictionError::InvalidDate { field, value })
        };
        Ok(Self {
            ovulation: OvulationForecast {
                start_date: date("ovulation", dto.ovulation.start_date)?,
                is_active:  dto.ovulation.is_active,
            },
            menstruation: MenstruationForecast {
                start_date: date("menstruation", dto.menstruation.start_date)?,
                is_active:  dto.menstruation.is_active,
                duration:   dto.menstruation.duration,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ovulation,
    Menstruation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Ovulation    => f.write_str("Ovulation"),
            Phase::Menstruation => f.write_str("Menstruation"),
        }
    }
}

/// The event the dashboard reports.
///
/// `days` is the expected length for menstruation (active or upcoming), 1 for
/// an active ovulation, and the days until onset for an upcoming ovulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSummary {
    pub event:       Phase,
    pub is_upcoming: bool,
    pub days:        i64,
}

impl EventSummary {
    pub fn headline(&self) -> String {
        let n = self.days;
        let unit = if n == 1 { "day" } else { "days" };
        match (self.event, self.is_upcoming) {
            (Phase::Ovulation, false)   => format!("{} today", self.event),
            (_, false)                  => format!("{} in progress: {n} {unit}", self.event),
            (Phase::Menstruation, true) => format!("Next menstruation expected to last {n} {unit}"),
            (_, true)                   => format!("{} in {n} {unit}", self.event),
        }
    }
}

// ─── Interpretation ───────────────────────────────────────────────────────────

/// Active menstruation beats active ovulation; otherwise the sooner start
/// wins, menstruation on a tie.
pub fn interpret(forecast: &Forecast, today: NaiveDate) -> EventSummary {
    let Forecast { ovulation, menstruation } = forecast;

    if menstruation.is_active {
        return EventSummary {
            event:       Phase::Menstruation,
            is_upcoming: false,
            days:        menstruation.duration as i64,
        };
    }
    if ovulation.is_active {
        return EventSummary { event: Phase::Ovulation, is_upcoming: false, days: 1 };
    }

    if ovulation.start_date < menstruation.start_date {
        // Never below one day, also for a start already in the past.
        EventSummary {
            event:       Phase::Ovulation,
            is_upcoming: true,
            days:        (ovulation.start_date - today).num_days().max(1),
        }
    } else {
        EventSummary {
            event:       Phase::Menstruation,
            is_upcoming: true,
            days:        menstruation.duration as i64,
        }
    }
}

/// Interprets `forecast` for the signed-in user.
pub fn predict(
    session:  Option<&Session>,
    forecast: &Forecast,
    today:    NaiveDate,
) -> Result<EventSummary, PredictionError> {
    let session = session.ok_or(PredictionError::UserNotFound)?;
    tracing::debug!(user = %session.user.sub, "interpreting forecast");
    Ok(interpret(forecast, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::IdToken;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn session() -> Session {
        Session {
            token: "token".into(),
            user:  IdToken {
                name:           "foo bar".into(),
                email:          "foo@bar.com".into(),
                email_verified: true,
                sub:            "foo-bar-000".into(),
            },
        }
    }

    fn forecast(
        ovulation_in: i64, ovulation_active: bool,
        menstruation_in: i64, menstruation_active: bool, duration: u32,
    ) -> Forecast {
        Forecast {
            ovulation: OvulationForecast {
                start_date: today() + Duration::days(ovulation_in),
                is_active:  ovulation_active,
            },
            menstruation: MenstruationForecast {
                start_date: today() + Duration::days(menstruation_in),
                is_active:  menstruation_active,
                duration,
            },
        }
    }

    #[test]
    fn missing_user_is_rejected() {
        let f = forecast(20, false, 1, false, 5);
        assert_eq!(predict(None, &f, today()), Err(PredictionError::UserNotFound));
        assert_eq!(PredictionError::UserNotFound.to_string(), "User not found");
    }

    #[test]
    fn upcoming_menstruation_reports_duration() {
        let f = forecast(20, false, 1, false, 5);
        let expected = EventSummary { event: Phase::Menstruation, is_upcoming: true, days: 5 };
        assert_eq!(predict(Some(&session()), &f, today()), Ok(expected));
    }

    #[test]
    fn active_menstruation_wins_over_anything() {
        let f = forecast(20, false, 1, true, 15);
        let expected = EventSummary { event: Phase::Menstruation, is_upcoming: false, days: 15 };
        assert_eq!(interpret(&f, today()), expected);

        let both = forecast(0, true, -2, true, 5);
        assert_eq!(interpret(&both, today()).event, Phase::Menstruation);
        assert!(!interpret(&both, today()).is_upcoming);
    }

    #[test]
    fn active_ovulation_is_a_single_day() {
        let f = forecast(0, true, 1, false, 5);
        let expected = EventSummary { event: Phase::Ovulation, is_upcoming: false, days: 1 };
        assert_eq!(interpret(&f, today()), expected);
    }

    #[test]
    fn upcoming_ovulation_reports_days_until_onset() {
        let f = forecast(0, false, 1, false, 5);
        let expected = EventSummary { event: Phase::Ovulation, is_upcoming: true, days: 1 };
        assert_eq!(predict(Some(&session()), &f, today()), Ok(expected));

        let soon = forecast(3, false, 20, false, 5);
        assert_eq!(interpret(&soon, today()).days, 3);
        assert_eq!(interpret(&soon, today()).headline(), "Ovulation in 3 days");

        let later = forecast(6, false, 20, false, 5);
        assert_eq!(interpret(&later, today()).days, 6);
    }

    #[test]
    fn stale_ovulation_start_never_goes_negative() {
        let f = forecast(-3, false, 20, false, 5);
        let summary = interpret(&f, today());
        assert_eq!(summary, EventSummary { event: Phase::Ovulation, is_upcoming: true, days: 1 });
        assert_eq!(summary.headline(), "Ovulation in 1 day");
    }

    #[test]
    fn same_start_date_goes_to_menstruation() {
        let f = forecast(4, false, 4, false, 6);
        let expected = EventSummary { event: Phase::Menstruation, is_upcoming: true, days: 6 };
        assert_eq!(interpret(&f, today()), expected);
    }

    #[test]
    fn wire_forecast_normalises_to_dates() {
        let json = r#"{
            "ovulation":    { "startDate": "2026-11-05T13:45:10.120Z", "isActive": false },
            "menstruation": { "startDate": "2026-10-17T08:00:00.000Z", "isActive": false, "duration": 5 }
        }"#;
        let dto: ForecastDto = serde_json::from_str(json).unwrap();
        let f = Forecast::try_from(dto).unwrap();
        assert_eq!(f.ovulation.start_date, NaiveDate::from_ymd_opt(2026, 11, 5).unwrap());
        assert_eq!(f.menstruation.start_date, NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        assert_eq!(interpret(&f, today()).event, Phase::Menstruation);
    }

    #[test]
    fn wire_forecast_accepts_period_key() {
        let json = r#"{
            "ovulation": { "startDate": "2026-10-16", "isActive": false },
            "period":    { "startDate": "2026-10-16", "isActive": true, "duration": 13 }
        }"#;
        let dto: ForecastDto = serde_json::from_str(json).unwrap();
        assert_eq!(Forecast::try_from(dto).unwrap().menstruation.duration, 13);
    }

    #[test]
    fn bad_dates_are_reported() {
        let dto = ForecastDto {
            ovulation:    OvulationDto { start_date: "soon".into(), is_active: false },
            menstruation: MenstruationDto {
                start_date: "2026-10-16".into(), is_active: false, duration: 5,
            },
        };
        assert_eq!(
            Forecast::try_from(dto),
            Err(PredictionError::InvalidDate { field: "ovulation", value: "soon".into() })
        );
    }

    #[test]
    fn headlines_read_naturally() {
        let s = |event, is_upcoming, days| EventSummary { event, is_upcoming, days }.headline();
        assert_eq!(s(Phase::Menstruation, false, 5), "Menstruation in progress: 5 days");
        assert_eq!(s(Phase::Menstruation, true, 1), "Next menstruation expected to last 1 day");
        assert_eq!(s(Phase::Ovulation, false, 1), "Ovulation today");
        assert_eq!(s(Phase::Ovulation, true, 3), "Ovulation in 3 days");
    }
}
