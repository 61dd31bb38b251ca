//! Reduces the 3-hour forecast list to display rows.
//!
//! The API returns 40 entries (5 days × 8). Taking every eighth entry gives
//! roughly one sample per day; the slider row exposes the unfiltered tail
//! from index 7 onward.

use chrono::{DateTime, TimeZone};
use std::fmt;

use crate::model::{ForecastEntry, Units};

/// Entries per day at 3-hour resolution.
pub const DAILY_STRIDE: usize = 8;

/// First raw index shown in the slider row.
pub const SLIDER_START: usize = 7;

pub const FIRST_DAY_LABEL: &str = "Tomorrow";

/// Entries at indices 0, 8, 16, … in list order.
pub fn daily_sample(raw: &[ForecastEntry]) -> Vec<&ForecastEntry> {
    raw.iter().step_by(DAILY_STRIDE).collect()
}

/// `raw[7..]` when there are more than seven entries.
pub fn slider_tail(raw: &[ForecastEntry]) -> Option<&[ForecastEntry]> {
    (raw.len() > SLIDER_START).then(|| &raw[SLIDER_START..])
}

/// Rounds half-way values toward positive infinity, so `-2.5` becomes `-2`.
pub fn round_temp(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Short en-GB date for a unix timestamp in `tz`, e.g. `Sat 18 Oct`.
pub fn date_label<Tz>(timestamp: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.with_timezone(tz).format("%a %-d %b").to_string(),
        None => String::from("?"),
    }
}

pub fn icon_path(icon_code: &str) -> String {
    if icon_code.is_empty() {
        FALLBACK_ICON.to_string()
    } else {
        format!("/images/{icon_code}.png")
    }
}

pub const FALLBACK_ICON: &str = "/images/fallback.png";

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastCard {
    pub label: String,
    pub icon_path: String,
    pub description: String,
    pub high: i64,
    pub low: i64,
    pub symbol: &'static str,
}

impl ForecastCard {
    fn from_entry(entry: &ForecastEntry, label: String, units: Units) -> Self {
        Self {
            label,
            icon_path: icon_path(&entry.icon_code),
            description: entry.description.clone(),
            high: round_temp(entry.temp_max),
            low: round_temp(entry.temp_min),
            symbol: units.symbol(),
        }
    }

    /// `19°C / 12°C`
    pub fn range(&self) -> String {
        format!("{}{} / {}{}", self.high, self.symbol, self.low, self.symbol)
    }
}

/// Both forecast rows, ready for rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastView {
    pub daily: Vec<ForecastCard>,
    pub slider: Option<Vec<ForecastCard>>,
}

impl ForecastView {
    /// Date labels are computed in `tz`, normally the viewer's local zone.
    pub fn build<Tz>(raw: &[ForecastEntry], units: Units, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let daily = daily_sample(raw)
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| {
                let label = if idx == 0 {
                    FIRST_DAY_LABEL.to_string()
                } else {
                    date_label(entry.timestamp, tz)
                };
                ForecastCard::from_entry(entry, label, units)
            })
            .collect();

        let slider = slider_tail(raw).map(|tail| {
            tail.iter()
                .map(|entry| {
                    ForecastCard::from_entry(entry, date_label(entry.timestamp, tz), units)
                })
                .collect()
        });

        Self { daily, slider }
    }
}
