//! Text rendering of the whole page.

use chrono::{DateTime, TimeZone};
use std::fmt;

use crate::{
    app::AppState,
    cities::CityDirectory,
    model::{Units, WeatherSnapshot},
    sampler::{ForecastCard, ForecastView, icon_path, round_temp},
};

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
const HUMIDITY_BAR_WIDTH: usize = 20;

/// Eight-point compass direction for a wind bearing in degrees.
pub fn compass_point(deg: f64) -> &'static str {
    let index = round_temp(deg / 45.0).rem_euclid(COMPASS.len() as i64);
    COMPASS[index as usize]
}

fn humidity_bar(pct: u8) -> String {
    let filled = (usize::from(pct.min(100)) * HUMIDITY_BAR_WIDTH + 50) / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(HUMIDITY_BAR_WIDTH - filled))
}

/// A render of `state` as seen at `now`. Every date on the page, "Today" and
/// the forecast labels alike, is shown in the time zone of `now`.
pub struct Dashboard<'a, Tz: TimeZone> {
    state: &'a AppState,
    now: DateTime<Tz>,
    cities: &'a CityDirectory,
}

impl<'a, Tz> Dashboard<'a, Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    pub fn new(state: &'a AppState, now: DateTime<Tz>, cities: &'a CityDirectory) -> Self {
        Self { state, now, cities }
    }

    fn sidebar(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ Search for Places ]  [ Use my location ]")?;
        writeln!(f)?;

        match &self.state.display {
            Some(bundle) => {
                let snap = &bundle.snapshot;
                writeln!(f, "  {}", icon_path(&snap.icon_code))?;
                writeln!(f, "  {}{}", round_temp(snap.temperature), self.state.units.symbol())?;
                writeln!(f, "  {}", snap.condition_main)?;
                writeln!(f, "  Today • {}", self.now.format("%a %-d %b"))?;
                writeln!(f, "  @ {}", snap.location_name)?;
            }
            None => writeln!(f, "  {}", self.state.error_message)?,
        }

        Ok(())
    }

    fn unit_switch(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = Units::all()
            .iter()
            .map(|u| {
                if *u == self.state.units {
                    format!("[{}]", u.symbol())
                } else {
                    format!(" {} ", u.symbol())
                }
            })
            .collect();
        writeln!(f, "{}", labels.join(" "))
    }

    fn forecast_row(f: &mut fmt::Formatter<'_>, cards: &[ForecastCard]) -> fmt::Result {
        for card in cards {
            writeln!(
                f,
                "  {:<12} {:<20} {:<22} {}",
                card.label,
                card.icon_path,
                card.description,
                card.range()
            )?;
        }
        Ok(())
    }

    fn highlights(&self, f: &mut fmt::Formatter<'_>, snap: &WeatherSnapshot) -> fmt::Result {
        writeln!(f, "Today's Highlights")?;
        writeln!(
            f,
            "  Wind status   {:.2} {}  {}",
            snap.wind_speed,
            self.state.units.wind_unit(),
            compass_point(snap.wind_direction_deg)
        )?;
        writeln!(f, "  Humidity      {} %  0 [{}] 100", snap.humidity_pct, humidity_bar(snap.humidity_pct))?;
        writeln!(f, "  Visibility    {:.2} km", snap.visibility_m / 1000.0)?;
        writeln!(f, "  Air Pressure  {} mb", snap.pressure)
    }

    fn search_panel(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Search location: {}", self.state.search_query)?;
        for city in self.cities.search(&self.state.search_query) {
            writeln!(f, "  {city}")?;
        }
        Ok(())
    }
}

impl<Tz> fmt::Display for Dashboard<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alert) = &self.state.alert {
            writeln!(f, "! {alert}")?;
            writeln!(f)?;
        }

        if self.state.search_open {
            self.search_panel(f)?;
            writeln!(f)?;
        }

        self.sidebar(f)?;
        writeln!(f)?;
        self.unit_switch(f)?;

        if let Some(bundle) = &self.state.display {
            let tz = self.now.timezone();
            let view = ForecastView::build(&bundle.forecast, self.state.units, &tz);

            if !view.daily.is_empty() {
                writeln!(f)?;
                Self::forecast_row(f, &view.daily)?;
            }
            if let Some(slider) = &view.slider {
                writeln!(f)?;
                Self::forecast_row(f, slider)?;
            }

            writeln!(f)?;
            self.highlights(f, &bundle.snapshot)?;
        }

        Ok(())
    }
}

pub fn render<Tz>(state: &AppState, now: DateTime<Tz>, cities: &CityDirectory) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    Dashboard::new(state, now, cities).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use crate::{
        app::{Action, update},
        error::{FETCH_ERROR_MESSAGE, WeatherError},
        model::{CityEntry, WeatherBundle},
        provider::tests::{entries, snapshot},
    };

    fn today() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 17, 12, 0, 0).unwrap()
    }

    fn loaded(units: Units, temp: f64, forecast_len: usize) -> AppState {
        let mut state = AppState::new("Lima", units);
        state.display = Some(WeatherBundle {
            snapshot: snapshot("Lima", temp),
            forecast: entries(forecast_len),
        });
        state
    }

    #[test]
    fn compass_points() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(22.4), "N");
        assert_eq!(compass_point(22.5), "NE");
        assert_eq!(compass_point(200.0), "S");
        assert_eq!(compass_point(350.0), "N");
        assert_eq!(compass_point(270.0), "W");
    }

    #[test]
    fn humidity_bar_scales() {
        assert_eq!(humidity_bar(0), "-".repeat(20));
        assert_eq!(humidity_bar(100), "#".repeat(20));
        assert_eq!(humidity_bar(50).matches('#').count(), 10);
    }

    #[test]
    fn celsius_temperature_is_rounded() {
        let out = render(&loaded(Units::Metric, 18.5, 40), today(), &CityDirectory::default());

        assert!(out.contains("  19°C\n"));
        assert!(out.contains("[°C]  °F "));
        assert!(out.contains("Today • Fri 17 Oct"));
        assert!(out.contains("@ Lima"));
        assert!(!out.contains("°F /"));
    }

    #[test]
    fn fahrenheit_suffix_follows_units() {
        let out = render(&loaded(Units::Imperial, 65.4, 40), today(), &CityDirectory::default());

        assert!(out.contains("  65°F\n"));
        assert!(out.contains(" °C  [°F]"));
        assert!(out.contains("mph"));
        assert!(!out.contains("°C /"));
    }

    #[test]
    fn forecast_rows_and_highlights() {
        let out = render(&loaded(Units::Metric, 20.0, 40), today(), &CityDirectory::default());

        assert!(out.contains("Tomorrow"));
        assert!(out.contains("Sun 19 Oct"));
        // slider row starts at raw index 7 (21:00 on the first day)
        assert!(out.contains("Sat 18 Oct"));
        assert!(out.contains("Today's Highlights"));
        assert!(out.contains("3.50 m/s  E"));
        assert!(out.contains("Humidity      40 %"));
        assert!(out.contains("10.00 km"));
        assert!(out.contains("1012 mb"));
    }

    #[test]
    fn page_dates_share_the_viewer_zone() {
        // 03:00 UTC on the 18th is still the evening of the 17th in Lima
        let lima = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = lima.with_ymd_and_hms(2025, 10, 17, 21, 0, 0).unwrap();
        let mut state = loaded(Units::Metric, 20.0, 9);
        if let Some(bundle) = state.display.as_mut() {
            // slider's first card: 2025-10-18 03:00 UTC
            bundle.forecast[7].timestamp = 1_760_756_400;
        }

        let out = render(&state, now, &CityDirectory::default());

        assert!(out.contains("Today • Fri 17 Oct"));
        let slider_first = out
            .lines()
            .filter(|l| l.contains("/images/02d.png"))
            .nth(2)
            .expect("slider row expected");
        assert!(slider_first.contains("Fri 17 Oct"), "{slider_first}");
    }

    #[test]
    fn short_forecast_has_no_slider() {
        let out = render(&loaded(Units::Metric, 20.0, 7), today(), &CityDirectory::default());
        let rows = out.lines().filter(|l| l.contains("/images/02d.png")).count();
        assert_eq!(rows, 1);
    }

    #[test]
    fn error_replaces_weather() {
        let mut state = loaded(Units::Metric, 20.0, 40);
        let token = match update(&mut state, Action::SetCity("Atlantis".into())) {
            Some(crate::app::Effect::Fetch { token, .. }) => token,
            other => panic!("expected fetch, got {other:?}"),
        };
        update(&mut state, Action::FetchFinished { token, result: Err(WeatherError::EmptyConditions) });

        let out = render(&state, today(), &CityDirectory::default());

        assert!(out.contains(FETCH_ERROR_MESSAGE));
        assert!(!out.contains("Today's Highlights"));
        assert!(!out.contains("Tomorrow"));
        assert!(!out.contains("@ Lima"));
    }

    #[test]
    fn search_panel_lists_matches() {
        let cities = CityDirectory::new(vec![
            CityEntry { name: "London".into(), country: "GB".into() },
            CityEntry { name: "Paris".into(), country: "FR".into() },
        ]);
        let mut state = AppState::default();
        update(&mut state, Action::OpenSearch);
        update(&mut state, Action::SetQuery("lon".into()));

        let out = render(&state, today(), &cities);

        assert!(out.contains("Search location: lon"));
        assert!(out.contains("  London, GB"));
        assert!(!out.contains("Paris, FR"));
    }

    #[test]
    fn alert_is_shown() {
        let mut state = AppState::default();
        state.alert = Some("Geolocation is not supported by your device".into());

        let out = render(&state, today(), &CityDirectory::default());
        assert!(out.starts_with("! Geolocation is not supported"));
    }
}
