//! Page state and its update cycle.
//!
//! `update` is a pure reducer: it mutates [`AppState`] and returns at most one
//! [`Effect`]. Effects are executed by [`run_effect`], whose result comes back
//! as another [`Action`]. Every fetch carries a sequence token and only the
//! result of the most recently issued fetch may touch the display.

use crate::{
    error::{FETCH_ERROR_MESSAGE, LocateError, WeatherError},
    locate::{self, PositionSource},
    model::{CityEntry, LocationQuery, Units, WeatherBundle},
    provider::{self, WeatherSource},
};

pub const DEFAULT_CITY: &str = "Lima";

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub selected_city: String,
    pub units: Units,
    pub search_open: bool,
    pub search_query: String,
    /// Empty unless the last fetch failed.
    pub error_message: String,
    pub display: Option<WeatherBundle>,
    /// One-shot message from a failed location lookup.
    pub alert: Option<String>,
    /// Token of the most recently issued fetch.
    pub latest_request: u64,
}

impl AppState {
    pub fn new(city: impl Into<String>, units: Units) -> Self {
        Self {
            selected_city: city.into(),
            units,
            search_open: false,
            search_query: String::new(),
            error_message: String::new(),
            display: None,
            alert: None,
            latest_request: 0,
        }
    }

    fn issue_fetch(&mut self) -> Effect {
        self.latest_request += 1;
        Effect::Fetch {
            token: self.latest_request,
            query: LocationQuery::City(self.selected_city.clone()),
            units: self.units,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_CITY, Units::default())
    }
}

#[derive(Debug)]
pub enum Action {
    SetCity(String),
    SetUnits(Units),
    ToggleUnits,
    OpenSearch,
    CloseSearch,
    SetQuery(String),
    /// Use the free-text query as the city.
    SubmitQuery,
    PickCity(CityEntry),
    Refresh,
    Locate,
    FetchFinished {
        token: u64,
        result: Result<WeatherBundle, WeatherError>,
    },
    LocateFinished(Result<String, LocateError>),
    DismissAlert,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch {
        token: u64,
        query: LocationQuery,
        units: Units,
    },
    Locate,
}

pub fn update(state: &mut AppState, action: Action) -> Option<Effect> {
    match action {
        Action::SetCity(city) => {
            let city = city.trim();
            if city.is_empty() {
                return None;
            }
            state.selected_city = city.to_string();
            Some(state.issue_fetch())
        }
        Action::SetUnits(units) => {
            if state.units == units {
                return None;
            }
            state.units = units;
            Some(state.issue_fetch())
        }
        Action::ToggleUnits => {
            state.units = state.units.toggled();
            Some(state.issue_fetch())
        }
        Action::OpenSearch => {
            state.search_open = true;
            None
        }
        Action::CloseSearch => {
            state.search_open = false;
            None
        }
        Action::SetQuery(query) => {
            state.search_query = query;
            None
        }
        Action::SubmitQuery => {
            let query = state.search_query.trim().to_string();
            if query.is_empty() {
                return None;
            }
            state.selected_city = query;
            state.search_query.clear();
            state.search_open = false;
            Some(state.issue_fetch())
        }
        Action::PickCity(city) => {
            state.selected_city = city.name;
            state.search_open = false;
            Some(state.issue_fetch())
        }
        Action::Refresh => Some(state.issue_fetch()),
        Action::Locate => Some(Effect::Locate),
        Action::FetchFinished { token, result } => {
            if token != state.latest_request {
                tracing::debug!(token, latest = state.latest_request, "dropping stale weather result");
                return None;
            }
            match result {
                Ok(bundle) => {
                    state.display = Some(bundle);
                    state.error_message.clear();
                }
                Err(err) => {
                    tracing::warn!(city = %state.selected_city, "error fetching data: {err}");
                    state.display = None;
                    state.error_message = FETCH_ERROR_MESSAGE.to_string();
                }
            }
            None
        }
        Action::LocateFinished(Ok(name)) => {
            state.selected_city = name;
            state.search_open = false;
            Some(state.issue_fetch())
        }
        Action::LocateFinished(Err(err)) => {
            tracing::warn!("error fetching location: {err}");
            state.alert = Some(err.user_message().to_string());
            None
        }
        Action::DismissAlert => {
            state.alert = None;
            None
        }
    }
}

/// Execute one effect against the network.
pub async fn run_effect(
    effect: Effect,
    weather: &dyn WeatherSource,
    positions: &dyn PositionSource,
) -> Action {
    match effect {
        Effect::Fetch { token, query, units } => {
            let result = provider::fetch_bundle(weather, &query, units).await;
            Action::FetchFinished { token, result }
        }
        Effect::Locate => Action::LocateFinished(locate::resolve_city(positions, weather).await),
    }
}

/// Apply `action` and run every effect that follows from it to completion.
pub async fn dispatch(
    state: &mut AppState,
    action: Action,
    weather: &dyn WeatherSource,
    positions: &dyn PositionSource,
) {
    let mut next = update(state, action);
    while let Some(effect) = next {
        let action = run_effect(effect, weather, positions).await;
        next = update(state, action);
    }
}
