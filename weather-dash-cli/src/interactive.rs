use std::fmt;

use inquire::{InquireError, Select, Text};
use weather_dash_core::{
    Action, AppState, CityDirectory, CityEntry, Units, WeatherSource,
    app::{dispatch, update},
    locate::PositionSource,
    view,
};

#[derive(Debug, Clone, Copy)]
enum MenuItem {
    Search,
    Locate,
    Celsius,
    Fahrenheit,
    Toggle,
    Refresh,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 7] = [
        MenuItem::Search,
        MenuItem::Locate,
        MenuItem::Celsius,
        MenuItem::Fahrenheit,
        MenuItem::Toggle,
        MenuItem::Refresh,
        MenuItem::Quit,
    ];
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuItem::Search => "Search for places",
            MenuItem::Locate => "Use my location",
            MenuItem::Celsius => "°C",
            MenuItem::Fahrenheit => "°F",
            MenuItem::Toggle => "Toggle units",
            MenuItem::Refresh => "Refresh",
            MenuItem::Quit => "Quit",
        })
    }
}

enum SearchChoice {
    City(CityEntry),
    FreeText(String),
    Close,
}

impl fmt::Display for SearchChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchChoice::City(city) => write!(f, "{city}"),
            SearchChoice::FreeText(query) => write!(f, "Search \"{}\"", query.trim()),
            SearchChoice::Close => f.write_str("Close"),
        }
    }
}

/// `None` when the user cancelled the prompt.
fn cancelled<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn print_page(state: &mut AppState, cities: &CityDirectory) {
    println!();
    print!("{}", view::render(state, chrono::Local::now(), cities));
    // alerts are one-shot
    update(state, Action::DismissAlert);
}

pub async fn run(
    mut state: AppState,
    weather: &dyn WeatherSource,
    positions: &dyn PositionSource,
    cities: &CityDirectory,
) -> anyhow::Result<()> {
    dispatch(&mut state, Action::Refresh, weather, positions).await;

    loop {
        print_page(&mut state, cities);

        let Some(item) = cancelled(Select::new("What next?", MenuItem::ALL.to_vec()).prompt())?
        else {
            break;
        };

        let action = match item {
            MenuItem::Search => match search(&mut state, cities)? {
                Some(action) => action,
                None => Action::CloseSearch,
            },
            MenuItem::Locate => Action::Locate,
            MenuItem::Celsius => Action::SetUnits(Units::Metric),
            MenuItem::Fahrenheit => Action::SetUnits(Units::Imperial),
            MenuItem::Toggle => Action::ToggleUnits,
            MenuItem::Refresh => Action::Refresh,
            MenuItem::Quit => break,
        };

        dispatch(&mut state, action, weather, positions).await;
    }

    Ok(())
}

/// Walk the search panel; returns the action that closes it.
fn search(state: &mut AppState, cities: &CityDirectory) -> anyhow::Result<Option<Action>> {
    update(state, Action::OpenSearch);

    let Some(query) = cancelled(Text::new("Search location:").prompt())? else {
        return Ok(None);
    };
    update(state, Action::SetQuery(query.clone()));
    print_page(state, cities);

    let mut choices: Vec<SearchChoice> =
        cities.search(&query).into_iter().cloned().map(SearchChoice::City).collect();
    if !query.trim().is_empty() {
        choices.push(SearchChoice::FreeText(query));
    }
    choices.push(SearchChoice::Close);

    let Some(choice) = cancelled(Select::new("Pick a location", choices).prompt())? else {
        return Ok(None);
    };

    Ok(Some(match choice {
        SearchChoice::City(city) => Action::PickCity(city),
        SearchChoice::FreeText(_) => Action::SubmitQuery,
        SearchChoice::Close => Action::CloseSearch,
    }))
}
