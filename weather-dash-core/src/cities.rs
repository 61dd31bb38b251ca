//! Static city list behind the search panel.

use crate::model::CityEntry;

/// Maximum number of matches shown in the search panel.
pub const SEARCH_LIMIT: usize = 10;

const BUNDLED_CITIES: &str = include_str!("../data/cities.json");

#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    cities: Vec<CityEntry>,
}

impl CityDirectory {
    pub fn new(cities: Vec<CityEntry>) -> Self {
        Self { cities }
    }

    /// The list shipped with the binary.
    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(BUNDLED_CITIES)
    }

    /// Parse a JSON array of `{ "name": ..., "country": ... }` records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let cities: Vec<CityEntry> = serde_json::from_str(json)?;
        Ok(Self { cities })
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Case-insensitive substring match on the city name, in list order,
    /// capped at [`SEARCH_LIMIT`]. The country is not searched.
    pub fn search(&self, query: &str) -> Vec<&CityEntry> {
        let needle = query.to_lowercase();

        self.cities
            .iter()
            .filter(|city| city.name.to_lowercase().contains(&needle))
            .take(SEARCH_LIMIT)
            .collect()
    }
}
