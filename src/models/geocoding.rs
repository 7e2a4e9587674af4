//! Geocoding matches

use super::location::Coordinate;
use serde::Serialize;

/// Single location match
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GeocodingResult {
    /// Upstream location identifier
    pub id: Option<i64>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters
    pub elevation: Option<f64>,
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: Option<String>,
    /// Administrative divisions, outermost first (admin1..admin4)
    pub admin_regions: Vec<String>,
    /// IANA timezone, e.g. "Europe/London"
    pub timezone: Option<String>,
    pub population: Option<u64>,
    /// GeoNames feature code (PPLC = capital, PPL = populated place, ...)
    pub feature_code: Option<String>,
    pub postcodes: Vec<String>,
}

impl GeocodingResult {
    /// Coordinate ready to feed into the weather tools
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// "Name, Region, Country" style label
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(region) = self.admin_regions.first() {
            parts.push(region);
        }
        if let Some(country) = &self.country {
            parts.push(country);
        }
        parts.join(", ")
    }
}

/// Result of `geocode_location`; no match is an empty list, not an error
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct GeocodingResults {
    pub results: Vec<GeocodingResult>,
}

impl GeocodingResults {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Best-ranked match
    #[must_use]
    pub fn first(&self) -> Option<&GeocodingResult> {
        self.results.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let result = GeocodingResult {
            id: Some(2_643_743),
            name: "London".to_string(),
            latitude: 51.508_53,
            longitude: -0.125_74,
            elevation: Some(25.0),
            country: Some("United Kingdom".to_string()),
            country_code: Some("GB".to_string()),
            admin_regions: vec!["England".to_string(), "Greater London".to_string()],
            timezone: Some("Europe/London".to_string()),
            population: Some(7_556_900),
            feature_code: Some("PPLC".to_string()),
            postcodes: Vec::new(),
        };
        assert_eq!(result.display_name(), "London, England, United Kingdom");
        assert_eq!(result.coordinate().latitude, 51.508_53);
    }

    #[test]
    fn test_empty_results() {
        let results = GeocodingResults::default();
        assert!(results.is_empty());
        assert!(results.first().is_none());
    }
}
