//! WMO 4677 present-weather code interpretation
//!
//! A static table indexed directly by code. The codes the forecast service emits
//! use its published wording; the rest keep the WMO present-weather text so every
//! code in 0..=99 resolves.

use crate::error::MeteoError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad condition category of a weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Clear,
    Cloud,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloud => "cloud",
            Self::Fog => "fog",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Thunderstorm => "thunderstorm",
        }
    }

    /// Whether the category implies falling precipitation
    #[must_use]
    pub fn is_precipitation(self) -> bool {
        matches!(
            self,
            Self::Drizzle | Self::Rain | Self::Snow | Self::Thunderstorm
        )
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherCodeEntry {
    pub code: u8,
    pub description: &'static str,
    pub severity: Severity,
}

const fn entry(code: u8, description: &'static str, severity: Severity) -> WeatherCodeEntry {
    WeatherCodeEntry {
        code,
        description,
        severity,
    }
}

use Severity::{Clear, Cloud, Drizzle, Fog, Rain, Snow, Thunderstorm};

static TABLE: [WeatherCodeEntry; 100] = [
    entry(0, "Clear sky", Clear),
    entry(1, "Mainly clear", Clear),
    entry(2, "Partly cloudy", Cloud),
    entry(3, "Overcast", Cloud),
    entry(4, "Visibility reduced by smoke", Fog),
    entry(5, "Haze", Fog),
    entry(6, "Widespread dust in suspension", Fog),
    entry(7, "Dust or sand raised by wind", Fog),
    entry(8, "Well developed dust or sand whirls", Fog),
    entry(9, "Duststorm or sandstorm within sight", Fog),
    entry(10, "Mist", Fog),
    entry(11, "Patches of shallow fog", Fog),
    entry(12, "Continuous shallow fog", Fog),
    entry(13, "Lightning visible, no thunder heard", Thunderstorm),
    entry(14, "Precipitation within sight, not reaching the ground", Rain),
    entry(15, "Distant precipitation reaching the ground", Rain),
    entry(16, "Nearby precipitation reaching the ground", Rain),
    entry(17, "Thunderstorm without precipitation", Thunderstorm),
    entry(18, "Squalls", Thunderstorm),
    entry(19, "Funnel cloud", Thunderstorm),
    entry(20, "Drizzle or snow grains in the past hour", Drizzle),
    entry(21, "Rain in the past hour", Rain),
    entry(22, "Snow in the past hour", Snow),
    entry(23, "Rain and snow or ice pellets in the past hour", Snow),
    entry(24, "Freezing drizzle or freezing rain in the past hour", Rain),
    entry(25, "Rain showers in the past hour", Rain),
    entry(26, "Snow showers in the past hour", Snow),
    entry(27, "Hail showers in the past hour", Rain),
    entry(28, "Fog in the past hour", Fog),
    entry(29, "Thunderstorm in the past hour", Thunderstorm),
    entry(30, "Slight or moderate duststorm, decreasing", Fog),
    entry(31, "Slight or moderate duststorm", Fog),
    entry(32, "Slight or moderate duststorm, increasing", Fog),
    entry(33, "Severe duststorm, decreasing", Fog),
    entry(34, "Severe duststorm", Fog),
    entry(35, "Severe duststorm, increasing", Fog),
    entry(36, "Slight or moderate drifting snow", Snow),
    entry(37, "Heavy drifting snow", Snow),
    entry(38, "Slight or moderate blowing snow", Snow),
    entry(39, "Heavy blowing snow", Snow),
    entry(40, "Fog at a distance", Fog),
    entry(41, "Fog in patches", Fog),
    entry(42, "Fog thinning, sky visible", Fog),
    entry(43, "Fog thinning, sky obscured", Fog),
    entry(44, "Fog, sky visible", Fog),
    entry(45, "Fog", Fog),
    entry(46, "Fog thickening, sky visible", Fog),
    entry(47, "Fog thickening, sky obscured", Fog),
    entry(48, "Depositing rime fog", Fog),
    entry(49, "Depositing rime fog, sky obscured", Fog),
    entry(50, "Intermittent light drizzle", Drizzle),
    entry(51, "Light drizzle", Drizzle),
    entry(52, "Intermittent moderate drizzle", Drizzle),
    entry(53, "Moderate drizzle", Drizzle),
    entry(54, "Intermittent dense drizzle", Drizzle),
    entry(55, "Dense drizzle", Drizzle),
    entry(56, "Light freezing drizzle", Drizzle),
    entry(57, "Dense freezing drizzle", Drizzle),
    entry(58, "Light drizzle and rain", Drizzle),
    entry(59, "Moderate or heavy drizzle and rain", Drizzle),
    entry(60, "Intermittent slight rain", Rain),
    entry(61, "Slight rain", Rain),
    entry(62, "Intermittent moderate rain", Rain),
    entry(63, "Moderate rain", Rain),
    entry(64, "Intermittent heavy rain", Rain),
    entry(65, "Heavy rain", Rain),
    entry(66, "Light freezing rain", Rain),
    entry(67, "Heavy freezing rain", Rain),
    entry(68, "Slight rain and snow", Snow),
    entry(69, "Moderate or heavy rain and snow", Snow),
    entry(70, "Intermittent slight snow fall", Snow),
    entry(71, "Slight snow fall", Snow),
    entry(72, "Intermittent moderate snow fall", Snow),
    entry(73, "Moderate snow fall", Snow),
    entry(74, "Intermittent heavy snow fall", Snow),
    entry(75, "Heavy snow fall", Snow),
    entry(76, "Diamond dust", Snow),
    entry(77, "Snow grains", Snow),
    entry(78, "Isolated star-like snow crystals", Snow),
    entry(79, "Ice pellets", Snow),
    entry(80, "Slight rain showers", Rain),
    entry(81, "Moderate rain showers", Rain),
    entry(82, "Violent rain showers", Rain),
    entry(83, "Slight showers of rain and snow", Snow),
    entry(84, "Moderate or heavy showers of rain and snow", Snow),
    entry(85, "Slight snow showers", Snow),
    entry(86, "Heavy snow showers", Snow),
    entry(87, "Slight showers of snow pellets or small hail", Snow),
    entry(88, "Moderate or heavy showers of snow pellets or small hail", Snow),
    entry(89, "Slight showers of hail", Rain),
    entry(90, "Moderate or heavy showers of hail", Rain),
    entry(91, "Slight rain after a thunderstorm", Thunderstorm),
    entry(92, "Moderate or heavy rain after a thunderstorm", Thunderstorm),
    entry(93, "Slight snow or hail after a thunderstorm", Thunderstorm),
    entry(94, "Moderate or heavy snow or hail after a thunderstorm", Thunderstorm),
    entry(95, "Thunderstorm", Thunderstorm),
    entry(96, "Thunderstorm with slight hail", Thunderstorm),
    entry(97, "Heavy thunderstorm", Thunderstorm),
    entry(98, "Thunderstorm with duststorm or sandstorm", Thunderstorm),
    entry(99, "Thunderstorm with heavy hail", Thunderstorm),
];

/// Look up a weather code
pub fn interpret(code: i64) -> Result<&'static WeatherCodeEntry> {
    usize::try_from(code)
        .ok()
        .and_then(|index| TABLE.get(index))
        .ok_or(MeteoError::InvalidCode { code })
}

/// Every entry in code order
#[must_use]
pub fn table() -> &'static [WeatherCodeEntry] {
    &TABLE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_every_code_has_exactly_one_entry() {
        assert_eq!(table().len(), 100);
        for code in 0..=99_i64 {
            let entry = interpret(code).unwrap();
            assert_eq!(i64::from(entry.code), code);
            assert!(!entry.description.is_empty(), "code {code} has no description");
        }
    }

    #[rstest]
    #[case(0, "Clear sky", Severity::Clear)]
    #[case(3, "Overcast", Severity::Cloud)]
    #[case(45, "Fog", Severity::Fog)]
    #[case(48, "Depositing rime fog", Severity::Fog)]
    #[case(53, "Moderate drizzle", Severity::Drizzle)]
    #[case(61, "Slight rain", Severity::Rain)]
    #[case(75, "Heavy snow fall", Severity::Snow)]
    #[case(82, "Violent rain showers", Severity::Rain)]
    #[case(86, "Heavy snow showers", Severity::Snow)]
    #[case(95, "Thunderstorm", Severity::Thunderstorm)]
    #[case(99, "Thunderstorm with heavy hail", Severity::Thunderstorm)]
    fn test_emitted_codes(
        #[case] code: i64,
        #[case] description: &str,
        #[case] severity: Severity,
    ) {
        let entry = interpret(code).unwrap();
        assert_eq!(entry.description, description);
        assert_eq!(entry.severity, severity);
    }

    #[rstest]
    #[case(-1)]
    #[case(100)]
    #[case(i64::MAX)]
    fn test_out_of_range_codes(#[case] code: i64) {
        assert_eq!(interpret(code), Err(MeteoError::InvalidCode { code }));
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_value(interpret(61).unwrap()).unwrap();
        assert_eq!(json["severity"], "rain");
        assert_eq!(json["code"], 61);
        assert!(Severity::Snow.is_precipitation());
        assert!(!Severity::Fog.is_precipitation());
    }
}
