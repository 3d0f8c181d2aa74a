//! WMO weather interpretation codes
//!
//! See the "Weather variable documentation" section of
//! https://open-meteo.com/en/docs

/// Human-readable description of a WMO weather code
pub fn describe(code: u8) -> String {
    let text = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snowfall",
        73 => "Moderate snowfall",
        75 => "Heavy snowfall",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        other => return format!("Unknown ({other})"),
    };
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(describe(0), "Clear sky");
        assert_eq!(describe(63), "Moderate rain");
        assert_eq!(describe(99), "Thunderstorm with heavy hail");
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(describe(42), "Unknown (42)");
    }
}
