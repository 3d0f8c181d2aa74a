//! Supported cities and their coordinates

/// A city the weather tools know about
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    /// English name
    pub name: &'static str,
    /// Japanese name
    pub local_name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    /// `Tokyo (東京)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.local_name)
    }
}

/// Supported cities, in listing order
pub const CITIES: &[City] = &[
    City {
        name: "Tokyo",
        local_name: "東京",
        latitude: 35.6762,
        longitude: 139.6503,
    },
    City {
        name: "Osaka",
        local_name: "大阪",
        latitude: 34.6937,
        longitude: 135.5023,
    },
    City {
        name: "Nagoya",
        local_name: "名古屋",
        latitude: 35.1815,
        longitude: 136.9066,
    },
    City {
        name: "Sapporo",
        local_name: "札幌",
        latitude: 43.0618,
        longitude: 141.3545,
    },
    City {
        name: "Fukuoka",
        local_name: "福岡",
        latitude: 33.5904,
        longitude: 130.4017,
    },
    City {
        name: "Kyoto",
        local_name: "京都",
        latitude: 35.0116,
        longitude: 135.7681,
    },
    City {
        name: "Yokohama",
        local_name: "横浜",
        latitude: 35.4437,
        longitude: 139.6380,
    },
    City {
        name: "Kobe",
        local_name: "神戸",
        latitude: 34.6901,
        longitude: 135.1956,
    },
];

/// Look a city up by English name (any case) or Japanese name
pub fn find_city(query: &str) -> Option<&'static City> {
    let query = query.trim();
    CITIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(query) || c.local_name == query)
}

/// Labels of every supported city, in table order
pub fn city_labels() -> Vec<String> {
    CITIES.iter().map(City::label).collect()
}
