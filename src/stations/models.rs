use serde::{Deserialize, Serialize};

pub const CATALOG_VERSION: &str = "1.0";

/// One (EXTINF, URL) pair pulled out of a playlist file. Ephemeral: entries
/// live for a single generate run and are rebuilt from scratch every time.
#[derive(Debug, Clone, PartialEq)]
pub struct StationEntry {
    pub name: String,
    pub logo: String,
    pub genres: Vec<String>,
    pub country_code: String,
    pub country: String,
    pub languages: Vec<String>,
    pub url: String,
    pub format: String,
    pub bitrate: u32,
    pub source_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationStream {
    pub url: String,
    pub format: String,
    pub bitrate: u32,
    pub reliability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub country: String,
    pub language: Vec<String>,
    pub genres: Vec<String>,
    pub website: String,
    pub streams: Vec<StationStream>,
    pub tags: Vec<String>,
    #[serde(rename = "lastChecked")]
    pub last_checked: String,
    pub logo: String,
    pub source: String,
    // Needed for per-country playlist grouping; not part of the catalog schema.
    #[serde(skip)]
    pub country_code: String,
}

impl Station {
    pub fn stream_url(&self) -> &str {
        self.streams
            .first()
            .map(|stream| stream.url.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub version: String,
    pub updated: String,
    pub stations: Vec<Station>,
}
