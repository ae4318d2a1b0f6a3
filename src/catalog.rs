use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::logging::logger;
use crate::lookup::RegionLookup;
use crate::playlist::read_playlist;
use crate::stations::{station_id, Catalog, Station, StationEntry, StationStream, CATALOG_VERSION};

const RELIABILITY_OK: f64 = 0.95;
const RELIABILITY_FAILED: f64 = 0.3;
const RELIABILITY_UNKNOWN: f64 = 0.5;
const MAX_TAGS: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct CountryFile {
    pub code: String,
    pub file: String,
    pub count: usize,
}

/// Everything one pass over the playlist tree produces.
#[derive(Default)]
pub struct PlaylistHarvest {
    pub entries: Vec<StationEntry>,
    pub country_counts: HashMap<String, usize>,
    pub country_files: Vec<CountryFile>,
}

/// Scans every `.m3u` file under the streams tree, lexicographic file order
/// for reproducible catalogs. Unreadable files are skipped with a warning.
pub fn harvest_playlists(streams_dir: &Path, lookup: &RegionLookup) -> PlaylistHarvest {
    let mut files = Vec::new();
    collect_m3u_files(streams_dir, &mut files);
    files.sort();

    let base = streams_dir.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut harvest = PlaylistHarvest::default();

    for path in files {
        let source_file = path
            .strip_prefix(&base)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");

        let mut scanner = match read_playlist(&path, source_file.clone(), lookup) {
            Ok(scanner) => scanner,
            Err(err) => {
                logger().warn(
                    "playlist.unreadable",
                    json!({ "file": source_file, "error": err.to_string() }),
                );
                continue;
            }
        };

        let entries: Vec<StationEntry> = scanner.by_ref().collect();
        if scanner.legacy_separators() > 0 {
            logger().warn(
                "playlist.legacy_genre_separator",
                json!({ "file": source_file, "lines": scanner.legacy_separators() }),
            );
        }
        if scanner.orphaned() > 0 {
            logger().debug(
                "playlist.orphaned_metadata",
                json!({ "file": source_file, "count": scanner.orphaned() }),
            );
        }

        let code = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_ascii_uppercase())
            .unwrap_or_default();
        let count = entries.len();
        *harvest.country_counts.entry(code.clone()).or_default() += count;
        harvest.country_files.push(CountryFile {
            code,
            file: source_file.clone(),
            count,
        });
        harvest.entries.extend(entries);

        logger().info(
            "playlist.processed",
            json!({ "file": source_file, "stations": count }),
        );
    }

    harvest
}

fn collect_m3u_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            logger().warn(
                "streams.dir_unreadable",
                json!({ "dir": dir.display().to_string(), "error": err.to_string() }),
            );
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_m3u_files(&path, files);
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("m3u"))
        {
            files.push(path);
        }
    }
}

/// Pure aggregation step: entries plus the previous run's validation map in,
/// full catalog out. Station order follows entry order.
pub fn build_catalog(
    entries: &[StationEntry],
    validation: &HashMap<String, String>,
    updated: &str,
) -> Catalog {
    let stations = entries
        .iter()
        .map(|entry| {
            let reliability = match validation.get(&entry.url).map(String::as_str) {
                Some("ok") => RELIABILITY_OK,
                Some(_) => RELIABILITY_FAILED,
                None => RELIABILITY_UNKNOWN,
            };
            Station {
                id: station_id(&entry.country_code, &entry.name, &entry.url),
                name: entry.name.clone(),
                country: entry.country.clone(),
                language: entry.languages.clone(),
                genres: entry.genres.clone(),
                website: website_from_logo(&entry.logo),
                streams: vec![StationStream {
                    url: entry.url.clone(),
                    format: entry.format.clone(),
                    bitrate: entry.bitrate,
                    reliability,
                }],
                tags: entry.genres.iter().take(MAX_TAGS).cloned().collect(),
                last_checked: updated.to_string(),
                logo: entry.logo.clone(),
                source: entry.source_file.clone(),
                country_code: entry.country_code.clone(),
            }
        })
        .collect();

    Catalog {
        version: CATALOG_VERSION.to_string(),
        updated: updated.to_string(),
        stations,
    }
}

/// The station homepage is guessed from the logo host when nothing better is
/// known: scheme plus authority, or empty when the logo is not an http URL.
fn website_from_logo(logo: &str) -> String {
    if !logo.starts_with("http") {
        return String::new();
    }
    let Ok(parsed) = Url::parse(logo) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    }
}

#[derive(Debug, Default, Deserialize)]
struct PriorValidation {
    #[serde(default)]
    stations: HashMap<String, String>,
}

/// The previous run's per-url status map. Missing file means a first run;
/// an unparseable file is treated the same way, with a warning.
pub fn load_validation_stations(path: &Path) -> HashMap<String, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return HashMap::new(),
    };
    match serde_json::from_str::<PriorValidation>(&raw) {
        Ok(prior) => prior.stations,
        Err(err) => {
            logger().warn(
                "validation.results_unreadable",
                json!({ "file": path.display().to_string(), "error": err.to_string() }),
            );
            HashMap::new()
        }
    }
}
