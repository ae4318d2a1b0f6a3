use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::catalog::{build_catalog, harvest_playlists, load_validation_stations, CountryFile};
use crate::config::Config;
use crate::genres::{analyze_genres, GenreStats};
use crate::logging::logger;
use crate::lookup::RegionLookup;
use crate::playlist::{write_country_playlists, write_unified_playlist};

#[derive(Debug, Serialize)]
struct CountryCount {
    code: String,
    count: usize,
}

#[derive(Serialize)]
struct Summary {
    total_stations: usize,
    total_countries: usize,
    countries: Vec<CountryCount>,
    country_files: Vec<CountryFile>,
    genre_stats: GenreStats,
    updated: String,
}

/// The `generate` batch command: parse every playlist, aggregate the catalog,
/// regenerate playlists, and write genre and summary statistics.
pub fn run(config: &Config) -> Result<()> {
    let lookup = RegionLookup::builtin();
    let validation = load_validation_stations(&config.validation_results_file);
    logger().info(
        "generate.started",
        json!({
            "streamsDir": config.streams_dir.display().to_string(),
            "knownValidations": validation.len(),
        }),
    );

    let harvest = harvest_playlists(&config.streams_dir, &lookup);
    let updated = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let catalog = build_catalog(&harvest.entries, &validation, &updated);

    fs::create_dir_all(config.metadata_dir()).context("failed to create metadata directory")?;
    write_json(&config.catalog_file(), &catalog)?;
    logger().info(
        "catalog.written",
        json!({ "stations": catalog.stations.len() }),
    );

    write_unified_playlist(&catalog.stations, &config.unified_playlist_file())?;
    let country_playlists =
        write_country_playlists(&catalog.stations, &config.by_country_dir())?;
    logger().info(
        "playlists.written",
        json!({ "countries": country_playlists }),
    );

    let genre_stats = analyze_genres(&catalog.stations);
    let summary = build_summary(
        &harvest.country_counts,
        harvest.country_files,
        genre_stats,
        catalog.stations.len(),
        updated,
    );
    write_json(&config.summary_file(), &summary)?;

    logger().info(
        "generate.completed",
        json!({
            "totalStations": summary.total_stations,
            "totalCountries": summary.total_countries,
            "uniqueGenres": summary.genre_stats.total_unique_genres,
        }),
    );
    Ok(())
}

fn build_summary(
    country_counts: &HashMap<String, usize>,
    country_files: Vec<CountryFile>,
    genre_stats: GenreStats,
    total_stations: usize,
    updated: String,
) -> Summary {
    let mut countries: Vec<CountryCount> = country_counts
        .iter()
        .map(|(code, count)| CountryCount {
            code: code.clone(),
            count: *count,
        })
        .collect();
    countries.sort_by(|a, b| b.count.cmp(&a.count).then(a.code.cmp(&b.code)));

    Summary {
        total_stations,
        total_countries: country_counts.len(),
        countries,
        country_files,
        genre_stats,
        updated,
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to encode {}", path.display()))?;
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
}
