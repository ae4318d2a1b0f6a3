use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::stations::Station;

const PLAYLIST_HEADER: &str = "#EXTM3U";

/// Renders stations back into the extended playlist format. Inverse of the
/// parser for well-formed input: re-scanning the output reproduces the same
/// (name, url, genres) tuples.
pub fn render_playlist(stations: &[&Station]) -> String {
    let mut lines = Vec::with_capacity(stations.len() * 2 + 1);
    lines.push(PLAYLIST_HEADER.to_string());
    for station in stations {
        lines.push(format!(
            "#EXTINF:-1 tvg-logo=\"{}\" group-title=\"{}\",{}",
            station.logo,
            station.genres.join(";"),
            station.name
        ));
        lines.push(station.stream_url().to_string());
    }
    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

pub fn write_unified_playlist(stations: &[Station], path: &Path) -> Result<()> {
    let all: Vec<&Station> = stations.iter().collect();
    fs::write(path, render_playlist(&all))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// One playlist per country code, stations kept in overall relative order.
/// Returns the number of playlists written.
pub fn write_country_playlists(stations: &[Station], dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut by_country: BTreeMap<String, Vec<&Station>> = BTreeMap::new();
    for station in stations {
        by_country
            .entry(station.country_code.to_lowercase())
            .or_default()
            .push(station);
    }

    for (code, group) in &by_country {
        let path = dir.join(format!("{code}.m3u"));
        fs::write(&path, render_playlist(group))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(by_country.len())
}

#[cfg(test)]
mod tests {
    use super::{render_playlist, write_country_playlists};
    use crate::playlist::parser::{EntryScanner, FileContext};
    use crate::stations::{Station, StationStream};

    fn station(name: &str, country_code: &str, url: &str, genres: &[&str]) -> Station {
        Station {
            id: format!("{}-{}", country_code.to_lowercase(), name.to_lowercase()),
            name: name.to_string(),
            country: country_code.to_string(),
            language: vec![],
            genres: genres.iter().map(|genre| genre.to_string()).collect(),
            website: String::new(),
            streams: vec![StationStream {
                url: url.to_string(),
                format: "MP3".into(),
                bitrate: 128,
                reliability: 0.5,
            }],
            tags: vec![],
            last_checked: "2026-01-01T00:00:00Z".into(),
            logo: "https://cdn.example.com/logo.png".into(),
            source: "streams/xx/stations.m3u".into(),
            country_code: country_code.to_string(),
        }
    }

    #[test]
    fn emitted_playlists_parse_back_to_the_same_tuples() {
        let stations = vec![
            station("Radio Nova", "FR", "https://nova.example.com/a.mp3", &["Jazz", "Funk"]),
            station("Deep House One", "DE", "https://dh.example.com/b.aac", &["House"]),
        ];
        let refs: Vec<&Station> = stations.iter().collect();
        let rendered = render_playlist(&refs);

        let lines: Vec<String> = rendered.lines().map(str::to_string).collect();
        let context = FileContext {
            country_code: "XX".into(),
            country: "XX".into(),
            languages: vec![],
            source_file: "roundtrip.m3u".into(),
        };
        let reparsed: Vec<_> = EntryScanner::new(lines.into_iter(), context).collect();

        assert_eq!(reparsed.len(), stations.len());
        for (entry, station) in reparsed.iter().zip(&stations) {
            assert_eq!(entry.name, station.name);
            assert_eq!(entry.url, station.stream_url());
            assert_eq!(entry.genres, station.genres);
        }
    }

    #[test]
    fn country_playlists_group_by_code_and_keep_order() {
        let stations = vec![
            station("A", "FR", "https://a.example.com/1", &["Pop"]),
            station("B", "DE", "https://b.example.com/2", &["Rock"]),
            station("C", "fr", "https://c.example.com/3", &["News"]),
        ];
        let dir = tempfile::tempdir().expect("tempdir");
        let written = write_country_playlists(&stations, dir.path()).expect("write");
        assert_eq!(written, 2);

        let fr = std::fs::read_to_string(dir.path().join("fr.m3u")).expect("fr playlist");
        assert!(fr.contains("https://a.example.com/1"));
        assert!(fr.contains("https://c.example.com/3"));
        let a_pos = fr.find("https://a.example.com/1").unwrap();
        let c_pos = fr.find("https://c.example.com/3").unwrap();
        assert!(a_pos < c_pos);
        assert!(!fr.contains("b.example.com"));
    }
}
