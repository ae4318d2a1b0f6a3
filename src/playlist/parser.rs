use std::fs;
use std::io;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lookup::RegionLookup;
use crate::stations::StationEntry;
use crate::stream_format;

// One structured match per metadata line: logo, genre group, display name.
static EXTINF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"tvg-logo="([^"]*)".*group-title="([^"]*)",(.*)"#)
        .expect("EXTINF pattern compiles")
});

/// Per-file constants shared by every entry the file produces.
#[derive(Debug, Clone)]
pub struct FileContext {
    pub country_code: String,
    pub country: String,
    pub languages: Vec<String>,
    pub source_file: String,
}

struct PendingStation {
    name: String,
    logo: String,
    genres: Vec<String>,
}

enum ScanState {
    AwaitingMetadata,
    AwaitingUrl(PendingStation),
}

/// Two-state line scanner over one playlist file. Lazy: entries materialize
/// as the iterator is driven; rebuilding the scanner restarts the scan.
pub struct EntryScanner<I> {
    lines: I,
    context: FileContext,
    state: ScanState,
    orphaned: usize,
    legacy_separators: usize,
}

impl<I> EntryScanner<I>
where
    I: Iterator<Item = String>,
{
    pub fn new(lines: I, context: FileContext) -> Self {
        Self {
            lines,
            context,
            state: ScanState::AwaitingMetadata,
            orphaned: 0,
            legacy_separators: 0,
        }
    }

    /// EXTINF lines that never saw a URL. Populated once the scan finishes.
    pub fn orphaned(&self) -> usize {
        self.orphaned
    }

    /// Group titles that used the legacy `,` separator instead of `;`.
    pub fn legacy_separators(&self) -> usize {
        self.legacy_separators
    }

    fn parse_metadata_line(&mut self, line: &str) -> Option<PendingStation> {
        if !line.starts_with("#EXTINF:") {
            return None;
        }
        let caps = EXTINF_PATTERN.captures(line)?;
        let name = caps[3].trim().to_string();
        if name.is_empty() {
            return None;
        }
        let (genres, legacy) = split_genres(&caps[2]);
        if legacy {
            self.legacy_separators += 1;
        }
        Some(PendingStation {
            name,
            logo: caps[1].to_string(),
            genres,
        })
    }

    fn complete_entry(&self, pending: PendingStation, url: &str) -> StationEntry {
        let (format, bitrate) = stream_format::detect(url);
        StationEntry {
            name: pending.name,
            logo: pending.logo,
            genres: pending.genres,
            country_code: self.context.country_code.clone(),
            country: self.context.country.clone(),
            languages: self.context.languages.clone(),
            url: url.to_string(),
            format: format.label().to_string(),
            bitrate,
            source_file: self.context.source_file.clone(),
        }
    }
}

impl<I> Iterator for EntryScanner<I>
where
    I: Iterator<Item = String>,
{
    type Item = StationEntry;

    fn next(&mut self) -> Option<StationEntry> {
        loop {
            let Some(raw) = self.lines.next() else {
                if matches!(self.state, ScanState::AwaitingUrl(_)) {
                    self.orphaned += 1;
                    self.state = ScanState::AwaitingMetadata;
                }
                return None;
            };
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") || line.starts_with("#EXTM3U") {
                continue;
            }

            // A fresh metadata line always starts a new pending entry; the
            // one it displaces never had a URL and counts as orphaned.
            if let Some(pending) = self.parse_metadata_line(line) {
                if matches!(self.state, ScanState::AwaitingUrl(_)) {
                    self.orphaned += 1;
                }
                self.state = ScanState::AwaitingUrl(pending);
                continue;
            }

            if matches!(self.state, ScanState::AwaitingUrl(_))
                && (line.starts_with("http://") || line.starts_with("https://"))
            {
                let ScanState::AwaitingUrl(pending) =
                    std::mem::replace(&mut self.state, ScanState::AwaitingMetadata)
                else {
                    unreachable!()
                };
                return Some(self.complete_entry(pending, line));
            }
            // Anything else between a metadata line and its URL is ignored.
        }
    }
}

fn split_genres(group_title: &str) -> (Vec<String>, bool) {
    let legacy = !group_title.contains(';') && group_title.contains(',');
    let separator = if legacy { ',' } else { ';' };
    let genres = group_title
        .split(separator)
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .map(str::to_string)
        .collect();
    (genres, legacy)
}

/// Opens one playlist file for scanning. The parent directory name is the
/// country code; bytes decode leniently so a stray invalid sequence never
/// fails the whole file.
pub fn read_playlist(
    path: &Path,
    source_file: String,
    lookup: &RegionLookup,
) -> io::Result<EntryScanner<std::vec::IntoIter<String>>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);

    let country_code = path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let context = FileContext {
        country: lookup.country_name(&country_code),
        languages: lookup.languages(&country_code),
        country_code: country_code.to_ascii_uppercase(),
        source_file,
    };

    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    Ok(EntryScanner::new(lines.into_iter(), context))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{read_playlist, EntryScanner, FileContext};
    use crate::lookup::{RegionInfo, RegionLookup};

    fn scan(input: &str) -> EntryScanner<std::vec::IntoIter<String>> {
        let lines: Vec<String> = input.lines().map(str::to_string).collect();
        EntryScanner::new(lines.into_iter(), test_context())
    }

    fn test_context() -> FileContext {
        FileContext {
            country_code: "FR".into(),
            country: "France".into(),
            languages: vec!["French".into()],
            source_file: "streams/fr/stations.m3u".into(),
        }
    }

    #[test]
    fn well_formed_pairs_yield_one_entry_each() {
        let mut scanner = scan(concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 tvg-logo=\"https://cdn.example.com/nova.png\" group-title=\"Jazz;Funk\",Radio Nova\n",
            "https://nova.example.com/stream.mp3\n",
        ));
        let entry = scanner.next().expect("one entry");
        assert_eq!(entry.name, "Radio Nova");
        assert_eq!(entry.url, "https://nova.example.com/stream.mp3");
        assert_eq!(entry.genres, vec!["Jazz".to_string(), "Funk".to_string()]);
        assert_eq!(entry.logo, "https://cdn.example.com/nova.png");
        assert_eq!(entry.country_code, "FR");
        assert_eq!(entry.country, "France");
        assert_eq!(entry.format, "MP3");
        assert_eq!(entry.bitrate, 128);
        assert!(scanner.next().is_none());
        assert_eq!(scanner.orphaned(), 0);
    }

    #[test]
    fn metadata_without_url_produces_no_entry() {
        let mut scanner = scan(concat!(
            "#EXTINF:-1 tvg-logo=\"\" group-title=\"Pop\",First\n",
            "https://one.example.com/a.mp3\n",
            "#EXTINF:-1 tvg-logo=\"\" group-title=\"Rock\",Orphan\n",
            "#EXTINF:-1 tvg-logo=\"\" group-title=\"News\",Second\n",
            "https://two.example.com/b.aac\n",
        ));
        let names: Vec<String> = scanner.by_ref().map(|entry| entry.name).collect();
        assert_eq!(names, vec!["First".to_string(), "Second".to_string()]);
        assert_eq!(scanner.orphaned(), 1);
    }

    #[test]
    fn trailing_orphan_is_counted_at_end_of_file() {
        let mut scanner = scan(concat!(
            "#EXTINF:-1 tvg-logo=\"\" group-title=\"Pop\",Dangling\n",
        ));
        assert!(scanner.next().is_none());
        assert_eq!(scanner.orphaned(), 1);
    }

    #[test]
    fn junk_between_metadata_and_url_is_ignored() {
        let mut scanner = scan(concat!(
            "#EXTINF:-1 tvg-logo=\"\" group-title=\"Pop\",Kept\n",
            "// stray comment\n",
            "#EXTVLCOPT:network-caching=1000\n",
            "\n",
            "https://kept.example.com/live\n",
        ));
        let entry = scanner.next().expect("entry survives junk lines");
        assert_eq!(entry.name, "Kept");
        assert_eq!(scanner.orphaned(), 0);
    }

    #[test]
    fn malformed_metadata_is_dropped_silently() {
        let mut scanner = scan(concat!(
            "#EXTINF:-1,No attributes at all\n",
            "https://ignored.example.com/a.mp3\n",
            "#EXTINF:-1 tvg-logo=\"\" group-title=\"Pop\",Good\n",
            "https://good.example.com/b.mp3\n",
        ));
        let names: Vec<String> = scanner.map(|entry| entry.name).collect();
        assert_eq!(names, vec!["Good".to_string()]);
    }

    #[test]
    fn legacy_comma_separator_is_accepted_and_flagged() {
        let mut scanner = scan(concat!(
            "#EXTINF:-1 tvg-logo=\"\" group-title=\"Jazz,Pop\",Legacy\n",
            "https://legacy.example.com/a.mp3\n",
        ));
        let entry = scanner.next().expect("legacy entry parses");
        assert_eq!(entry.genres, vec!["Jazz".to_string(), "Pop".to_string()]);
        assert_eq!(scanner.legacy_separators(), 1);
    }

    #[test]
    fn empty_genre_tokens_are_dropped() {
        let mut scanner = scan(concat!(
            "#EXTINF:-1 tvg-logo=\"\" group-title=\"\",Bare\n",
            "https://bare.example.com/a.mp3\n",
        ));
        let entry = scanner.next().expect("entry with empty group title");
        assert!(entry.genres.is_empty());
    }

    #[test]
    fn invalid_utf8_bytes_do_not_fail_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let country_dir = dir.path().join("fr");
        std::fs::create_dir(&country_dir).expect("country dir");
        let path = country_dir.join("stations.m3u");
        let mut file = std::fs::File::create(&path).expect("file");
        file.write_all(b"#EXTM3U\n#EXTINF:-1 tvg-logo=\"\" group-title=\"Pop\",Caf\xe9\n")
            .expect("write");
        file.write_all(b"https://cafe.example.com/a.mp3\n").expect("write");
        drop(file);

        let lookup = RegionLookup::from_entries([(
            "FR".to_string(),
            RegionInfo {
                name: "France".into(),
                languages: vec!["French".into()],
            },
        )]);
        let entries: Vec<_> =
            read_playlist(&path, "streams/fr/stations.m3u".into(), &lookup)
                .expect("readable")
                .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Caf\u{fffd}");
        assert_eq!(entries[0].country, "France");
    }

    #[test]
    fn rebuilding_the_scanner_restarts_the_scan() {
        let input = concat!(
            "#EXTINF:-1 tvg-logo=\"\" group-title=\"Pop\",Again\n",
            "https://again.example.com/a.mp3\n",
        );
        let first: Vec<_> = scan(input).collect();
        let second: Vec<_> = scan(input).collect();
        assert_eq!(first, second);
    }
}
