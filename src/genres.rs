use std::collections::HashMap;

use serde::Serialize;

use crate::stations::Station;

const TOP_GENRE_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct GenreStats {
    pub total_unique_genres: usize,
    pub top_genres: Vec<GenreCount>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenreCount {
    pub name: String,
    pub count: usize,
}

struct Tally {
    count: usize,
    first_seen: usize,
}

/// Case-insensitive genre frequencies over the whole station set. Ties rank
/// by first appearance so equal counts keep a stable order.
pub fn analyze_genres(stations: &[Station]) -> GenreStats {
    let mut tallies: HashMap<String, Tally> = HashMap::new();
    for station in stations {
        for genre in &station.genres {
            let key = genre.to_lowercase();
            let first_seen = tallies.len();
            tallies
                .entry(key)
                .or_insert(Tally {
                    count: 0,
                    first_seen,
                })
                .count += 1;
        }
    }

    let total_unique_genres = tallies.len();
    let mut ranked: Vec<(String, Tally)> = tallies.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.count
            .cmp(&a.1.count)
            .then(a.1.first_seen.cmp(&b.1.first_seen))
    });

    let top_genres = ranked
        .into_iter()
        .take(TOP_GENRE_LIMIT)
        .map(|(name, tally)| GenreCount {
            name,
            count: tally.count,
        })
        .collect();

    GenreStats {
        total_unique_genres,
        top_genres,
    }
}

#[cfg(test)]
mod tests {
    use super::{analyze_genres, GenreCount};
    use crate::stations::Station;

    fn station(genres: &[&str]) -> Station {
        Station {
            id: "test".into(),
            name: "Test".into(),
            country: "Testland".into(),
            language: vec![],
            genres: genres.iter().map(|genre| genre.to_string()).collect(),
            website: String::new(),
            streams: vec![],
            tags: vec![],
            last_checked: String::new(),
            logo: String::new(),
            source: String::new(),
            country_code: "XX".into(),
        }
    }

    #[test]
    fn counting_is_case_insensitive() {
        let stations = vec![station(&["Jazz", "Pop"]), station(&["jazz"])];
        let stats = analyze_genres(&stations);
        assert_eq!(stats.total_unique_genres, 2);
        assert_eq!(
            stats.top_genres,
            vec![
                GenreCount {
                    name: "jazz".into(),
                    count: 2
                },
                GenreCount {
                    name: "pop".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn equal_counts_keep_first_seen_order() {
        let stations = vec![station(&["Ambient", "Techno", "Drone"])];
        let stats = analyze_genres(&stations);
        let names: Vec<&str> = stats
            .top_genres
            .iter()
            .map(|genre| genre.name.as_str())
            .collect();
        assert_eq!(names, vec!["ambient", "techno", "drone"]);
    }

    #[test]
    fn no_genres_means_empty_stats() {
        let stats = analyze_genres(&[station(&[])]);
        assert_eq!(stats.total_unique_genres, 0);
        assert!(stats.top_genres.is_empty());
    }
}
