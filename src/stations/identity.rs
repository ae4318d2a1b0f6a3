use sha2::{Digest, Sha256};

/// Stable station identifier: a country/name slug plus a short content hash
/// of the stream URL. The hash only disambiguates stations that share a name
/// within a country; it carries no security weight.
pub fn station_id(country_code: &str, name: &str, url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    format!("{}-{}", station_slug(country_code, name), &digest[..8])
}

pub fn station_slug(country_code: &str, name: &str) -> String {
    let base = format!("{}-{}", country_code.to_lowercase(), name.to_lowercase());
    let mut slug = String::with_capacity(base.len());
    let mut pending_dash = false;
    for ch in base.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::{station_id, station_slug};

    #[test]
    fn ids_are_stable_across_calls() {
        let a = station_id("FR", "Radio Nova", "https://nova.example.com/stream.mp3");
        let b = station_id("FR", "Radio Nova", "https://nova.example.com/stream.mp3");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_urls_get_distinct_suffixes() {
        let a = station_id("FR", "Radio Nova", "https://nova.example.com/a.mp3");
        let b = station_id("FR", "Radio Nova", "https://nova.example.com/b.mp3");
        assert_ne!(a, b);
        assert!(a.starts_with("fr-radio-nova-"));
        assert!(b.starts_with("fr-radio-nova-"));
    }

    #[test]
    fn slugs_collapse_and_trim_punctuation() {
        assert_eq!(station_slug("US", " Jazz!!  FM "), "us-jazz-fm");
        assert_eq!(station_slug("de", "100% Schlager"), "de-100-schlager");
        assert_eq!(station_slug("FR", "Café Radio"), "fr-caf-radio");
    }

    #[test]
    fn id_suffix_is_eight_hex_chars() {
        let id = station_id("SE", "P3", "https://sr.example.com/p3");
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
