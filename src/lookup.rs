use std::collections::HashMap;

/// Country metadata resolved from a two-letter code. Built once per run and
/// passed into the parser and aggregator so lookups stay scoped to that run.
pub struct RegionLookup {
    regions: HashMap<String, RegionInfo>,
}

#[derive(Debug, Clone)]
pub struct RegionInfo {
    pub name: String,
    pub languages: Vec<String>,
}

const REGION_TABLE: &[(&str, &str, &[&str])] = &[
    ("AR", "Argentina", &["Spanish"]),
    ("AT", "Austria", &["German"]),
    ("AU", "Australia", &["English"]),
    ("BE", "Belgium", &["Dutch", "French", "German"]),
    ("BG", "Bulgaria", &["Bulgarian"]),
    ("BR", "Brazil", &["Portuguese"]),
    ("CA", "Canada", &["English", "French"]),
    ("CH", "Switzerland", &["German", "French", "Italian"]),
    ("CL", "Chile", &["Spanish"]),
    ("CN", "China", &["Chinese"]),
    ("CO", "Colombia", &["Spanish"]),
    ("CZ", "Czechia", &["Czech"]),
    ("DE", "Germany", &["German"]),
    ("DK", "Denmark", &["Danish"]),
    ("EE", "Estonia", &["Estonian"]),
    ("EG", "Egypt", &["Arabic"]),
    ("ES", "Spain", &["Spanish"]),
    ("FI", "Finland", &["Finnish", "Swedish"]),
    ("FR", "France", &["French"]),
    ("GB", "United Kingdom", &["English"]),
    ("GR", "Greece", &["Greek"]),
    ("HR", "Croatia", &["Croatian"]),
    ("HU", "Hungary", &["Hungarian"]),
    ("ID", "Indonesia", &["Indonesian"]),
    ("IE", "Ireland", &["English", "Irish"]),
    ("IL", "Israel", &["Hebrew"]),
    ("IN", "India", &["Hindi", "English"]),
    ("IS", "Iceland", &["Icelandic"]),
    ("IT", "Italy", &["Italian"]),
    ("JP", "Japan", &["Japanese"]),
    ("KR", "South Korea", &["Korean"]),
    ("LT", "Lithuania", &["Lithuanian"]),
    ("LU", "Luxembourg", &["Luxembourgish", "French", "German"]),
    ("LV", "Latvia", &["Latvian"]),
    ("MA", "Morocco", &["Arabic"]),
    ("MX", "Mexico", &["Spanish"]),
    ("NL", "Netherlands", &["Dutch"]),
    ("NO", "Norway", &["Norwegian"]),
    ("NZ", "New Zealand", &["English"]),
    ("PE", "Peru", &["Spanish"]),
    ("PH", "Philippines", &["Filipino", "English"]),
    ("PL", "Poland", &["Polish"]),
    ("PT", "Portugal", &["Portuguese"]),
    ("RO", "Romania", &["Romanian"]),
    ("RS", "Serbia", &["Serbian"]),
    ("RU", "Russia", &["Russian"]),
    ("SE", "Sweden", &["Swedish"]),
    ("SI", "Slovenia", &["Slovenian"]),
    ("SK", "Slovakia", &["Slovak"]),
    ("TH", "Thailand", &["Thai"]),
    ("TR", "Turkey", &["Turkish"]),
    ("TW", "Taiwan", &["Chinese"]),
    ("UA", "Ukraine", &["Ukrainian"]),
    ("US", "United States", &["English"]),
    ("UY", "Uruguay", &["Spanish"]),
    ("VN", "Vietnam", &["Vietnamese"]),
    ("ZA", "South Africa", &["Afrikaans", "English", "Zulu"]),
];

impl RegionLookup {
    pub fn builtin() -> Self {
        Self::from_entries(REGION_TABLE.iter().map(|(code, name, languages)| {
            (
                code.to_string(),
                RegionInfo {
                    name: name.to_string(),
                    languages: languages.iter().map(|value| value.to_string()).collect(),
                },
            )
        }))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, RegionInfo)>) -> Self {
        let regions = entries
            .into_iter()
            .map(|(code, info)| (code.to_ascii_uppercase(), info))
            .collect();
        Self { regions }
    }

    /// Unknown codes resolve to the uppercased code itself.
    pub fn country_name(&self, code: &str) -> String {
        let code = code.to_ascii_uppercase();
        match self.regions.get(&code) {
            Some(info) => info.name.clone(),
            None => code,
        }
    }

    pub fn languages(&self, code: &str) -> Vec<String> {
        self.regions
            .get(&code.to_ascii_uppercase())
            .map(|info| info.languages.clone())
            .unwrap_or_default()
    }
}
