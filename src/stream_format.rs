use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

pub const MIN_BITRATE_KBPS: u32 = 32;
pub const MAX_BITRATE_KBPS: u32 = 1411;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Unknown,
    Mp3,
    Aac,
    Ogg,
    Flac,
    Opus,
    Wav,
}

impl AudioFormat {
    pub fn label(self) -> &'static str {
        match self {
            AudioFormat::Unknown => "Unknown",
            AudioFormat::Mp3 => "MP3",
            AudioFormat::Aac => "AAC",
            AudioFormat::Ogg => "OGG",
            AudioFormat::Flac => "FLAC",
            AudioFormat::Opus => "OPUS",
            AudioFormat::Wav => "WAV",
        }
    }

    pub fn default_bitrate(self) -> u32 {
        match self {
            AudioFormat::Unknown => 0,
            AudioFormat::Mp3 | AudioFormat::Aac | AudioFormat::Ogg => 128,
            AudioFormat::Flac => 960,
            AudioFormat::Opus => 96,
            AudioFormat::Wav => 1411,
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "mp3" => Some(AudioFormat::Mp3),
            "aac" | "m4a" => Some(AudioFormat::Aac),
            "ogg" => Some(AudioFormat::Ogg),
            "flac" => Some(AudioFormat::Flac),
            "opus" => Some(AudioFormat::Opus),
            "wav" => Some(AudioFormat::Wav),
            _ => None,
        }
    }
}

// Checked in order; the first identifier found anywhere in the URL wins.
const FORMAT_IDENTIFIERS: &[(AudioFormat, &[&str])] = &[
    (AudioFormat::Mp3, &["mp3", "mpeg"]),
    (AudioFormat::Aac, &["aac", "aacp", "he-aac"]),
    (AudioFormat::Ogg, &["ogg", "vorbis"]),
    (AudioFormat::Flac, &["flac"]),
    (AudioFormat::Opus, &["opus"]),
    (AudioFormat::Wav, &["wav", "pcm"]),
];

static BITRATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[-_/](\d+)k[-_/.]",
        r"[-_/](\d+)kbps[-_/.]",
        r"[-_/](\d+)kb[-_/.]",
        r"[-_/.](\d+)[-_/.]",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("bitrate pattern compiles"))
    .collect()
});

/// Format and bitrate inferred from the stream URL alone.
pub fn detect(url: &str) -> (AudioFormat, u32) {
    let format = infer_format(url);
    (format, infer_bitrate(url, format))
}

pub fn infer_format(url: &str) -> AudioFormat {
    let lowered = url.to_lowercase();
    let parsed = Url::parse(url).ok();

    if let Some(parsed) = &parsed {
        let path = parsed.path().to_lowercase();
        if let Some((_, ext)) = path.rsplit_once('.') {
            if let Some(format) = AudioFormat::from_extension(ext) {
                return format;
            }
        }
    }

    for (format, identifiers) in FORMAT_IDENTIFIERS {
        if identifiers.iter().any(|id| lowered.contains(id)) {
            return *format;
        }
    }

    // Query values are percent-decoded here, so this can still hit when the
    // raw URL text did not contain the identifier verbatim.
    if let Some(parsed) = &parsed {
        for (key, value) in parsed.query_pairs() {
            if !matches!(key.to_lowercase().as_str(), "format" | "fmt" | "type") {
                continue;
            }
            let value = value.to_lowercase();
            for (format, identifiers) in FORMAT_IDENTIFIERS {
                if identifiers.contains(&value.as_str()) {
                    return *format;
                }
            }
        }
    }

    AudioFormat::Unknown
}

pub fn infer_bitrate(url: &str, format: AudioFormat) -> u32 {
    let lowered = url.to_lowercase();

    for pattern in BITRATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(&lowered) {
            if let Ok(bitrate) = caps[1].parse::<u32>() {
                if (MIN_BITRATE_KBPS..=MAX_BITRATE_KBPS).contains(&bitrate) {
                    return bitrate;
                }
            }
        }
    }

    // Icecast mounts rarely advertise a bitrate in the URL.
    if lowered.contains("icecast") {
        return 128;
    }

    format.default_bitrate()
}
