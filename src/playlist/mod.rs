mod emit;
mod parser;

pub use emit::{render_playlist, write_country_playlists, write_unified_playlist};
pub use parser::{read_playlist, EntryScanner, FileContext};
