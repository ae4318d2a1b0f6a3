mod identity;
mod models;

pub use identity::{station_id, station_slug};
pub use models::{Catalog, Station, StationEntry, StationStream, CATALOG_VERSION};
