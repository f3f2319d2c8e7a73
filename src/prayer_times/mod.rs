pub mod api;
pub mod calculator;
pub mod location;
pub mod provider;
pub mod resolver;
pub mod table;

pub use api::ApiClient;
pub use provider::{ResolvedTable, TableProvider, TableSource};
pub use resolver::{resolve_next, NextPrayer};
pub use table::PrayerTimeTable;
