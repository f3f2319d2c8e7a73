pub mod bookmark;
pub mod prayer;

pub use bookmark::{Bookmark, BookmarkKind};
pub use prayer::PrayerName;
