use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkKind {
    Surah,
    Dua,
    Ayah,
}

impl BookmarkKind {
    pub fn all() -> Vec<BookmarkKind> {
        vec![BookmarkKind::Surah, BookmarkKind::Dua, BookmarkKind::Ayah]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookmarkKind::Surah => "surah",
            BookmarkKind::Dua => "dua",
            BookmarkKind::Ayah => "ayah",
        }
    }
}

impl std::fmt::Display for BookmarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookmarkKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "surah" => Ok(BookmarkKind::Surah),
            "dua" => Ok(BookmarkKind::Dua),
            "ayah" => Ok(BookmarkKind::Ayah),
            _ => Err(anyhow::anyhow!("Unknown bookmark type: {}", s)),
        }
    }
}

/// A saved surah, dua or ayah. Field names are the persisted JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BookmarkKind,
    pub title: String,
    /// Surah number, dua id, or "surah:ayah"
    pub reference: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Bookmark {
    /// Tab filter plus case-insensitive title search, as on the bookmarks page.
    pub fn matches(&self, kind: Option<BookmarkKind>, query: &str) -> bool {
        let kind_ok = kind.map(|k| k == self.kind).unwrap_or(true);
        kind_ok && self.title.to_lowercase().contains(&query.to_lowercase())
    }

    /// Where opening this bookmark leads.
    pub fn target(&self) -> String {
        match self.kind {
            BookmarkKind::Surah => format!("surah {}", self.reference),
            BookmarkKind::Dua => format!("dua {}", self.reference),
            BookmarkKind::Ayah => match self.reference.split_once(':') {
                Some((surah, ayah)) => format!("surah {}, ayah {}", surah, ayah),
                None => format!("surah {}", self.reference),
            },
        }
    }
}

/// Validate a reference for its kind. Ayah references must be "surah:ayah".
pub fn validate_reference(kind: BookmarkKind, reference: &str) -> anyhow::Result<()> {
    let positive = |s: &str| s.parse::<u32>().map(|n| n > 0).unwrap_or(false);
    let ok = match kind {
        BookmarkKind::Surah => positive(reference),
        BookmarkKind::Dua => !reference.trim().is_empty(),
        BookmarkKind::Ayah => reference
            .split_once(':')
            .map(|(s, a)| positive(s) && positive(a))
            .unwrap_or(false),
    };
    if ok {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Invalid {} reference '{}'",
            kind.as_str(),
            reference
        ))
    }
}
