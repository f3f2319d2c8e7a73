use clap::{Args, Parser, Subcommand};

use crate::config::settings::{parse_latitude, parse_longitude};

#[derive(Parser, Debug)]
#[command(name = "ramadhan", version, author, about = "A terminal Ramadan companion: prayer times, countdown and bookmarks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Coordinates for this invocation only, overriding the saved location
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true, requires = "lng", value_parser = parse_latitude)]
    pub lat: Option<f64>,
    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true, requires = "lat", value_parser = parse_longitude)]
    pub lng: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer times and the next prayer
    Times {
        #[command(flatten)]
        location: LocationArgs,
        /// Fetch again even if today's times are cached
        #[arg(long)]
        refresh: bool,
    },
    /// Print the next prayer, its time and the countdown on one line
    Next {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Show today's Hijri date
    Hijri,
    /// Manage bookmarked surahs, duas and ayahs
    Bookmark {
        #[command(subcommand)]
        action: BookmarkCommands,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// Manage cached prayer times
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum BookmarkCommands {
    /// Bookmark an item
    Add {
        /// Type: surah, dua or ayah
        kind: String,
        /// Surah number, dua id, or surah:ayah
        reference: String,
        /// Title shown in lists
        #[arg(long)]
        title: Option<String>,
    },
    /// Bookmark an item, or remove it if already bookmarked
    Toggle {
        /// Type: surah, dua or ayah
        kind: String,
        /// Surah number, dua id, or surah:ayah
        reference: String,
        /// Title shown in lists
        #[arg(long)]
        title: Option<String>,
    },
    /// Remove a bookmark by id
    Remove {
        id: String,
    },
    /// List bookmarks
    List {
        /// Only this type: surah, dua or ayah
        #[arg(long = "type")]
        kind: Option<String>,
        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,
    },
    /// Exit with status 0 if the item is bookmarked, 1 otherwise
    Check {
        kind: String,
        reference: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print current settings and file location
    Show,
    /// Change one setting, e.g. `settings set prayer.madhab Hanafi`
    Set {
        key: String,
        value: String,
    },
    /// Restore defaults
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Delete all cached prayer times
    Clear,
}
