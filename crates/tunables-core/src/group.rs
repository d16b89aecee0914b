//! Entry groups (namespaces).
//!
//! Every entry belongs to exactly one group, and (group, name) identifies a
//! live entry. Control surfaces typically show one panel per group:
//!
//! ```text
//! GENERAL          Pause, Next frame, Fast forward
//! VISUAL           Show Points, Show KeyFrames, ...
//! EXTRACTOR        Features, Scale Factor, ...
//! TRACKING         Threshold, ...
//! INITIALIZATION   ...
//! RELOCALIZATION   ...
//! LOCAL_MAPPING    ...
//! LOOP_CLOSING     ...
//! ```

use std::fmt;

/// Enumerated namespace for entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    General,
    Visual,
    Extractor,
    Tracking,
    Initialization,
    Relocalization,
    LocalMapping,
    LoopClosing,
}

impl Group {
    /// All groups in declaration order.
    pub const ALL: [Group; 8] = [
        Group::General,
        Group::Visual,
        Group::Extractor,
        Group::Tracking,
        Group::Initialization,
        Group::Relocalization,
        Group::LocalMapping,
        Group::LoopClosing,
    ];

    /// Stable upper-case key used in entry IDs and diagnostics.
    pub const fn key(self) -> &'static str {
        match self {
            Group::General => "GENERAL",
            Group::Visual => "VISUAL",
            Group::Extractor => "EXTRACTOR",
            Group::Tracking => "TRACKING",
            Group::Initialization => "INITIALIZATION",
            Group::Relocalization => "RELOCALIZATION",
            Group::LocalMapping => "LOCAL_MAPPING",
            Group::LoopClosing => "LOOP_CLOSING",
        }
    }

    /// Find a group by its key (case-insensitive).
    pub fn from_key(key: &str) -> Option<Group> {
        Self::ALL
            .into_iter()
            .find(|group| group.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
