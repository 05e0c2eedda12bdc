//! Store configuration: backend selection, the auto-collapse ceiling, and
//! the fixed segment list bootstrap seeds (§9).

use std::path::PathBuf;

/// Which [`crate::persist::PageStorage`] backend to open.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Nothing survives process exit; used for tests and ephemeral runs.
    Memory,
    /// One file per page under `dir`, optionally gzip-compressed.
    File {
        /// Root directory pages and `segments.json` are written under.
        dir: PathBuf,
        /// Write pages as `<index>.json.gz` instead of `<index>.json`.
        compress: bool,
    },
}

/// One entry of the fixed segment list bootstrap seeds.
#[derive(Debug, Clone)]
pub struct SegmentSeed {
    /// Stable id, also the `PageIndex` prefix.
    pub id: &'static str,
    /// Human-readable label.
    pub name: &'static str,
    /// Short summary.
    pub description: &'static str,
    /// Descriptive content classification.
    pub kind: crate::model::SegmentType,
    /// Governs which mutation classes the authorization layer allows.
    pub permission: crate::model::Permission,
}

/// Store-wide configuration. Built via [`Config::default`] or
/// [`Config::ephemeral`]; fields are public so an integrator can adjust a
/// single knob without re-deriving the whole preset.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend to open the store against.
    pub backend: Backend,
    /// Auto-collapse token ceiling (§4.5).
    pub token_ceiling: usize,
    /// Segments bootstrap seeds on first run.
    pub segments: Vec<SegmentSeed>,
}

impl Default for Config {
    /// File backend under `./palimpsest-data`, no compression, an 8000-token
    /// ceiling, and the fixed segment list of §6.
    fn default() -> Self {
        Config {
            backend: Backend::File {
                dir: PathBuf::from("palimpsest-data"),
                compress: false,
            },
            token_ceiling: 8000,
            segments: default_segments(),
        }
    }
}

impl Config {
    /// In-memory backend, same ceiling and segment list as [`Config::default`].
    /// Intended for tests and short-lived runs that should not touch disk.
    pub fn ephemeral() -> Self {
        Config {
            backend: Backend::Memory,
            ..Config::default()
        }
    }
}

fn default_segments() -> Vec<SegmentSeed> {
    use crate::model::{Permission, SegmentType};
    vec![
        SegmentSeed {
            id: "sys",
            name: "System",
            description: "System prompt and operating instructions.",
            kind: SegmentType::System,
            permission: Permission::SystemManaged,
        },
        SegmentSeed {
            id: "usr",
            name: "User",
            description: "User-facing dialogue.",
            kind: SegmentType::User,
            permission: Permission::ReadWrite,
        },
        SegmentSeed {
            id: "self",
            name: "Self",
            description: "The agent's own reflections and learned facts.",
            kind: SegmentType::User,
            permission: Permission::ReadWrite,
        },
        SegmentSeed {
            id: "teach",
            name: "Teach",
            description: "Transcripts from tool-originated learning.",
            kind: SegmentType::Tool,
            permission: Permission::ReadWrite,
        },
        SegmentSeed {
            id: "topic",
            name: "Topic",
            description: "Subject-matter notes grouped by topic.",
            kind: SegmentType::User,
            permission: Permission::ReadWrite,
        },
        SegmentSeed {
            id: "interact",
            name: "Interact",
            description: "Committed per-turn summaries.",
            kind: SegmentType::User,
            permission: Permission::ReadWrite,
        },
    ]
}
