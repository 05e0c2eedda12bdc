//! Core data types shared by every component: [`PageIndex`], [`Page`],
//! [`Segment`], and the small enums that drive the lifecycle/visibility
//! state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Opaque, unique page identifier of the form `<segment_id>-<n>`.
///
/// The integer suffix is allocated by the owning [`Segment`] and is never
/// reused; indices are compared and hashed as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageIndex(pub String);

impl PageIndex {
    /// Builds an index from a segment id and allocated suffix.
    pub fn new(segment_id: &str, suffix: u64) -> Self {
        PageIndex(format!("{segment_id}-{suffix}"))
    }

    /// The segment-id prefix of this index (invariant 5: ownership never
    /// changes, so this is stable for the page's lifetime).
    pub fn segment_id(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// The monotonic integer suffix, if the index is well-formed.
    pub fn suffix(&self) -> Option<u64> {
        self.0.rsplit('-').next()?.parse().ok()
    }

    /// Borrows the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PageIndex {
    fn from(s: String) -> Self {
        PageIndex(s)
    }
}

impl From<&str> for PageIndex {
    fn from(s: &str) -> Self {
        PageIndex(s.to_string())
    }
}

/// Whether a page participates in rendering at all. Only `Active` pages
/// ever render; `HotArchived` and `ColdArchived` are a reserved extension
/// point preserved through persistence but otherwise inert today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Participates normally in rendering, subject to `visibility`.
    Active,
    /// Persisted but renders as empty; kept warm for a future promotion path.
    HotArchived,
    /// Persisted but renders as empty; the coldest tier.
    ColdArchived,
}

impl Lifecycle {
    pub(crate) fn to_wire(self) -> u8 {
        match self {
            Lifecycle::Active => 0,
            Lifecycle::HotArchived => 1,
            Lifecycle::ColdArchived => 2,
        }
    }

    pub(crate) fn from_wire(v: u8) -> Option<Self> {
        match v {
            0 => Some(Lifecycle::Active),
            1 => Some(Lifecycle::HotArchived),
            2 => Some(Lifecycle::ColdArchived),
            _ => None,
        }
    }
}

/// Whether the renderer materializes a page's content (`Expanded`) or only
/// a placeholder (`Hidden`). Has observable effect only on `Active` pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Content is materialized into the rendered prompt.
    Expanded,
    /// Only a placeholder heading is materialized.
    Hidden,
}

impl Visibility {
    pub(crate) fn to_wire(self) -> u8 {
        match self {
            Visibility::Expanded => 0,
            Visibility::Hidden => 1,
        }
    }

    pub(crate) fn from_wire(v: u8) -> Option<Self> {
        match v {
            0 => Some(Visibility::Expanded),
            1 => Some(Visibility::Hidden),
            _ => None,
        }
    }
}

/// Header fields shared by both page variants.
#[derive(Debug, Clone)]
pub struct PageHeader {
    /// Stable identity, set once at insertion.
    pub index: PageIndex,
    /// Human-readable label; must be non-empty.
    pub name: String,
    /// Short summary; may be empty.
    pub description: String,
    /// `None` iff this page is a segment root.
    pub parent: Option<PageIndex>,
    /// Rendering-eligibility flag.
    pub lifecycle: Lifecycle,
    /// Render-full-vs-placeholder flag.
    pub visibility: Visibility,
    /// Insertion timestamp.
    pub created_at: OffsetDateTime,
    /// Timestamp of the most recent mutation.
    pub updated_at: OffsetDateTime,
}

/// A node in the store: either a leaf carrying content, or an internal node
/// carrying an ordered list of children.
#[derive(Debug, Clone)]
pub enum Page {
    /// A leaf page. Renders `detail` when `visibility = Expanded`.
    Detail {
        /// Shared header fields.
        header: PageHeader,
        /// The full content: original messages, notes, prompt text.
        detail: String,
    },
    /// An internal page. Renders its children when `visibility = Expanded`.
    Contents {
        /// Shared header fields.
        header: PageHeader,
        /// Ordered references to child pages.
        children: Vec<PageIndex>,
    },
}

impl Page {
    /// Borrows the shared header fields regardless of variant.
    pub fn header(&self) -> &PageHeader {
        match self {
            Page::Detail { header, .. } => header,
            Page::Contents { header, .. } => header,
        }
    }

    /// Mutably borrows the shared header fields regardless of variant.
    pub fn header_mut(&mut self) -> &mut PageHeader {
        match self {
            Page::Detail { header, .. } => header,
            Page::Contents { header, .. } => header,
        }
    }

    /// This page's stable identity.
    pub fn index(&self) -> &PageIndex {
        &self.header().index
    }

    /// `true` iff this page is a [`Page::Contents`] variant.
    pub fn is_contents(&self) -> bool {
        matches!(self, Page::Contents { .. })
    }

    /// The children list, if this is a [`Page::Contents`] page.
    pub fn children(&self) -> Option<&[PageIndex]> {
        match self {
            Page::Contents { children, .. } => Some(children),
            Page::Detail { .. } => None,
        }
    }
}

/// The three system-defined permission classes a segment may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    /// Reads only; all writes are rejected.
    ReadOnly,
    /// Reads and ordinary writes; `System`-classified operations rejected.
    ReadWrite,
    /// Reads, writes, and `System`-classified operations all allowed.
    SystemManaged,
}

/// The kind of content a segment is conventionally used for. Purely
/// descriptive except that `System` segments get invariant 8's root
/// protection and the renderer's `"system"` role tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentType {
    /// Carries system prompts; its root may never be hidden.
    System,
    /// Carries user-facing dialogue.
    User,
    /// Carries tool-originated transcripts.
    Tool,
    /// Anything else an integrator wants to partition.
    Custom,
}

/// A named top-level partition of the tree, with its own permission class
/// and `PageIndex` allocator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Stable id; also the prefix of every `PageIndex` it owns.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// Short summary.
    pub description: String,
    /// Descriptive content classification.
    pub kind: SegmentType,
    /// Governs which mutation classes the authorization layer allows.
    pub permission: Permission,
    /// The segment's root `ContentsPage`, once created.
    pub root_index: Option<PageIndex>,
    /// Monotonic allocator for this segment's `PageIndex` suffixes.
    pub next_index: u64,
}

impl Segment {
    /// Allocates the next `PageIndex` for this segment, bumping the
    /// counter. Satisfies invariant 6: the returned suffix strictly
    /// exceeds every suffix previously allocated from this segment.
    pub fn allocate_index(&mut self) -> PageIndex {
        let idx = PageIndex::new(&self.id, self.next_index);
        self.next_index += 1;
        idx
    }

    /// Seeds the counter from the highest suffix observed in storage,
    /// per the open question in §9: legacy stores written with a global
    /// counter may have non-monotonic suffixes across segments, but each
    /// segment's own suffixes remain internally ordered once re-seeded to
    /// `max(seen) + 1`.
    pub fn reseed_counter(&mut self, max_seen_suffix: u64) {
        if max_seen_suffix >= self.next_index {
            self.next_index = max_seen_suffix + 1;
        }
    }
}
