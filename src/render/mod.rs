//! Deterministic serialization of the store into a role-tagged message
//! list, plus the token estimator (§4.4). The renderer is a pure function
//! of store state: given the same pages and segments, it always produces
//! the same output.

use crate::model::{Lifecycle, Page, PageIndex, SegmentType, Visibility};
use crate::store::{PageStore, SegmentRegistry};

/// The role tag attached to a rendered segment's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Emitted for `SegmentType::System` segments.
    System,
    /// Emitted for every other segment type.
    User,
}

impl Role {
    /// The wire string used in the rendered message envelope (§6).
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// One message contributed by a single non-empty segment.
#[derive(Debug, Clone)]
pub struct RenderedMessage {
    /// `System` for System-type segments, `User` otherwise.
    pub role: Role,
    /// A fenced ```markdown block containing the segment's rendered tree.
    pub content: String,
}

/// Renders the full store: every segment with a non-null root, in
/// insertion order, recursively rendered from depth 0. Segments that
/// render to empty text contribute no message.
pub fn render(pages: &PageStore, segments: &SegmentRegistry) -> Vec<RenderedMessage> {
    let mut out = Vec::new();
    for segment in segments.list_segments() {
        let Some(root) = segment.root_index.clone() else {
            continue;
        };
        let text = render_node(pages, &root, 0);
        if text.is_empty() {
            continue;
        }
        let role = if segment.kind == SegmentType::System {
            Role::System
        } else {
            Role::User
        };
        out.push(RenderedMessage {
            role,
            content: format!("```markdown\n{text}\n```"),
        });
    }
    out
}

/// Renders the page at `index` and, for an `Expanded` `Contents` page, its
/// subtree. Returns the empty string for a non-`Active` page or a page that
/// fails to resolve (consistency is eventual on the rendering side: a
/// dangling reference is silently skipped rather than treated as an
/// error).
fn render_node(pages: &PageStore, index: &PageIndex, depth: usize) -> String {
    let page = match pages.get_page(index) {
        Ok(p) => p,
        Err(_) => return String::new(),
    };
    let header = page.header();
    if !matches!(header.lifecycle, Lifecycle::Active) {
        return String::new();
    }

    let mut heading = format!("{} [{}] {}", "#".repeat(depth + 1), header.index, header.name);
    if !header.description.is_empty() {
        heading.push_str(": ");
        heading.push_str(&header.description);
    }

    match &page {
        Page::Detail { detail, .. } => match header.visibility {
            Visibility::Expanded if !detail.is_empty() => {
                format!("{heading}\n[Hide]\n~~~\n{detail}\n~~~")
            }
            Visibility::Hidden if !detail.is_empty() => format!("{heading} ([Expand]...)"),
            _ => heading,
        },
        Page::Contents { children, .. } => match header.visibility {
            Visibility::Expanded => {
                let mut parts = vec![heading];
                for child in children {
                    let rendered = render_node(pages, child, depth + 1);
                    if !rendered.is_empty() {
                        parts.push(rendered);
                    }
                }
                parts.join("\n")
            }
            Visibility::Hidden if !children.is_empty() => {
                format!("{heading} ({} [Expand]...)", children.len())
            }
            Visibility::Hidden => heading,
        },
    }
}

/// Character-count/3, truncated: the token estimator of §4.4. Exact and
/// deterministic given a set of rendered messages.
pub fn estimate_tokens(messages: &[RenderedMessage]) -> usize {
    messages
        .iter()
        .map(|m| m.content.chars().count())
        .sum::<usize>()
        / 3
}
