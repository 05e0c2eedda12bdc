//! Bounded rewriter that reduces the rendered token count by flipping
//! `Expanded -> Hidden` (§4.5). Runs below the authorization boundary: it
//! calls `PageStore::set_visibility` directly, the one sanctioned "system"
//! bypass outside bootstrap.

use crate::model::{Page, PageIndex, SegmentType, Visibility};
use crate::render::{estimate_tokens, render};
use crate::store::{PageStore, SegmentRegistry};
use tracing::{debug, warn};

/// Outcome of one [`auto_collapse`] call.
#[derive(Debug, Clone)]
pub struct CollapseReport {
    /// Indices collapsed, in the order they were collapsed.
    pub collapsed: Vec<PageIndex>,
    /// Token estimate before any collapsing.
    pub tokens_before: usize,
    /// Token estimate after the policy stopped (whether or not the
    /// ceiling was reached).
    pub tokens_after: usize,
    /// `true` iff `tokens_after <= ceiling`.
    pub reached_ceiling: bool,
}

/// Iterates segments in insertion order, skipping `System`-type segments.
/// Within each segment, DFS from the root collects `Detail` pages whose
/// visibility is currently `Expanded` (`Contents` pages are never flipped).
/// Each candidate is hidden in turn, re-estimating tokens after every flip,
/// until the estimate is at or below `ceiling`. If the traversal completes
/// without reaching it, every candidate across every segment has been
/// collapsed and `reached_ceiling` is `false`.
pub fn auto_collapse(pages: &PageStore, segments: &SegmentRegistry, ceiling: usize) -> CollapseReport {
    let before = estimate_tokens(&render(pages, segments));
    if before <= ceiling {
        return CollapseReport {
            collapsed: Vec::new(),
            tokens_before: before,
            tokens_after: before,
            reached_ceiling: true,
        };
    }

    let mut collapsed = Vec::new();
    let mut tokens_after = before;
    let mut reached_ceiling = false;

    'segments: for segment in segments.list_segments() {
        if segment.kind == SegmentType::System {
            continue;
        }
        let Some(root) = segment.root_index.clone() else {
            continue;
        };
        let candidates = collect_expanded_detail_pages(pages, &root);
        for idx in candidates {
            if let Err(e) = pages.set_visibility(&idx, Visibility::Hidden) {
                warn!(index = %idx, error = %e, "auto_collapse: hide_details failed, skipping");
                continue;
            }
            collapsed.push(idx);
            tokens_after = estimate_tokens(&render(pages, segments));
            if tokens_after <= ceiling {
                reached_ceiling = true;
                break 'segments;
            }
        }
    }

    debug!(
        collapsed = collapsed.len(),
        tokens_before = before,
        tokens_after,
        reached_ceiling,
        "auto_collapse finished"
    );

    CollapseReport {
        collapsed,
        tokens_before: before,
        tokens_after,
        reached_ceiling,
    }
}

/// Pre-order DFS of `root`'s subtree: `Detail` pages whose visibility is
/// `Expanded`, in children-list order. Traversal descends through
/// `Contents` pages regardless of their own visibility, since the policy
/// reasons about tree structure, not current render state.
fn collect_expanded_detail_pages(pages: &PageStore, root: &PageIndex) -> Vec<PageIndex> {
    let mut out = Vec::new();
    let mut stack = vec![root.clone()];
    // A plain Vec used as a stack gives LIFO order; reverse children when
    // pushing so the DFS still visits them left-to-right.
    while let Some(idx) = stack.pop() {
        let Ok(page) = pages.get_page(&idx) else {
            continue;
        };
        match &page {
            Page::Detail { header, .. } => {
                if matches!(header.visibility, Visibility::Expanded) {
                    out.push(idx);
                }
            }
            Page::Contents { children, .. } => {
                for child in children.iter().rev() {
                    stack.push(child.clone());
                }
            }
        }
    }
    out
}
