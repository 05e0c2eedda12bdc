//! On-disk page format (§6): a JSON object whose `type` field discriminates
//! `"detail"` from `"contents"`, field names lowercase, times in RFC 3339.

use crate::error::{Result, StoreError};
use crate::model::{Lifecycle, Page, PageHeader, PageIndex, Visibility};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Serialize, Deserialize)]
struct WirePage {
    #[serde(rename = "type")]
    kind: String,
    index: String,
    name: String,
    description: String,
    lifecycle: u8,
    visibility: u8,
    parent: String,
    created_at: String,
    updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<String>>,
}

/// Serializes a [`Page`] to the §6 JSON object.
pub fn encode(page: &Page) -> Result<Vec<u8>> {
    let header = page.header();
    let wire = WirePage {
        kind: if page.is_contents() {
            "contents".to_string()
        } else {
            "detail".to_string()
        },
        index: header.index.as_str().to_string(),
        name: header.name.clone(),
        description: header.description.clone(),
        lifecycle: header.lifecycle.to_wire(),
        visibility: header.visibility.to_wire(),
        parent: header
            .parent
            .as_ref()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default(),
        created_at: header
            .created_at
            .format(&Rfc3339)
            .map_err(|e| format_err("encode_page", &header.index, e))?,
        updated_at: header
            .updated_at
            .format(&Rfc3339)
            .map_err(|e| format_err("encode_page", &header.index, e))?,
        detail: match page {
            Page::Detail { detail, .. } => Some(detail.clone()),
            Page::Contents { .. } => None,
        },
        children: match page {
            Page::Contents { children, .. } => {
                Some(children.iter().map(|c| c.as_str().to_string()).collect())
            }
            Page::Detail { .. } => None,
        },
    };
    serde_json::to_vec_pretty(&wire)
        .map_err(|e| StoreError::serde("encode_page", header.index.to_string(), e))
}

/// Parses a [`Page`] from its §6 JSON encoding.
pub fn decode(bytes: &[u8]) -> Result<Page> {
    let wire: WirePage =
        serde_json::from_slice(bytes).map_err(|e| StoreError::serde("decode_page", "<bytes>", e))?;

    let index = PageIndex::from(wire.index.clone());
    let lifecycle = Lifecycle::from_wire(wire.lifecycle).ok_or_else(|| {
        StoreError::InvariantViolation {
            op: "decode_page",
            target: wire.index.clone(),
            reason: format!("unknown lifecycle code {}", wire.lifecycle),
        }
    })?;
    let visibility = Visibility::from_wire(wire.visibility).ok_or_else(|| {
        StoreError::InvariantViolation {
            op: "decode_page",
            target: wire.index.clone(),
            reason: format!("unknown visibility code {}", wire.visibility),
        }
    })?;
    let created_at = parse_rfc3339(&wire.created_at, &wire.index)?;
    let updated_at = parse_rfc3339(&wire.updated_at, &wire.index)?;
    let parent = if wire.parent.is_empty() {
        None
    } else {
        Some(PageIndex::from(wire.parent))
    };

    let header = PageHeader {
        index,
        name: wire.name,
        description: wire.description,
        parent,
        lifecycle,
        visibility,
        created_at,
        updated_at,
    };

    match wire.kind.as_str() {
        "detail" => Ok(Page::Detail {
            header,
            detail: wire.detail.unwrap_or_default(),
        }),
        "contents" => Ok(Page::Contents {
            header,
            children: wire
                .children
                .unwrap_or_default()
                .into_iter()
                .map(PageIndex::from)
                .collect(),
        }),
        other => Err(StoreError::InvariantViolation {
            op: "decode_page",
            target: wire.index,
            reason: format!("unknown page type {other:?}"),
        }),
    }
}

fn parse_rfc3339(s: &str, index: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339).map_err(|e| StoreError::InvariantViolation {
        op: "decode_page",
        target: index.to_string(),
        reason: format!("bad timestamp {s:?}: {e}"),
    })
}

fn format_err(op: &'static str, index: &PageIndex, e: time::error::Format) -> StoreError {
    StoreError::InvariantViolation {
        op,
        target: index.to_string(),
        reason: format!("could not format timestamp: {e}"),
    }
}
