//! Hierarchical, visibility-driven context store for long-running LLM
//! agents.
//!
//! An agent accumulates unbounded dialogue, tool traces, and learned facts.
//! This crate lets it selectively *expand* (materialize full content into
//! the prompt) or *hide* (show only a placeholder) portions of that
//! history, so the rendered prompt stays within a token budget while the
//! agent retains random access to everything it has ever recorded.
//!
//! The pieces, in dependency order:
//! - [`model`] — the typed page/segment data model and its state machine.
//! - [`persist`] — the durable mirror (`PageStorage`) and its two backends.
//! - [`store`] — [`store::PageStore`] (the typed tree) and
//!   [`store::SegmentRegistry`] (its named partitions).
//! - [`auth`] — [`auth::AuthorizedStore`], the permission-gated front door.
//! - [`render`] — deterministic serialization into a role-tagged message
//!   list, plus the token estimator.
//! - [`collapse`] — the bounded auto-collapse policy.
//! - [`tools`] — the named callables exposed to a sandboxed script runner.
//! - [`turn`] — the per-turn summarize-and-commit flow.
//! - [`config`] and [`bootstrap`] — wiring a [`bootstrap::Store`] from a
//!   [`config::Config`].

pub mod auth;
pub mod bootstrap;
pub mod collapse;
pub mod config;
pub mod error;
pub mod model;
pub mod persist;
pub mod render;
pub mod store;
pub mod tools;
pub mod turn;

pub use auth::AuthorizedStore;
pub use bootstrap::{open, Store};
pub use config::Config;
pub use error::{Result, StoreError};
pub use model::{Lifecycle, Page, PageHeader, PageIndex, Permission, Segment, SegmentType, Visibility};
