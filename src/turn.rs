//! The agent's turn-commit flow (§2): buffers one reasoning turn's
//! messages, hands them to an injected summarization collaborator, and
//! materializes the result as a new `DetailPage` under a designated
//! segment. The turn fails entirely if either step fails; nothing is
//! committed and the buffer is left untouched for a retry.

use crate::auth::AuthorizedStore;
use crate::error::StoreError;
use crate::model::PageIndex;
use thiserror::Error;

/// The external summarization model. Out of scope for this crate beyond
/// this call boundary: an integrator supplies an implementation that talks
/// to whatever LLM or transport it likes.
pub trait Summarizer: Send + Sync {
    /// Summarizes one turn's buffered messages into the text a new
    /// `DetailPage` should carry.
    fn summarize(&self, messages: &[String]) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// Failure of a [`TurnBuffer::commit`] call.
#[derive(Debug, Error)]
pub enum TurnError {
    /// The summarization collaborator failed; the buffer is untouched.
    #[error("summarization failed: {0}")]
    Summarizer(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The resulting `DetailPage` could not be created; the buffer is
    /// untouched.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Accumulates messages for one reasoning turn.
#[derive(Debug, Default)]
pub struct TurnBuffer {
    messages: Vec<String>,
}

impl TurnBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one message to the turn.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// `true` iff nothing has been appended since the last commit.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Summarizes the buffered messages and commits them as a new
    /// `DetailPage` under `parent` (conventionally the `interact` segment's
    /// root). On success, clears the buffer and returns the new page's
    /// index. On failure from either the summarizer or the store, the
    /// buffer is left exactly as it was, and no page is created.
    pub fn commit(
        &mut self,
        auth: &AuthorizedStore,
        summarizer: &dyn Summarizer,
        parent: &PageIndex,
        name: String,
        description: String,
    ) -> std::result::Result<PageIndex, TurnError> {
        let detail = summarizer
            .summarize(&self.messages)
            .map_err(TurnError::Summarizer)?;
        let index = auth.create_detail_page(name, description, detail, parent)?;
        self.messages.clear();
        Ok(index)
    }
}
