//! The search session state machine
//!
//! Owns everything about one user's search workflow: which image is
//! selected, whether an upload is in flight, the latest results, the error
//! banner, and the similarity threshold. All transitions happen here so the
//! UI layer stays a thin renderer over this struct, and the whole workflow
//! can be unit-tested without a window or a network.
//!
//! States: `Idle -> FileSelected -> Uploading -> {ResultsReady | Failed}`.
//! From `ResultsReady` or `Failed`, selecting a new file returns to
//! `FileSelected` and discards the old results/error.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use super::data::SearchResult;
use super::filter;
use crate::transfer::TransferError;

/// Default similarity threshold applied before any slider movement
pub const DEFAULT_THRESHOLD: f32 = 0.30;

/// Where the session currently is in the search workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing selected yet
    Idle,
    /// An image is selected and ready to submit
    FileSelected,
    /// Exactly one upload is in flight
    Uploading,
    /// The last search completed with a (possibly empty) result list
    ResultsReady,
    /// The last search failed; see `error()`
    Failed,
}

/// The image the user picked, owned exclusively by the session
///
/// Bytes are shared behind an `Arc` so submitting doesn't copy the image;
/// the display preview handle derived from these bytes lives in the app
/// layer and is dropped when a new selection replaces it.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    path: PathBuf,
    bytes: Arc<Vec<u8>>,
}

impl SelectedFile {
    pub fn new(path: PathBuf, bytes: Vec<u8>) -> Self {
        Self {
            path,
            bytes: Arc::new(bytes),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Filename for the multipart form field and the preview caption
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string())
    }

    pub fn bytes(&self) -> &Arc<Vec<u8>> {
        &self.bytes
    }
}

/// Identifies one `begin_search` invocation
///
/// Monotonically increasing; a completion whose token no longer matches the
/// session's current token belongs to a superseded request and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchToken(u64);

/// Everything the transfer layer needs to run one search
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSearch {
    pub token: SearchToken,
    pub file_name: String,
    pub bytes: Arc<Vec<u8>>,
}

/// Why a submit attempt did not start a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    /// User hit "Find Similar" without picking an image; surfaced as an
    /// inline prompt, never as a session error
    #[error("Please choose an image first!")]
    NoFileSelected,
    /// An upload is already in flight; the attempt is silently ignored
    #[error("a search is already running")]
    SearchInFlight,
}

/// All state for one search session
pub struct SearchSession {
    state: SessionState,
    selected: Option<SelectedFile>,
    results: Vec<SearchResult>,
    error: Option<String>,
    threshold: f32,
    /// Bumped on every selection and submission; stale completions lose
    token: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            selected: None,
            results: Vec::new(),
            error: None,
            threshold: DEFAULT_THRESHOLD,
            token: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Result list exactly as the service returned it (rank order)
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Human-readable failure message; `Some` only in `Failed`
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Replace the current selection with a newly picked image.
    ///
    /// Valid from every state. Discards previous results and any error, and
    /// invalidates an in-flight upload so its late response cannot land on
    /// top of the new selection. The previous `SelectedFile` (and the
    /// preview the app derived from it) is released by being dropped here.
    pub fn select_file(&mut self, file: SelectedFile) {
        self.token += 1;
        self.selected = Some(file);
        self.results.clear();
        self.error = None;
        self.state = SessionState::FileSelected;
    }

    /// Try to start an upload of the selected image.
    ///
    /// On success the session moves to `Uploading` and the caller is handed
    /// a `PendingSearch` to run through the transfer layer; its token must
    /// come back through `complete_search`. At most one upload is in flight:
    /// submitting while `Uploading` is blocked without touching any state.
    pub fn begin_search(&mut self) -> Result<PendingSearch, SubmitBlocked> {
        if self.state == SessionState::Uploading {
            return Err(SubmitBlocked::SearchInFlight);
        }

        let file = self.selected.as_ref().ok_or(SubmitBlocked::NoFileSelected)?;

        self.token += 1;
        let pending = PendingSearch {
            token: SearchToken(self.token),
            file_name: file.file_name(),
            bytes: Arc::clone(file.bytes()),
        };

        self.error = None;
        self.state = SessionState::Uploading;

        Ok(pending)
    }

    /// Apply the outcome of a finished transfer.
    ///
    /// A completion carrying a stale token belongs to a request that was
    /// superseded by a newer selection or submission; it is discarded
    /// without mutating anything and `false` is returned. Results are
    /// stored verbatim. On failure the previous result list is cleared as
    /// well: showing a stale grid under an error banner would misread as
    /// current.
    pub fn complete_search(
        &mut self,
        token: SearchToken,
        outcome: Result<Vec<SearchResult>, TransferError>,
    ) -> bool {
        if token.0 != self.token {
            tracing::debug!(
                stale = token.0,
                current = self.token,
                "discarding completion for superseded search"
            );
            return false;
        }

        match outcome {
            Ok(results) => {
                tracing::info!(count = results.len(), "search completed");
                self.results = results;
                self.error = None;
                self.state = SessionState::ResultsReady;
            }
            Err(err) => {
                tracing::warn!(error = %err, "search failed");
                self.results.clear();
                self.error = Some(err.to_string());
                self.state = SessionState::Failed;
            }
        }

        true
    }

    /// Move the similarity threshold; out-of-range input is clamped to [0, 1].
    ///
    /// No workflow transition: the filtered view simply recomputes.
    pub fn set_threshold(&mut self, value: f32) {
        self.threshold = value.clamp(0.0, 1.0);
    }

    /// The matches to display: results at or above the current threshold,
    /// in the service's rank order. Recomputed on every call.
    pub fn visible_results(&self) -> Vec<&SearchResult> {
        filter::similar_at_least(&self.results, self.threshold)
    }
}
