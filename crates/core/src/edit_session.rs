//! Editor session state machine for a single timeline.
//!
//! The canvas starts read-only (`Viewing`). Editing mutates an in-memory copy
//! of the graph and header; nothing is persisted until `begin_save` hands the
//! draft to the caller, who performs the write and reports back with
//! `save_succeeded` or `save_failed`. While a write is in flight the session
//! is `Saving` and refuses a second save, further edits, and cancel.
//!
//! ```text
//!            begin_edit                 begin_save
//!  Viewing ─────────────▶ Editing ─────────────────▶ Saving
//!     ▲                    │   ▲                       │
//!     │      cancel        │   │     save_failed       │
//!     ├────────────────────┘   └───────────────────────┤
//!     │                     save_succeeded             │
//!     └────────────────────────────────────────────────┘
//! ```

use crate::timeline::{DEFAULT_DESCRIPTION, DEFAULT_TITLE};
use crate::timeline_graph::{GraphPayload, TimelineGraph};
use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Viewing,
    Editing,
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Timeline is read-only until editing begins")]
    NotEditing,

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("No save is in progress")]
    NoSaveInProgress,
}

/// Header and graph of a timeline as the editor sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineDraft {
    pub title: String,
    pub description: String,
    pub graph: GraphPayload,
}

/// What the caller must persist after [`EditSession::begin_save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// `None` for a timeline that has never been stored (create, not update).
    pub timeline_id: Option<DbId>,
    pub draft: TimelineDraft,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    timeline_id: Option<DbId>,
    mode: EditMode,
    /// Last persisted state; `cancel` restores it.
    persisted: TimelineDraft,
    title: String,
    description: String,
    graph: TimelineGraph,
    last_error: Option<String>,
}

impl EditSession {
    /// Open a stored timeline read-only.
    pub fn open(timeline_id: DbId, persisted: TimelineDraft) -> Self {
        Self::from_persisted(Some(timeline_id), persisted, EditMode::Viewing)
    }

    /// Start a timeline that does not exist yet. The session begins in
    /// `Editing` with the starter graph and placeholder header.
    pub fn new_timeline() -> Self {
        let draft = TimelineDraft {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            graph: TimelineGraph::starter().serialize(),
        };
        Self::from_persisted(None, draft, EditMode::Editing)
    }

    fn from_persisted(timeline_id: Option<DbId>, persisted: TimelineDraft, mode: EditMode) -> Self {
        Self {
            timeline_id,
            mode,
            title: persisted.title.clone(),
            description: persisted.description.clone(),
            graph: TimelineGraph::deserialize(persisted.graph.clone()),
            persisted,
            last_error: None,
        }
    }

    pub fn timeline_id(&self) -> Option<DbId> {
        self.timeline_id
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn graph(&self) -> &TimelineGraph {
        &self.graph
    }

    /// Message from the most recent failed save, cleared by the next
    /// successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the working copy differs from the last persisted state.
    pub fn is_dirty(&self) -> bool {
        self.working_draft() != self.persisted
    }

    fn working_draft(&self) -> TimelineDraft {
        TimelineDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            graph: self.graph.serialize(),
        }
    }

    fn require_editing(&self) -> Result<(), SessionError> {
        match self.mode {
            EditMode::Editing => Ok(()),
            EditMode::Viewing => Err(SessionError::NotEditing),
            EditMode::Saving => Err(SessionError::SaveInProgress),
        }
    }

    // -- Transitions --------------------------------------------------------

    /// Viewing → Editing. A no-op when already editing.
    pub fn begin_edit(&mut self) -> Result<(), SessionError> {
        match self.mode {
            EditMode::Viewing | EditMode::Editing => {
                self.mode = EditMode::Editing;
                Ok(())
            }
            EditMode::Saving => Err(SessionError::SaveInProgress),
        }
    }

    /// Editing → Viewing, discarding every unsaved change.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        match self.mode {
            EditMode::Saving => Err(SessionError::SaveInProgress),
            EditMode::Viewing | EditMode::Editing => {
                self.title = self.persisted.title.clone();
                self.description = self.persisted.description.clone();
                self.graph = TimelineGraph::deserialize(self.persisted.graph.clone());
                self.mode = EditMode::Viewing;
                Ok(())
            }
        }
    }

    /// Editing → Saving. Returns the draft to persist.
    pub fn begin_save(&mut self) -> Result<SaveRequest, SessionError> {
        self.require_editing()?;
        self.mode = EditMode::Saving;
        Ok(SaveRequest {
            timeline_id: self.timeline_id,
            draft: self.working_draft(),
        })
    }

    /// Saving → Viewing. `persisted` is what the store returned and becomes
    /// the new restore point.
    pub fn save_succeeded(
        &mut self,
        timeline_id: DbId,
        persisted: TimelineDraft,
    ) -> Result<(), SessionError> {
        if self.mode != EditMode::Saving {
            return Err(SessionError::NoSaveInProgress);
        }
        *self = Self::from_persisted(Some(timeline_id), persisted, EditMode::Viewing);
        Ok(())
    }

    /// Saving → Editing. Unsaved edits are kept so the user can retry.
    pub fn save_failed(&mut self, reason: impl Into<String>) -> Result<(), SessionError> {
        if self.mode != EditMode::Saving {
            return Err(SessionError::NoSaveInProgress);
        }
        self.last_error = Some(reason.into());
        self.mode = EditMode::Editing;
        Ok(())
    }

    // -- Edits --------------------------------------------------------------

    /// Mutable access to the working graph; only while editing.
    pub fn graph_mut(&mut self) -> Result<&mut TimelineGraph, SessionError> {
        self.require_editing()?;
        Ok(&mut self.graph)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), SessionError> {
        self.require_editing()?;
        self.title = title.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), SessionError> {
        self.require_editing()?;
        self.description = description.into();
        Ok(())
    }
}
