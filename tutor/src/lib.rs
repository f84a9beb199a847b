//! # Tutor
//!
//! Guided-dialogue sessions over an ingested paper.
//!
//! A session is created from a [`readiscover_paper::PaperStructure`] and a
//! list of concepts derived by the completion capability. Each turn sends the
//! learner's answer with the stored history, then parses the reply for the
//! protocol markers that drive the session forward.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                            Tutor                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  start_session ──► ConceptDeriver ──► opening message        │
//! │        │                                      │              │
//! │        ▼                                      ▼              │
//! │  SessionRegistry ◄──────────────────── Session (Active)      │
//! │        │                                                     │
//! │  submit_answer ──► provider ──► markers / disclosure         │
//! │                                      │                       │
//! │                                      ▼                       │
//! │                          apply_turn ──► TurnOutcome          │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod concept;
pub mod config;
pub mod disclosure;
pub mod error;
pub mod markers;
pub mod prompts;
pub mod registry;
pub mod service;
pub mod session;

pub use concept::{Concept, ConceptDeriver, parse_concepts};
pub use config::{DEFAULT_INACTIVITY_TIMEOUT_SECS, FALLBACK_TITLE, TutorConfig};
pub use disclosure::{DisclosedFigure, disclose_figures, strip_figure_markers};
pub use error::{Result, TutorError};
pub use markers::{parse_progress, signals_completion, signals_concept_advance, strip_markers};
pub use registry::{SessionHandle, SessionRegistry};
pub use service::{SessionStarted, StartSession, Tutor};
pub use session::{DialogueTurn, Session, SessionState, Speaker, TurnOutcome};
