//! Tutoring session state and the per-turn transition rule.

use chrono::{DateTime, Utc};
use readiscover_completion::{ChatMessage, Credential};
use readiscover_paper::PaperStructure;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::concept::Concept;
use crate::disclosure::{DisclosedFigure, disclose_figures};
use crate::error::{Result, TutorError};
use crate::markers::{parse_progress, signals_completion, signals_concept_advance, strip_markers};

/// Lifecycle of a session.
///
/// Sessions are registered already `Active`; `Initializing` covers callers
/// that assemble one step by step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Initializing,
    Active,
    Completed,
}

/// Who produced a dialogue turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One stored message; never contains protocol markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub role: Speaker,
    pub text: String,
}

impl DialogueTurn {
    fn to_chat_message(&self) -> ChatMessage {
        match self.role {
            Speaker::User => ChatMessage::user(self.text.clone()),
            Speaker::Assistant => ChatMessage::assistant(self.text.clone()),
        }
    }
}

/// Result of one answer/response exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Generated reply with markers removed.
    pub tutor_message: String,

    /// 1-based index of the active concept after this turn.
    pub current_concept: usize,

    pub is_complete: bool,

    /// Figures referenced by the reply, each once.
    pub figures: Vec<DisclosedFigure>,

    /// Progress estimate from the reply, absent when not given.
    pub progress_percentage: Option<u8>,
}

/// A live tutoring session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub credential: Credential,
    pub knowledge_text: String,
    pub structure: PaperStructure,
    pub concepts: Vec<Concept>,
    pub history: Vec<DialogueTurn>,

    /// 1-based; always within `1..=concepts.len()`.
    pub current_concept: usize,

    pub state: SessionState,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create an active session whose history opens with `opening_message`.
    pub fn new(
        id: impl Into<String>,
        credential: Credential,
        knowledge_text: impl Into<String>,
        structure: PaperStructure,
        concepts: Vec<Concept>,
        opening_message: impl Into<String>,
    ) -> Result<Self> {
        if concepts.is_empty() {
            return Err(TutorError::Upstream(
                "a session needs at least one concept".to_string(),
            ));
        }

        Ok(Self {
            id: id.into(),
            credential,
            knowledge_text: knowledge_text.into(),
            structure,
            concepts,
            history: vec![DialogueTurn {
                role: Speaker::Assistant,
                text: opening_message.into(),
            }],
            current_concept: 1,
            state: SessionState::Active,
            created_at: Utc::now(),
        })
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// The concept under discussion.
    pub fn current(&self) -> Option<&Concept> {
        self.concepts.get(self.current_concept.saturating_sub(1))
    }

    /// Stored history followed by a pending answer, as provider messages.
    pub fn transcript_with(&self, answer: &str) -> Vec<ChatMessage> {
        self.history
            .iter()
            .map(DialogueTurn::to_chat_message)
            .chain(std::iter::once(ChatMessage::user(answer)))
            .collect()
    }

    /// Apply one exchange: record it, advance the cursor and detect completion.
    ///
    /// The cursor moves by at most one per turn. Completion requires the
    /// cursor to sit on the last concept and either an advance signal or a
    /// completion phrase in this reply.
    pub fn apply_turn(&mut self, answer: &str, generated: &str) -> Result<TurnOutcome> {
        if self.state != SessionState::Active {
            return Err(TutorError::SessionNotFound(self.id.clone()));
        }

        let progress_percentage = parse_progress(generated);
        let figures = disclose_figures(generated, &self.structure.figures);
        let tutor_message = strip_markers(generated);

        let advance = signals_concept_advance(generated);
        if advance && self.current_concept < self.concepts.len() {
            self.current_concept += 1;
            info!("[{}] Moving to concept {}", self.id, self.current_concept);
        }

        let is_complete = self.current_concept >= self.concepts.len()
            && (advance || signals_completion(generated));

        self.history.push(DialogueTurn {
            role: Speaker::User,
            text: answer.to_string(),
        });
        self.history.push(DialogueTurn {
            role: Speaker::Assistant,
            text: tutor_message.clone(),
        });

        if is_complete {
            self.state = SessionState::Completed;
            info!("[{}] Session complete", self.id);
        }

        Ok(TurnOutcome {
            tutor_message,
            current_concept: self.current_concept,
            is_complete,
            figures,
            progress_percentage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use readiscover_paper::{Figure, FigureFormat};

    fn concepts(n: usize) -> Vec<Concept> {
        (1..=n)
            .map(|i| Concept {
                id: u32::try_from(i).unwrap(),
                title: format!("Concept {i}"),
                core_idea: String::new(),
                required_background: String::new(),
                relevant_figures: Vec::new(),
                discovery_path: None,
            })
            .collect()
    }

    fn session(n: usize) -> Session {
        let structure = PaperStructure {
            title: "Paper".to_string(),
            figures: vec![Figure {
                label: "fig:res".to_string(),
                caption: Some("Results".to_string()),
                source_path: "plots/fig1.png".to_string(),
                format: FigureFormat::Png,
                encoded_payload: "iVBORw==".to_string(),
            }],
            ..Default::default()
        };
        Session::new(
            "s-1",
            Credential::new("k"),
            "",
            structure,
            concepts(n),
            "Welcome",
        )
        .unwrap()
    }

    #[test]
    fn test_new_requires_concepts() {
        let err = Session::new(
            "s",
            Credential::new("k"),
            "",
            PaperStructure::default(),
            Vec::new(),
            "hi",
        )
        .unwrap_err();
        assert!(matches!(err, TutorError::Upstream(_)));
    }

    #[test]
    fn test_marker_stripping_and_disclosure() {
        let mut s = session(3);
        let outcome = s
            .apply_turn(
                "It compares outputs.",
                "PROGRESS: 40%\nLook at {{fig:res}} for evidence. Again: {{fig:res}}",
            )
            .unwrap();

        assert_eq!(outcome.progress_percentage, Some(40));
        assert_eq!(outcome.figures.len(), 1);
        assert_eq!(outcome.figures[0].label, "fig:res");
        assert_eq!(outcome.tutor_message, "Look at  for evidence. Again:");
        assert_eq!(outcome.current_concept, 1);
        assert!(!outcome.is_complete);
    }

    #[test]
    fn test_history_never_holds_markers() {
        let mut s = session(3);
        s.apply_turn("a", "PROGRESS: 40%\nLook at {{fig:res}} for evidence.")
            .unwrap();
        assert_eq!(
            s.history,
            vec![
                DialogueTurn {
                    role: Speaker::Assistant,
                    text: "Welcome".to_string()
                },
                DialogueTurn {
                    role: Speaker::User,
                    text: "a".to_string()
                },
                DialogueTurn {
                    role: Speaker::Assistant,
                    text: "Look at  for evidence.".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_decimal_progress_never_reaches_history() {
        let mut s = session(3);
        let outcome = s.apply_turn("a", "PROGRESS: 40.5%\nLook at this.").unwrap();

        assert_eq!(outcome.progress_percentage, Some(41));
        assert_eq!(outcome.tutor_message, "Look at this.");
        assert!(s.history.iter().all(|turn| !turn.text.contains("PROGRESS")));
    }

    #[test]
    fn test_advance_is_idempotent_within_a_turn() {
        let mut s = session(3);
        let outcome = s
            .apply_turn(
                "got it",
                "Let's move to the next concept. Yes, let's move to the next concept!",
            )
            .unwrap();
        assert_eq!(outcome.current_concept, 2);
        assert!(!outcome.is_complete);
    }

    #[test]
    fn test_advancing_onto_last_concept_completes() {
        let mut s = session(2);
        let outcome = s
            .apply_turn("ok", "Ready for the next concept?")
            .unwrap();
        assert_eq!(outcome.current_concept, 2);
        assert!(outcome.is_complete);
        assert!(s.is_complete());
    }

    #[test]
    fn test_completion_phrase_on_last_concept() {
        let mut s = session(1);
        let outcome = s.apply_turn("done", "The session is complete.").unwrap();
        assert_eq!(outcome.current_concept, 1);
        assert!(outcome.is_complete);
    }

    #[test]
    fn test_completion_phrase_before_last_concept_is_ignored() {
        let mut s = session(2);
        let outcome = s.apply_turn("done", "That part is complete.").unwrap();
        assert!(!outcome.is_complete);
        assert_eq!(s.state, SessionState::Active);
    }

    #[test]
    fn test_completed_session_rejects_turns() {
        let mut s = session(1);
        s.apply_turn("done", "complete").unwrap();
        let err = s.apply_turn("again", "hello").unwrap_err();
        assert!(matches!(err, TutorError::SessionNotFound(id) if id == "s-1"));
    }

    #[test]
    fn test_transcript_with_pending_answer() {
        let s = session(2);
        let messages = s.transcript_with("my answer");
        assert_eq!(
            messages,
            vec![ChatMessage::assistant("Welcome"), ChatMessage::user("my answer")]
        );
    }
}
