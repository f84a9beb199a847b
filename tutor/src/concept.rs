//! Concept derivation through the completion capability.

use std::sync::Arc;

use readiscover_completion::{ChatMessage, CompletionProvider, CompletionRequest, Credential};
use readiscover_paper::PaperStructure;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TutorError};
use crate::prompts;

/// One unit of guided discussion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// 1-based sequential id as given by the deriver.
    #[serde(default, deserialize_with = "id_from_number_or_string")]
    pub id: u32,

    pub title: String,

    #[serde(default)]
    pub core_idea: String,

    #[serde(default)]
    pub required_background: String,

    /// Figure labels that help explain this concept.
    #[serde(default)]
    pub relevant_figures: Vec<String>,

    #[serde(default)]
    pub discovery_path: Option<String>,
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u32),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(n),
        RawId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid concept id {s:?}"))),
    }
}

/// Decode the concept list from a deriver response.
///
/// The span from the first `[` to the last `]` must be a non-empty JSON
/// array of concepts; any surrounding prose is ignored.
pub fn parse_concepts(text: &str) -> Result<Vec<Concept>> {
    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return Err(TutorError::Upstream(
            "failed to extract concepts from summarizer response".to_string(),
        ));
    };
    if end < start {
        return Err(TutorError::Upstream(
            "failed to extract concepts from summarizer response".to_string(),
        ));
    }

    let concepts: Vec<Concept> = serde_json::from_str(&text[start..=end])
        .map_err(|e| TutorError::Upstream(format!("invalid concept list: {e}")))?;

    if concepts.is_empty() {
        return Err(TutorError::Upstream(
            "summarizer returned no concepts".to_string(),
        ));
    }
    Ok(concepts)
}

/// Turns a paper structure and the learner's background into concepts.
pub struct ConceptDeriver {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    temperature: f32,
}

impl ConceptDeriver {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    /// Ask the provider for the paper's concepts and parse the answer.
    pub async fn derive(
        &self,
        credential: &Credential,
        structure: &PaperStructure,
        knowledge: &str,
    ) -> Result<Vec<Concept>> {
        debug!(
            "Deriving concepts for {:?} with model {}",
            structure.title, self.model
        );

        let messages = vec![
            ChatMessage::system(prompts::analysis_system_prompt(structure, knowledge)),
            ChatMessage::user(prompts::analysis_user_prompt(structure)),
        ];
        let request = CompletionRequest::new(credential.clone(), messages)
            .with_model(self.model.clone())
            .with_temperature(self.temperature);

        let response = self.provider.complete(request).await?;
        let concepts = parse_concepts(&response.text)?;

        info!("Derived {} concepts", concepts.len());
        Ok(concepts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_concepts_with_surrounding_prose() {
        let text = r#"Here you go:
[
  {"id": 1, "title": "Attention", "core_idea": "Weigh tokens.", "required_background": "Linear algebra", "relevant_figures": ["fig:arch"]},
  {"id": "2", "title": "Positional encoding"}
]
Hope this helps."#;
        let concepts = parse_concepts(text).unwrap();
        assert_eq!(concepts.len(), 2);
        assert_eq!(concepts[0].id, 1);
        assert_eq!(concepts[0].relevant_figures, vec!["fig:arch".to_string()]);
        assert_eq!(concepts[1].id, 2);
        assert_eq!(concepts[1].core_idea, "");
        assert_eq!(concepts[1].discovery_path, None);
    }

    #[test]
    fn test_parse_concepts_without_array() {
        let err = parse_concepts("I could not read the paper.").unwrap_err();
        assert!(matches!(err, TutorError::Upstream(_)));
    }

    #[test]
    fn test_parse_concepts_invalid_json() {
        let err = parse_concepts("[{\"title\": }]").unwrap_err();
        assert!(matches!(err, TutorError::Upstream(_)));
    }

    #[test]
    fn test_parse_concepts_rejects_non_numeric_id() {
        let err = parse_concepts(r#"[{"id": "first", "title": "Attention"}]"#).unwrap_err();
        assert!(matches!(err, TutorError::Upstream(_)));
    }

    #[test]
    fn test_parse_concepts_empty_list() {
        let err = parse_concepts("[]").unwrap_err();
        assert!(matches!(err, TutorError::Upstream(_)));
    }

    #[test]
    fn test_parse_concepts_reversed_brackets() {
        let err = parse_concepts("] nothing [").unwrap_err();
        assert!(matches!(err, TutorError::Upstream(_)));
    }
}
