#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use readiscover_completion::{
    CompletionError, CompletionProvider, CompletionRequest, CompletionResponse, Credential,
};
use readiscover_paper::{Figure, FigureFormat, PaperStructure};
use readiscover_tutor::{SessionRegistry, StartSession, Tutor, TutorConfig};

/// Provider that replays canned replies and records every request.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn push_failure(&self, error: CompletionError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> readiscover_completion::Result<CompletionResponse> {
        let model = request.model.clone().unwrap_or_default();
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(CompletionResponse {
                text,
                model,
                tokens_used: None,
            }),
            Some(Err(error)) => Err(error),
            None => Err(CompletionError::InvalidResponse(
                "script exhausted".to_string(),
            )),
        }
    }
}

pub fn concepts_json(n: usize) -> String {
    let items: Vec<serde_json::Value> = (1..=n)
        .map(|i| {
            serde_json::json!({
                "id": i,
                "title": format!("Concept {i}"),
                "core_idea": format!("Idea {i}."),
                "required_background": "",
                "relevant_figures": ["fig:res"]
            })
        })
        .collect();
    format!(
        "Here are the concepts:\n{}\n",
        serde_json::Value::Array(items)
    )
}

pub fn structure(title: &str) -> PaperStructure {
    PaperStructure {
        title: title.to_string(),
        main_document_path: "main.tex".to_string(),
        full_text: "% File: main.tex\n\\section{Results}".to_string(),
        figures: vec![Figure {
            label: "fig:res".to_string(),
            caption: Some("Results".to_string()),
            source_path: "plots/fig1.png".to_string(),
            format: FigureFormat::Png,
            encoded_payload: "iVBORw==".to_string(),
        }],
    }
}

pub fn start_request(title: &str) -> StartSession {
    StartSession {
        structure: structure(title),
        credential: Credential::new("sk-or-test"),
        knowledge: "I know linear algebra.".to_string(),
    }
}

pub fn tutor(provider: Arc<ScriptedProvider>, registry: Arc<SessionRegistry>) -> Tutor {
    Tutor::new(provider, registry, TutorConfig::default())
}
