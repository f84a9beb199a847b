//! Prompt construction for concept derivation and dialogue turns.
//!
//! Prompts describe the output conventions the session protocol parses:
//! a leading `PROGRESS: <n>%` line, `{{label}}` figure markers and the
//! "move to the next concept" phrase.

use readiscover_paper::PaperStructure;

use crate::concept::Concept;

/// User message that opens a session.
pub const OPENING_REQUEST: &str = "Begin the tutoring session.";

const NO_BACKGROUND: &str = "(not provided)";

fn background(knowledge: &str) -> &str {
    if knowledge.trim().is_empty() {
        NO_BACKGROUND
    } else {
        knowledge
    }
}

/// Leading `chars` characters of the paper text.
pub fn excerpt(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

pub fn analysis_system_prompt(structure: &PaperStructure, knowledge: &str) -> String {
    let labels = structure.figure_labels().join(", ");
    format!(
        "You analyze research papers from their LaTeX source. You are given the \
complete source of one paper, every file included.

Identify the concepts a reader must understand, ordered so that each builds on \
the previous ones. Skip what the reader already knows. Attach the figures that \
help explain each concept. Aim for five to eight concepts.

Paper title: {title}
Available figures: {labels}

Reader background:
{background}

Answer with a JSON array only. Each element has the keys: id (sequential \
number), title, core_idea (two or three sentences), required_background, \
relevant_figures (array of figure labels) and optionally discovery_path.",
        title = structure.title,
        background = background(knowledge),
    )
}

pub fn analysis_user_prompt(structure: &PaperStructure) -> String {
    format!(
        "Complete LaTeX source:\n\n{}\n\nList the key concepts as a JSON array.",
        structure.full_text
    )
}

pub fn opening_system_prompt(title: &str, concepts: &[Concept], knowledge: &str) -> String {
    let outline = concepts
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}: {}", i + 1, c.title, c.core_idea))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a tutor helping a researcher rediscover the ideas of the paper \
\"{title}\". You will lead them through {count} concepts by asking questions \
rather than lecturing, adapting to what they already know.

Reader background:
{background}

Concepts:
{outline}

Greet the reader and open the first concept with a question that reveals how \
much they already understand.",
        count = concepts.len(),
        background = background(knowledge),
    )
}

pub fn dialogue_system_prompt(
    concept: &Concept,
    position: usize,
    total: usize,
    knowledge: &str,
    paper_excerpt: &str,
) -> String {
    format!(
        "You are a tutor guiding a researcher through a paper.

Current concept ({position} of {total}):
Title: {title}
Core idea: {core_idea}
Required background: {required}
Relevant figures: {figures}

Reader background:
{background}

Paper excerpt:
{paper_excerpt}...

Start every reply with a line of the form `PROGRESS: <n>%` estimating how far \
the reader has understood the current concept. To show a figure, write its \
label in double braces, for example {{{{fig:architecture}}}}. Once the reader \
has understood this concept, say \"Let's move to the next concept\". After the \
last concept, tell them the session is complete. Use $ or $$ for mathematics.",
        title = concept.title,
        core_idea = concept.core_idea,
        required = concept.required_background,
        figures = concept.relevant_figures.join(", "),
        background = background(knowledge),
    )
}
