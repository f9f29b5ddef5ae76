//! Problems Loaded for Editing
//!
//! The editor works on documents, storage holds Markdown. A [`ProblemDraft`]
//! is the editor-side copy of a stored problem: every rich-text section is a
//! [`LoadedField`] whose format was decided once, from the row's format tag
//! or by sniffing a legacy row. Turning the draft back into a save payload
//! always produces Markdown.

use crate::markdown::LoadedField;
use crate::models::problem::{Difficulty, ProblemPayload, ProblemView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemDraft {
    pub slug: String,
    pub title: String,
    pub description: LoadedField,
    pub examples: Vec<LoadedField>,
    pub requirements: LoadedField,
    pub theory: LoadedField,
    pub hints: Vec<LoadedField>,
    pub constraints: LoadedField,
    pub difficulty: Difficulty,
    pub runner_template: String,
    pub tag_ids: Vec<String>,
}

impl ProblemDraft {
    pub fn from_view(view: &ProblemView) -> Self {
        let problem = &view.problem;
        let declared = problem.content_format;
        let load = |raw: &String| LoadedField::load(raw, declared);

        Self {
            slug: problem.id.clone(),
            title: problem.title.clone(),
            description: load(&problem.description),
            examples: problem.examples.iter().map(load).collect(),
            requirements: load(&problem.requirements),
            theory: load(&problem.theory),
            hints: problem.hints.iter().map(load).collect(),
            constraints: load(&problem.constraints),
            difficulty: problem.difficulty,
            runner_template: problem.runner_template.clone(),
            tag_ids: view.tag_ids(),
        }
    }

    /// Save payload with every section serialized to Markdown
    pub fn to_payload(&self) -> ProblemPayload {
        let markdown = |fields: &[LoadedField]| -> Vec<String> {
            fields.iter().map(LoadedField::to_markdown).collect()
        };

        ProblemPayload {
            slug: Some(self.slug.clone()),
            title: Some(self.title.clone()),
            description: Some(self.description.to_markdown()),
            examples: Some(markdown(&self.examples)),
            requirements: Some(self.requirements.to_markdown()),
            theory: Some(self.theory.to_markdown()),
            hints: Some(markdown(&self.hints)),
            constraints: Some(self.constraints.to_markdown()),
            difficulty: Some(self.difficulty.as_str().to_string()),
            tag_ids: Some(self.tag_ids.clone()),
            runner_template: Some(self.runner_template.clone()),
        }
    }
}
