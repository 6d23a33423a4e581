//! Read-only task input consumed by routing and execution.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a task, as reported by the task/PRD subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Finished; excluded from cost estimates.
    Completed,
}

/// A unit of work handed to the router and cascade.
///
/// Tasks are produced by the task/PRD subsystem and are read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable task identifier.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Longer description of the work.
    pub description: String,
    /// Acceptance criteria, one entry per criterion.
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    /// Ids of tasks this one depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Current lifecycle status.
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// Creates a pending task with no criteria or dependencies.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            acceptance_criteria: Vec::new(),
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
        }
    }

    /// Adds acceptance criteria.
    #[must_use]
    pub fn with_criteria(mut self, criteria: &[&str]) -> Self {
        self.acceptance_criteria = criteria.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Total character length of title, description and criteria.
    ///
    /// This is the input-size measure the token estimate is based on.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.title.len()
            + self.description.len()
            + self
                .acceptance_criteria
                .iter()
                .map(String::len)
                .sum::<usize>()
    }

    /// All task text joined and lowercased, for heuristic classification.
    #[must_use]
    pub fn normalized_text(&self) -> String {
        let mut text = String::with_capacity(self.text_len() + 16);
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.description);
        for criterion in &self.acceptance_criteria {
            text.push(' ');
            text.push_str(criterion);
        }
        text.to_lowercase()
    }

    /// Renders the task as a prompt for the injected executor.
    #[must_use]
    pub fn to_prompt(&self) -> String {
        let mut prompt = format!("{}\n\n{}", self.title, self.description);
        if !self.acceptance_criteria.is_empty() {
            prompt.push_str("\n\nAcceptance criteria:");
            for criterion in &self.acceptance_criteria {
                prompt.push_str("\n- ");
                prompt.push_str(criterion);
            }
        }
        prompt
    }
}
