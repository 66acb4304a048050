//! Reading the parts of a Jira webhook event that matter for the task description.

use miette::Diagnostic;
use serde_json::Value;

/// Pull `issue.fields.labels` out of a Jira webhook payload.
///
/// Any missing key along the path yields an empty list. A key that is present with the wrong
/// JSON type is a [`MalformedEvent`]. Non-string entries inside `labels` are skipped.
pub fn labels(event: &Value) -> Result<Vec<&str>, MalformedEvent> {
    let event = event
        .as_object()
        .ok_or(MalformedEvent::NotAnObject { path: "<event>" })?;
    let Some(issue) = event.get("issue") else {
        return Ok(Vec::new());
    };
    let issue = issue
        .as_object()
        .ok_or(MalformedEvent::NotAnObject { path: "issue" })?;
    let Some(fields) = issue.get("fields") else {
        return Ok(Vec::new());
    };
    let fields = fields.as_object().ok_or(MalformedEvent::NotAnObject {
        path: "issue.fields",
    })?;
    match fields.get("labels") {
        None => Ok(Vec::new()),
        Some(Value::Array(labels)) => Ok(labels.iter().filter_map(Value::as_str).collect()),
        Some(_) => Err(MalformedEvent::LabelsNotAList),
    }
}

#[derive(Debug, Diagnostic, thiserror::Error, PartialEq, Eq)]
pub enum MalformedEvent {
    #[error("Expected `{path}` to be a JSON object")]
    #[diagnostic(code(event::not_an_object))]
    NotAnObject { path: &'static str },
    #[error("Expected `issue.fields.labels` to be a list")]
    #[diagnostic(code(event::labels_not_a_list))]
    LabelsNotAList,
}

/// Recognised labels, highest priority first. The first one present on an issue becomes the new
/// task description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelPriority(Vec<String>);

impl LabelPriority {
    /// Parse a comma-separated list, e.g. `Due,Ready`. Blank entries are dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The highest-priority recognised label present in `labels`, regardless of where it appears.
    #[must_use]
    pub fn select(&self, labels: &[&str]) -> Option<&str> {
        self.0
            .iter()
            .find(|recognised| labels.contains(&recognised.as_str()))
            .map(String::as_str)
    }
}

impl Default for LabelPriority {
    fn default() -> Self {
        Self(vec!["Due".to_string(), "Ready".to_string()])
    }
}


#[cfg(test)]
mod test_label_priority {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn due_wins_regardless_of_position() {
        let priority = LabelPriority::default();

        assert_eq!(priority.select(&["Ready", "Due"]), Some("Due"));
        assert_eq!(priority.select(&["Due", "Ready"]), Some("Due"));
        assert_eq!(priority.select(&["Blocked", "Due", "Other"]), Some("Due"));
    }

    #[test]
    fn ready_without_due() {
        let priority = LabelPriority::default();

        assert_eq!(priority.select(&["Blocked", "Ready"]), Some("Ready"));
    }

    #[test]
    fn nothing_recognised() {
        let priority = LabelPriority::default();

        assert_eq!(priority.select(&["Blocked"]), None);
        assert_eq!(priority.select(&[]), None);
    }

    #[test]
    fn match_is_exact() {
        let priority = LabelPriority::default();

        assert_eq!(priority.select(&["due", "Ready-ish"]), None);
    }

    #[test]
    fn parse_trims_and_drops_blanks() {
        assert_eq!(LabelPriority::parse(" Due , ,Ready"), LabelPriority::default());
    }
}
