//! Purpose: Built-in templates addressable by name.
//! Exports: `Preset`.
//! Role: Ships the issue-search projection so callers need no template file for it.
//! Invariants: Presets go through the same validation as user templates.
//! Invariants: Names are stable, kebab-case, and listed by `Preset::ALL`.

use serde_json::{Value, json};

use crate::core::error::{Error, ErrorKind};
use crate::core::template::Template;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Preset {
    /// Issue search response: `total` plus `id`, `self` and `key` of every issue.
    IssueSearch,
}

impl Preset {
    pub const ALL: &'static [Preset] = &[Preset::IssueSearch];

    pub fn name(self) -> &'static str {
        match self {
            Preset::IssueSearch => "issue-search",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::IssueSearch => "total plus id/self/key collected from issues[]",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|preset| preset.name() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|preset| preset.name()).collect();
                Error::new(ErrorKind::NotFound)
                    .with_message(format!("unknown preset `{name}`"))
                    .with_hint(format!("Known presets: {}.", known.join(", ")))
            })
    }

    pub fn template_json(self) -> Value {
        match self {
            Preset::IssueSearch => json!({
                "total": "total",
                "id": {"keyName": "issues", "fields": ["id"]},
                "self": {"keyName": "issues", "fields": ["self"]},
                "key": {"keyName": "issues", "fields": ["key"]}
            }),
        }
    }

    pub fn template(self) -> Result<Template, Error> {
        Template::parse(&self.template_json())
    }
}

#[cfg(test)]
mod tests {
    use super::Preset;
    use crate::core::error::ErrorKind;
    use crate::core::projector::project;
    use serde_json::json;

    #[test]
    fn every_preset_parses_and_round_trips_its_name() {
        for preset in Preset::ALL {
            assert!(preset.template().is_ok(), "{} must parse", preset.name());
            assert_eq!(Preset::from_name(preset.name()).unwrap(), *preset);
        }
    }

    #[test]
    fn unknown_preset_is_not_found_with_hint() {
        let err = Preset::from_name("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.hint().unwrap().contains("issue-search"));
    }

    #[test]
    fn issue_search_shapes_a_search_response() {
        let response = json!({
            "expand": "schema,names",
            "startAt": 0,
            "maxResults": 50,
            "total": 2,
            "issues": [
                {"id": "10001", "self": "https://jira.example/rest/api/2/issue/10001", "key": "OPS-1", "fields": {}},
                {"id": "10002", "self": "https://jira.example/rest/api/2/issue/10002", "key": "OPS-2", "fields": {}}
            ]
        });
        let template = Preset::IssueSearch.template().unwrap();
        assert_eq!(
            project(&response, &template),
            Some(json!({
                "total": 2,
                "id": ["10001", "10002"],
                "self": [
                    "https://jira.example/rest/api/2/issue/10001",
                    "https://jira.example/rest/api/2/issue/10002"
                ],
                "key": ["OPS-1", "OPS-2"]
            }))
        );
    }

    #[test]
    fn issue_search_on_empty_result_keeps_total_and_empty_lists() {
        let template = Preset::IssueSearch.template().unwrap();
        assert_eq!(
            project(&json!({"total": 0, "issues": []}), &template),
            Some(json!({"total": 0, "id": [], "self": [], "key": []}))
        );
        assert_eq!(project(&json!({"errorMessages": ["bad jql"]}), &template), None);
    }
}
