//! Purpose: Recursive pick/project engine that shapes a source document after a template.
//! Exports: `project`, `collect_array`, `Collected`.
//! Role: Pure core; reads the source through `resolve_path`, writes through `Output`.
//! Invariants: Total and side-effect free; identical inputs give identical outputs.
//! Invariants: Missing data contributes nothing; a level that produced nothing is `None` (ABSENT).
//! Invariants: Array-collect preserves element order and drops ABSENT elements.

use serde_json::{Map, Value};
use tracing::trace;

use super::output::Output;
use super::path::resolve_path;
use super::template::{FieldDescriptor, FieldKey, Template, TemplateEntry};

/// Result of projecting every element of a source array.
#[derive(Clone, Debug, PartialEq)]
pub enum Collected {
    /// Splice key: the collected array is the whole value of its level.
    Spliced(Vec<Value>),
    /// Named key: `{ key: [...] }`, merged into the level.
    Keyed(Map<String, Value>),
}

/// Project `source` through `template`. `None` is ABSENT.
pub fn project(source: &Value, template: &Template) -> Option<Value> {
    let mut output = Output::new();
    match template {
        Template::Sequence(refs) => {
            for path in refs {
                match resolve_path(source, path) {
                    Some(found) => {
                        trace!(path = %path, "key reference resolved");
                        output.replace(found.clone());
                    }
                    None => trace!(path = %path, "key reference absent"),
                }
            }
        }
        Template::Mapping(entries) => {
            for entry in entries {
                project_entry(source, entry, &mut output);
            }
        }
    }
    output.finish()
}

fn project_entry(source: &Value, entry: &TemplateEntry, output: &mut Output) {
    let path = entry.lookup_path();
    let Some(found) = resolve_path(source, path) else {
        trace!(path, "entry absent in source");
        return;
    };

    match entry {
        TemplateEntry::Leaf { key, .. } => output.assign(key, found.clone()),
        TemplateEntry::Field(descriptor) => match found {
            Value::Array(items) => match collect_array(items, descriptor) {
                Collected::Spliced(values) => output.replace(Value::Array(values)),
                Collected::Keyed(map) => output.merge(map),
            },
            other => {
                let Some(projected) = project(other, &descriptor.fields) else {
                    trace!(path, key = %descriptor.key, "nested projection absent");
                    return;
                };
                // Splicing only applies to array collection; objects land under the literal key.
                output.insert(descriptor.key.as_str(), projected);
            }
        },
    }
}

/// Project each element of `items` through `descriptor.fields`.
pub fn collect_array(items: &[Value], descriptor: &FieldDescriptor) -> Collected {
    let collected: Vec<Value> = items
        .iter()
        .filter_map(|item| project(item, &descriptor.fields))
        .collect();
    trace!(
        key = %descriptor.key,
        total = items.len(),
        kept = collected.len(),
        "array collected"
    );

    match &descriptor.key {
        FieldKey::Splice => Collected::Spliced(collected),
        FieldKey::Named(key) => {
            let mut wrapped = Map::new();
            wrapped.insert(key.clone(), Value::Array(collected));
            Collected::Keyed(wrapped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Collected, collect_array, project};
    use crate::core::template::{FieldDescriptor, FieldKey, Template};
    use serde_json::{Value, json};

    fn template(value: Value) -> Template {
        Template::parse(&value).expect("valid template")
    }

    fn issues() -> Value {
        json!({"issues": [{"id": "1", "self": "url1"}, {"id": "2", "self": "url2"}]})
    }

    #[test]
    fn all_missing_entries_collapse_to_absent() {
        let t = template(json!({"id": {"keyName": "issues", "fields": ["id"]}}));
        assert_eq!(project(&json!({}), &t), None);
        assert_eq!(project(&json!({"other": 1}), &template(json!({"a": "b"}))), None);
    }

    #[test]
    fn sequence_template_passes_the_value_through() {
        let t = template(json!(["key"]));
        assert_eq!(project(&json!({"key": "ABC-1"}), &t), Some(json!("ABC-1")));
    }

    #[test]
    fn sequence_template_last_resolved_wins() {
        let t = template(json!(["key", "missing", "id"]));
        assert_eq!(
            project(&json!({"key": "ABC-1", "id": "10"}), &t),
            Some(json!("10"))
        );
        assert_eq!(project(&json!({"key": "ABC-1"}), &t), Some(json!("ABC-1")));
    }

    #[test]
    fn named_collection_is_wrapped_under_its_key() {
        let t = template(json!({"id": {"keyName": "issues", "fields": ["id"]}}));
        assert_eq!(project(&issues(), &t), Some(json!({"id": ["1", "2"]})));
    }

    #[test]
    fn splice_collection_is_the_whole_value() {
        let t = template(json!({"-": {"keyName": "issues", "fields": ["id"]}}));
        assert_eq!(project(&issues(), &t), Some(json!(["1", "2"])));
    }

    #[test]
    fn absent_elements_are_dropped_in_order() {
        let source = json!({"issues": [{"id": "1"}, {}, {"id": "3"}]});
        let t = template(json!({"-": {"keyName": "issues", "fields": ["id"]}}));
        assert_eq!(project(&source, &t), Some(json!(["1", "3"])));
    }

    #[test]
    fn empty_source_array_still_yields_empty_collection() {
        let t = template(json!({"id": {"keyName": "issues", "fields": ["id"]}}));
        assert_eq!(project(&json!({"issues": []}), &t), Some(json!({"id": []})));
    }

    #[test]
    fn nested_object_descriptor_recurses() {
        let source = json!({"fields": {"summary": "Broken", "status": {"name": "Open"}}});
        let t = template(json!({
            "details": {"keyName": "fields", "fields": {
                "title": "summary",
                "state": "status.name"
            }}
        }));
        assert_eq!(
            project(&source, &t),
            Some(json!({"details": {"title": "Broken", "state": "Open"}}))
        );
    }

    #[test]
    fn absent_nested_object_is_not_stored() {
        let source = json!({"total": 1, "fields": {"other": true}});
        let t = template(json!({
            "total": "total",
            "details": {"keyName": "fields", "fields": {"title": "summary"}}
        }));
        assert_eq!(project(&source, &t), Some(json!({"total": 1})));

        let only_nested = template(json!({"details": {"keyName": "fields", "fields": ["x"]}}));
        assert_eq!(project(&source, &only_nested), None);
    }

    #[test]
    fn leaf_keys_rename_and_renest() {
        let source = json!({"total": 12, "startAt": 0});
        let t = template(json!({"page.total": "total", "page.offset": "startAt"}));
        assert_eq!(
            project(&source, &t),
            Some(json!({"page": {"total": 12, "offset": 0}}))
        );
    }

    #[test]
    fn present_null_is_copied_by_leaf_references() {
        let source = json!({"assignee": null});
        assert_eq!(
            project(&source, &template(json!({"owner": "assignee"}))),
            Some(json!({"owner": null}))
        );
        assert_eq!(
            project(&source, &template(json!({"owner": {"keyName": "assignee", "fields": ["name"]}}))),
            None
        );
    }

    #[test]
    fn first_entry_missing_does_not_lose_later_entries() {
        let t = template(json!({
            "missing": "nope",
            "total": "total",
            "id": {"keyName": "issues", "fields": ["id"]}
        }));
        let mut source = issues();
        source["total"] = json!(2);
        assert_eq!(
            project(&source, &t),
            Some(json!({"total": 2, "id": ["1", "2"]}))
        );
    }

    #[test]
    fn splice_discards_keyed_siblings_before_it() {
        let mut source = issues();
        source["total"] = json!(2);
        let t = template(json!({
            "total": "total",
            "-": {"keyName": "issues", "fields": {"ref": "self"}}
        }));
        assert_eq!(
            project(&source, &t),
            Some(json!([{"ref": "url1"}, {"ref": "url2"}]))
        );
    }

    #[test]
    fn splice_key_over_an_object_is_stored_under_its_literal_key() {
        let source = json!({"total": 2, "meta": {"a": 1}});
        let t = template(json!({
            "total": "total",
            "-": {"keyName": "meta", "fields": ["a"]}
        }));
        assert_eq!(project(&source, &t), Some(json!({"total": 2, "-": 1})));
    }

    #[test]
    fn nested_arrays_collect_recursively() {
        let source = json!({"issues": [
            {"key": "A-1", "comments": [{"body": "x"}, {"author": "z"}]},
            {"key": "A-2", "comments": []}
        ]});
        let t = template(json!({"-": {"keyName": "issues", "fields": {
            "key": "key",
            "bodies": {"keyName": "comments", "fields": ["body"]}
        }}}));
        assert_eq!(
            project(&source, &t),
            Some(json!([
                {"key": "A-1", "bodies": ["x"]},
                {"key": "A-2", "bodies": []}
            ]))
        );
    }

    #[test]
    fn collect_array_wraps_by_key_kind() {
        let items = vec![json!({"id": "1"}), json!({"id": "2"})];
        let named = FieldDescriptor {
            key: FieldKey::Named("ids".to_string()),
            key_name: None,
            fields: Box::new(Template::Sequence(vec!["id".to_string()])),
        };
        let Collected::Keyed(map) = collect_array(&items, &named) else {
            panic!("expected keyed collection");
        };
        assert_eq!(Value::Object(map), json!({"ids": ["1", "2"]}));

        let spliced = FieldDescriptor {
            key: FieldKey::Splice,
            ..named
        };
        assert_eq!(
            collect_array(&items, &spliced),
            Collected::Spliced(vec![json!("1"), json!("2")])
        );
    }

    #[test]
    fn projection_is_deterministic() {
        let t = template(json!({
            "total": "total",
            "id": {"keyName": "issues", "fields": ["id"]},
            "self": {"keyName": "issues", "fields": ["self"]}
        }));
        let source = issues();
        assert_eq!(project(&source, &t), project(&source, &t));
    }
}
