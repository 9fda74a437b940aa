//! Purpose: Typed model of projection templates and their fail-fast parser.
//! Exports: `Template`, `TemplateEntry`, `FieldDescriptor`, `FieldKey`, `TemplateSummary`.
//! Role: Turns authored JSON templates into closed variants the projector matches on.
//! Invariants: A parsed `Template` is always well-formed; malformed input is `ErrorKind::Template`.
//! Invariants: Mapping entries keep their declared order (serde_json `preserve_order`).
//! Notes: The JSON key `"-"` on a field descriptor is parsed once into `FieldKey::Splice`.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::{Error, ErrorKind};
use crate::json::parse;

pub const SPLICE_KEY: &str = "-";
const KEY_NAME: &str = "keyName";
const FIELDS: &str = "fields";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum Template {
    /// `["key", "other.path"]`: the resolved value itself is the output.
    Sequence(Vec<String>),
    /// `{ "out": "in.path", "nested": { "keyName": ..., "fields": ... } }`.
    Mapping(Vec<TemplateEntry>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateEntry {
    Leaf { key: String, path: String },
    Field(FieldDescriptor),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: FieldKey,
    pub key_name: Option<String>,
    pub fields: Box<Template>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKey {
    Named(String),
    Splice,
}

impl FieldKey {
    fn parse(key: &str) -> Self {
        if key == SPLICE_KEY {
            FieldKey::Splice
        } else {
            FieldKey::Named(key.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldKey::Named(key) => key,
            FieldKey::Splice => SPLICE_KEY,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldDescriptor {
    /// Source path this descriptor reads: `keyName` if given, else its own key.
    pub fn lookup_path(&self) -> &str {
        self.key_name.as_deref().unwrap_or_else(|| self.key.as_str())
    }
}

impl TemplateEntry {
    pub fn lookup_path(&self) -> &str {
        match self {
            TemplateEntry::Leaf { path, .. } => path,
            TemplateEntry::Field(descriptor) => descriptor.lookup_path(),
        }
    }
}

/// Shape statistics used by `pickshape check`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TemplateSummary {
    pub entries: usize,
    pub leaves: usize,
    pub descriptors: usize,
    pub splices: usize,
    pub max_depth: usize,
}

impl Template {
    pub fn parse(value: &Value) -> Result<Self, Error> {
        parse_template(value, "")
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Template::Sequence(refs) => refs.is_empty(),
            Template::Mapping(entries) => entries.is_empty(),
        }
    }

    pub fn summary(&self) -> TemplateSummary {
        let mut summary = TemplateSummary::default();
        accumulate_summary(self, 1, &mut summary);
        summary
    }
}

fn accumulate_summary(template: &Template, depth: usize, summary: &mut TemplateSummary) {
    summary.max_depth = summary.max_depth.max(depth);
    match template {
        Template::Sequence(refs) => {
            summary.entries += refs.len();
            summary.leaves += refs.len();
        }
        Template::Mapping(entries) => {
            for entry in entries {
                summary.entries += 1;
                match entry {
                    TemplateEntry::Leaf { .. } => summary.leaves += 1,
                    TemplateEntry::Field(descriptor) => {
                        summary.descriptors += 1;
                        if descriptor.key == FieldKey::Splice {
                            summary.splices += 1;
                        }
                        accumulate_summary(&descriptor.fields, depth + 1, summary);
                    }
                }
            }
        }
    }
}

impl TryFrom<Value> for Template {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Template::parse(&value)
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let value: Value = parse::from_str(input).map_err(|err| {
            Error::new(ErrorKind::Template)
                .with_message("template is not valid JSON")
                .with_hint(parse::hint_for_error(&err, "template"))
                .with_source(err)
        })?;
        Template::parse(&value)
    }
}

fn parse_template(value: &Value, pointer: &str) -> Result<Template, Error> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(path) => Ok(path.clone()),
                other => Err(Error::template(
                    &child_pointer(pointer, &index.to_string()),
                    format!(
                        "sequence templates hold key references only, found {}",
                        kind_name(other)
                    ),
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Template::Sequence),
        Value::Object(map) => map
            .iter()
            .map(|(key, entry)| parse_entry(key, entry, &child_pointer(pointer, key)))
            .collect::<Result<Vec<_>, _>>()
            .map(Template::Mapping),
        other => Err(Error::template(
            pointer_or_root(pointer),
            format!("template must be an array or object, found {}", kind_name(other)),
        )
        .with_hint("Use [\"key\"] to copy a value or {\"out\": \"in.path\"} to rename it.")),
    }
}

fn parse_entry(key: &str, value: &Value, pointer: &str) -> Result<TemplateEntry, Error> {
    match value {
        Value::String(path) => Ok(TemplateEntry::Leaf {
            key: key.to_string(),
            path: path.clone(),
        }),
        Value::Object(map) => parse_descriptor(key, map, pointer).map(TemplateEntry::Field),
        other => Err(Error::template(
            pointer,
            format!(
                "template entry must be a key reference or field descriptor, found {}",
                kind_name(other)
            ),
        )),
    }
}

fn parse_descriptor(
    key: &str,
    map: &Map<String, Value>,
    pointer: &str,
) -> Result<FieldDescriptor, Error> {
    let Some(fields) = map.get(FIELDS) else {
        return Err(
            Error::template(pointer, "field descriptor is missing `fields`").with_hint(
                "Descriptors look like {\"keyName\": \"issues\", \"fields\": [\"id\"]}.",
            ),
        );
    };
    let key_name = match map.get(KEY_NAME) {
        None => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(other) => {
            return Err(Error::template(
                &child_pointer(pointer, KEY_NAME),
                format!("`keyName` must be a string, found {}", kind_name(other)),
            ));
        }
    };
    if let Some(unknown) = map.keys().find(|k| *k != FIELDS && *k != KEY_NAME) {
        return Err(Error::template(
            &child_pointer(pointer, unknown),
            format!("unknown field descriptor member `{unknown}`"),
        ));
    }
    let fields = parse_template(fields, &child_pointer(pointer, FIELDS))?;

    Ok(FieldDescriptor {
        key: FieldKey::parse(key),
        key_name,
        fields: Box::new(fields),
    })
}

fn child_pointer(parent: &str, token: &str) -> String {
    let escaped = token.replace('~', "~0").replace('/', "~1");
    format!("{parent}/{escaped}")
}

fn pointer_or_root(pointer: &str) -> &str {
    if pointer.is_empty() { "/" } else { pointer }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
