//! Purpose: Name where a template comes from and load it into a `Template`.
//! Exports: `TemplateRef`.
//! Role: Shared resolution rules for the CLI and library callers (file, inline text, preset).
//! Invariants: Every source is validated by `Template::parse`; errors keep the file path.
//! Invariants: Loading is the only I/O in the library and happens before any projection.

use std::path::PathBuf;

use crate::core::error::{Error, ErrorKind};
use crate::core::template::Template;

use super::preset::Preset;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TemplateRef {
    Path(PathBuf),
    Inline(String),
    Preset(Preset),
}

impl TemplateRef {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn inline(text: impl Into<String>) -> Self {
        Self::Inline(text.into())
    }

    pub fn preset(name: &str) -> Result<Self, Error> {
        Preset::from_name(name).map(Self::Preset)
    }

    pub fn describe(&self) -> String {
        match self {
            TemplateRef::Path(path) => path.to_string_lossy().to_string(),
            TemplateRef::Inline(_) => "<inline>".to_string(),
            TemplateRef::Preset(preset) => format!("preset:{}", preset.name()),
        }
    }

    pub fn load(&self) -> Result<Template, Error> {
        match self {
            TemplateRef::Path(path) => {
                let text = std::fs::read_to_string(path).map_err(|err| {
                    let kind = if err.kind() == std::io::ErrorKind::NotFound {
                        ErrorKind::NotFound
                    } else {
                        ErrorKind::Io
                    };
                    Error::new(kind)
                        .with_message("failed to read template")
                        .with_path(path)
                        .with_source(err)
                })?;
                text.parse::<Template>().map_err(|err| err.with_path(path))
            }
            TemplateRef::Inline(text) => text.parse::<Template>(),
            TemplateRef::Preset(preset) => preset.template(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TemplateRef;
    use crate::core::error::ErrorKind;
    use crate::core::template::Template;
    use std::io::Write;

    #[test]
    fn loads_from_file_inline_and_preset() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"total": "total"}}"#).expect("write");

        let from_file = TemplateRef::path(file.path()).load().unwrap();
        let inline = TemplateRef::inline(r#"{"total": "total"}"#).load().unwrap();
        assert_eq!(from_file, inline);

        let preset = TemplateRef::preset("issue-search").unwrap().load().unwrap();
        assert!(matches!(preset, Template::Mapping(ref entries) if entries.len() == 4));
    }

    #[test]
    fn missing_file_is_not_found_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.json");
        let err = TemplateRef::path(&path).load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[test]
    fn malformed_file_keeps_path_and_pointer() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"id": {{"keyName": "issues"}}}}"#).expect("write");
        let err = TemplateRef::path(file.path()).load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Template);
        assert_eq!(err.pointer(), Some("/id"));
        assert_eq!(err.path(), Some(file.path()));
    }

    #[test]
    fn describe_is_human_readable() {
        assert_eq!(TemplateRef::inline("[]").describe(), "<inline>");
        assert_eq!(
            TemplateRef::preset("issue-search").unwrap().describe(),
            "preset:issue-search"
        );
    }
}
