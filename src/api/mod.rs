//! Purpose: Define the stable public Rust API boundary for pickshape.
//! Exports: Template model, projection entrypoints, presets, errors, and decode helpers.
//! Role: Public, additive-only surface used by the CLI and library consumers.
//! Invariants: This module is the only public path to core types.
//! Invariants: Nothing exported here performs network I/O.

mod decode;
mod preset;
mod template_ref;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::output::{Output, deep_merge};
pub use crate::core::path::{assign_path, resolve_path, split_path};
pub use crate::core::projector::{Collected, collect_array, project};
pub use crate::core::template::{
    FieldDescriptor, FieldKey, SPLICE_KEY, Template, TemplateEntry, TemplateSummary,
};
pub use decode::decode_json;
pub use preset::Preset;
pub use template_ref::TemplateRef;
