//! Purpose: Internal JSON parsing boundary shared by templates and source documents.
//! Exports: `parse` module with decode helpers and failure categorization.
//! Role: Single seam for decoding so callsites never map serde errors ad hoc.
//! Invariants: Decoding of templates and inputs goes through this module.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod parse;
