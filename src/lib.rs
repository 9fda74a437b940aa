//! Purpose: Library crate behind the `pickshape` CLI: declarative JSON projection.
//! Exports: `api` (stable surface), `core` (template model, paths, projector), `notice`.
//! Role: Pure projection engine plus the small helpers the CLI shares with library users.
//! Invariants: Projection is synchronous, allocation-only, and free of I/O or global state.
//! Invariants: Callers should prefer `api` re-exports over reaching into `core`.
pub mod api;
pub mod core;
pub(crate) mod json;
pub mod notice;
