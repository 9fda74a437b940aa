// Core modules: template model, path access, output accumulation, projection, errors.
pub mod error;
pub mod output;
pub mod path;
pub mod projector;
pub mod template;
