//! Purpose: Public JSON decode helper that maps parser failures onto `Error`.
//! Exports: `decode_json`.
//! Role: Lets the CLI decode source documents with the same hints templates get.
//! Invariants: Decode failures are `ErrorKind::Usage` with a categorized hint.

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::json::parse;

/// Decode one JSON document. `context` names the input in the hint (e.g. `stdin line 3`).
pub fn decode_json(input: &str, context: &str) -> Result<Value, Error> {
    parse::from_str(input).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid json")
            .with_hint(parse::hint_for_error(&err, context))
            .with_source(err)
    })
}
