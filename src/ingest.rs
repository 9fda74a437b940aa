//! Purpose: Read source documents for `project` as one JSON value or JSON Lines.
//! Exports: `IngestMode`, `ErrorPolicy`, `IngestConfig`, `IngestOutcome`, `IngestFailure`, `ingest`.
//! Role: Input engine used by the CLI; keeps stream handling out of command dispatch.
//! Invariants: JSON Lines are processed one line at a time; the whole input is never buffered.
//! Invariants: Skip mode only continues at line boundaries; stop mode fails on the first bad record.
use std::io::{self, BufRead, BufReader, Read};

use pickshape::api::{Error, ErrorKind, decode_json};
use serde_json::Value;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IngestMode {
    Json,
    Jsonl,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorPolicy {
    Stop,
    Skip,
}

#[derive(Copy, Clone, Debug)]
pub struct IngestConfig {
    pub mode: IngestMode,
    pub errors: ErrorPolicy,
    pub max_record_bytes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            mode: IngestMode::Json,
            errors: ErrorPolicy::Stop,
            max_record_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct IngestOutcome {
    pub records_total: u64,
    pub ok: u64,
    pub failed: u64,
}

#[derive(Clone, Debug)]
pub struct IngestFailure {
    pub index: u64,
    pub line: Option<u64>,
    pub message: String,
}

fn io_error(err: io::Error, message: &str) -> Error {
    Error::new(ErrorKind::Io)
        .with_message(message)
        .with_source(err)
}

/// Feed every decoded record to `on_value` with its zero-based index.
pub fn ingest<R, F, N>(
    reader: R,
    config: IngestConfig,
    mut on_value: F,
    mut on_failure: N,
) -> Result<IngestOutcome, Error>
where
    R: Read,
    F: FnMut(Value, u64) -> Result<(), Error>,
    N: FnMut(IngestFailure),
{
    let mut outcome = IngestOutcome::default();
    let mut handle = |result: Result<Value, Error>,
                      line: Option<u64>,
                      outcome: &mut IngestOutcome|
     -> Result<(), Error> {
        let index = outcome.records_total;
        outcome.records_total += 1;
        match result {
            Ok(value) => {
                on_value(value, index)?;
                outcome.ok += 1;
                Ok(())
            }
            Err(err) => match config.errors {
                ErrorPolicy::Stop if config.mode == IngestMode::Jsonl => Err(append_hint(
                    err,
                    "Use --errors skip to continue past bad lines.",
                )),
                ErrorPolicy::Stop => Err(err),
                ErrorPolicy::Skip => {
                    outcome.failed += 1;
                    on_failure(IngestFailure {
                        index,
                        line,
                        message: err.message().unwrap_or("invalid record").to_string(),
                    });
                    Ok(())
                }
            },
        }
    };

    match config.mode {
        IngestMode::Json => {
            let mut text = String::new();
            BufReader::new(reader)
                .read_to_string(&mut text)
                .map_err(|err| io_error(err, "failed to read input"))?;
            if text.trim().is_empty() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("missing input")
                    .with_hint("Provide a JSON document via INPUT or pipe it to stdin."));
            }
            let trimmed = text.trim();
            let record = if trimmed.len() > config.max_record_bytes {
                Err(Error::new(ErrorKind::Usage)
                    .with_message(format!(
                        "input exceeds {} bytes",
                        config.max_record_bytes
                    ))
                    .with_hint("Split the input into JSON Lines and use --in jsonl."))
            } else {
                decode_json(&text, "input")
            };
            handle(record, None, &mut outcome)?;
        }
        IngestMode::Jsonl => {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            let mut line_no = 0u64;
            loop {
                buf.clear();
                let read = reader
                    .read_until(b'\n', &mut buf)
                    .map_err(|err| io_error(err, "failed to read input"))?;
                if read == 0 {
                    break;
                }
                line_no += 1;
                let record = match decode_line(&buf, line_no, config.max_record_bytes) {
                    Ok(None) => continue,
                    Ok(Some(value)) => Ok(value),
                    Err(err) => Err(err),
                };
                handle(record, Some(line_no), &mut outcome)?;
            }
        }
    }

    Ok(outcome)
}

// Ok(None) marks a blank line.
fn decode_line(buf: &[u8], line_no: u64, max_record_bytes: usize) -> Result<Option<Value>, Error> {
    if buf.len() > max_record_bytes {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("line {line_no} exceeds {max_record_bytes} bytes")));
    }
    let text = std::str::from_utf8(buf).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("line {line_no} is not valid utf-8"))
            .with_source(err)
    })?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    decode_json(trimmed, &format!("line {line_no}"))
        .map(Some)
        .map_err(|err| err.with_message(format!("invalid json on line {line_no}")))
}

fn append_hint(err: Error, extra: &str) -> Error {
    let hint = match err.hint() {
        Some(existing) => format!("{existing}\n{extra}"),
        None => extra.to_string(),
    };
    err.with_hint(hint)
}

#[cfg(test)]
mod tests {
    use super::{ErrorPolicy, IngestConfig, IngestMode, IngestOutcome, ingest};
    use pickshape::api::{Error, ErrorKind};
    use serde_json::{Value, json};

    type RunResult = (
        Result<IngestOutcome, Error>,
        Vec<Value>,
        Vec<Option<u64>>,
    );

    fn run(input: &str, config: IngestConfig) -> RunResult {
        let mut values = Vec::new();
        let mut failures = Vec::new();
        let outcome = ingest(
            input.as_bytes(),
            config,
            |value, _| {
                values.push(value);
                Ok(())
            },
            |failure| failures.push(failure.line),
        );
        (outcome, values, failures)
    }

    fn jsonl(errors: ErrorPolicy) -> IngestConfig {
        IngestConfig {
            mode: IngestMode::Jsonl,
            errors,
            ..IngestConfig::default()
        }
    }

    #[test]
    fn single_document_mode_reads_everything() {
        let (outcome, values, _) = run("{\n  \"total\": 1\n}\n", IngestConfig::default());
        assert_eq!(outcome.unwrap().ok, 1);
        assert_eq!(values, vec![json!({"total": 1})]);
    }

    #[test]
    fn oversized_document_respects_the_size_limit() {
        let stop = IngestConfig {
            max_record_bytes: 8,
            ..IngestConfig::default()
        };
        let (outcome, values, _) = run("  {\"total\": 12345}  \n", stop);
        let err = outcome.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.message(), Some("input exceeds 8 bytes"));
        assert!(values.is_empty());

        let skip = IngestConfig {
            errors: ErrorPolicy::Skip,
            ..stop
        };
        let (outcome, values, failures) = run("{\"total\": 12345}", skip);
        assert_eq!(outcome.unwrap().failed, 1);
        assert_eq!(failures, vec![None]);
        assert!(values.is_empty());

        let roomy = IngestConfig {
            max_record_bytes: 15,
            ..stop
        };
        let (outcome, values, _) = run("\n  {\"total\": 1}\n\n", roomy);
        assert_eq!(outcome.unwrap().ok, 1);
        assert_eq!(values, vec![json!({"total": 1})]);
    }

    #[test]
    fn empty_input_is_usage_error() {
        let (outcome, _, _) = run("  \n", IngestConfig::default());
        assert_eq!(outcome.unwrap_err().kind(), ErrorKind::Usage);
    }

    #[test]
    fn jsonl_skips_blank_lines() {
        let (outcome, values, _) = run("{\"a\":1}\n\n{\"a\":2}\n", jsonl(ErrorPolicy::Stop));
        let outcome = outcome.unwrap();
        assert_eq!(outcome.records_total, 2);
        assert_eq!(values, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn jsonl_stop_fails_on_first_bad_line() {
        let (outcome, values, _) = run("{\"a\":1}\n{bad\n{\"a\":3}\n", jsonl(ErrorPolicy::Stop));
        let err = outcome.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.message(), Some("invalid json on line 2"));
        assert!(err.hint().unwrap().contains("--errors skip"));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn jsonl_skip_reports_and_continues() {
        let (outcome, values, failures) =
            run("{\"a\":1}\n{bad\n{\"a\":3}", jsonl(ErrorPolicy::Skip));
        let outcome = outcome.unwrap();
        assert_eq!(outcome.ok, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(failures, vec![Some(2)]);
        assert_eq!(values, vec![json!({"a": 1}), json!({"a": 3})]);
    }

    #[test]
    fn oversized_line_is_a_failure() {
        let config = IngestConfig {
            max_record_bytes: 4,
            ..jsonl(ErrorPolicy::Skip)
        };
        let (outcome, values, failures) = run("[1,2,3,4]\n[]\n", config);
        assert_eq!(outcome.unwrap().failed, 1);
        assert_eq!(failures, vec![Some(1)]);
        assert_eq!(values, vec![json!([])]);
    }
}
