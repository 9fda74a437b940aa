//! Purpose: Hold top-level CLI command dispatch for `pickshape`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and run each command here.
//! Invariants: Projected documents are the only stdout payload of `project`.
//! Invariants: ABSENT results and skipped records surface as stderr notices, never as stdout `null`.

use super::*;

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Project {
            input,
            template,
            input_mode,
            errors,
            pretty,
            fail_on_absent,
        } => {
            let template_ref = template.template_ref()?;
            let compiled = template_ref.load()?;
            let template_label = template_ref.describe();
            let input_name = input_label(&input);
            tracing::debug!(template = %template_label, input = %input_name, "project start");

            let style = if input_mode == InputMode::Jsonl && !pretty {
                RenderStyle::Compact
            } else {
                stdout_style(pretty, color_mode)
            };
            let config = IngestConfig {
                mode: input_mode.into(),
                errors: errors.into(),
                ..IngestConfig::default()
            };

            let mut absent = 0u64;
            let outcome = ingest(
                open_input(&input)?,
                config,
                |source, index| {
                    match project(&source, &compiled) {
                        Some(shaped) => emit_json(&shaped, style),
                        None => {
                            absent += 1;
                            let notice =
                                Notice::absent("project", &input_name, index + 1, &template_label);
                            emit_notice(&notice, color_mode);
                        }
                    }
                    Ok(())
                },
                |failure| {
                    tracing::debug!(index = failure.index, "record skipped");
                    let notice =
                        Notice::skipped("project", &input_name, failure.line, &failure.message);
                    emit_notice(&notice, color_mode);
                },
            )?;
            tracing::debug!(
                records = outcome.records_total,
                ok = outcome.ok,
                failed = outcome.failed,
                absent,
                "project finished"
            );

            if fail_on_absent && absent > 0 {
                return Err(Error::new(ErrorKind::NotFound)
                    .with_message(format!(
                        "{absent} of {} record(s) produced no output",
                        outcome.ok
                    ))
                    .with_hint(
                        "Check the template paths against the input, or drop --fail-on-absent.",
                    ));
            }
            Ok(RunOutcome::ok())
        }
        Command::Check { template, json } => {
            let template_ref = template.template_ref()?;
            let compiled = template_ref.load()?;
            let summary = compiled.summary();
            let label = template_ref.describe();

            if json {
                emit_json(
                    &json!({
                        "template": label,
                        "valid": true,
                        "empty": compiled.is_empty(),
                        "entries": summary.entries,
                        "leaves": summary.leaves,
                        "descriptors": summary.descriptors,
                        "splices": summary.splices,
                        "max_depth": summary.max_depth,
                    }),
                    stdout_style(false, color_mode),
                );
            } else {
                let use_color = color_mode.use_color(io::stdout().is_terminal());
                println!(
                    "{} {label}: {} entries ({} leaves, {} descriptors, {} splices), depth {}",
                    colorize_label("ok", use_color, AnsiColor::Green),
                    summary.entries,
                    summary.leaves,
                    summary.descriptors,
                    summary.splices,
                    summary.max_depth,
                );
                if compiled.is_empty() {
                    println!(
                        "{} template has no entries; every projection will be empty",
                        colorize_label("warning:", use_color, AnsiColor::Yellow)
                    );
                }
            }
            Ok(RunOutcome::ok())
        }
        Command::Presets => {
            let presets: Vec<Value> = Preset::ALL
                .iter()
                .map(|preset| {
                    json!({
                        "name": preset.name(),
                        "description": preset.description(),
                        "template": preset.template_json(),
                    })
                })
                .collect();
            emit_json(&json!({ "presets": presets }), stdout_style(false, color_mode));
            Ok(RunOutcome::ok())
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "pickshape", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_json(
                &json!({
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                }),
                stdout_style(false, color_mode),
            );
            Ok(RunOutcome::ok())
        }
    }
}
