//! Purpose: Hold top-level CLI command dispatch for `matjson`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Command output formats and exit code semantics stay unchanged.
//! Invariants: Helpers in `main.rs` remain the source of command business logic.

use super::*;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "matjson", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Normalize {
            file,
            decode_args,
            pretty,
            keep_nonfinite,
        } => {
            let options = decode_args.to_options()?;
            let text = read_input(file.as_deref())?;
            let started = Instant::now();
            let value = decode(&text, &options)?;
            let encode_options = EncodeOptions::new()
                .with_pretty(pretty)
                .with_convert_nonfinite(!keep_nonfinite);
            let output = encode(&value, &encode_options);
            tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                bytes_in = text.len(),
                bytes_out = output.len(),
                "normalized document"
            );
            println!("{output}");
            Ok(RunOutcome::ok())
        }
        Command::Inspect {
            file,
            decode_args,
            json: as_json,
        } => {
            let options = decode_args.to_options()?;
            let text = read_input(file.as_deref())?;
            let started = Instant::now();
            let value = decode(&text, &options)?;
            tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                kind = value.kind_name(),
                "decoded document"
            );
            let report = summarize(&value);
            if as_json {
                let encoded = serde_json::to_string_pretty(&report).map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to encode inspect report")
                        .with_source(err)
                })?;
                println!("{encoded}");
            } else {
                emit_inspect_human(&report);
            }
            Ok(RunOutcome::ok())
        }
    }
}
