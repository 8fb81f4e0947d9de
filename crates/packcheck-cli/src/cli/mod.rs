pub mod args;
mod render;

use crate::exit_codes;
use anyhow::Context;
use args::{Cli, OutputFormat};
use packcheck_core::{DiagnosticLog, PolicyOverrides, ValidationMode, ValidationPolicy, Validator};

pub fn run(cli: Cli) -> anyhow::Result<i32> {
    let policy = match &cli.policy {
        Some(path) => ValidationPolicy::from_file(path)?,
        None => ValidationPolicy::default(),
    };
    let policy = policy
        .apply(PolicyOverrides {
            max_archive_bytes: cli.max_archive_bytes,
            max_file_bytes: cli.max_file_bytes,
            mode: cli.fail_fast.then_some(ValidationMode::FailFast),
            detect_polyglots: cli.detect_polyglots.then_some(true),
            ..Default::default()
        })
        .compile()
        .context("invalid policy")?;

    let mut validator = Validator::new(policy);
    if let Some(path) = &cli.log_file {
        validator = validator.with_log(DiagnosticLog::open(path));
    }

    tracing::debug!(
        archive = %cli.archive.display(),
        mode = ?validator.policy().mode(),
        "validating"
    );
    let result = validator.validate_path(&cli.archive);

    match cli.format {
        OutputFormat::Text => print!("{}", render::text(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(if result.is_valid() {
        exit_codes::SUCCESS
    } else {
        exit_codes::INVALID_PACK
    })
}
