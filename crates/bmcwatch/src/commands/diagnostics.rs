//! `bmcwatch diagnostics`: redacted JSON for bug reports.

use std::sync::Arc;

use bmcwatch_core::{IssueRegistry, Session, diagnostics};

use crate::cli::{DiagnosticsArgs, GlobalOpts, OutputFormat};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    target: Target,
    args: DiagnosticsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = Session::redfish(
        target.entry_id,
        target.connection,
        target.polling,
        Arc::new(IssueRegistry::new()),
    );
    session.start().await?;
    let doc = diagnostics::collect(&session).await;
    session.stop().await;
    let doc = doc?;

    // Tables make no sense for a nested document.
    let format = match global.output {
        OutputFormat::Table | OutputFormat::Plain => &OutputFormat::Json,
        ref other => other,
    };
    let rendered = output::render_single(format, &doc, output::render_json_pretty, |_| {
        String::new()
    });

    match args.file {
        Some(path) => {
            std::fs::write(&path, format!("{rendered}\n"))?;
            if !global.quiet {
                eprintln!("✓ Diagnostics written to {}", path.display());
            }
        }
        None => output::print_output(&rendered, global.quiet),
    }
    Ok(())
}
