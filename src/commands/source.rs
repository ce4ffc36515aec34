// ABOUTME: Source command: replays a dump file or stdin against MySQL
// ABOUTME: Confirms before touching a live target unless told not to

use crate::config::SourceOptions;
use crate::mysql::{connect_mysql, extract_database_name};
use crate::restore::{self, NullExecutor, ReplaySummary};
use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use tokio::io::{AsyncBufRead, BufReader};

/// Replay `input` (a file path) or stdin against the database in `url`
///
/// Without `yes`, a confirmation prompt is shown before executing against
/// a live target. Dry runs never connect.
pub async fn source(
    url: &str,
    input: Option<&str>,
    options: &SourceOptions,
    yes: bool,
) -> Result<ReplaySummary> {
    options.validate()?;
    let database = extract_database_name(url);

    if !options.dry_run && !yes {
        let target = database.as_deref().unwrap_or("<no default database>");
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Execute statements from {} against '{}'?",
                input.unwrap_or("stdin"),
                target
            ))
            .default(false)
            .interact()
            .context("Failed to get confirmation")?;

        if !confirmed {
            tracing::warn!("⚠ User cancelled operation");
            bail!("Source cancelled by user");
        }
    }

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input file {}", path))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let summary = if options.dry_run {
        tracing::info!("Dry run: statements are parsed and logged, not executed");
        restore::replay(reader, NullExecutor, database.as_deref(), options).await?
    } else {
        let mut conn = connect_mysql(url).await?;
        let replayed = restore::replay(reader, &mut conn, database.as_deref(), options).await;
        if let Err(e) = conn.disconnect().await {
            tracing::warn!("Failed to close MySQL connection cleanly: {}", e);
        }
        replayed?
    };

    tracing::info!(
        "✓ Sourced {} statement(s) ({} INSERT(s) merged){}",
        summary.statements_executed,
        summary.inserts_merged,
        if summary.dry_run { " [dry run]" } else { "" }
    );

    Ok(summary)
}
