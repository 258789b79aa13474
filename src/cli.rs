use crate::client::BuildServiceClient;
use crate::model::{ActionKind, ActionReport, ClientConfig};
use crate::page::Page;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Placeholder text of the page's search input.
const SEARCH_PLACEHOLDER: &str = "Search packages...";

/// Output line routing for stdout/stderr writer.
pub(crate) enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
pub(crate) fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "pbs-web-cli",
    version,
    about = "Client for the package build service web interface"
)]
pub struct Cli {
    /// Base URL of the build service
    #[arg(long, default_value = "https://pakfire.ipfire.org")]
    pub base_url: String,

    /// Session cookie string as copied from the browser; the `_xsrf` token
    /// for state-changing requests is read from it
    #[arg(long, env = "PBS_COOKIE")]
    pub cookie: Option<String>,

    /// Request timeout
    #[arg(long, default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Fetch package name suggestions for a single query
    Autocomplete { query: String },

    /// Interactive suggestion session reading queries from stdin
    Typeahead,

    /// Run a repository action and hide its row on success
    Run { id: String },

    /// Remove a repository action and hide its row on success
    Remove { id: String },
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        base_url: args.base_url.clone(),
        cookie: args.cookie.clone(),
        timeout: Duration::from(args.timeout),
        user_agent: format!("pbs-web-cli/{}", env!("CARGO_PKG_VERSION")),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let client = BuildServiceClient::new(&cfg)?;

    match args.command.clone() {
        Command::Autocomplete { query } => run_autocomplete(&args, client, &query).await,
        Command::Typeahead => run_typeahead(client).await,
        Command::Run { id } => run_action(&args, client, ActionKind::Run, &id).await,
        Command::Remove { id } => run_action(&args, client, ActionKind::Remove, &id).await,
    }
}

async fn run_autocomplete(args: &Cli, client: BuildServiceClient, query: &str) -> Result<()> {
    let resp = client.autocomplete(query).await?;

    let (out_tx, out_handle) = spawn_output_writer();
    if args.json {
        let _ = out_tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&resp)?));
    } else if resp.packages.is_empty() {
        let _ = out_tx.send(OutputLine::Stderr(format!(
            "No packages match '{}'",
            resp.query
        )));
    } else {
        for name in &resp.packages {
            let _ = out_tx.send(OutputLine::Stdout(name.clone()));
        }
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

async fn run_typeahead(client: BuildServiceClient) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let mut page = Page::activate(SEARCH_PLACEHOLDER);

    let res = crate::session::run(client, &mut page, &out_tx).await;

    drop(out_tx);
    let _ = out_handle.await;
    res
}

/// Trigger a run/remove action and report the resulting row state.
///
/// The row is only hidden after the server confirms the action; on failure
/// it stays visible with the error attached, and the process exits non-zero.
async fn run_action(args: &Cli, client: BuildServiceClient, kind: ActionKind, id: &str) -> Result<()> {
    let mut page = Page::activate(SEARCH_PLACEHOLDER);
    page.insert_row(id);

    let outcome = client.action(kind, id).await;
    page.apply_action_outcome(id, &outcome);

    let row = match page.row(id) {
        Some(row) => row.clone(),
        None => anyhow::bail!("row for action {} was not registered", id),
    };
    let report = ActionReport {
        timestamp_utc: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "now".into()),
        base_url: args.base_url.clone(),
        action: kind,
        id: id.to_string(),
        hidden: !row.visible,
        error: row.error.clone(),
    };

    let (out_tx, out_handle) = spawn_output_writer();
    if args.json {
        let _ = out_tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&report)?));
    } else if report.hidden {
        let _ = out_tx.send(OutputLine::Stdout(format!(
            "Action {} ({}): confirmed, row {} hidden",
            id,
            kind.as_path_str(),
            row.element_id()
        )));
    } else {
        let _ = out_tx.send(OutputLine::Stderr(format!(
            "Action {} ({}): failed, row {} stays visible: {}",
            id,
            kind.as_path_str(),
            row.element_id(),
            report.error.as_deref().unwrap_or("unknown error")
        )));
    }
    drop(out_tx);
    let _ = out_handle.await;

    outcome.map(|_| ())
}
