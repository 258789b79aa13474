//! Interactive typeahead session.
//!
//! Reads queries from stdin, spawns a suggestion fetch per line, and applies
//! replies through the stale-response guard before presenting them.

use crate::cli::OutputLine;
use crate::client::BuildServiceClient;
use crate::model::{AutocompleteResponse, SessionEvent};
use crate::page::typeahead::Applied;
use crate::page::Page;
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};

/// Completion message from a spawned suggestion fetch.
struct FetchDone {
    query: String,
    result: Result<AutocompleteResponse>,
}

fn apply_fetch_done(page: &mut Page, out_tx: &UnboundedSender<OutputLine>, done: FetchDone) {
    match done.result {
        Ok(resp) => match page.typeahead.apply_response(resp) {
            Applied::Fresh => {
                let event = SessionEvent::Suggestions {
                    query: done.query,
                    packages: page.typeahead.suggestions().to_vec(),
                };
                let _ = out_tx.send(OutputLine::Stdout(event.to_message()));
            }
            Applied::Stale { current } => {
                let event = SessionEvent::Stale {
                    query: done.query,
                    current,
                };
                let _ = out_tx.send(OutputLine::Stderr(event.to_message()));
            }
        },
        Err(e) => {
            let event = SessionEvent::FetchFailed {
                query: done.query,
                error: format!("{e:#}"),
            };
            let _ = out_tx.send(OutputLine::Stderr(event.to_message()));
        }
    }
}

/// Run the session until stdin reaches EOF.
///
/// Fetches are never cancelled; a reply that comes back after a newer query
/// was typed is dropped by the guard, not aborted on the wire.
pub(crate) async fn run(
    client: BuildServiceClient,
    page: &mut Page,
    out_tx: &UnboundedSender<OutputLine>,
) -> Result<()> {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<FetchDone>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    page.search.focus();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(raw) => {
                        let query = raw.trim().to_string();
                        if query.is_empty() {
                            continue;
                        }
                        page.search.set_value(&query);
                        page.typeahead.set_query(&query);

                        let event = SessionEvent::Fetching { query: query.clone() };
                        let _ = out_tx.send(OutputLine::Stderr(event.to_message()));

                        let client = client.clone();
                        let done_tx = done_tx.clone();
                        tokio::spawn(async move {
                            let result = client.autocomplete(&query).await;
                            let _ = done_tx.send(FetchDone { query, result });
                        });
                    }
                    None => break,
                }
            }
            Some(done) = done_rx.recv() => {
                apply_fetch_done(page, out_tx, done);
            }
        }
    }

    // After EOF, drain replies still in flight; late responses go through
    // the same guard instead of being lost.
    drop(done_tx);
    while let Some(done) = done_rx.recv().await {
        apply_fetch_done(page, out_tx, done);
    }

    page.search.blur();
    Ok(())
}
