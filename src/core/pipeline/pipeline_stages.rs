//! Building blocks of the streaming part of a run: parsing, the per-file
//! extraction fan-out, and the generic split/expand/normalize stage task.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::analysis::extract_identifiers;
use crate::core::errors::{NomenError, Result};
use crate::core::identifier::Identifier;
use crate::core::source::{RawSource, SourceFile};
use crate::lang::go::GoParser;

/// Parse every raw source on up to `workers` blocking threads, keeping the
/// reader's order.
pub(crate) async fn parse_sources(raw: Vec<RawSource>, workers: usize) -> Result<Vec<SourceFile>> {
    let jobs = raw.into_iter().map(|source| {
        tokio::task::spawn_blocking(move || -> Result<SourceFile> {
            let mut parser = GoParser::new()?;
            Ok(SourceFile::parse(source, &mut parser))
        })
    });

    let outcomes: Vec<_> = stream::iter(jobs).buffered(workers.max(1)).collect().await;

    let mut files = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let file = outcome
            .map_err(|e| NomenError::internal(format!("Parse worker failed: {e}")))??;
        if let Some(error) = &file.parse_error {
            warn!("Dropping {}: {}", file.name, error);
        }
        files.push(file);
    }
    Ok(files)
}

/// Send unless the run was cancelled first. `false` means stop producing.
pub(crate) async fn send_or_cancel(
    output: &mpsc::Sender<Identifier>,
    identifier: Identifier,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        sent = output.send(identifier) => sent.is_ok(),
        _ = cancel.cancelled() => false,
    }
}

/// One task per file, all feeding `output`; the queue closes once every
/// task has finished.
pub(crate) fn spawn_extraction(
    files: &[Arc<SourceFile>],
    output: mpsc::Sender<Identifier>,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<()>> {
    files
        .iter()
        .map(|file| {
            let file = Arc::clone(file);
            let output = output.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let name = file.name.clone();
                let identifiers =
                    match tokio::task::spawn_blocking(move || extract_identifiers(&file)).await {
                        Ok(identifiers) => identifiers,
                        Err(e) => {
                            warn!("Extraction of {} failed: {}", name, e);
                            return;
                        }
                    };
                debug!("Extracted {} identifiers from {}", identifiers.len(), name);
                for identifier in identifiers {
                    if !send_or_cancel(&output, identifier, &cancel).await {
                        break;
                    }
                }
            })
        })
        .collect()
}

/// Pull identifiers from `input`, run `apply` on up to `workers` blocking
/// threads, and forward the results to `output` as they complete.
pub(crate) fn spawn_stage<F>(
    stage: &'static str,
    input: mpsc::Receiver<Identifier>,
    output: mpsc::Sender<Identifier>,
    workers: usize,
    cancel: CancellationToken,
    apply: F,
) -> JoinHandle<()>
where
    F: Fn(&mut Identifier) + Send + Sync + 'static,
{
    let apply = Arc::new(apply);
    tokio::spawn(async move {
        let incoming = stream::unfold(input, |mut input| async move {
            input.recv().await.map(|identifier| (identifier, input))
        });
        let mut results = Box::pin(
            incoming
                .map(|mut identifier| {
                    let apply = Arc::clone(&apply);
                    tokio::task::spawn_blocking(move || {
                        apply(&mut identifier);
                        identifier
                    })
                })
                .buffer_unordered(workers.max(1))
                .take_until(cancel.clone().cancelled_owned()),
        );

        let mut processed = 0usize;
        while let Some(result) = results.next().await {
            match result {
                Ok(identifier) => {
                    if !send_or_cancel(&output, identifier, &cancel).await {
                        break;
                    }
                    processed += 1;
                }
                Err(e) => warn!("Worker in stage '{}' failed: {}", stage, e),
            }
        }
        debug!("Stage '{}' forwarded {} identifiers", stage, processed);
    })
}
