//! Stdin/stdout JSON bridge for the host command channel.
//!
//! Reads newline-delimited JSON `CommandEnvelope` messages from stdin,
//! dispatches them through the `HostCommandServer` router, and writes
//! `ResponseEnvelope` and `EventEnvelope` messages as newline-delimited
//! JSON to stdout.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use crate::config::HostConfig;
use crate::error::{JaculatoriaError, Result};
use crate::host::channel::{
    CommandHandler, EventSink, HostCommandClient, command_channel_with_events,
};
use crate::host::contract::{CommandEnvelope, CommandName, ResponseEnvelope};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;

type SharedWriter<W> = Arc<Mutex<BufWriter<W>>>;

/// Run the stdin/stdout JSON bridge until stdin closes or a `stop`
/// command is received.
pub async fn run_stdio_bridge<H: CommandHandler>(
    handler: H,
    events: EventSink,
    config: HostConfig,
) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    run_bridge(input, tokio::io::stdout(), handler, events, config).await
}

/// Run the bridge over arbitrary line streams.
///
/// Three concurrent tasks operate in parallel:
///
/// 1. **Reader** -- reads newline-delimited JSON, dispatches each
///    `CommandEnvelope` through the host command client, and writes the
///    resulting `ResponseEnvelope`.
/// 2. **Event forwarder** -- receives broadcast `EventEnvelope` messages
///    and writes them as JSON lines.
/// 3. **Server** -- runs the `HostCommandServer` router loop.
///
/// The bridge exits when the reader finishes (EOF or `stop`). Dropping the
/// client causes the server task to exit naturally.
pub async fn run_bridge<R, W, H>(
    input: R,
    output: W,
    handler: H,
    events: EventSink,
    config: HostConfig,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    H: CommandHandler,
{
    let (client, server) = command_channel_with_events(config.request_capacity, events, handler);
    let writer: SharedWriter<W> = Arc::new(Mutex::new(BufWriter::new(output)));

    let server_handle = tokio::spawn(server.run());

    let event_writer = Arc::clone(&writer);
    let mut event_rx = client.subscribe_events();
    let event_handle = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event_envelope) => match serde_json::to_string(&event_envelope) {
                    Ok(json) => {
                        let mut w = event_writer.lock().await;
                        if let Err(e) = write_line(&mut w, &json).await {
                            tracing::warn!(
                                error = %e,
                                "failed to write event envelope; stopping event forwarder"
                            );
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to serialize event envelope; skipping");
                    }
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event forwarder lagged; some events were dropped");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    tracing::info!("event broadcast channel closed; stopping event forwarder");
                    break;
                }
            }
        }
    });

    let reader_result = run_reader(input, client, Arc::clone(&writer)).await;

    event_handle.abort();
    let _ = event_handle.await;
    let _ = server_handle.await;

    reader_result
}

/// Read line-by-line, dispatch each command, and write responses.
async fn run_reader<R, W>(
    mut reader: R,
    client: HostCommandClient,
    writer: SharedWriter<W>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| JaculatoriaError::Channel(format!("failed to read from stdin: {e}")))?;

        if bytes_read == 0 {
            tracing::info!("stdin closed (EOF); shutting down stdio bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    raw_line = %trimmed,
                    "failed to parse command envelope"
                );
                let error_response = ResponseEnvelope::error(
                    "parse-error",
                    format!("failed to parse command envelope: {e}"),
                );
                write_response(&writer, &error_response).await?;
                continue;
            }
        };

        let is_stop = envelope.command == CommandName::Stop;
        let request_id = envelope.request_id.clone();

        let response = match client.send(envelope).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error = %e, "host command dispatch failed");
                ResponseEnvelope::error(request_id, format!("dispatch failed: {e}"))
            }
        };
        write_response(&writer, &response).await?;

        if is_stop {
            tracing::info!("stop received; shutting down stdio bridge");
            break;
        }
    }

    Ok(())
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &SharedWriter<W>,
    response: &ResponseEnvelope,
) -> Result<()> {
    let json = serde_json::to_string(response).map_err(|e| {
        JaculatoriaError::Host(format!("failed to serialize response envelope: {e}"))
    })?;
    let mut w = writer.lock().await;
    write_line(&mut w, &json).await
}

/// Write a single JSON line to the buffered writer and flush.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut BufWriter<W>, json: &str) -> Result<()> {
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| JaculatoriaError::Channel(format!("failed to write to stdout: {e}")))?;
    writer.write_all(b"\n").await.map_err(|e| {
        JaculatoriaError::Channel(format!("failed to write newline to stdout: {e}"))
    })?;
    writer
        .flush()
        .await
        .map_err(|e| JaculatoriaError::Channel(format!("failed to flush stdout: {e}")))?;
    Ok(())
}
