//! mini-mind - host page entry point
//!
//! Reads agent session events as JSON lines on stdin and writes frontend
//! tool replies as JSON lines on stdout. JSON frames also go to stdout; text
//! frames and logs go to stderr, so stdout is always NDJSON.

use mini_mind::config::{Config, OutputFormat};
use mini_mind::events::SessionEvent;
use mini_mind::page::{HostPage, PageFrame};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_mind=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: background={}, output={}",
        config.default_background, config.output
    );

    let page = HostPage::new(&config);
    if config.print_manifest {
        println!("{}", serde_json::to_string(&page.manifest())?);
    }

    let (events_tx, events_rx) = mpsc::channel(config.event_buffer);
    let (replies_tx, mut replies_rx) = mpsc::channel(config.event_buffer);
    let (frames_tx, mut frames_rx) = page.frame_channel();

    tokio::spawn(read_events(events_tx));
    let page_task = tokio::spawn(page.run(events_rx, replies_tx, frames_tx));

    let mut replies_open = true;
    let mut frames_open = true;
    while replies_open || frames_open {
        tokio::select! {
            reply = replies_rx.recv(), if replies_open => match reply {
                Some(reply) => println!("{}", serde_json::to_string(&reply)?),
                None => replies_open = false,
            },
            changed = frames_rx.changed(), if frames_open => match changed {
                Ok(()) => {
                    let frame = frames_rx.borrow_and_update().clone();
                    write_frame(
                        &frame,
                        config.output,
                        &mut std::io::stdout().lock(),
                        &mut std::io::stderr().lock(),
                    )?;
                }
                Err(_) => frames_open = false,
            },
        }
    }

    page_task.await??;
    info!("Shutting down");
    Ok(())
}

/// Forward stdin lines to the page until EOF.
async fn read_events(events: mpsc::Sender<SessionEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<SessionEvent>(&line) {
            Ok(event) => {
                if events.send(event).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("Skipping malformed session event: {}", e),
        }
    }
}

/// JSON frames join the NDJSON stream on `out`; text frames go to `err`.
fn write_frame(
    frame: &PageFrame,
    output: OutputFormat,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<()> {
    match output {
        OutputFormat::Text => write!(err, "{}", frame.to_text())?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(frame)?)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> PageFrame {
        HostPage::new(&Config::default()).frame()
    }

    #[test]
    fn text_frames_stay_off_stdout() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        write_frame(&frame(), OutputFormat::Text, &mut out, &mut err).unwrap();
        assert!(out.is_empty());
        assert!(String::from_utf8(err).unwrap().contains("background: #6366f1"));
    }

    #[test]
    fn json_frames_are_single_lines_on_stdout() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        write_frame(&frame(), OutputFormat::Json, &mut out, &mut err).unwrap();
        assert!(err.is_empty());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["background"], "#6366f1");
    }
}
