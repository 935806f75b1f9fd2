use anyhow::Context;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use vlcbkit::{
    build_controller, gridconnect, init_logging, Controller, EventConsumerService,
    LoopbackTransport, NodeConfig, VlcbFrame, BUILD_DATE, VERSION,
};

type Matched = Arc<Mutex<Vec<(u8, VlcbFrame)>>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("VLCBKit {} (built {})", VERSION, BUILD_DATE);

    let config_path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => NodeConfig::default_path()?,
    };
    let config = NodeConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let matched: Matched = Arc::new(Mutex::new(Vec::new()));
    let sink = matched.clone();
    let consumer = EventConsumerService::new()
        .with_event_handler(move |slot, frame: &VlcbFrame| sink.lock().push((slot, *frame)));

    let transport = LoopbackTransport::new();
    let mut controller = build_controller(&config, transport.clone(), consumer)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("Input closed");
                    break;
                };
                let replies = handle_line(&line, &mut controller, &transport, &matched);
                for reply in replies {
                    stdout.write_all(reply.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                }
                stdout.flush().await?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    controller
        .event_store_mut()
        .commit()
        .context("committing event table")?;
    Ok(())
}

/// Decode one GridConnect line, run it through the node and return the
/// encoded replies.
fn handle_line(
    line: &str,
    controller: &mut Controller,
    transport: &LoopbackTransport,
    matched: &Matched,
) -> Vec<String> {
    if line.trim().is_empty() {
        return Vec::new();
    }

    let inbound = match gridconnect::decode(line) {
        Ok(inbound) => inbound,
        Err(e) => {
            tracing::warn!("{}", e);
            return Vec::new();
        }
    };

    transport.push_inbound(inbound.frame);
    while controller.process().is_some() {}

    for (slot, frame) in matched.lock().drain(..) {
        match controller.event_store().read_event_variable(slot, 1) {
            Ok(ev1) => tracing::info!("Event {} in slot {} (EV1 = {})", frame, slot, ev1),
            Err(e) => tracing::warn!("Event {} in slot {}: {}", frame, slot, e),
        }
    }

    let can_id = controller.identity().can_id;
    transport
        .take_sent()
        .iter()
        .filter_map(|frame| match gridconnect::encode(frame, can_id) {
            Ok(line) => Some(line),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        })
        .collect()
}
