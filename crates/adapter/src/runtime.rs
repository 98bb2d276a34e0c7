//! Line runtime - drives a [`LevelController`] from a JSON line stream.
//!
//! Inbound lines are handled in order. Board events, cascade outcomes and
//! level changes are written back as they happen, interleaved with replies.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use match3_core::Viewport;
use match3_engine::{BoardEvent, CascadeOutcome};
use match3_types::Vec2;

use crate::controller::{LevelController, LevelInfo};
use crate::protocol::{parse_message, ErrorCode, InboundMessage, OutboundMessage, ParsedMessage};

/// Adapter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdapterConfig {
    pub world_width: f32,
    pub world_height: f32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            world_width: 10.0,
            world_height: 16.0,
        }
    }
}

impl AdapterConfig {
    /// Create from environment variables (`MATCH3_WORLD_WIDTH`, `MATCH3_WORLD_HEIGHT`)
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let read = |key: &str, default: f32| {
            env::var(key)
                .ok()
                .and_then(|s| s.trim().parse::<f32>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(default)
        };

        Self {
            world_width: read("MATCH3_WORLD_WIDTH", defaults.world_width),
            world_height: read("MATCH3_WORLD_HEIGHT", defaults.world_height),
        }
    }

    /// World rectangle centered on the origin.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            Vec2::new(-self.world_width / 2.0, -self.world_height / 2.0),
            Vec2::new(self.world_width, self.world_height),
        )
    }
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut W, buf: &mut Vec<u8>, msg: &OutboundMessage) -> Result<()> {
    buf.clear();
    serde_json::to_writer(&mut *buf, msg)?;
    buf.push(b'\n');
    writer.write_all(buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Forward a cascade's outcome into the loop once it finishes.
fn watch(handle: JoinHandle<CascadeOutcome>, outcomes: &mpsc::UnboundedSender<CascadeOutcome>) {
    let outcomes = outcomes.clone();
    tokio::spawn(async move {
        match handle.await {
            Ok(outcome) => {
                let _ = outcomes.send(outcome);
            }
            Err(err) => tracing::error!(%err, "cascade task failed"),
        }
    });
}

async fn handle_line(
    controller: &LevelController,
    line: &str,
    outcomes: &mpsc::UnboundedSender<CascadeOutcome>,
) -> Option<OutboundMessage> {
    let msg = match parse_message(line) {
        Ok(ParsedMessage::Known(msg)) => msg,
        Ok(ParsedMessage::Unknown { msg_type }) => {
            return Some(OutboundMessage::error(
                ErrorCode::UnknownType,
                format!("unknown message type: {msg_type}"),
            ));
        }
        Err(err) => {
            tracing::debug!(%err, "unparsable line");
            return Some(OutboundMessage::error(ErrorCode::InvalidMessage, err.to_string()));
        }
    };

    match msg {
        InboundMessage::Swap { row, col, direction } => {
            match controller.swap_cell(row, col, direction).await {
                Ok(handle) => {
                    watch(handle, outcomes);
                    None
                }
                Err(rejected) => Some(OutboundMessage::rejected(rejected.code(), rejected)),
            }
        }
        InboundMessage::Swipe { pointer, from, to } => {
            controller.pointer_down(pointer, Vec2::new(from[0], from[1]));
            match controller.pointer_up(pointer, Vec2::new(to[0], to[1])).await {
                Some(Ok(handle)) => {
                    watch(handle, outcomes);
                    None
                }
                Some(Err(rejected)) => Some(OutboundMessage::rejected(rejected.code(), rejected)),
                None => None,
            }
        }
        InboundMessage::Restart => Some(level_reply(controller.restart().await)),
        InboundMessage::NextLevel => Some(level_reply(controller.next_level().await)),
        InboundMessage::Snapshot => Some(controller.level_info().await.into()),
    }
}

fn level_reply(result: Result<LevelInfo>) -> OutboundMessage {
    match result {
        Ok(info) => info.into(),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "level load failed");
            OutboundMessage::error(ErrorCode::LevelLoad, format!("{err:#}"))
        }
    }
}

fn outcome_reply(outcome: CascadeOutcome) -> Option<OutboundMessage> {
    match outcome {
        CascadeOutcome::Rejected(rejection) => Some(OutboundMessage::rejected(rejection.code(), rejection)),
        CascadeOutcome::Failed(err) => Some(OutboundMessage::error(ErrorCode::Internal, err.to_string())),
        CascadeOutcome::Settled(report) => {
            tracing::debug!(?report, "cascade settled");
            None
        }
        CascadeOutcome::Cancelled => None,
    }
}

/// Serve `controller` over a line stream until the reader hits EOF.
///
/// The current level is announced first.
pub async fn run<R, W>(controller: LevelController, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut events = controller.subscribe();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<CascadeOutcome>();
    let mut lines = reader.lines();
    let mut buf: Vec<u8> = Vec::with_capacity(1024);

    let intro: OutboundMessage = controller.level_info().await.into();
    send(&mut writer, &mut buf, &intro).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(reply) = handle_line(&controller, &line, &outcome_tx).await {
                    send(&mut writer, &mut buf, &reply).await?;
                }
            }
            Some(event) = events.recv() => {
                send(&mut writer, &mut buf, &event.into()).await?;
                if event == BoardEvent::CascadeComplete {
                    match controller.on_cascade_complete().await {
                        Ok(Some(info)) => send(&mut writer, &mut buf, &info.into()).await?,
                        Ok(None) => {}
                        Err(err) => {
                            let reply = level_reply(Err(err));
                            send(&mut writer, &mut buf, &reply).await?;
                        }
                    }
                }
            }
            Some(outcome) = outcome_rx.recv() => {
                if let Some(reply) = outcome_reply(outcome) {
                    send(&mut writer, &mut buf, &reply).await?;
                }
            }
        }
    }

    let cancelled = controller.session().cancel_pending().await;
    tracing::info!(cancelled, "input closed; adapter stopping");
    Ok(())
}
