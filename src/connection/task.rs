//! Background task driving one push-channel lifecycle
//!
//! The task dials, pumps frames into the [`StateStore`] until the channel
//! ends, then sleeps the reconnect delay and dials again. Cancellation is
//! checked at every await point that can block.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::message::{PushMessage, parse_push_message};
use crate::store::StateStore;
use crate::transport::{ChannelConnector, DuplexChannel};

use super::{ConnectionState, StateCell};

/// Everything the channel task needs, moved in at spawn time
pub(super) struct ChannelContext<C> {
    pub connector: Arc<C>,
    pub store: StateStore,
    pub state: Arc<StateCell>,
    pub reconnect_delay: Duration,
    pub cancel: CancellationToken,
}

/// Why the pump stopped
enum PumpEnd {
    /// Peer closed or the channel errored
    Lost,
    /// Teardown requested
    Cancelled,
}

/// Dial / pump / wait loop; runs until cancelled
pub(super) async fn run_channel<C: ChannelConnector>(
    ctx: ChannelContext<C>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    loop {
        ctx.state.set(ConnectionState::Connecting);

        let opened = tokio::select! {
            () = ctx.cancel.cancelled() => return,
            opened = ctx.connector.open() => opened,
        };

        match opened {
            Ok(mut channel) => {
                // Requests queued while we were down are stale
                while outbound.try_recv().is_ok() {}

                ctx.state.set(ConnectionState::Open);
                log::info!("Push channel open");

                match pump(&mut channel, &ctx, &mut outbound).await {
                    PumpEnd::Cancelled => {
                        if let Err(e) = channel.close().await {
                            log::debug!("Close on teardown failed: {e}");
                        }
                        return;
                    }
                    PumpEnd::Lost => {}
                }
            }
            Err(e) => log::warn!("Push channel failed to open: {e}"),
        }

        ctx.state.set(ConnectionState::Closed);
        ctx.state.set(ConnectionState::Reconnecting);
        log::info!("Push channel lost; reconnecting in {:?}", ctx.reconnect_delay);

        tokio::select! {
            () = ctx.cancel.cancelled() => return,
            () = tokio::time::sleep(ctx.reconnect_delay) => {}
        }
    }
}

async fn pump<C: ChannelConnector>(
    channel: &mut C::Channel,
    ctx: &ChannelContext<C>,
    outbound: &mut mpsc::UnboundedReceiver<String>,
) -> PumpEnd {
    loop {
        tokio::select! {
            () = ctx.cancel.cancelled() => return PumpEnd::Cancelled,
            Some(frame) = outbound.recv() => {
                if let Err(e) = channel.send(frame).await {
                    log::warn!("Push channel send failed: {e}");
                    return PumpEnd::Lost;
                }
            }
            inbound = channel.recv() => match inbound {
                Some(Ok(frame)) => deliver(&ctx.store, &frame),
                Some(Err(e)) => {
                    log::warn!("Push channel error: {e}");
                    return PumpEnd::Lost;
                }
                None => {
                    log::info!("Push channel closed by peer");
                    return PumpEnd::Lost;
                }
            },
        }
    }
}

/// Decode one frame and apply it; bad frames are logged and skipped
fn deliver(store: &StateStore, frame: &str) {
    match parse_push_message(frame) {
        Ok(PushMessage::StatsUpdate(snapshot) | PushMessage::StatusUpdate(snapshot)) => {
            store.apply_snapshot(snapshot);
        }
        Ok(PushMessage::Pong) => log::debug!("pong"),
        Ok(PushMessage::Unknown(tag)) => log::debug!("Ignoring push message type {tag:?}"),
        Err(e) => log::warn!("Dropping undecodable push frame: {e}"),
    }
}
