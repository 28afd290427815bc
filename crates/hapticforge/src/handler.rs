//! Per-connection pump: moves frames between the server and the session.
//!
//! Inbound frames go to the translator; outbound batches go to the
//! server. The pump stops once the translator does. If the server hangs
//! up first, the translator is told to shut down and whatever it still
//! emits is dropped.

use hapticforge_session::{OutboundReceiver, SessionHandle};
use hapticforge_transport::Connection;

use crate::HapticError;

/// What woke the pump up.
enum Event<E> {
    Outbound(Option<String>),
    Inbound(Result<Option<String>, E>),
}

/// Runs until the translator's outbound stream ends.
pub(crate) async fn pump<C>(
    conn: &C,
    handle: &SessionHandle,
    outbound: &mut OutboundReceiver,
) -> Result<(), HapticError>
where
    C: Connection,
    HapticError: From<C::Error>,
{
    let conn_id = conn.id();
    let mut server_open = true;

    loop {
        let event = tokio::select! {
            frame = outbound.recv() => Event::Outbound(frame),
            inbound = conn.recv(), if server_open => Event::Inbound(inbound),
        };

        match event {
            Event::Outbound(Some(frame)) => {
                if server_open {
                    tracing::trace!(%conn_id, %frame, "sending frame");
                    if let Err(e) = conn.send(&frame).await {
                        let _ = handle.shutdown().await;
                        return Err(e.into());
                    }
                } else {
                    tracing::debug!(%conn_id, %frame, "server gone, dropping frame");
                }
            }
            Event::Outbound(None) => break,
            Event::Inbound(Ok(Some(frame))) => {
                tracing::trace!(%conn_id, %frame, "received frame");
                if handle.inbound(frame).await.is_err() {
                    tracing::debug!(%conn_id, "session stopped, ignoring frame");
                }
            }
            Event::Inbound(Ok(None)) => {
                tracing::info!(%conn_id, "server closed the connection");
                server_open = false;
                let _ = handle.shutdown().await;
            }
            Event::Inbound(Err(e)) => {
                let _ = handle.shutdown().await;
                return Err(e.into());
            }
        }
    }

    Ok(())
}
