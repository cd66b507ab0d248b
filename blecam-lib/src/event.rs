use crate::config::SubChannel;
use crate::error::Error;
use crate::link::BleParameters;
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything the transfer engine reports to its consumer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransferEvent {
    /// The camera reported new link parameters
    LinkParametersUpdated(BleParameters),
    /// A fragment arrived. `fraction` is in `[0, 1]`.
    TransferProgress { fraction: f32, rate_kbps: f64 },
    /// A full image was reassembled
    TransferComplete { image: Bytes, fps: f64 },
    /// The transport reported an error, or the image could not be reassembled.
    /// Transport failures arrive as [`Error::Transport`].
    TransferFailed { channel: SubChannel, error: Error },
}

/// Receiver of engine events.
///
/// Called synchronously from the engine's handlers, so implementations must
/// not block.
pub trait EventSink {
    fn emit(&mut self, event: TransferEvent);
}

impl EventSink for Vec<TransferEvent> {
    fn emit(&mut self, event: TransferEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: TransferEvent) {
        (**self).emit(event);
    }
}

impl EventSink for mpsc::UnboundedSender<TransferEvent> {
    fn emit(&mut self, event: TransferEvent) {
        if self.send(event).is_err() {
            debug!("Event receiver dropped, discarding event");
        }
    }
}

impl EventSink for mpsc::Sender<TransferEvent> {
    fn emit(&mut self, event: TransferEvent) {
        match self.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!("Event channel full, dropping {:?}", EventKind::of(&event));
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Event receiver dropped, discarding event");
            }
        }
    }
}

// Compact name for logging without dumping image payloads
#[derive(Debug)]
enum EventKind {
    LinkParametersUpdated,
    TransferProgress,
    TransferComplete,
    TransferFailed,
}

impl EventKind {
    fn of(event: &TransferEvent) -> Self {
        match event {
            TransferEvent::LinkParametersUpdated(_) => EventKind::LinkParametersUpdated,
            TransferEvent::TransferProgress { .. } => EventKind::TransferProgress,
            TransferEvent::TransferComplete { .. } => EventKind::TransferComplete,
            TransferEvent::TransferFailed { .. } => EventKind::TransferFailed,
        }
    }
}
