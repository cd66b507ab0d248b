//! Reassembly of images from image-characteristic notifications.
//!
//! The camera announces each image with an ImageInfo message on the info
//! characteristic, then pushes the image bytes as MTU-sized notifications on
//! the image characteristic. [`TransferEngine`] glues those fragments back
//! together, tracks timing for transfer rate and FPS, and reports everything
//! through an [`EventSink`].
//!
//! The wire format has no sequence numbers. Fragments are assumed to arrive
//! in order and without loss; the engine cannot detect otherwise.

use crate::clock::{Clock, SystemClock};
use crate::config::SubChannel;
use crate::error::{Error, TransportError};
use crate::event::{EventSink, TransferEvent};
use crate::info::InfoMessage;
use bytes::BytesMut;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// No transfer in progress
    Idle,
    /// An ImageInfo was received and fragments are being collected
    AwaitingImage,
    /// The last image was delivered; left on the next inbound message
    Complete,
}

/// Stateful image reassembler for one camera session.
///
/// Handlers take `&mut self` and never block. Notifications for a session
/// must be fed strictly serialized in arrival order: interleaving fragments
/// from concurrent callers corrupts the reassembled image, and no locking is
/// done here to prevent it.
pub struct TransferEngine<S: EventSink, C: Clock = SystemClock> {
    sink: S,
    clock: C,
    state: TransferState,
    buffer: BytesMut,
    expected_size: u32,
    started_at: Option<Instant>,
    stream_started_at: Option<Instant>,
    frame_count: u32,
    rate_kbps: f64,
}

impl<S: EventSink> TransferEngine<S, SystemClock> {
    pub fn new(sink: S) -> Self {
        Self::with_clock(sink, SystemClock)
    }
}

impl<S: EventSink, C: Clock> TransferEngine<S, C> {
    pub fn with_clock(sink: S, clock: C) -> Self {
        Self {
            sink,
            clock,
            state: TransferState::Idle,
            buffer: BytesMut::new(),
            expected_size: 0,
            started_at: None,
            stream_started_at: None,
            frame_count: 0,
            rate_kbps: 0.0,
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Declared size of the current (or last) image
    pub fn expected_size(&self) -> u32 {
        self.expected_size
    }

    /// Bytes accumulated for the in-flight image
    pub fn received(&self) -> usize {
        self.buffer.len()
    }

    /// Images completed since the stream was started
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Transfer rate measured at the last fragment, in kbit/s
    pub fn transfer_rate_kbps(&self) -> f64 {
        self.rate_kbps
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Handle one message from the info characteristic.
    ///
    /// Any partially received image is discarded first, whatever the message
    /// turns out to be. Only ImageInfo moves the transfer state; anything else
    /// leaves an in-flight transfer collecting fragments. Malformed and
    /// unrecognized messages are otherwise ignored.
    pub fn handle_info(&mut self, message: &[u8]) {
        self.clear_buffer();
        if self.state == TransferState::Complete {
            self.state = TransferState::Idle;
        }

        match InfoMessage::parse(message) {
            Ok(InfoMessage::ImageInfo { image_size }) => {
                let now = self.clock.now();
                self.expected_size = image_size;
                self.started_at = Some(now);
                self.stream_started_at.get_or_insert(now);
                self.rate_kbps = 0.0;
                self.state = TransferState::AwaitingImage;
                debug!("Expecting image of {} bytes", image_size);
            }
            Ok(InfoMessage::BleInfo(params)) => {
                info!(
                    "Link parameters: MTU {}, interval {:.2} ms, tx {}, rx {}",
                    params.mtu, params.connection_interval_ms, params.tx_phy, params.rx_phy
                );
                self.sink.emit(TransferEvent::LinkParametersUpdated(params));
            }
            Ok(InfoMessage::Unknown { code }) => {
                debug!("Ignoring info message of unknown kind {:?}", code);
            }
            Err(e) => {
                debug!("Ignoring malformed info message {:02x?}: {}", message, e);
            }
        }
    }

    /// Handle one fragment from the image characteristic.
    pub fn handle_image(&mut self, fragment: &[u8]) {
        match self.state {
            TransferState::AwaitingImage => {}
            TransferState::Complete | TransferState::Idle => {
                self.state = TransferState::Idle;
                debug!("Dropping {} byte fragment received outside of a transfer", fragment.len());
                return;
            }
        }

        let received = self.buffer.len() + fragment.len();
        if received > self.expected_size as usize {
            let error = Error::ImageOverflow {
                expected: self.expected_size,
                received,
            };
            warn!("Abandoning transfer: {}", error);
            self.discard_partial();
            self.sink.emit(TransferEvent::TransferFailed {
                channel: SubChannel::ImageNotify,
                error,
            });
            return;
        }

        self.buffer.extend_from_slice(fragment);

        let now = self.clock.now();
        let elapsed = since(self.started_at, now);
        self.rate_kbps = rate_kbps(self.buffer.len(), elapsed);

        if self.buffer.len() == self.expected_size as usize {
            self.frame_count += 1;
            let fps = frames_per_second(self.frame_count, since(self.stream_started_at, now));

            self.sink.emit(TransferEvent::TransferProgress {
                fraction: 1.0,
                rate_kbps: self.rate_kbps,
            });

            let image = self.buffer.split().freeze();
            info!(
                "Image complete: {} bytes in {:?} ({:.2} kbps, {:.2} fps)",
                image.len(),
                elapsed,
                self.rate_kbps,
                fps
            );
            self.sink.emit(TransferEvent::TransferComplete { image, fps });
            self.state = TransferState::Complete;
        } else {
            let fraction = self.buffer.len() as f32 / self.expected_size as f32;
            self.sink.emit(TransferEvent::TransferProgress {
                fraction,
                rate_kbps: self.rate_kbps,
            });
        }
    }

    /// Relay a transport failure and abandon the in-flight image.
    pub fn handle_error(&mut self, channel: SubChannel, error: &TransportError) {
        warn!("Transfer failed on {}: {}", channel, error);
        self.discard_partial();
        self.sink.emit(TransferEvent::TransferFailed {
            channel,
            error: Error::Transport(error.clone()),
        });
    }

    /// Start measuring a new stream (or single capture): FPS clock and frame
    /// count restart and any partial image is dropped.
    pub fn begin_stream(&mut self) {
        self.discard_partial();
        self.stream_started_at = Some(self.clock.now());
        self.frame_count = 0;
    }

    /// Explicit stop: the partial image is dropped.
    pub fn stop(&mut self) {
        self.discard_partial();
    }

    /// Forget everything, as after a disconnect.
    pub fn reset(&mut self) {
        self.buffer = BytesMut::new();
        self.state = TransferState::Idle;
        self.expected_size = 0;
        self.started_at = None;
        self.stream_started_at = None;
        self.frame_count = 0;
        self.rate_kbps = 0.0;
    }

    fn discard_partial(&mut self) {
        self.clear_buffer();
        self.state = TransferState::Idle;
    }

    fn clear_buffer(&mut self) {
        if !self.buffer.is_empty() {
            debug!(
                "Discarding {} of {} bytes of partial image",
                self.buffer.len(),
                self.expected_size
            );
            self.buffer.clear();
        }
    }
}

fn since(start: Option<Instant>, now: Instant) -> Duration {
    start.map(|t| now.saturating_duration_since(t)).unwrap_or_default()
}

/// `bytes` transferred over `elapsed`, in kbit/s. Zero when no time has passed.
pub fn rate_kbps(bytes: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 * 8.0 / 1000.0 / secs
}

/// Frames over `elapsed`. Zero when no time has passed.
pub fn frames_per_second(frames: u32, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    frames as f64 / secs
}
