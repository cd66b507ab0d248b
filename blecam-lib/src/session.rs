use crate::clock::{Clock, SystemClock};
use crate::command::{Command, Resolution};
use crate::config::SubChannel;
use crate::engine::TransferEngine;
use crate::error::{Error, TransportError};
use crate::event::EventSink;
use crate::link::Phy;
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outbound half of a connected transport: the command characteristic.
///
/// Writes are fire-and-forget; implementations serialize their own writes.
pub trait CommandWriter {
    fn write_command(&mut self, data: Bytes) -> Result<(), TransportError>;
}

impl CommandWriter for Vec<Bytes> {
    fn write_command(&mut self, data: Bytes) -> Result<(), TransportError> {
        self.push(data);
        Ok(())
    }
}

impl<W: CommandWriter + ?Sized> CommandWriter for &mut W {
    fn write_command(&mut self, data: Bytes) -> Result<(), TransportError> {
        (**self).write_command(data)
    }
}

impl CommandWriter for mpsc::UnboundedSender<Bytes> {
    fn write_command(&mut self, data: Bytes) -> Result<(), TransportError> {
        self.send(data).map_err(|_| TransportError::Disconnected)
    }
}

/// What the transport session pushes towards the engine
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Notification {
        channel: SubChannel,
        data: Result<Bytes, TransportError>,
    },
    Disconnected,
}

/// A connected camera.
///
/// Only constructible from a [`CommandWriter`], which the connection layer
/// hands out once the link and its characteristics are ready. Consumed by
/// [`CameraSession::disconnect`].
pub struct CameraSession<W: CommandWriter, S: EventSink, C: Clock = SystemClock> {
    writer: W,
    engine: TransferEngine<S, C>,
}

impl<W: CommandWriter, S: EventSink> CameraSession<W, S, SystemClock> {
    pub fn new(writer: W, sink: S) -> Self {
        Self::with_clock(writer, sink, SystemClock)
    }
}

impl<W: CommandWriter, S: EventSink, C: Clock> CameraSession<W, S, C> {
    pub fn with_clock(writer: W, sink: S, clock: C) -> Self {
        info!("Camera session started");
        Self {
            writer,
            engine: TransferEngine::with_clock(sink, clock),
        }
    }

    pub fn engine(&self) -> &TransferEngine<S, C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TransferEngine<S, C> {
        &mut self.engine
    }

    /// Write a command to the camera
    pub fn send(&mut self, command: Command) -> Result<(), Error> {
        let data = command.encode();
        debug!("Sending {:?} as {:02x?}", command, data.as_ref());
        self.writer.write_command(data)?;
        Ok(())
    }

    pub fn start_stream(&mut self) -> Result<(), Error> {
        self.engine.begin_stream();
        self.send(Command::StartStreaming)
    }

    pub fn take_snapshot(&mut self) -> Result<(), Error> {
        self.engine.begin_stream();
        self.send(Command::StartSingleCapture)
    }

    pub fn stop_stream(&mut self) -> Result<(), Error> {
        self.engine.stop();
        self.send(Command::StopStreaming)
    }

    pub fn change_resolution(&mut self, resolution: Resolution) -> Result<(), Error> {
        self.send(Command::ChangeResolution(resolution))
    }

    pub fn change_phy(&mut self, phy: Phy) -> Result<(), Error> {
        self.send(Command::ChangePhy(phy))
    }

    /// Ask the camera to report its link parameters on the info characteristic
    pub fn request_ble_parameters(&mut self) -> Result<(), Error> {
        self.send(Command::SendBleParameters)
    }

    /// Route one notification to the engine
    pub fn notify(&mut self, channel: SubChannel, data: Result<Bytes, TransportError>) {
        match (channel, data) {
            (_, Err(error)) => self.engine.handle_error(channel, &error),
            (SubChannel::ImageNotify, Ok(fragment)) => self.engine.handle_image(&fragment),
            (SubChannel::InfoNotify, Ok(message)) => self.engine.handle_info(&message),
            (SubChannel::CommandWrite, Ok(data)) => {
                warn!("Ignoring {} byte notification on the command channel", data.len());
            }
        }
    }

    /// Feed notifications to the engine until the transport disconnects or
    /// the channel closes. Engine state is discarded on return.
    pub async fn run(&mut self, events: &mut mpsc::Receiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::Notification { channel, data } => self.notify(channel, data),
                SessionEvent::Disconnected => {
                    info!("Camera disconnected");
                    break;
                }
            }
        }
        self.engine.reset();
    }

    /// Tear down the session, handing back the writer
    pub fn disconnect(mut self) -> W {
        self.engine.reset();
        info!("Camera session closed");
        self.writer
    }
}
