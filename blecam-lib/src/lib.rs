pub mod clock;
pub mod command;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod event;
pub mod info;
pub mod link;
pub mod session;


// Re-export the main types for easy access
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{Command, Opcode, Resolution};
pub use config::{ServiceLayout, SubChannel};
pub use engine::{TransferEngine, TransferState};
pub use error::{Error, TransportError};
pub use event::{EventSink, TransferEvent};
pub use info::{InfoKind, InfoMessage};
pub use link::{BleParameters, Phy};
pub use session::{CameraSession, CommandWriter, SessionEvent};
