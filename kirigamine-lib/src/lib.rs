pub mod checksum;
pub mod command;
pub mod constants;
pub mod crypto;
pub mod diagnostics;
pub mod energy;
pub mod error;
pub mod fault;
pub mod frame;
pub mod general;
pub mod payload;
pub mod power;
pub mod sensor;
pub mod state;
pub mod temperature;

// Re-export the types most callers need
pub use command::{Extend08Fields, GeneralFields};
pub use crypto::EnvelopeKey;
pub use error::KirigamineError;
pub use frame::{Frame, FrameGroup};
pub use state::DeviceState;
