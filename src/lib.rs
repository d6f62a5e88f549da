//! Mididash: a virtual MIDI control surface.
//!
//! Racks of rotary knobs whose positions are streamed as Control Change
//! messages to a MIDI output. The engine has three coupled parts: the gesture
//! mapper ([`gesture`]), the output transport ([`transport`]), and the
//! persisted rack/knob document ([`store`]); [`surface`] wires them together.

pub mod cli;
pub mod error;
pub mod gesture;
pub mod midi;
pub mod paths;
pub mod storage;
pub mod store;
pub mod surface;
pub mod transport;

pub use error::{AccessError, ImportError, ValidationError};
pub use store::ConfigStore;
pub use surface::ControlSurface;
pub use transport::Transport;
