//! Protocol module containing the event model, the decoder, and the encoder.

pub mod decoder;
pub mod encoder;
pub mod events;

pub use decoder::{
    decode_event, decode_event_at, decode_line, now_timestamp, DecodeError, ProtocolError,
};
pub use encoder::encode_line;
pub use events::*;
