//! Infrastructure layer: sockets, OS injection backends, and config storage.

pub mod injection;
pub mod network;
pub mod storage;
