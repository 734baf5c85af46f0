//! Ferrous IP Stack Infrastructure Layer
pub mod buffers;
pub mod dns;
pub mod net;
