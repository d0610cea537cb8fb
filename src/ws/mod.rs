//! Realtime transport

pub mod handler;
pub mod protocol;
