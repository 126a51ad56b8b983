//! Outbound chat messaging.

pub mod port;
