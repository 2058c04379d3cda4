//! Line-oriented command endpoint for a two-motor actuator controller.
//!
//! Bytes arriving on a serial link are framed into lines, matched against a
//! fixed command vocabulary and turned into writes on each motor's speed,
//! direction and brake outputs. The `motor` module is the host side that
//! produces those lines.

pub mod actuator;
pub mod config;
pub mod endpoint;
pub mod messages;
pub mod motor;
pub mod runtime;
pub mod transport;
