// Host-side motor control for a KINETIC serial endpoint
//
// Provides:
// - Command line transmission over a serial link
// - JSON keymaps naming each motor's command lines
// - Motor and dual-motor drive API

mod driver;
pub mod keymap;
pub mod link;

pub use driver::{DualMotor, Motor, MAX_DUTY};
pub use keymap::{export_all, Keymap, KeymapError};
pub use link::{LineSink, LinkError, SerialLink};
