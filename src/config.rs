// Line capacity, serial settings, loop rate, topics
use std::time::Duration;

// Bytes kept per command line; anything past this is dropped until the next newline
pub const LINE_CAPACITY: usize = 64;

// Line terminator on the wire
pub const LINE_TERMINATOR: u8 = 0x0A;

// Serial link configuration
pub const DEFAULT_BAUDRATE: u32 = 9600;
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";
pub const SERIAL_TIMEOUT: Duration = Duration::from_millis(100);

// Polling loop frequency
pub const LOOP_HZ: u64 = 200;

// Zenoh topics
pub const TOPIC_RT_PINS: &str = "kinetic/rt/pins"; // pin writes for the hardware process
pub const TOPIC_STATE_MOTORS: &str = "kinetic/state/motors"; // channel snapshot
