// Line classification and per-motor speed arming

use tracing::debug;

use super::framer::Line;
use crate::messages::{Command, Effect, Motor};

/// Per-motor dispatch state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorMode {
    #[default]
    Idle,
    /// `MOTOR_SPEED <m>` was seen; the next line is this motor's speed
    AwaitingSpeed,
}

/// Maps completed lines to effects
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    modes: [MotorMode; 2],
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self, motor: Motor) -> MotorMode {
        self.modes[motor.index()]
    }

    pub fn is_awaiting_speed(&self, motor: Motor) -> bool {
        self.mode(motor) == MotorMode::AwaitingSpeed
    }

    /// Classify one line
    ///
    /// An armed motor consumes the line as its speed, whatever the line says,
    /// and the line is not matched against the command table. Empty lines are
    /// ignored and leave an armed motor armed.
    pub fn dispatch<const N: usize>(&mut self, line: &Line<N>) -> Option<Effect> {
        if line.is_empty() {
            return None;
        }

        let armed = Motor::ALL.into_iter().find(|&m| self.is_awaiting_speed(m));
        if let Some(motor) = armed {
            self.modes[motor.index()] = MotorMode::Idle;
            let value = parse_speed(line.text());
            debug!("Speed for {}: {}", motor, value);
            return Some(Effect::Speed { motor, value });
        }

        let Some(command) = Command::parse(line.text()) else {
            debug!(
                "Ignoring unrecognized line: {:?}",
                String::from_utf8_lossy(line.raw())
            );
            return None;
        };
        debug!("Command: {}", command);

        match command {
            Command::BrakeHold(motor) => Some(Effect::Brake {
                motor,
                engaged: true,
            }),
            Command::BrakeRelease(motor) => Some(Effect::Brake {
                motor,
                engaged: false,
            }),
            Command::Forward(motor) => Some(Effect::Direction {
                motor,
                forward: true,
            }),
            Command::Backward(motor) => Some(Effect::Direction {
                motor,
                forward: false,
            }),
            Command::Speed(motor) => {
                self.modes[motor.index()] = MotorMode::AwaitingSpeed;
                None
            }
        }
    }
}

/// Best-effort decimal parse with C `atoi` rules
///
/// Leading whitespace is skipped, one optional sign is accepted, and digits
/// are read up to the first non-digit. No digits gives 0. Out-of-range values
/// saturate.
pub fn parse_speed(text: &[u8]) -> i32 {
    let mut rest = text;
    while let [first, tail @ ..] = rest {
        if !matches!(first, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r') {
            break;
        }
        rest = tail;
    }

    let negative = match rest {
        [b'-', tail @ ..] => {
            rest = tail;
            true
        }
        [b'+', tail @ ..] => {
            rest = tail;
            false
        }
        _ => false,
    };

    let mut value: i32 = 0;
    for &b in rest.iter().take_while(|b| b.is_ascii_digit()) {
        let digit = i32::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}
