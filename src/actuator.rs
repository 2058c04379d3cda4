// Actuator side: channel state per motor and the pin wiring behind it

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::messages::{Effect, Level, Motor, PinValue, PinWrite};

/// Anything that can carry out an [`Effect`]
pub trait Actuator {
    fn apply(&mut self, effect: &Effect);
}

/// Last value written to each channel of one motor, `None` if never written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorChannels {
    pub forward: Option<bool>,
    pub brake: Option<bool>,
    pub speed: Option<i32>,
}

/// Snapshot of every output channel. Serves as the simulated actuator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorState {
    pub left: MotorChannels,
    pub right: MotorChannels,
}

impl ActuatorState {
    pub fn motor(&self, motor: Motor) -> &MotorChannels {
        match motor {
            Motor::Left => &self.left,
            Motor::Right => &self.right,
        }
    }

    pub fn motor_mut(&mut self, motor: Motor) -> &mut MotorChannels {
        match motor {
            Motor::Left => &mut self.left,
            Motor::Right => &mut self.right,
        }
    }
}

impl Actuator for ActuatorState {
    fn apply(&mut self, effect: &Effect) {
        let channels = self.motor_mut(effect.motor());
        match *effect {
            Effect::Brake { engaged, .. } => channels.brake = Some(engaged),
            Effect::Direction { forward, .. } => channels.forward = Some(forward),
            Effect::Speed { value, .. } => channels.speed = Some(value),
        }
    }
}

/// Pins driving one motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorPins {
    pub pwm: u8,
    pub direction: u8,
    pub brake: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum PinMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pin map: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Pin {0} assigned to more than one channel")]
    DuplicatePin(u8),
}

/// Wiring of both motors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMap {
    pub left: MotorPins,
    pub right: MotorPins,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            left: MotorPins {
                pwm: 3,
                direction: 2,
                brake: 4,
            },
            right: MotorPins {
                pwm: 9,
                direction: 5,
                brake: 6,
            },
        }
    }
}

impl PinMap {
    /// Load a pin map from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PinMapError> {
        let text = fs::read_to_string(path.as_ref())?;
        let map: PinMap = serde_json::from_str(&text)?;
        map.validate()?;
        debug!("Loaded pin map from {}: {:?}", path.as_ref().display(), map);
        Ok(map)
    }

    /// Every pin must drive exactly one channel
    pub fn validate(&self) -> Result<(), PinMapError> {
        let mut seen = HashSet::new();
        for pin in self.output_pins() {
            if !seen.insert(pin) {
                return Err(PinMapError::DuplicatePin(pin));
            }
        }
        Ok(())
    }

    pub fn motor(&self, motor: Motor) -> &MotorPins {
        match motor {
            Motor::Left => &self.left,
            Motor::Right => &self.right,
        }
    }

    /// All output pins, [pwm, direction, brake] for left then right
    pub fn output_pins(&self) -> [u8; 6] {
        [
            self.left.pwm,
            self.left.direction,
            self.left.brake,
            self.right.pwm,
            self.right.direction,
            self.right.brake,
        ]
    }

    /// Translate an effect into the pin write that carries it out.
    /// Forward and brake-engaged are logic high.
    pub fn resolve(&self, effect: &Effect) -> PinWrite {
        let pins = self.motor(effect.motor());
        match *effect {
            Effect::Brake { engaged, .. } => PinWrite {
                pin: pins.brake,
                value: PinValue::Digital(Level::from(engaged)),
            },
            Effect::Direction { forward, .. } => PinWrite {
                pin: pins.direction,
                value: PinValue::Digital(Level::from(forward)),
            },
            Effect::Speed { value, .. } => PinWrite {
                pin: pins.pwm,
                value: PinValue::Analog(value),
            },
        }
    }
}
