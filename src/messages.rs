// Message types shared by the endpoint, the actuator side and the host controller

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two drive motors addressed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motor {
    Left,
    Right,
}

impl Motor {
    pub const ALL: [Motor; 2] = [Motor::Left, Motor::Right];

    /// Name used in command lines
    pub fn name(self) -> &'static str {
        match self {
            Motor::Left => "MotorLeft",
            Motor::Right => "MotorRight",
        }
    }

    /// Exact, case-sensitive lookup of a wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Motor::Left => 0,
            Motor::Right => 1,
        }
    }
}

impl fmt::Display for Motor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A command line from the vocabulary, `<VERB> <MotorName>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    BrakeHold(Motor),
    BrakeRelease(Motor),
    Forward(Motor),
    Backward(Motor),
    /// Arms the motor so the next line is read as its speed
    Speed(Motor),
}

impl Command {
    /// Classify a line. Only exact matches count: no trimming, no case folding,
    /// exactly one space between verb and motor name.
    pub fn parse(line: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(line).ok()?;
        let (verb, name) = text.split_once(' ')?;
        let motor = Motor::from_name(name)?;

        match verb {
            "MOTOR_BRAKE_HOLD" => Some(Command::BrakeHold(motor)),
            "MOTOR_BRAKE_RELEASE" => Some(Command::BrakeRelease(motor)),
            "MOTOR_FORWARD" => Some(Command::Forward(motor)),
            "MOTOR_BACKWARD" => Some(Command::Backward(motor)),
            "MOTOR_SPEED" => Some(Command::Speed(motor)),
            _ => None,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Command::BrakeHold(_) => "MOTOR_BRAKE_HOLD",
            Command::BrakeRelease(_) => "MOTOR_BRAKE_RELEASE",
            Command::Forward(_) => "MOTOR_FORWARD",
            Command::Backward(_) => "MOTOR_BACKWARD",
            Command::Speed(_) => "MOTOR_SPEED",
        }
    }

    pub fn motor(&self) -> Motor {
        match *self {
            Command::BrakeHold(m)
            | Command::BrakeRelease(m)
            | Command::Forward(m)
            | Command::Backward(m)
            | Command::Speed(m) => m,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.motor())
    }
}

/// Output produced by a dispatched line, addressed to one motor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum Effect {
    Brake { motor: Motor, engaged: bool },
    Direction { motor: Motor, forward: bool },
    Speed { motor: Motor, value: i32 },
}

impl Effect {
    pub fn motor(&self) -> Motor {
        match *self {
            Effect::Brake { motor, .. }
            | Effect::Direction { motor, .. }
            | Effect::Speed { motor, .. } => motor,
        }
    }
}

/// Logic level of a digital output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// Value written to a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinValue {
    Digital(Level),
    Analog(i32),
}

/// Pin-level write published to the hardware process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinWrite {
    pub pin: u8,
    pub value: PinValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vocabulary() {
        assert_eq!(
            Command::parse(b"MOTOR_BRAKE_HOLD MotorLeft"),
            Some(Command::BrakeHold(Motor::Left))
        );
        assert_eq!(
            Command::parse(b"MOTOR_BRAKE_RELEASE MotorRight"),
            Some(Command::BrakeRelease(Motor::Right))
        );
        assert_eq!(
            Command::parse(b"MOTOR_FORWARD MotorRight"),
            Some(Command::Forward(Motor::Right))
        );
        assert_eq!(
            Command::parse(b"MOTOR_BACKWARD MotorLeft"),
            Some(Command::Backward(Motor::Left))
        );
        assert_eq!(
            Command::parse(b"MOTOR_SPEED MotorLeft"),
            Some(Command::Speed(Motor::Left))
        );
    }

    #[test]
    fn test_parse_requires_exact_match() {
        assert_eq!(Command::parse(b"MOTOR_FORWARD MotorLeft "), None);
        assert_eq!(Command::parse(b" MOTOR_FORWARD MotorLeft"), None);
        assert_eq!(Command::parse(b"MOTOR_FORWARD  MotorLeft"), None);
        assert_eq!(Command::parse(b"motor_forward MotorLeft"), None);
        assert_eq!(Command::parse(b"MOTOR_FORWARD motorleft"), None);
        assert_eq!(Command::parse(b"MOTOR_FORWARD MotorLeft\r"), None);
        assert_eq!(Command::parse(b"MOTOR_FORWARD"), None);
        assert_eq!(Command::parse(b""), None);
        assert_eq!(Command::parse(&[0xFF, b' ', b'M']), None);
    }

    #[test]
    fn test_display_is_wire_literal() {
        for motor in Motor::ALL {
            for cmd in [
                Command::BrakeHold(motor),
                Command::BrakeRelease(motor),
                Command::Forward(motor),
                Command::Backward(motor),
                Command::Speed(motor),
            ] {
                let text = cmd.to_string();
                assert_eq!(Command::parse(text.as_bytes()), Some(cmd));
            }
        }
        assert_eq!(
            Command::Speed(Motor::Right).to_string(),
            "MOTOR_SPEED MotorRight"
        );
    }

    #[test]
    fn test_effect_json() {
        let effect = Effect::Speed {
            motor: Motor::Right,
            value: 200,
        };
        let json = serde_json::to_string(&effect).unwrap();
        assert_eq!(json, r#"{"channel":"speed","motor":"right","value":200}"#);
    }
}
