// High-level motor control from the host
//
// Turns a signed control value into the command lines the endpoint
// understands, and pairs two motors into a differential drive.

use tracing::{debug, warn};

use super::keymap::Keymap;
use super::link::{LineSink, LinkError};
use crate::messages::Motor as MotorId;

/// Full-scale PWM value sent for a control of +/-1
pub const MAX_DUTY: u8 = 255;

/// One motor driven through a command link
pub struct Motor<L: LineSink> {
    link: L,
    keymap: Keymap,
    control: f32,
    pwm_enabled: bool,
    direction_enabled: bool,
}

impl<L: LineSink> Motor<L> {
    /// Motor with speed and direction control
    pub fn new(link: L, keymap: Keymap) -> Self {
        Self::with_channels(link, keymap, true, true)
    }

    /// Motor addressed by its standard endpoint name
    pub fn for_endpoint(link: L, motor: MotorId) -> Self {
        Self::new(link, Keymap::for_motor(motor))
    }

    /// Motor with some channels missing. Without PWM no speed is sent;
    /// without direction the motor is always driven forward.
    pub fn with_channels(link: L, keymap: Keymap, pwm: bool, direction: bool) -> Self {
        Self {
            link,
            keymap,
            control: 0.0,
            pwm_enabled: pwm,
            direction_enabled: direction,
        }
    }

    /// Set the control value and send it
    ///
    /// `value` is clamped to [-1, 1]: sign is direction, magnitude is speed,
    /// 0 brakes. NaN is treated as 0.
    pub fn set_control(&mut self, value: f32) -> Result<(), LinkError> {
        self.control = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
        debug!("Motor control {} -> {}", self.keymap.speed, self.control);

        if self.control == 0.0 {
            return self.link.send_line(&self.keymap.brake);
        }

        if self.pwm_enabled {
            self.link.send_line(&self.keymap.speed)?;
            self.link.send_line(&duty(self.control).to_string())?;
        }

        if !self.direction_enabled || self.control > 0.0 {
            self.link.send_line(&self.keymap.forwards)?;
        } else {
            self.link.send_line(&self.keymap.backwards)?;
        }

        self.link.send_line(&self.keymap.release)
    }

    /// Drive forward at `speed` (magnitude only)
    pub fn forward(&mut self, speed: f32) -> Result<(), LinkError> {
        self.set_control(speed.abs())
    }

    /// Drive backward at `speed` (magnitude only)
    pub fn backward(&mut self, speed: f32) -> Result<(), LinkError> {
        self.set_control(-speed.abs())
    }

    /// Brake
    pub fn stop(&mut self) -> Result<(), LinkError> {
        self.set_control(0.0)
    }

    /// Last control value sent
    pub fn control(&self) -> f32 {
        self.control
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }
}

/// PWM duty for a control value
fn duty(control: f32) -> u8 {
    (f32::from(MAX_DUTY) * control.abs()).round() as u8
}

/// Two motors as a differential drive train
pub struct DualMotor<L: LineSink> {
    pub left: Motor<L>,
    pub right: Motor<L>,
}

impl<L: LineSink> DualMotor<L> {
    pub fn new(left: Motor<L>, right: Motor<L>) -> Self {
        Self { left, right }
    }

    pub fn forward(&mut self, speed: f32) -> Result<(), LinkError> {
        self.left.forward(speed)?;
        self.right.forward(speed)
    }

    pub fn backward(&mut self, speed: f32) -> Result<(), LinkError> {
        self.left.backward(speed)?;
        self.right.backward(speed)
    }

    /// Spin in place to the right
    pub fn clockwise(&mut self, speed: f32) -> Result<(), LinkError> {
        self.left.forward(speed)?;
        self.right.backward(speed)
    }

    /// Spin in place to the left
    pub fn counterclockwise(&mut self, speed: f32) -> Result<(), LinkError> {
        self.left.backward(speed)?;
        self.right.forward(speed)
    }

    pub fn stop(&mut self) -> Result<(), LinkError> {
        self.left.stop()?;
        self.right.stop()
    }
}

impl<L: LineSink + Clone> DualMotor<L> {
    /// Both endpoint motors on one shared link
    pub fn for_endpoint(link: L) -> Self {
        Self::new(
            Motor::for_endpoint(link.clone(), MotorId::Left),
            Motor::for_endpoint(link, MotorId::Right),
        )
    }
}

impl<L: LineSink> Drop for DualMotor<L> {
    fn drop(&mut self) {
        // Leave the drive braked
        if let Err(e) = self.stop() {
            warn!("Failed to brake motors on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{Actuator, ActuatorState};
    use crate::endpoint::Endpoint;
    use std::sync::{Arc, Mutex};

    fn lines(bytes: &[u8]) -> Vec<String> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_duty_scaling() {
        assert_eq!(duty(1.0), 255);
        assert_eq!(duty(-1.0), 255);
        assert_eq!(duty(0.5), 128);
        assert_eq!(duty(0.1), 26);
    }

    #[test]
    fn test_forward_sequence() {
        let mut motor = Motor::for_endpoint(Vec::<u8>::new(), MotorId::Left);
        motor.set_control(0.5).unwrap();
        assert_eq!(
            lines(&motor.link),
            [
                "MOTOR_SPEED MotorLeft",
                "128",
                "MOTOR_FORWARD MotorLeft",
                "MOTOR_BRAKE_RELEASE MotorLeft"
            ]
        );
    }

    #[test]
    fn test_backward_clamps() {
        let mut motor = Motor::for_endpoint(Vec::<u8>::new(), MotorId::Right);
        motor.set_control(-3.0).unwrap();
        assert_eq!(motor.control(), -1.0);
        assert_eq!(
            lines(&motor.link),
            [
                "MOTOR_SPEED MotorRight",
                "255",
                "MOTOR_BACKWARD MotorRight",
                "MOTOR_BRAKE_RELEASE MotorRight"
            ]
        );
    }

    #[test]
    fn test_zero_brakes_only() {
        let mut motor = Motor::for_endpoint(Vec::<u8>::new(), MotorId::Left);
        motor.stop().unwrap();
        assert_eq!(lines(&motor.link), ["MOTOR_BRAKE_HOLD MotorLeft"]);

        let mut motor = Motor::for_endpoint(Vec::<u8>::new(), MotorId::Left);
        motor.set_control(f32::NAN).unwrap();
        assert_eq!(motor.control(), 0.0);
        assert_eq!(lines(&motor.link), ["MOTOR_BRAKE_HOLD MotorLeft"]);
    }

    #[test]
    fn test_missing_channels() {
        let keymap = Keymap::for_motor(MotorId::Left);
        let mut motor = Motor::with_channels(Vec::<u8>::new(), keymap, false, false);
        motor.backward(0.7).unwrap();
        assert_eq!(
            lines(&motor.link),
            ["MOTOR_FORWARD MotorLeft", "MOTOR_BRAKE_RELEASE MotorLeft"]
        );
    }

    #[test]
    fn test_dual_motor_drives_endpoint() {
        let link = Arc::new(Mutex::new(Vec::<u8>::new()));
        {
            let mut drive = DualMotor::for_endpoint(Arc::clone(&link));
            drive.clockwise(1.0).unwrap();
        }
        // Dropping the drive sent the brake lines after the spin
        let sent = link.lock().unwrap().clone();

        let mut endpoint = Endpoint::new();
        let mut state = ActuatorState::default();
        let mut after_spin = None;
        for effect in endpoint.effects(sent.iter().copied()) {
            state.apply(&effect);
            if after_spin.is_none() && state.right.brake == Some(false) {
                after_spin = Some(state.clone());
            }
        }

        let spin = after_spin.unwrap();
        assert_eq!(spin.left.forward, Some(true));
        assert_eq!(spin.left.speed, Some(255));
        assert_eq!(spin.left.brake, Some(false));
        assert_eq!(spin.right.forward, Some(false));
        assert_eq!(spin.right.speed, Some(255));

        assert_eq!(state.left.brake, Some(true));
        assert_eq!(state.right.brake, Some(true));
    }

    #[test]
    fn test_counterclockwise() {
        let link = Arc::new(Mutex::new(Vec::<u8>::new()));
        let mut drive = DualMotor::for_endpoint(Arc::clone(&link));
        drive.counterclockwise(0.2).unwrap();
        let sent = lines(&link.lock().unwrap());
        assert!(sent.contains(&"MOTOR_BACKWARD MotorLeft".to_string()));
        assert!(sent.contains(&"MOTOR_FORWARD MotorRight".to_string()));
        assert_eq!(drive.left.control(), -0.2);
        assert_eq!(drive.right.control(), 0.2);
    }
}
