// Keymaps: the command lines a host sends to drive one motor
//
// Stored as JSON so a host can be pointed at an endpoint whose motors carry
// other names: {"FORWARDS": ..., "BACKWARDS": ..., "SPEED": ..., "BRAKE": ..., "RELEASE": ...}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::messages::{Command, Motor};

#[derive(Debug, thiserror::Error)]
pub enum KeymapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid keymap: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Keymap {
    pub forwards: String,
    pub backwards: String,
    pub speed: String,
    pub brake: String,
    pub release: String,
}

impl Keymap {
    /// Keymap for one of the endpoint's motors
    pub fn for_motor(motor: Motor) -> Self {
        Self {
            forwards: Command::Forward(motor).to_string(),
            backwards: Command::Backward(motor).to_string(),
            speed: Command::Speed(motor).to_string(),
            brake: Command::BrakeHold(motor).to_string(),
            release: Command::BrakeRelease(motor).to_string(),
        }
    }

    /// Conventional file name, e.g. `motor_MotorLeft_keymap.json`
    pub fn file_name(motor: Motor) -> String {
        format!("motor_{}_keymap.json", motor.name())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeymapError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), KeymapError> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

/// Write the keymap of every motor into `dir`, returning the written paths
pub fn export_all(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, KeymapError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(Motor::ALL.len());
    for motor in Motor::ALL {
        let path = dir.join(Keymap::file_name(motor));
        Keymap::for_motor(motor).save(&path)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_for_left() {
        let keymap = Keymap::for_motor(Motor::Left);
        assert_eq!(keymap.forwards, "MOTOR_FORWARD MotorLeft");
        assert_eq!(keymap.backwards, "MOTOR_BACKWARD MotorLeft");
        assert_eq!(keymap.speed, "MOTOR_SPEED MotorLeft");
        assert_eq!(keymap.brake, "MOTOR_BRAKE_HOLD MotorLeft");
        assert_eq!(keymap.release, "MOTOR_BRAKE_RELEASE MotorLeft");
    }

    #[test]
    fn test_json_keys() {
        let json = serde_json::to_value(Keymap::for_motor(Motor::Right)).unwrap();
        assert_eq!(json["FORWARDS"], "MOTOR_FORWARD MotorRight");
        assert_eq!(json["BRAKE"], "MOTOR_BRAKE_HOLD MotorRight");
        assert_eq!(json["RELEASE"], "MOTOR_BRAKE_RELEASE MotorRight");
    }

    #[test]
    fn test_export_and_load() {
        let name = format!("kinetic-keymaps-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        let written = export_all(&dir).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("motor_MotorLeft_keymap.json"));

        let loaded = Keymap::load(&written[1]).unwrap();
        assert_eq!(loaded, Keymap::for_motor(Motor::Right));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_rejects_missing_key() {
        let name = format!("kinetic-bad-keymap-{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, r#"{"FORWARDS": "GO"}"#).unwrap();
        let result = Keymap::load(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(KeymapError::Json(_))));
    }
}
