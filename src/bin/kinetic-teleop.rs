// Keyboard teleop over the serial link: W/S drive, A/D spin, R/F speed, Space brake, Q quit
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kinetic_endpoint::config::{DEFAULT_BAUDRATE, DEFAULT_PORT};
use kinetic_endpoint::messages::Motor as MotorId;
use kinetic_endpoint::motor::{
    DualMotor, Keymap, KeymapError, LineSink, LinkError, Motor, SerialLink,
};

const SPEEDS: [f32; 3] = [0.25, 0.5, 1.0];
const INPUT_TIMEOUT_MS: u64 = 300; // Brake after this much time with no movement key

/// Drive a two-motor endpoint from the keyboard
#[derive(Parser, Debug)]
#[command(name = "kinetic-teleop", version)]
struct Args {
    /// Serial port of the endpoint
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,

    #[arg(short, long, default_value_t = DEFAULT_BAUDRATE)]
    baud: u32,

    /// Keymap JSON for the left motor
    #[arg(long, value_name = "FILE")]
    left_keymap: Option<PathBuf>,

    /// Keymap JSON for the right motor
    #[arg(long, value_name = "FILE")]
    right_keymap: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drive {
    Stop,
    Forward,
    Backward,
    Clockwise,
    Counterclockwise,
}

fn load_keymap(path: Option<PathBuf>, motor: MotorId) -> Result<Keymap, KeymapError> {
    match path {
        Some(path) => Keymap::load(path),
        None => Ok(Keymap::for_motor(motor)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let left = load_keymap(args.left_keymap, MotorId::Left)?;
    let right = load_keymap(args.right_keymap, MotorId::Right)?;

    info!("Opening serial link on {} at {} baud", args.port, args.baud);
    let link = SerialLink::open_with_baudrate(&args.port, args.baud)?.shared();
    let mut drive = DualMotor::new(Motor::new(link.clone(), left), Motor::new(link, right));

    info!("Controls: W/S=drive, A/D=spin, R/F=speed, Space=brake, Q=quit");
    print_speed(0);

    enable_raw_mode()?;
    let result = run_teleop(&mut drive);
    disable_raw_mode()?;

    result
}

fn run_teleop<L: LineSink>(
    drive: &mut DualMotor<L>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut speed_idx: usize = 0;
    let mut current = Drive::Stop;
    let mut last_movement_input = Instant::now();

    loop {
        let mut wanted = current;
        let mut resend = false;

        // Poll for key with 20ms timeout
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    KeyCode::Char('w') if pressed => {
                        wanted = Drive::Forward;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        wanted = Drive::Backward;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        wanted = Drive::Counterclockwise;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        wanted = Drive::Clockwise;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char(' ') if pressed => wanted = Drive::Stop,

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(SPEEDS.len() - 1);
                        print_speed(speed_idx);
                        resend = true;
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        print_speed(speed_idx);
                        resend = true;
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        if wanted != Drive::Stop
            && last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS)
        {
            wanted = Drive::Stop;
        }

        // The link is slow; only send when the drive actually changes
        if wanted != current || (resend && wanted != Drive::Stop) {
            send(drive, wanted, SPEEDS[speed_idx])?;
            current = wanted;
        }
    }

    Ok(())
}

fn send<L: LineSink>(
    drive: &mut DualMotor<L>,
    action: Drive,
    speed: f32,
) -> Result<(), LinkError> {
    match action {
        Drive::Stop => drive.stop(),
        Drive::Forward => drive.forward(speed),
        Drive::Backward => drive.backward(speed),
        Drive::Clockwise => drive.clockwise(speed),
        Drive::Counterclockwise => drive.counterclockwise(speed),
    }
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {}", label);
}
