// Polling loop: serial bytes in, pin writes out
// Each byte is fed to the endpoint and its effect applied before the next byte is read.
// Pin writes go out over Zenoh to the process that owns the hardware pins.

use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

// local imports
use crate::actuator::{Actuator, ActuatorState, PinMap};
use crate::config::{DEFAULT_BAUDRATE, DEFAULT_PORT, LOOP_HZ, TOPIC_RT_PINS, TOPIC_STATE_MOTORS};
use crate::endpoint::Endpoint;
use crate::messages::PinWrite;
use crate::transport::{self, ByteSource, SerialTransport};

pub struct Runtime<S> {
    transport: S,
    endpoint: Endpoint,
    state: ActuatorState,
    pins: PinMap,
}

impl<S: ByteSource> Runtime<S> {
    pub fn new(transport: S, pins: PinMap) -> Self {
        Self {
            transport,
            endpoint: Endpoint::new(),
            state: ActuatorState::default(),
            pins,
        }
    }

    /// Consume every byte that is ready and return the resulting pin writes
    ///
    /// A transport error ends this drain but is not fatal: it is logged, the
    /// writes produced so far are returned, and the next poll starts afresh.
    /// Framing and armed-speed state are kept across the error.
    pub fn poll(&mut self) -> Vec<PinWrite> {
        let mut writes = Vec::new();

        loop {
            let byte = match self.next_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => break,
                Err(e) => {
                    warn!("Transport error, retrying next poll: {}", e);
                    break;
                }
            };
            if let Some(effect) = self.endpoint.feed(byte) {
                self.state.apply(&effect);
                let write = self.pins.resolve(&effect);
                debug!("{:?} -> {:?}", effect, write);
                writes.push(write);
            }
        }

        writes
    }

    fn next_byte(&mut self) -> transport::Result<Option<u8>> {
        if !self.transport.available()? {
            return Ok(None);
        }
        self.transport.read_byte()
    }

    pub fn state(&self) -> &ActuatorState {
        &self.state
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport_mut(&mut self) -> &mut S {
        &mut self.transport
    }
}

/// Settings for [`run`]
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub port: String,
    pub baudrate: u32,
    pub pins: PinMap,
    /// Log pin writes instead of publishing them
    pub simulate: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baudrate: DEFAULT_BAUDRATE,
            pins: PinMap::default(),
            simulate: false,
        }
    }
}

struct Outputs {
    _session: zenoh::Session,
    pins: zenoh::pubsub::Publisher<'static>,
    state: zenoh::pubsub::Publisher<'static>,
}

impl Outputs {
    async fn publish(
        &self,
        writes: &[PinWrite],
        state: &ActuatorState,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for write in writes {
            self.pins.put(serde_json::to_string(write)?).await?;
        }
        self.state.put(serde_json::to_string(state)?).await?;
        Ok(())
    }
}

pub async fn run(options: RunOptions) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    options.pins.validate()?;
    let transport = SerialTransport::open_with_baudrate(&options.port, options.baudrate)?;

    for pin in options.pins.output_pins() {
        debug!("Pin {} configured as output", pin);
    }

    let outputs = if options.simulate {
        info!("Simulation mode: pin writes are logged only");
        None
    } else {
        info!("Opening Zenoh session...");
        let session = zenoh::open(zenoh::Config::default()).await?;
        let pins = session.declare_publisher(TOPIC_RT_PINS).await?;
        let state = session.declare_publisher(TOPIC_STATE_MOTORS).await?;
        info!("Publishing to: {}, {}", TOPIC_RT_PINS, TOPIC_STATE_MOTORS);
        Some(Outputs {
            _session: session,
            pins,
            state,
        })
    };

    let mut runtime = Runtime::new(transport, options.pins);
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));

    info!("Endpoint started: {}Hz polling on {}", LOOP_HZ, options.port);

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }

        let writes = runtime.poll();
        if writes.is_empty() {
            continue;
        }

        match &outputs {
            Some(outputs) => {
                if let Err(e) = outputs.publish(&writes, runtime.state()).await {
                    warn!("Failed to publish pin writes: {}", e);
                }
            }
            None => {
                for write in &writes {
                    info!("Pin write: {:?}", write);
                }
            }
        }
    }
}
