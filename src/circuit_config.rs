//! # JSON Circuit Configuration
//!
//! Circuits can be described in JSON instead of being wired up in code. A
//! document lists the wires, then the components in execution order, then the
//! active controls and the probes to attach.
//!
//! ```rust
//! use rusty_logic::circuit_config::CircuitFactory;
//!
//! let factory = CircuitFactory::new();
//! let mut board = factory.create_from_json("configs/counter.json").expect("valid circuit");
//! board.init().expect("circuit settles");
//! board.tick_clock(3).expect("clock ticks");
//! ```
//!
//! ## Configuration File Format
//!
//! ```json
//! {
//!   "name": "Counter",
//!   "simulator": { "max_passes": 100 },
//!   "wires": [ { "name": "clk", "width": 1 }, { "name": "count", "width": 4 } ],
//!   "components": [
//!     { "component_type": "const", "ports": ["vcc"], "properties": { "value": 1 } },
//!     { "component_type": "register", "name": "counter",
//!       "ports": ["clk", "vcc", "gnd", "vcc", "gnd", "count"] }
//!   ],
//!   "controls": [ { "name": "clock", "control_type": "clock", "ports": ["clk"] } ],
//!   "probes": [ { "name": "Count", "component": "counter", "format": "hex" } ]
//! }
//! ```
//!
//! Ports are either a wire name, a slice `{ "wire": "bus", "start": 4, "count": 4 }`
//! (`count` defaults to 1) or a concatenation `{ "concat": [ ... ] }`, most
//! significant part first.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Control, ProbeFormat};
use crate::component::StateRef;
use crate::components::alu::alu;
use crate::components::display::{LedArray, SegDisplay};
use crate::components::gates::{
    and_gate, bus_transceiver, comparator, constant, not_gate, or_gate, xor_gate,
};
use crate::components::hd44780::Hd44780;
use crate::components::memory::{Ram, Rom};
use crate::components::register::Register;
use crate::error::SimError;
use crate::signal::{combine, Signal};
use crate::simulator::{SimConfig, Simulator};
use crate::types::Value;
use crate::wire::WireId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub simulator: SimConfig,
    #[serde(default)]
    pub wires: Vec<WireConfig>,
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
    #[serde(default)]
    pub controls: Vec<ControlConfig>,
    #[serde(default)]
    pub probes: Vec<ProbeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireConfig {
    pub name: String,
    pub width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub component_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ports: Vec<SignalConfig>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl ComponentConfig {
    /// Instance name, falling back to the component type.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.component_type
        } else {
            &self.name
        }
    }

    fn invalid(&self, property: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidProperty {
            component: self.label().to_string(),
            property: property.to_string(),
            reason: reason.into(),
        }
    }

    fn word(&self, property: &str) -> Result<Option<Value>, ConfigError> {
        self.properties
            .get(property)
            .map(|v| parse_word(v).ok_or_else(|| self.invalid(property, "expected an unsigned integer")))
            .transpose()
    }

    fn words(&self, property: &str) -> Result<Option<Vec<Value>>, ConfigError> {
        let Some(raw) = self.properties.get(property) else {
            return Ok(None);
        };
        let items = raw
            .as_array()
            .ok_or_else(|| self.invalid(property, "expected an array"))?;
        items
            .iter()
            .map(|v| parse_word(v).ok_or_else(|| self.invalid(property, "expected unsigned integers")))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn size(&self, property: &str, default: usize) -> Result<usize, ConfigError> {
        match self.properties.get(property) {
            None => Ok(default),
            Some(v) => v
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| self.invalid(property, "expected a size")),
        }
    }
}

/// Numbers, or strings with an optional `0x`/`0b`/`0o` prefix for values too
/// wide for JSON numbers.
fn parse_word(value: &serde_json::Value) -> Option<Value> {
    if let Some(n) = value.as_u64() {
        return Some(Value::from(n));
    }
    let text = value.as_str()?.replace('_', "");
    let (digits, radix) = match text.get(..2) {
        Some("0x") | Some("0X") => (&text[2..], 16),
        Some("0b") | Some("0B") => (&text[2..], 2),
        Some("0o") | Some("0O") => (&text[2..], 8),
        _ => (text.as_str(), 10),
    };
    BigUint::parse_bytes(digits.as_bytes(), radix).map(Value::from)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalConfig {
    Wire(String),
    Slice {
        wire: String,
        start: u32,
        #[serde(default = "default_count")]
        count: u32,
    },
    Concat {
        concat: Vec<SignalConfig>,
    },
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    pub name: String,
    pub control_type: String,
    pub ports: Vec<SignalConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub name: String,
    pub component: String,
    #[serde(default)]
    pub format: ProbeFormat,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse circuit JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown component type: {0}")]
    UnknownComponentType(String),
    #[error("unknown control type: {0}")]
    UnknownControlType(String),
    #[error("unknown wire: {0}")]
    UnknownWire(String),
    #[error("wire '{0}' declared more than once")]
    DuplicateWire(String),
    #[error("no stateful component named '{0}' to probe")]
    UnknownComponent(String),
    #[error("{component}: invalid property '{property}': {reason}")]
    InvalidProperty {
        component: String,
        property: String,
        reason: String,
    },
    #[error(transparent)]
    Sim(#[from] SimError),
}

/// Stateful instance created from a document, kept so probes can attach.
#[derive(Debug, Clone)]
pub enum Part {
    Register(StateRef<Register>),
    Leds(StateRef<LedArray>),
    Display(StateRef<SegDisplay>),
    Ram(StateRef<Ram>),
    Rom(StateRef<Rom>),
    Lcd(StateRef<Hd44780>),
}

pub type ComponentCreator =
    fn(&mut Simulator, &ComponentConfig, Vec<Signal>) -> Result<Option<Part>, ConfigError>;

pub type ControlCreator = fn(&mut Simulator, Vec<Signal>) -> Result<Control, ConfigError>;

/// Builds [`Board`]s from circuit documents.
#[derive(Debug)]
pub struct CircuitFactory {
    component_registry: HashMap<String, ComponentCreator>,
    control_registry: HashMap<String, ControlCreator>,
}

impl Default for CircuitFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitFactory {
    pub fn new() -> Self {
        let mut factory = CircuitFactory {
            component_registry: HashMap::new(),
            control_registry: HashMap::new(),
        };
        factory.register_default_components();
        factory
    }

    fn register_default_components(&mut self) {
        self.register_component_type("and", |sim, config, ports| {
            sim.register_named_fn(config.label(), and_gate, ports);
            Ok(None)
        });
        self.register_component_type("or", |sim, config, ports| {
            sim.register_named_fn(config.label(), or_gate, ports);
            Ok(None)
        });
        self.register_component_type("xor", |sim, config, ports| {
            sim.register_named_fn(config.label(), xor_gate, ports);
            Ok(None)
        });
        self.register_component_type("not", |sim, config, ports| {
            sim.register_named_fn(config.label(), not_gate, ports);
            Ok(None)
        });
        self.register_component_type("const", |sim, config, ports| {
            let value = config
                .word("value")?
                .ok_or_else(|| config.invalid("value", "missing"))?;
            sim.register_named_fn(config.label(), constant(value), ports);
            Ok(None)
        });
        self.register_component_type("bus_transceiver", |sim, config, ports| {
            sim.register_named_fn(config.label(), bus_transceiver, ports);
            Ok(None)
        });
        self.register_component_type("comparator", |sim, config, ports| {
            sim.register_named_fn(config.label(), comparator, ports);
            Ok(None)
        });
        self.register_component_type("alu", |sim, config, ports| {
            sim.register_named_fn(config.label(), alu, ports);
            Ok(None)
        });
        self.register_component_type("register", |sim, config, ports| {
            let register = sim.register_component(Register::named(config.label()), ports);
            Ok(Some(Part::Register(register)))
        });
        self.register_component_type("ram", |sim, config, ports| {
            let ram = match config.words("content")? {
                Some(content) => Ram::new(content),
                None => Ram::with_size(config.size("size", 16)?),
            };
            let ram = sim.register_component(ram.named(config.label()), ports);
            Ok(Some(Part::Ram(ram)))
        });
        self.register_component_type("rom", |sim, config, ports| {
            let content = config
                .words("content")?
                .ok_or_else(|| config.invalid("content", "missing"))?;
            let rom = sim.register_component(Rom::new(content).named(config.label()), ports);
            Ok(Some(Part::Rom(rom)))
        });
        self.register_component_type("led_array", |sim, _config, ports| {
            let leds = sim.register_component(LedArray::new(), ports);
            Ok(Some(Part::Leds(leds)))
        });
        self.register_component_type("seg_display", |sim, _config, ports| {
            let display = sim.register_component(SegDisplay::new(), ports);
            Ok(Some(Part::Display(display)))
        });
        self.register_component_type("hd44780", |sim, config, ports| {
            let cols = config.size("cols", 16)?;
            let rows = config.size("rows", 2)?;
            let lcd = sim.register_component(Hd44780::new(cols, rows), ports);
            Ok(Some(Part::Lcd(lcd)))
        });

        self.control_registry
            .insert("clock".to_string(), |sim, ports| {
                Ok(Control::Clock(sim.register_active(ports)?))
            });
        self.control_registry
            .insert("dip_switch".to_string(), |sim, ports| {
                Ok(Control::Switch(sim.register_active(ports)?))
            });
        self.control_registry
            .insert("push_button".to_string(), |sim, ports| {
                Ok(Control::Button(sim.register_active(ports)?))
            });
    }

    /// Add or replace a component type.
    pub fn register_component_type(&mut self, name: &str, creator: ComponentCreator) {
        self.component_registry.insert(name.to_string(), creator);
    }

    pub fn component_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.component_registry.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn control_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.control_registry.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn create_from_json(&self, path: impl AsRef<Path>) -> Result<Board, ConfigError> {
        let config = self.load_json_config(path.as_ref())?;
        self.build(&config)
    }

    pub fn create_from_str(&self, json: &str) -> Result<Board, ConfigError> {
        let config: CircuitConfig = serde_json::from_str(json)?;
        self.build(&config)
    }

    fn load_json_config(&self, path: &Path) -> Result<CircuitConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Assemble an uninitialised board from a parsed document.
    pub fn build(&self, config: &CircuitConfig) -> Result<Board, ConfigError> {
        let mut sim = Simulator::with_config(config.simulator);

        let mut wires = HashMap::new();
        for wire in &config.wires {
            if wires.contains_key(&wire.name) {
                return Err(ConfigError::DuplicateWire(wire.name.clone()));
            }
            wires.insert(wire.name.clone(), sim.create_wire(wire.width)?);
        }

        let mut parts = HashMap::new();
        for component in &config.components {
            let creator = self
                .component_registry
                .get(&component.component_type)
                .ok_or_else(|| ConfigError::UnknownComponentType(component.component_type.clone()))?;
            let ports = resolve_ports(&sim, &wires, &component.ports)?;
            if let Some(part) = creator(&mut sim, component, ports)? {
                parts.insert(component.label().to_string(), part);
            }
        }

        let mut controls = Vec::new();
        for control in &config.controls {
            let creator = self
                .control_registry
                .get(&control.control_type)
                .ok_or_else(|| ConfigError::UnknownControlType(control.control_type.clone()))?;
            let ports = resolve_ports(&sim, &wires, &control.ports)?;
            controls.push((control.name.clone(), creator(&mut sim, ports)?));
        }

        let mut board = Board::new(config.name.clone(), sim).with_description(config.description.clone());
        for (name, control) in controls {
            board.add_control(name, control);
        }

        for probe in &config.probes {
            let part = parts
                .get(&probe.component)
                .ok_or_else(|| ConfigError::UnknownComponent(probe.component.clone()))?;
            match part {
                Part::Register(r) => board.watch_register(&probe.name, r, probe.format),
                Part::Leds(l) => board.watch_leds(&probe.name, l, probe.format),
                Part::Display(d) => board.watch_display(&probe.name, d, probe.format),
                Part::Ram(r) => board.watch_ram(&probe.name, r),
                Part::Rom(r) => board.watch_rom(&probe.name, r),
                Part::Lcd(l) => board.watch_lcd(&probe.name, l),
            }
        }

        debug!(
            "built circuit '{}' with {} wire(s) and {} component(s)",
            config.name,
            wires.len(),
            config.components.len()
        );
        Ok(board)
    }
}

fn resolve_ports(
    sim: &Simulator,
    wires: &HashMap<String, WireId>,
    ports: &[SignalConfig],
) -> Result<Vec<Signal>, ConfigError> {
    ports.iter().map(|p| resolve_signal(sim, wires, p)).collect()
}

fn resolve_signal(
    sim: &Simulator,
    wires: &HashMap<String, WireId>,
    signal: &SignalConfig,
) -> Result<Signal, ConfigError> {
    let lookup = |name: &String| {
        wires
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownWire(name.clone()))
    };
    match signal {
        SignalConfig::Wire(name) => Ok(Signal::Wire(lookup(name)?)),
        SignalConfig::Slice { wire, start, count } => Ok(sim.slice(lookup(wire)?, *start, *count)?),
        SignalConfig::Concat { concat } => Ok(combine(resolve_ports(sim, wires, concat)?)),
    }
}
