use std::any::type_name;
use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::component::{Behavior, Component, Io, StateRef};
use crate::error::SimError;
use crate::signal::Signal;
use crate::stimulus::{ActiveComponent, ActiveLines, Stimulus};
use crate::types::Value;
use crate::wire::{Wire, WireId, Wires, Writer};

pub const DEFAULT_MAX_PASSES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Upper bound on component passes per settle.
    pub max_passes: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Outcome of a successful settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleReport {
    /// Full component passes run, including the final one that changed nothing.
    pub passes: usize,
}

impl SettleReport {
    /// Passes that actually moved a value.
    pub fn propagation_depth(&self) -> usize {
        self.passes.saturating_sub(1)
    }
}

#[derive(Debug)]
struct Registration {
    label: String,
    behavior: Behavior,
    ports: Vec<Signal>,
}

/// Owns the wires and components of one circuit and settles it.
///
/// Components run in registration order, every pass, until a pass commits no
/// change. A settle that needs more than [`SimConfig::max_passes`] passes
/// fails with [`SimError::NonConvergence`]. Whenever a settle fails, in-flight
/// writes are dropped and the wires keep the values of the last completed pass.
#[derive(Debug, Default)]
pub struct Simulator {
    config: SimConfig,
    wires: Wires,
    components: Vec<Registration>,
    initialized: bool,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SimConfig) -> Self {
        Simulator {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn create_wire(&mut self, width: u32) -> Result<WireId, SimError> {
        self.wires.create(width)
    }

    pub fn slice(
        &self,
        signal: impl Into<Signal>,
        start: u32,
        count: u32,
    ) -> Result<Signal, SimError> {
        self.wires
            .slice(&signal.into(), start, count)
            .map(Signal::Slice)
    }

    pub fn bit(&self, signal: impl Into<Signal>, n: u32) -> Result<Signal, SimError> {
        self.slice(signal, n, 1)
    }

    pub fn width(&self, signal: impl Into<Signal>) -> Result<u32, SimError> {
        self.wires.width_of(&signal.into())
    }

    /// Committed value seen through `signal`.
    pub fn read(&self, signal: impl Into<Signal>) -> Result<Value, SimError> {
        self.wires.read(&signal.into())
    }

    pub fn wire(&self, id: WireId) -> Result<&Wire, SimError> {
        self.wires.get(id)
    }

    pub fn wires(&self) -> &Wires {
        &self.wires
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Register a stateless combinational function.
    pub fn register_fn<F>(&mut self, f: F, ports: Vec<Signal>)
    where
        F: Fn(&mut Io<'_>) -> Result<(), SimError> + 'static,
    {
        let label = short_type_name::<F>().to_string();
        self.register_named_fn(label, f, ports);
    }

    pub fn register_named_fn<F>(&mut self, label: impl Into<String>, f: F, ports: Vec<Signal>)
    where
        F: Fn(&mut Io<'_>) -> Result<(), SimError> + 'static,
    {
        let label = label.into();
        trace!("registering {label} on {} port(s)", ports.len());
        self.components.push(Registration {
            label,
            behavior: Behavior::Combinational(Box::new(f)),
            ports,
        });
    }

    /// Register a stateful instance and hand back a shared handle to it.
    pub fn register_component<T>(&mut self, component: T, ports: Vec<Signal>) -> StateRef<T>
    where
        T: Component + 'static,
    {
        let label = component.name().to_string();
        trace!("registering {label} on {} port(s)", ports.len());
        let instance = Rc::new(RefCell::new(component));
        self.components.push(Registration {
            label,
            behavior: Behavior::Stateful(instance.clone()),
            ports,
        });
        instance
    }

    /// Attach an active component to writable lines.
    pub fn register_active<A>(&mut self, lines: Vec<Signal>) -> Result<A, SimError>
    where
        A: ActiveComponent,
    {
        let widths = lines
            .iter()
            .map(|line| {
                if line.is_writable() {
                    self.wires.width_of(line)
                } else {
                    Err(SimError::ReadOnlyView)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        let owner = short_type_name::<A>().to_string();
        A::attach(ActiveLines::new(owner, lines, widths))
    }

    /// First settle of a freshly built circuit.
    pub fn init(&mut self) -> Result<SettleReport, SimError> {
        if self.initialized {
            return Err(SimError::AlreadyInitialized);
        }
        debug!(
            "initializing {} wire(s), {} component(s)",
            self.wires.len(),
            self.components.len()
        );
        self.initialized = true;
        self.run_settle()
    }

    /// Settle again without new input.
    pub fn settle(&mut self) -> Result<SettleReport, SimError> {
        if !self.initialized {
            return Err(SimError::NotInitialized);
        }
        self.run_settle()
    }

    /// Inject external writes, make them visible and settle.
    pub fn apply(&mut self, stimulus: Stimulus) -> Result<SettleReport, SimError> {
        if !self.initialized {
            return Err(SimError::NotInitialized);
        }

        for (signal, value) in stimulus.writes() {
            trace!("stimulus {signal} <- {value:#x}");
            if let Err(err) = self.wires.write(signal, value.clone(), Writer::Stimulus) {
                self.wires.discard_pending();
                return Err(err);
            }
        }
        self.wires.commit_all();
        self.run_settle()
    }

    fn run_pass(&mut self) -> Result<(), SimError> {
        let Simulator {
            wires, components, ..
        } = self;
        for (index, registration) in components.iter().enumerate() {
            let mut io = Io::new(
                &registration.label,
                wires,
                &registration.ports,
                Writer::Component(index),
            );
            registration.behavior.invoke(&registration.label, &mut io)?;
        }
        Ok(())
    }

    fn run_settle(&mut self) -> Result<SettleReport, SimError> {
        let limit = self.config.max_passes;
        for pass in 1..=limit {
            if let Err(err) = self.run_pass() {
                self.wires.discard_pending();
                warn!("settle aborted in pass {pass}: {err}");
                return Err(err);
            }

            let changed = self.wires.commit_all();
            trace!("pass {pass}: {changed} wire(s) changed");
            if changed == 0 {
                debug!("settled after {pass} pass(es)");
                return Ok(SettleReport { passes: pass });
            }
        }

        warn!("no fixed point after {limit} passes");
        Err(SimError::NonConvergence { passes: limit })
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    // closures are named after the function that built them
    base.rsplit("::")
        .find(|segment| !segment.starts_with('{'))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::gates::{and_gate, not_gate, xor_gate};
    use crate::ports;

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Simulator>(), "Simulator");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }

    #[test]
    fn test_init_once() {
        let mut sim = Simulator::new();
        assert_eq!(sim.settle(), Err(SimError::NotInitialized));
        assert_eq!(sim.apply(Stimulus::new()), Err(SimError::NotInitialized));
        assert_eq!(sim.init(), Ok(SettleReport { passes: 1 }));
        assert_eq!(sim.init(), Err(SimError::AlreadyInitialized));
    }

    #[test]
    fn test_registration_and_settle() {
        let mut sim = Simulator::new();
        let a = sim.create_wire(1).unwrap();
        let b = sim.create_wire(1).unwrap();
        let sum = sim.create_wire(1).unwrap();
        let carry = sim.create_wire(1).unwrap();
        sim.register_fn(xor_gate, ports![a, b, sum]);
        sim.register_fn(and_gate, ports![a, b, carry]);
        assert_eq!(sim.component_count(), 2);
        assert_eq!(sim.components[0].label, "xor_gate");

        sim.init().unwrap();
        let report = sim
            .apply(Stimulus::new().set(a, 1u32).set(b, 1u32))
            .unwrap();
        assert_eq!(report.propagation_depth(), 1);
        assert_eq!(sim.read(sum).unwrap(), Value::zero());
        assert_eq!(sim.read(carry).unwrap(), Value::from(1u32));
    }

    #[test]
    fn test_pass_bound_is_configurable() {
        let mut sim = Simulator::with_config(SimConfig { max_passes: 7 });
        let w = sim.create_wire(1).unwrap();
        sim.register_fn(not_gate, ports![w, w]);
        assert_eq!(sim.init(), Err(SimError::NonConvergence { passes: 7 }));
    }

    #[test]
    fn test_failed_settle_discards_pending() {
        let mut sim = Simulator::new();
        let out = sim.create_wire(4).unwrap();
        sim.register_fn(|io: &mut Io<'_>| io.write(0, 3u32), ports![out]);
        sim.register_fn(|io: &mut Io<'_>| io.write(0, 5u32), ports![out]);
        assert_eq!(sim.init(), Err(SimError::DoubleWrite { wire: out }));
        let wire = sim.wire(out).unwrap();
        assert_eq!(wire.value(), &Value::zero());
        assert!(wire.pending().is_none());
    }

    #[test]
    fn test_stimulus_rejects_concat() {
        let mut sim = Simulator::new();
        let a = sim.create_wire(1).unwrap();
        sim.init().unwrap();
        let both = crate::combine([a, a]);
        assert_eq!(
            sim.apply(Stimulus::new().set(both, 1u32)),
            Err(SimError::ReadOnlyView)
        );
    }
}
