//! An assembled circuit with its named controls and probes.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::component::{MemoryReading, Reading, StateRef};
use crate::components::clock::Clock;
use crate::components::display::{LedArray, SegDisplay};
use crate::components::hd44780::{render_lines, Hd44780, LcdState};
use crate::components::memory::{Ram, Rom};
use crate::components::register::Register;
use crate::components::switch::{DipSwitch, PushButton};
use crate::error::SimError;
use crate::simulator::{SettleReport, Simulator};
use crate::stimulus::ActiveComponent;
use crate::types::Value;

/// Named handle to an active component.
#[derive(Debug, Clone)]
pub enum Control {
    Clock(Clock),
    Switch(DipSwitch),
    Button(PushButton),
}

impl Control {
    pub fn kind(&self) -> &'static str {
        match self {
            Control::Clock(_) => "clock",
            Control::Switch(_) => "switch",
            Control::Button(_) => "button",
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Control::Clock(c) => c.width(),
            Control::Switch(s) => s.width(),
            Control::Button(b) => b.width(),
        }
    }

    /// Default interaction: tick a clock, push a button, flip bit 0 of a switch.
    pub fn act(&self, sim: &mut Simulator) -> Result<SettleReport, SimError> {
        match self {
            Control::Clock(c) => c.tick(sim),
            Control::Switch(s) => s.toggle(sim, 0),
            Control::Button(b) => b.push(sim),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeFormat {
    #[default]
    Binary,
    Decimal,
    Hex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReading {
    /// Nothing pushed yet.
    Pending,
    Value(Reading),
    Memory(MemoryReading),
    Text(Vec<String>),
}

/// Observer fed by a component's `on_value_change` notifications.
#[derive(Debug, Clone)]
pub struct Probe {
    label: String,
    format: ProbeFormat,
    latest: Rc<RefCell<ProbeReading>>,
}

impl Probe {
    fn new(label: impl Into<String>, format: ProbeFormat) -> Self {
        Probe {
            label: label.into(),
            format,
            latest: Rc::new(RefCell::new(ProbeReading::Pending)),
        }
    }

    fn sink<T: 'static>(
        &self,
        convert: impl Fn(&T) -> ProbeReading + 'static,
    ) -> impl FnMut(&T) + 'static {
        let latest = self.latest.clone();
        move |value: &T| *latest.borrow_mut() = convert(value)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn format(&self) -> ProbeFormat {
        self.format
    }

    pub fn reading(&self) -> ProbeReading {
        self.latest.borrow().clone()
    }

    pub fn render(&self) -> String {
        match &*self.latest.borrow() {
            ProbeReading::Pending => "-".to_string(),
            ProbeReading::Value(reading) => format_value(reading, self.format),
            ProbeReading::Memory(memory) => memory
                .content
                .iter()
                .enumerate()
                .map(|(i, word)| {
                    if memory.address == Some(i) {
                        format!("[{word:02x}]")
                    } else {
                        format!("{word:02x}")
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
            ProbeReading::Text(lines) => lines.join("\n"),
        }
    }
}

pub fn format_value(reading: &Reading, format: ProbeFormat) -> String {
    match format {
        ProbeFormat::Binary => reading.value.to_binary_string(reading.width),
        ProbeFormat::Decimal => reading.value.to_string(),
        ProbeFormat::Hex => {
            let digits = reading.width.div_ceil(4) as usize;
            format!("{:0digits$x}", reading.value)
        }
    }
}

#[derive(Debug)]
pub struct Board {
    name: String,
    description: String,
    simulator: Simulator,
    controls: Vec<(String, Control)>,
    probes: Vec<Probe>,
}

fn find<'a>(controls: &'a [(String, Control)], name: &str) -> Result<&'a Control, SimError> {
    controls
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, control)| control)
        .ok_or_else(|| SimError::NoSuchControl(name.to_string()))
}

impl Board {
    pub fn new(name: impl Into<String>, simulator: Simulator) -> Self {
        Board {
            name: name.into(),
            description: String::new(),
            simulator,
            controls: Vec::new(),
            probes: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.simulator
    }

    pub fn add_control(&mut self, name: impl Into<String>, control: Control) {
        self.controls.push((name.into(), control));
    }

    pub fn controls(&self) -> &[(String, Control)] {
        &self.controls
    }

    pub fn control(&self, name: &str) -> Result<&Control, SimError> {
        find(&self.controls, name)
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    pub fn probe(&self, label: &str) -> Option<&Probe> {
        self.probes.iter().find(|p| p.label == label)
    }

    /// Rendered `(label, text)` of every probe, in insertion order.
    pub fn readings(&self) -> Vec<(String, String)> {
        self.probes
            .iter()
            .map(|p| (p.label.clone(), p.render()))
            .collect()
    }

    pub fn init(&mut self) -> Result<SettleReport, SimError> {
        debug!(
            "board '{}': {} control(s), {} probe(s)",
            self.name,
            self.controls.len(),
            self.probes.len()
        );
        self.simulator.init()
    }

    /// Run the default action of a control.
    pub fn act(&mut self, name: &str) -> Result<SettleReport, SimError> {
        find(&self.controls, name)?.act(&mut self.simulator)
    }

    /// Tick the first clock `n` times. Reports the last settle.
    pub fn tick_clock(&mut self, n: usize) -> Result<SettleReport, SimError> {
        let clock = self
            .controls
            .iter()
            .find_map(|(_, control)| match control {
                Control::Clock(clock) => Some(clock),
                _ => None,
            })
            .ok_or_else(|| SimError::NoSuchControl("clock".to_string()))?;

        let mut report = SettleReport { passes: 0 };
        for _ in 0..n {
            report = clock.tick(&mut self.simulator)?;
        }
        Ok(report)
    }

    pub fn set_switch(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<SettleReport, SimError> {
        match find(&self.controls, name)? {
            Control::Switch(s) => s.set(&mut self.simulator, value),
            _ => Err(wrong(name, "switch")),
        }
    }

    pub fn toggle_switch(&mut self, name: &str, bit: u32) -> Result<SettleReport, SimError> {
        match find(&self.controls, name)? {
            Control::Switch(s) => s.toggle(&mut self.simulator, bit),
            _ => Err(wrong(name, "switch")),
        }
    }

    pub fn push_button(&mut self, name: &str) -> Result<SettleReport, SimError> {
        match find(&self.controls, name)? {
            Control::Button(b) => b.push(&mut self.simulator),
            _ => Err(wrong(name, "button")),
        }
    }

    fn add_probe(&mut self, label: impl Into<String>, format: ProbeFormat) -> Probe {
        let probe = Probe::new(label, format);
        self.probes.push(probe.clone());
        probe
    }

    pub fn watch_register(&mut self, label: &str, register: &StateRef<Register>, format: ProbeFormat) {
        let probe = self.add_probe(label, format);
        register
            .borrow_mut()
            .on_value_change(probe.sink(|r: &Reading| ProbeReading::Value(r.clone())));
    }

    pub fn watch_leds(&mut self, label: &str, leds: &StateRef<LedArray>, format: ProbeFormat) {
        let probe = self.add_probe(label, format);
        leds.borrow_mut()
            .on_value_change(probe.sink(|r: &Reading| ProbeReading::Value(r.clone())));
    }

    pub fn watch_display(&mut self, label: &str, display: &StateRef<SegDisplay>, format: ProbeFormat) {
        let probe = self.add_probe(label, format);
        display
            .borrow_mut()
            .on_value_change(probe.sink(|r: &Reading| ProbeReading::Value(r.clone())));
    }

    pub fn watch_ram(&mut self, label: &str, ram: &StateRef<Ram>) {
        let probe = self.add_probe(label, ProbeFormat::Hex);
        ram.borrow_mut()
            .on_value_change(probe.sink(|m: &MemoryReading| ProbeReading::Memory(m.clone())));
    }

    pub fn watch_rom(&mut self, label: &str, rom: &StateRef<Rom>) {
        let probe = self.add_probe(label, ProbeFormat::Hex);
        rom.borrow_mut()
            .on_value_change(probe.sink(|m: &MemoryReading| ProbeReading::Memory(m.clone())));
    }

    pub fn watch_lcd(&mut self, label: &str, lcd: &StateRef<Hd44780>) {
        let probe = self.add_probe(label, ProbeFormat::Binary);
        let (cols, rows) = lcd.borrow().size();
        *probe.latest.borrow_mut() = ProbeReading::Text(lcd.borrow().lines());
        lcd.borrow_mut().on_state_change(
            probe.sink(move |state: &LcdState| ProbeReading::Text(render_lines(state, cols, rows))),
        );
    }
}

fn wrong(name: &str, expected: &'static str) -> SimError {
    SimError::WrongControl {
        name: name.to_string(),
        expected,
    }
}
