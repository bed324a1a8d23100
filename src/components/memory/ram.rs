use super::{resolve, words};
use crate::component::{Component, Io, Listener, MemoryReading};
use crate::edge::EdgeDetector;
use crate::error::SimError;
use crate::types::Value;

pub const CLOCK: usize = 0;
pub const ADDRESS: usize = 1;
pub const DATA: usize = 2;
pub const OUTPUT_ENABLE: usize = 3;
pub const WRITE_ENABLE: usize = 4;

/// Random-access memory: `(clk, address, data, output_enable, write_enable)`.
///
/// Writes are latched on the rising clock edge. The addressed word is driven
/// onto `data` every pass while output-enable is high.
#[derive(Debug)]
pub struct Ram {
    name: String,
    clock: EdgeDetector,
    memory: Vec<Value>,
    on_value_change: Listener<MemoryReading>,
}

impl Ram {
    pub fn new(content: Vec<Value>) -> Self {
        Ram {
            name: "ram".to_string(),
            clock: EdgeDetector::rising(),
            memory: content,
            on_value_change: Listener::default(),
        }
    }

    pub fn from_words<I, V>(content: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(words(content))
    }

    /// Zero-filled memory of `size` words.
    pub fn with_size(size: usize) -> Self {
        Self::new(vec![Value::zero(); size])
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    pub fn content(&self) -> &[Value] {
        &self.memory
    }

    pub fn set_content(&mut self, content: Vec<Value>) {
        self.memory = content;
    }

    pub fn read_word(&self, address: usize) -> Result<&Value, SimError> {
        let index = resolve(&self.name, &Value::from(address), self.memory.len())?;
        Ok(&self.memory[index])
    }

    pub fn write_word(&mut self, address: usize, value: impl Into<Value>) -> Result<(), SimError> {
        let index = resolve(&self.name, &Value::from(address), self.memory.len())?;
        self.memory[index] = value.into();
        Ok(())
    }

    pub fn clear_memory(&mut self) {
        self.fill_memory(Value::zero());
    }

    pub fn fill_memory(&mut self, value: impl Into<Value>) {
        let value = value.into();
        self.memory.iter_mut().for_each(|word| *word = value.clone());
    }

    pub fn on_value_change(&mut self, callback: impl FnMut(&MemoryReading) + 'static) {
        self.on_value_change.set(callback);
    }
}

impl Component for Ram {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&mut self, io: &mut Io<'_>) -> Result<(), SimError> {
        let edge = self.clock.detect(io, CLOCK)?;
        let store = edge && io.high(WRITE_ENABLE)?;
        let drive = io.high(OUTPUT_ENABLE)?;

        let mut address = None;
        if store || drive {
            let index = resolve(&self.name, &io.value(ADDRESS)?, self.memory.len())?;
            if store {
                self.memory[index] = io.value(DATA)?;
            }
            if drive {
                io.write(DATA, self.memory[index].clone())?;
            }
            address = Some(index);
        }

        if self.on_value_change.is_set() {
            let reading = MemoryReading {
                address,
                content: self.memory.clone(),
            };
            self.on_value_change.notify(&reading);
        }
        Ok(())
    }
}
