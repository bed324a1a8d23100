use super::{resolve, words};
use crate::component::{Component, Io, Listener, MemoryReading};
use crate::error::SimError;
use crate::types::Value;

pub const ADDRESS: usize = 0;
pub const DATA: usize = 1;
pub const OUTPUT_ENABLE: usize = 2;

/// Read-only memory: `(address, data, output_enable)`.
///
/// The address may be any signal, including a concatenation; a microcode
/// store is just a ROM addressed by opcode, step and flags.
#[derive(Debug)]
pub struct Rom {
    name: String,
    memory: Vec<Value>,
    on_value_change: Listener<MemoryReading>,
}

impl Rom {
    pub fn new(content: Vec<Value>) -> Self {
        Rom {
            name: "rom".to_string(),
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

    /// Replace the image. Visible on the next settle.
    pub fn set_content(&mut self, content: Vec<Value>) {
        self.memory = content;
    }

    pub fn on_value_change(&mut self, callback: impl FnMut(&MemoryReading) + 'static) {
        self.on_value_change.set(callback);
    }
}

impl Component for Rom {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&mut self, io: &mut Io<'_>) -> Result<(), SimError> {
        let mut address = None;
        if io.high(OUTPUT_ENABLE)? {
            let index = resolve(&self.name, &io.value(ADDRESS)?, self.memory.len())?;
            io.write(DATA, self.memory[index].clone())?;
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
