//! Word-addressed memories. Addresses are resolved only when a word is
//! actually accessed, so an out-of-range address on an idle memory is fine.

pub mod ram;
pub mod rom;

pub use ram::Ram;
pub use rom::Rom;

use crate::error::SimError;
use crate::types::Value;

pub(crate) fn resolve(component: &str, address: &Value, len: usize) -> Result<usize, SimError> {
    address
        .to_usize()
        .filter(|index| *index < len)
        .ok_or_else(|| SimError::OutOfBounds {
            component: component.to_string(),
            address: address.clone(),
            len,
        })
}

pub(crate) fn words<I, V>(content: I) -> Vec<Value>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    content.into_iter().map(Into::into).collect()
}
