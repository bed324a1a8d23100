use thiserror::Error;

use crate::types::Value;
use crate::wire::WireId;

/// Fatal simulation errors. None of them is retried: the settle that raised
/// one is aborted and its in-flight writes are dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("wire {wire} written by two independent drivers in the same pass")]
    DoubleWrite { wire: WireId },
    #[error("circuit did not settle within {passes} passes")]
    NonConvergence { passes: usize },
    #[error("{component}: address {address} out of bounds for {len} words")]
    OutOfBounds {
        component: String,
        address: Value,
        len: usize,
    },
    #[error("level query on a {width}-bit signal, expected a single bit")]
    NotSingleBit { width: u32 },
    #[error("slice of {count} bits at {start} exceeds a {width}-bit signal")]
    InvalidSlice { start: u32, count: u32, width: u32 },
    #[error("concatenations cannot be sliced")]
    UnsliceableView,
    #[error("concatenations are read-only")]
    ReadOnlyView,
    #[error("wires must be at least one bit wide")]
    ZeroWidth,
    #[error("unknown wire {0}")]
    UnknownWire(WireId),
    #[error("{component}: no signal bound to port {index}")]
    MissingPort { component: String, index: usize },
    #[error("{component}: instance is borrowed elsewhere during evaluation")]
    ComponentBusy { component: String },
    #[error("simulator already initialized")]
    AlreadyInitialized,
    #[error("simulator used before init()")]
    NotInitialized,
    #[error("{component}: {reason}")]
    Unsupported { component: String, reason: String },
    #[error("no control named '{0}'")]
    NoSuchControl(String),
    #[error("control '{name}' is not a {expected}")]
    WrongControl { name: String, expected: &'static str },
}
