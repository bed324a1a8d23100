use crate::component::Io;
use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Tracks the previous sample of a 1-bit signal and reports transitions.
///
/// A detector is sampled once per settle pass. A clock edge that causes
/// several passes is therefore only reported by the first of them.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    edge: Edge,
    previous: bool,
    primed: bool,
}

impl EdgeDetector {
    /// Previous sample starts low, so a line that is already high on the
    /// first evaluation counts as a rising edge.
    pub fn rising() -> Self {
        EdgeDetector {
            edge: Edge::Rising,
            previous: false,
            primed: true,
        }
    }

    /// Previous sample starts high. The first sample never fires, even when
    /// the line is already low.
    pub fn falling() -> Self {
        EdgeDetector {
            edge: Edge::Falling,
            previous: true,
            primed: false,
        }
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn previous(&self) -> bool {
        self.previous
    }

    /// Feed the current level. The previous sample is always updated.
    pub fn sample(&mut self, level: bool) -> bool {
        let fired = self.primed
            && match self.edge {
                Edge::Rising => !self.previous && level,
                Edge::Falling => self.previous && !level,
            };
        self.previous = level;
        self.primed = true;
        fired
    }

    /// Sample port `port` of a component invocation.
    pub fn detect(&mut self, io: &Io<'_>, port: usize) -> Result<bool, SimError> {
        Ok(self.sample(io.high(port)?))
    }
}
