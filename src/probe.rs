use std::{fmt::Display, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Tokenizing and shunting-yard conversion; the lexer is lazy so both
    /// happen in the same pass.
    Convert,
    Evaluate,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Convert => write!(f, "convert"),
            Stage::Evaluate => write!(f, "evaluate"),
        }
    }
}

/// Receives how long each pipeline stage took.
pub trait Probe {
    fn record(&mut self, stage: Stage, elapsed: Duration);
}

pub struct NoProbe;

impl Probe for NoProbe {
    fn record(&mut self, _: Stage, _: Duration) {}
}

impl<F: FnMut(Stage, Duration)> Probe for F {
    fn record(&mut self, stage: Stage, elapsed: Duration) {
        self(stage, elapsed)
    }
}

#[derive(Debug, Default, Clone)]
pub struct Timings {
    entries: Vec<(Stage, Duration)>,
}

impl Timings {
    pub fn iter(&self) -> impl Iterator<Item = &(Stage, Duration)> {
        self.entries.iter()
    }

    pub fn total(&self) -> Duration {
        self.entries.iter().map(|(_, elapsed)| *elapsed).sum()
    }
}

impl Probe for Timings {
    fn record(&mut self, stage: Stage, elapsed: Duration) {
        self.entries.push((stage, elapsed));
    }
}
