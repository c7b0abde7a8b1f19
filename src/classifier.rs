// src/classifier.rs
// Edge-triggered run-length classification of bin powers into dots, dashes and spaces

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Dot,
    Dash,
    Space,
}

impl Symbol {
    pub fn as_char(self) -> char {
        match self {
            Symbol::Dot => '.',
            Symbol::Dash => '-',
            Symbol::Space => ' ',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A maximal stretch of bins on the same side of the power threshold, with its length in bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Run {
    Tone(usize),
    Silence(usize),
}

impl Run {
    fn start(is_tone: bool) -> Self {
        if is_tone { Run::Tone(1) } else { Run::Silence(1) }
    }

    fn is_tone(self) -> bool {
        matches!(self, Run::Tone(_))
    }

    fn extended(self) -> Self {
        match self {
            Run::Tone(n) => Run::Tone(n + 1),
            Run::Silence(n) => Run::Silence(n + 1),
        }
    }

    /// Symbol emitted once the run is finished. Short silences are intra-character gaps.
    pub fn symbol(self, dash_bin_count: usize) -> Option<Symbol> {
        match self {
            Run::Tone(n) if n < dash_bin_count => Some(Symbol::Dot),
            Run::Tone(_) => Some(Symbol::Dash),
            Run::Silence(n) if n < dash_bin_count => None,
            Run::Silence(_) => Some(Symbol::Space),
        }
    }
}

/// Streaming state machine: feed powers one at a time, then `finish` to flush the last run.
#[derive(Debug, Clone)]
pub struct RunClassifier {
    power_threshold: f64,
    dash_bin_count: usize,
    current: Option<Run>,
}

impl RunClassifier {
    pub fn new(power_threshold: f64, dash_bin_count: usize) -> Self {
        Self {
            power_threshold,
            dash_bin_count,
            current: None,
        }
    }

    pub fn current(&self) -> Option<Run> {
        self.current
    }

    /// Consumes one bin power. Returns a symbol when this bin ends the previous run.
    pub fn push(&mut self, power: f64) -> Option<Symbol> {
        let is_tone = power > self.power_threshold;
        match self.current {
            Some(run) if run.is_tone() == is_tone => {
                self.current = Some(run.extended());
                None
            }
            Some(run) => {
                self.current = Some(Run::start(is_tone));
                log::trace!("Edge after {:?}", run);
                run.symbol(self.dash_bin_count)
            }
            None => {
                self.current = Some(Run::start(is_tone));
                None
            }
        }
    }

    /// Finalizes the trailing run, which has no edge after it.
    pub fn finish(self) -> Option<Symbol> {
        self.current.and_then(|run| {
            log::trace!("Final {:?}", run);
            run.symbol(self.dash_bin_count)
        })
    }
}

/// Converts bin powers into the dot/dash/space string.
pub fn power_to_symbols(powers: &[f64], power_threshold: f64, dash_bin_count: usize) -> String {
    let mut classifier = RunClassifier::new(power_threshold, dash_bin_count);
    let mut symbols: String = powers
        .iter()
        .filter_map(|&p| classifier.push(p))
        .map(Symbol::as_char)
        .collect();
    if let Some(last) = classifier.finish() {
        symbols.push(last.as_char());
    }
    symbols
}
