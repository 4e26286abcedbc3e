//! Ordered fallback strategies.
//!
//! A chain tries each strategy in order and stops at the first success.
//! Failures of earlier strategies are logged and handed back with the
//! result, so a fallback never hides why the preferred path failed.

use stickerforge_core::{Error, Result, StrategyFailure};

type StrategyFn<'a> = Box<dyn FnOnce() -> Result<Vec<u8>> + 'a>;

/// A named way of producing output bytes.
pub struct Strategy<'a> {
    name: String,
    run: StrategyFn<'a>,
}

impl<'a> Strategy<'a> {
    /// Wrap `run` under `name`.
    pub fn new(name: impl Into<String>, run: impl FnOnce() -> Result<Vec<u8>> + 'a) -> Self {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    /// Strategy name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result of a chain that found a working strategy.
#[derive(Debug)]
pub struct ChainOutcome {
    /// Name of the strategy that succeeded.
    pub strategy: String,
    /// Its output.
    pub data: Vec<u8>,
    /// Strategies that failed before it, in order.
    pub failures: Vec<StrategyFailure>,
}

impl ChainOutcome {
    /// Whether the first strategy had to be skipped.
    pub fn fell_back(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Run `strategies` in order, returning the first success.
///
/// # Errors
///
/// [`Error::StrategiesExhausted`] with every individual failure when none
/// succeeds.
pub fn first_success<'a>(strategies: impl IntoIterator<Item = Strategy<'a>>) -> Result<ChainOutcome> {
    let mut failures = Vec::new();

    for strategy in strategies {
        let Strategy { name, run } = strategy;
        match run() {
            Ok(data) => {
                if !failures.is_empty() {
                    tracing::info!(
                        strategy = %name,
                        skipped = failures.len(),
                        "fallback strategy succeeded"
                    );
                }
                return Ok(ChainOutcome {
                    strategy: name,
                    data,
                    failures,
                });
            }
            Err(error) => {
                tracing::warn!(strategy = %name, "conversion strategy failed: {error}");
                failures.push(StrategyFailure {
                    strategy: name,
                    error,
                });
            }
        }
    }

    Err(Error::StrategiesExhausted(failures))
}
