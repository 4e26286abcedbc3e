//! Adaptive quality reduction.
//!
//! Vector stickers have unbounded visual complexity, so there is no closed
//! form for "the quality that fits". Instead each attempt backs off on two
//! axes at once: quality halves and the frame rate drops by a third. With
//! the default bounds (start 100/30, floors 2/5) the search makes at most
//! four attempts: (100, 30), (50, 20), (25, 13), (12.5, 8).

use stickerforge_core::config::ReducerConfig;
use stickerforge_core::{Error, Result};

/// One (quality, frame rate) encode setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityBudget {
    /// Encoder quality in (0, 100].
    pub quality: f32,
    /// Frames per second.
    pub fps: u32,
}

impl QualityBudget {
    /// The next, cheaper budget: quality / 2, fps / 1.5 truncated toward zero.
    #[must_use]
    pub fn decay(self) -> Self {
        Self {
            quality: self.quality / 2.0,
            // floor(fps / 1.5) without going through floats.
            fps: (u64::from(self.fps) * 2 / 3) as u32,
        }
    }
}

/// Successful reduction.
#[derive(Debug, Clone)]
pub struct Reduced {
    /// Encoded bytes, strictly smaller than the ceiling.
    pub data: Vec<u8>,
    /// Budget that produced `data`.
    pub budget: QualityBudget,
    /// Number of encoder invocations, including the successful one.
    pub attempts: u32,
}

/// Drives encode attempts under a decaying [`QualityBudget`].
#[derive(Debug, Clone)]
pub struct QualityReducer {
    config: ReducerConfig,
}

impl QualityReducer {
    /// Create a reducer with the given bounds.
    pub fn new(config: ReducerConfig) -> Self {
        Self { config }
    }

    /// Bounds in use.
    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    /// Starting budget.
    pub fn initial_budget(&self) -> QualityBudget {
        QualityBudget {
            quality: self.config.initial_quality,
            fps: self.config.initial_fps,
        }
    }

    fn within_floors(&self, budget: QualityBudget) -> bool {
        budget.quality > self.config.min_quality && budget.fps > self.config.min_fps
    }

    /// Every budget the reducer would try, in order.
    pub fn schedule(&self) -> impl Iterator<Item = QualityBudget> + '_ {
        std::iter::successors(Some(self.initial_budget()), |b| Some(b.decay()))
            .take_while(move |b| self.within_floors(*b))
    }

    /// Call `encode` with successively cheaper budgets until its output is
    /// under the ceiling.
    ///
    /// # Errors
    ///
    /// An `encode` error is returned immediately, untouched: a failing
    /// encoder is not assumed to be a size problem. Running out of budgets
    /// yields [`Error::SizeBudgetExceeded`].
    pub fn reduce<F>(&self, mut encode: F) -> Result<Reduced>
    where
        F: FnMut(QualityBudget) -> Result<Vec<u8>>,
    {
        let ceiling = self.config.ceiling_bytes;
        let mut attempts = 0;

        for budget in self.schedule() {
            attempts += 1;
            let data = encode(budget)?;
            tracing::debug!(
                attempt = attempts,
                quality = budget.quality,
                fps = budget.fps,
                size = data.len(),
                ceiling,
                "encode attempt"
            );
            if data.len() < ceiling {
                return Ok(Reduced {
                    data,
                    budget,
                    attempts,
                });
            }
        }

        Err(Error::SizeBudgetExceeded { ceiling, attempts })
    }
}

impl Default for QualityReducer {
    fn default() -> Self {
        Self::new(ReducerConfig::default())
    }
}
