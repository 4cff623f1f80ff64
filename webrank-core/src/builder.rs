//! Builder utilities for configuring ranking simulations.
//!
//! Exposes the execution strategy selection surface and the validation done
//! before a [`Simulation`] is handed out.

use crate::{error::SimulationError, rank::Simulation};

/// Number of generations a simulation runs unless told otherwise.
pub const DEFAULT_GENERATIONS: i64 = 15;

/// Indicates how a [`Simulation`] evaluates the vertices of one generation.
///
/// Every strategy produces identical ranks: a generation only reads the
/// ranks committed by the previous one, so the per-vertex updates are
/// independent of evaluation order.
///
/// `Auto` uses the Rayon pool for graphs with at least
/// [`Simulation::PARALLEL_THRESHOLD`] pages when the `parallel` feature is
/// enabled and evaluates sequentially otherwise.
///
/// # Examples
/// ```
/// use webrank_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::Auto;
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Let the library choose based on graph size and build features.
    #[default]
    Auto,
    /// Evaluate vertices one after another on the calling thread.
    Sequential,
    /// Evaluate vertices on the Rayon thread pool.
    Parallel,
}

/// Configures and constructs [`Simulation`] instances.
///
/// # Examples
/// ```
/// use webrank_core::{ExecutionStrategy, SimulationBuilder};
///
/// let simulation = SimulationBuilder::new()
///     .with_generations(3)
///     .with_focus("example.org/index")
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(simulation.generations(), 3);
/// assert_eq!(simulation.focus(), Some("example.org/index"));
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    generations: i64,
    focus: Option<String>,
    execution_strategy: ExecutionStrategy,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self {
            generations: DEFAULT_GENERATIONS,
            focus: None,
            execution_strategy: ExecutionStrategy::Auto,
        }
    }
}

impl SimulationBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use webrank_core::{ExecutionStrategy, SimulationBuilder};
    ///
    /// let builder = SimulationBuilder::new();
    /// assert_eq!(builder.generations(), 15);
    /// assert_eq!(builder.focus(), None);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of generations.
    ///
    /// A negative count is accepted; the resulting simulation leaves every
    /// graph untouched.
    #[must_use]
    pub fn with_generations(mut self, generations: i64) -> Self {
        self.generations = generations;
        self
    }

    /// Returns the configured number of generations.
    #[must_use]
    pub fn generations(&self) -> i64 {
        self.generations
    }

    /// Selects the page whose rank evolution is traced.
    #[must_use]
    pub fn with_focus(mut self, url: impl Into<String>) -> Self {
        self.focus = Some(url.into());
        self
    }

    /// Replaces or clears the focused page.
    #[must_use]
    pub fn with_optional_focus(mut self, url: Option<String>) -> Self {
        self.focus = url;
        self
    }

    /// Returns the focused URL, if any.
    #[must_use]
    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Sets the execution strategy to use when running.
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Validates the configuration and constructs a [`Simulation`].
    ///
    /// # Errors
    /// Returns [`SimulationError::BackendUnavailable`] when
    /// [`ExecutionStrategy::Parallel`] is requested in a build without the
    /// `parallel` feature.
    pub fn build(self) -> Result<Simulation, SimulationError> {
        if self.execution_strategy == ExecutionStrategy::Parallel && !cfg!(feature = "parallel") {
            return Err(SimulationError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            });
        }
        Ok(Simulation::new(
            self.generations,
            self.focus,
            self.execution_strategy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_preserves_configuration() {
        let simulation = SimulationBuilder::new()
            .with_generations(-2)
            .with_optional_focus(Some("a/b".to_owned()))
            .with_execution_strategy(ExecutionStrategy::Sequential)
            .build()
            .expect("sequential is always available");
        assert_eq!(simulation.generations(), -2);
        assert_eq!(simulation.focus(), Some("a/b"));
        assert_eq!(
            simulation.execution_strategy(),
            ExecutionStrategy::Sequential
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_is_available_with_feature() {
        assert!(
            SimulationBuilder::new()
                .with_execution_strategy(ExecutionStrategy::Parallel)
                .build()
                .is_ok()
        );
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn parallel_is_rejected_without_feature() {
        let err = SimulationBuilder::new()
            .with_execution_strategy(ExecutionStrategy::Parallel)
            .build()
            .expect_err("parallel backend is compiled out");
        assert_eq!(
            err,
            SimulationError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel
            }
        );
    }
}
