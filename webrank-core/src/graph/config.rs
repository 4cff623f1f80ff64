//! Ranking configuration owned by a [`crate::Graph`].

/// Default spam threshold; no page is spam.
pub const DEFAULT_LOWER_BOUND: f64 = 0.0;

/// Default sibling factor; same-domain links are not scaled.
pub const DEFAULT_SIBLING_FACTOR: f64 = 1.0;

/// Spam threshold and sibling scaling used by the ranking engine.
///
/// Both values are validated on update; a rejected update leaves the
/// previous value in place.
///
/// # Examples
/// ```
/// use webrank_core::RankConfig;
///
/// let mut config = RankConfig::default();
/// assert!(config.set_sibling_factor(0.5));
/// assert!(!config.set_sibling_factor(0.0));
/// assert_eq!(config.sibling_factor(), 0.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankConfig {
    lower_bound: f64,
    sibling_factor: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            lower_bound: DEFAULT_LOWER_BOUND,
            sibling_factor: DEFAULT_SIBLING_FACTOR,
        }
    }
}

impl RankConfig {
    /// Builds a configuration, returning `None` when either value is out of range.
    #[must_use]
    pub fn new(lower_bound: f64, sibling_factor: f64) -> Option<Self> {
        let mut config = Self::default();
        (config.set_lower_bound(lower_bound) && config.set_sibling_factor(sibling_factor))
            .then_some(config)
    }

    /// Returns the spam threshold.
    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    /// Returns the sibling factor.
    #[must_use]
    pub fn sibling_factor(&self) -> f64 {
        self.sibling_factor
    }

    /// Sets the spam threshold; accepts any finite `value >= 0`.
    pub fn set_lower_bound(&mut self, value: f64) -> bool {
        if !(value >= 0.0 && value.is_finite()) {
            return false;
        }
        self.lower_bound = value;
        true
    }

    /// Sets the sibling factor; accepts `0 < value <= 1`.
    pub fn set_sibling_factor(&mut self, value: f64) -> bool {
        if !(value > 0.0 && value <= 1.0) {
            return false;
        }
        self.sibling_factor = value;
        true
    }

    /// Returns whether a page with `rank` counts as spam under this configuration.
    #[must_use]
    pub fn is_spam(&self, rank: f64) -> bool {
        rank < self.lower_bound
    }
}
