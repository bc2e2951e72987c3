//! # Runtime configuration for observed combinator runs.
//!
//! Provides [`Config`] used by [`Combinators`](crate::Combinators) and its builder.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1

/// Configuration for [`Combinators`](crate::Combinators).
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `report_discarded`: Publish `SettlementDiscarded` for outcomes that arrive after a decision
///
/// ## Notes
/// All fields are public for flexibility.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// The listener lagging more than `bus_capacity` messages behind skips older
    /// items. Minimum value is 1.
    pub bus_capacity: usize,

    /// Whether settlements arriving after a decision are reported.
    ///
    /// They are always discarded; this only controls the event.
    pub report_discarded: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024` (good baseline)
    /// - `report_discarded = true`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            report_discarded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert!(cfg.report_discarded);
    }
}
