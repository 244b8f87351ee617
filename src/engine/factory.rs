// ============================================================================
// Cascade Factory
// Creates recalculation cascades with proper configuration
// ============================================================================

use crate::domain::config::AllocationConfig;
use crate::engine::{ProportionalDistributor, RecalculationCascade};
use crate::interfaces::{DistributionAlgorithm, EventHandler, NoOpEventHandler};
use crate::numeric::CurrencyFormat;
use rust_decimal::Decimal;
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a cascade with the proportional distributor from configuration
///
/// # Example
/// ```
/// use shipping_allocation::prelude::*;
/// use std::sync::Arc;
///
/// let cascade = create_from_config(AllocationConfig::default(), Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(cascade.distributor_name(), "Proportional");
/// ```
pub fn create_from_config(
    config: AllocationConfig,
    event_handler: Arc<dyn EventHandler>,
) -> Result<RecalculationCascade, String> {
    config.validate()?;

    Ok(RecalculationCascade::new(
        Box::new(ProportionalDistributor::new()),
        event_handler,
        config,
    ))
}

// ============================================================================
// Builder Pattern for Advanced Configuration
// ============================================================================

/// Builder for creating cascades with fluent API
///
/// # Example
/// ```
/// use shipping_allocation::prelude::*;
/// use std::sync::Arc;
/// use rust_decimal::Decimal;
///
/// let cascade = CascadeBuilder::new()
///     .with_tolerance(Decimal::new(1, 3))
///     .verify_after_cascade(true)
///     .with_event_handler(Arc::new(LoggingEventHandler))
///     .build()
///     .unwrap();
/// assert!(cascade.config().verify_after_cascade);
/// ```
pub struct CascadeBuilder {
    config: AllocationConfig,
    distributor: Option<Box<dyn DistributionAlgorithm>>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl CascadeBuilder {
    pub fn new() -> Self {
        Self {
            config: AllocationConfig::default(),
            distributor: None,
            event_handler: None,
        }
    }

    /// Start from the strict preset
    pub fn strict() -> Self {
        Self::new().with_config(AllocationConfig::strict())
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: AllocationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn with_currency(mut self, currency: CurrencyFormat) -> Self {
        self.config.currency = currency;
        self
    }

    pub fn verify_after_cascade(mut self, enabled: bool) -> Self {
        self.config.verify_after_cascade = enabled;
        self
    }

    /// Swap in another distribution algorithm (defaults to proportional)
    pub fn with_distributor(mut self, distributor: Box<dyn DistributionAlgorithm>) -> Self {
        self.distributor = Some(distributor);
        self
    }

    /// Defaults to [`NoOpEventHandler`]
    pub fn with_event_handler(mut self, event_handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(event_handler);
        self
    }

    /// Build the cascade
    pub fn build(self) -> Result<RecalculationCascade, String> {
        self.config.validate()?;

        let distributor = self
            .distributor
            .unwrap_or_else(|| Box::new(ProportionalDistributor::new()));
        let event_handler = self
            .event_handler
            .unwrap_or_else(|| Arc::new(NoOpEventHandler));

        Ok(RecalculationCascade::new(distributor, event_handler, self.config))
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &AllocationConfig {
        &self.config
    }
}

impl Default for CascadeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
