// ============================================================================
// Engine Module
// Contains the allocation, cascade and validation business logic
// ============================================================================

mod cascade;
mod errors;
mod proportional;
mod validator;

pub mod factory;

pub use cascade::{CascadeOutcome, CascadeStage, CascadeTrigger, RecalculationCascade};
pub use errors::{AllocationError, AllocationResult};
pub use factory::{create_from_config, CascadeBuilder};
pub use proportional::{distribute, ProportionalDistributor};
pub use validator::{
    CheckResult, Invariant, InvariantValidator, InvariantViolation, ValidationChecks,
    ValidationReport,
};
