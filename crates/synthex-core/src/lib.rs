// crates/synthex-core/src/lib.rs
//
// synthex-core: Core types, fixed-point math, and collaborator traits for the
// Synthex protocol.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the canonical value types (amounts, currency keys, addresses),
// the protocol error type, the role table, and the trait interfaces through
// which the debt engine talks to escrow, fee, and rewards collaborators.

pub mod access;
pub mod currency;
pub mod decimal;
pub mod error;
pub mod identity;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use synthex_core::CurrencyKey;`

// Value types
pub use currency::CurrencyKey;
pub use decimal::{Amount, Units, PRECISE_UNIT, UNIT};
pub use identity::Address;

// Roles
pub use access::Roles;

// Error type
pub use error::SynthError;

// Traits
pub use traits::{CollateralSource, FeeSink, RewardsDistributor};
