//! # capseal-permits
//!
//! The pending-permit container and discharge protocol.
//!
//! ## Overview
//!
//! A loaded unit that claims a privileged relationship (subclass a
//! protected type, implement a protected interface, instantiate a protected
//! type) carries *permits*: signatures by the privileged unit's owner over
//! a digest of the requestor's content. Verification needs the grantor's
//! key, which may not be loaded yet, so permits sit in a per-unit
//! [`PendingPermits`] container until [`discharge`] resolves each one to a
//! terminal granted/rejected verdict and removes it.
//!
//! ## Key invariants
//!
//! - Containers are sized once, at creation, and never grow.
//! - Removal compacts by swapping the last live permit into the vacated
//!   slot; permit order carries no meaning once discharge begins.
//! - Removing the last permit discards the container (`remove` returns
//!   `None`), never leaving a zero-sized one.
//! - Discharge is idempotent per permit: granted and rejected are both
//!   absorbing, and a removed permit can never be re-evaluated.

pub mod container;
pub mod discharge;
pub mod error;
pub mod permit;

pub use container::PendingPermits;
pub use discharge::{discharge, DischargeOutcome, Verdict};
pub use error::{PermitError, Result};
pub use permit::Permit;
