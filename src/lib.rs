//! Cascade - cascading-scan decision engine
//!
//! Cascade is the decision core of a security-scan orchestration pipeline.
//! After a scan finishes and its findings are parsed, Cascade decides which
//! follow-up scans must run, synthesizes their full specification, and hands
//! them to an external launcher. It does not execute scans or persist
//! results - it only decides *what new work to create* and *how to shape it*.
//!
//! ## How a decision pass works
//!
//! 1. Load the findings of the completed parent scan.
//! 2. For every active [`CascadingRule`](domain::CascadingRule) not yet in
//!    the scan's rule chain, match each finding against the rule's
//!    predicates (exact or wildcard) after gating on the parent's
//!    annotation selector.
//! 3. Template, merge, and synthesize one child [`Scan`](domain::Scan) per
//!    matching (rule, finding) pair.
//! 4. Submit the children to the launcher, sequentially, in order.

pub mod domain;
pub mod engine;
pub mod hook;
pub mod store;

pub use domain::*;
