//! A*-style dependency resolution over package version assignments.
//!
//! A client registers [`UnitVersion`]s with a [`Resolver`] (each referencing
//! [`Constraint`]s obtained from the resolver's own interner), then calls
//! [`Resolver::resolve`] with a set of required names. The resolver builds an
//! initial search state, propagates every forced (exact) choice to a fixed
//! point, and runs best-first search over the remaining partial assignments
//! until every required name has a chosen version.
//!
//! Parsing of version strings is delegated to [`semver`]; cost/estimate
//! functions are supplied by the caller via [`ResolveOptions`]. Everything
//! else — registry bookkeeping, propagation, the priority queue — lives here.

mod constraint;
mod constraints_list;
mod deps_list;
mod error;
mod options;
mod resolver;
mod unit_version;

pub use constraint::{Constraint, ConstraintKind};
pub use constraints_list::ConstraintsList;
pub use deps_list::DependenciesList;
pub use error::ResolveError;
pub use options::{CombineFn, CostFn, EstimateFn, ResolveOptions};
pub use resolver::{ChoiceList, Resolver, SearchState};
pub use unit_version::UnitVersion;
