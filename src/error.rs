//! Error types surfaced by the resolver.
//!
//! Three kinds, per the resolver's failure model: registration/programming
//! errors and unsatisfiable-propagation errors are fatal; search dead-ends
//! are local and only escalate to [`ResolveError::Unresolvable`] once the
//! whole search space has been drained.

use thiserror::Error;

/// Every error the resolver can return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// `add_dependency` called twice for the same name on one [`UnitVersion`](crate::UnitVersion).
    #[error("Dependency already exists — {name}")]
    DependencyAlreadyExists { name: String },

    /// `add_constraint` called twice with an identical constraint on one
    /// [`UnitVersion`](crate::UnitVersion).
    #[error("Constraint already exists — {constraint}")]
    ConstraintAlreadyExists { constraint: String },

    /// A declared exact constraint refers to a version never registered.
    /// Fatal: the caller's view of the universe is incomplete.
    #[error("No unit version was found for the constraint — {constraint}")]
    NoUnitVersionForConstraint { constraint: String },

    /// No registered candidate of `name` satisfies the constraints in force.
    #[error("Cannot choose satisfying versions of package — {name}")]
    NoSatisfyingVersion { name: String },

    /// Every candidate of `name` produced a state where propagation
    /// invalidated one of the prior choices.
    #[error("None of the versions produce a sensible result — {name}")]
    NoSensibleNeighbor { name: String, last_invalid: String },

    /// The priority queue drained without reaching a terminal state.
    #[error("Couldn't resolve{}", reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
    Unresolvable { reason: Option<String> },
}
