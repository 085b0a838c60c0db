//! [`UnitVersion`] — an immutable descriptor of one concrete release of one
//! package.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use semver::Version;

use crate::constraint::Constraint;
use crate::constraints_list::ConstraintsList;
use crate::deps_list::DependenciesList;
use crate::error::ResolveError;

/// A concrete release of a package: its name, version, earliest-compatible
/// version (ecv), the dependency *names* it pulls in, and the constraints it
/// imposes on others (including, possibly, on itself).
///
/// Built once during registration via [`UnitVersion::new`] plus
/// [`add_dependency`](Self::add_dependency) /
/// [`add_constraint`](Self::add_constraint), then never mutated again.
/// Identity is established by the resolver's `"name@version"` interning
/// table; since a `UnitVersion` is registered exactly once and never
/// mutated, comparing by `(name, version)` is equivalent to identity.
#[derive(Debug, Clone)]
pub struct UnitVersion {
    name: Rc<str>,
    version: Version,
    ecv: Version,
    dependencies: DependenciesList,
    constraints: ConstraintsList,
}

impl UnitVersion {
    pub fn new(name: Rc<str>, version: Version, ecv: Version) -> Self {
        Self {
            name,
            version,
            ecv,
            dependencies: DependenciesList::new(),
            constraints: ConstraintsList::new(),
        }
    }

    pub fn name(&self) -> &Rc<str> {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn ecv(&self) -> &Version {
        &self.ecv
    }

    pub fn dependencies(&self) -> &DependenciesList {
        &self.dependencies
    }

    pub fn constraints(&self) -> &ConstraintsList {
        &self.constraints
    }

    /// Declare a dependency-by-name. Used only during registration, before
    /// any `resolve` call.
    ///
    /// # Errors
    /// Fails with [`ResolveError::DependencyAlreadyExists`] if `name` was
    /// already declared.
    pub fn add_dependency(&mut self, name: Rc<str>) -> Result<(), ResolveError> {
        if self.dependencies.contains(&name) {
            return Err(ResolveError::DependencyAlreadyExists {
                name: name.to_string(),
            });
        }
        self.dependencies = self.dependencies.push(name);
        Ok(())
    }

    /// Impose a constraint (on another package, or on this one). Used only
    /// during registration, before any `resolve` call.
    ///
    /// # Errors
    /// Fails with [`ResolveError::ConstraintAlreadyExists`] if an identical
    /// constraint was already imposed.
    pub fn add_constraint(&mut self, constraint: Rc<Constraint>) -> Result<(), ResolveError> {
        if self.constraints.contains(&constraint) {
            return Err(ResolveError::ConstraintAlreadyExists {
                constraint: constraint.to_string(),
            });
        }
        self.constraints = self.constraints.push(constraint);
        Ok(())
    }
}

impl fmt::Display for UnitVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl PartialEq for UnitVersion {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for UnitVersion {}

impl Hash for UnitVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
    }
}
