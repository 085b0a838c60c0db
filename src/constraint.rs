//! A single parsed version requirement on a named package.
//!
//! Constraints are interned by the [`Resolver`](crate::Resolver): for a given
//! `(name, printed-form)` pair exactly one [`Constraint`] exists per resolver,
//! so identity (here: structural equality, since constraints are immutable
//! once interned) implies semantic equality.

use std::fmt;
use std::rc::Rc;

use semver::Version;

use crate::resolver::Resolver;
use crate::unit_version::UnitVersion;

/// Whether a constraint pins one exact version or sets a lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `=v` — holds iff the candidate's version equals `v` exactly.
    Exact,
    /// `v` — holds iff `v <= candidate.version` and `candidate.ecv <= v`.
    AtLeast,
}

/// One parsed `(name, kind, version)` requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    name: Rc<str>,
    kind: ConstraintKind,
    version: Version,
}

impl Constraint {
    pub(crate) fn new(name: Rc<str>, kind: ConstraintKind, version: Version) -> Self {
        Self {
            name,
            kind,
            version,
        }
    }

    pub fn name(&self) -> &Rc<str> {
        &self.name
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Test whether `uv` satisfies this constraint.
    ///
    /// - Exact: holds iff `uv.version == self.version`.
    /// - AtLeast: holds iff `self.version <= uv.version` AND
    ///   `uv.ecv <= self.version` — the candidate must still consider itself
    ///   compatible with a consumer pinned at `self.version`.
    pub fn is_satisfied(&self, uv: &UnitVersion) -> bool {
        match self.kind {
            ConstraintKind::Exact => uv.version() == &self.version,
            ConstraintKind::AtLeast => &self.version <= uv.version() && uv.ecv() <= &self.version,
        }
    }

    /// Resolve the [`UnitVersion`] this constraint pins or prefers, scanning
    /// the resolver's registry.
    ///
    /// - Exact: direct lookup of `"name@version"` in the interning table.
    /// - AtLeast: the first registered candidate (in registration order)
    ///   that satisfies this constraint, or `None`.
    pub fn get_satisfying_unit_version(&self, resolver: &Resolver) -> Option<Rc<UnitVersion>> {
        match self.kind {
            ConstraintKind::Exact => {
                resolver.lookup_unit_version(&format!("{}@{}", self.name, self.version))
            }
            ConstraintKind::AtLeast => resolver
                .versions_of(&self.name)
                .iter()
                .find(|uv| self.is_satisfied(uv))
                .cloned(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConstraintKind::Exact => write!(f, "{}@={}", self.name, self.version),
            ConstraintKind::AtLeast => write!(f, "{}@{}", self.name, self.version),
        }
    }
}

/// Parse the version-requirement half of a constraint: `"=1.2.3"` is
/// [`ConstraintKind::Exact`], anything else is [`ConstraintKind::AtLeast`].
pub(crate) fn parse_version_part(spec: &str) -> Result<(ConstraintKind, Version), semver::Error> {
    let (kind, raw) = match spec.strip_prefix('=') {
        Some(rest) => (ConstraintKind::Exact, rest),
        None => (ConstraintKind::AtLeast, spec),
    };
    let version = Version::parse(raw)?;
    Ok((kind, version))
}

/// Parse a combined `"name@version"` / `"name@=version"` constraint string.
pub(crate) fn parse_combined(spec: &str) -> Option<(&str, &str)> {
    spec.split_once('@')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_version::UnitVersion;

    fn uv(name: &str, version: &str, ecv: &str) -> UnitVersion {
        UnitVersion::new(
            Rc::from(name),
            Version::parse(version).unwrap(),
            Version::parse(ecv).unwrap(),
        )
    }

    #[test]
    fn exact_ignores_ecv() {
        let c = Constraint::new(Rc::from("a"), ConstraintKind::Exact, Version::new(1, 0, 0));
        assert!(c.is_satisfied(&uv("a", "1.0.0", "5.0.0")));
        assert!(!c.is_satisfied(&uv("a", "1.0.1", "0.0.0")));
    }

    #[test]
    fn at_least_checks_both_bounds() {
        let c = Constraint::new(
            Rc::from("a"),
            ConstraintKind::AtLeast,
            Version::new(1, 0, 0),
        );
        assert!(c.is_satisfied(&uv("a", "1.0.0", "1.0.0")));
        assert!(c.is_satisfied(&uv("a", "2.0.0", "1.0.0")));
        assert!(!c.is_satisfied(&uv("a", "0.9.0", "0.0.0")), "below version");
        assert!(
            !c.is_satisfied(&uv("a", "2.0.0", "2.0.0")),
            "ecv above constraint"
        );
    }

    #[test]
    fn display_round_trips_kind() {
        let exact = Constraint::new(Rc::from("a"), ConstraintKind::Exact, Version::new(1, 0, 0));
        assert_eq!(exact.to_string(), "a@=1.0.0");
        let at_least = Constraint::new(
            Rc::from("a"),
            ConstraintKind::AtLeast,
            Version::new(1, 0, 0),
        );
        assert_eq!(at_least.to_string(), "a@1.0.0");
    }

    #[test]
    fn parse_version_part_exact() {
        let (kind, version) = parse_version_part("=1.2.3").unwrap();
        assert_eq!(kind, ConstraintKind::Exact);
        assert_eq!(version, Version::new(1, 2, 3));
    }

    #[test]
    fn parse_version_part_at_least() {
        let (kind, version) = parse_version_part("1.2.3").unwrap();
        assert_eq!(kind, ConstraintKind::AtLeast);
        assert_eq!(version, Version::new(1, 2, 3));
    }

    #[test]
    fn parse_combined_splits_on_at() {
        assert_eq!(parse_combined("a@=1.2.3"), Some(("a", "=1.2.3")));
        assert_eq!(parse_combined("a@1.2.3"), Some(("a", "1.2.3")));
        assert_eq!(parse_combined("a"), None);
    }
}
