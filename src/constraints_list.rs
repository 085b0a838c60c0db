//! [`ConstraintsList`] — the set of constraints currently in force.
//!
//! Keyed by identity (constraints are interned, so structural equality
//! coincides with identity here — see [`crate::Constraint`]). Persistent,
//! like [`crate::DependenciesList`]: every mutator returns a new value.

use std::rc::Rc;

use im_rc::{HashSet, Vector};

use crate::constraint::{Constraint, ConstraintKind};
use crate::deps_list::DependenciesList;
use crate::unit_version::UnitVersion;

#[derive(Debug, Clone, Default)]
pub struct ConstraintsList {
    items: Vector<Rc<Constraint>>,
    set: HashSet<Rc<Constraint>>,
}

impl ConstraintsList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, c: &Rc<Constraint>) -> bool {
        self.set.contains(c)
    }

    /// Append `c`, returning a new list. A no-op if already present.
    pub fn push(&self, c: Rc<Constraint>) -> Self {
        if self.set.contains(&c) {
            return self.clone();
        }
        let mut items = self.items.clone();
        items.push_back(c.clone());
        let mut set = self.set.clone();
        set.insert(c);
        Self { items, set }
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for c in other.items.iter() {
            result = result.push(c.clone());
        }
        result
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Constraint>> {
        self.items.iter()
    }

    pub fn each<F: FnMut(&Rc<Constraint>)>(&self, mut f: F) {
        for c in self.items.iter() {
            f(c);
        }
    }

    /// True iff some contained constraint named `uv.name()` is not satisfied
    /// by `uv`.
    pub fn violated(&self, uv: &UnitVersion) -> bool {
        self.items
            .iter()
            .any(|c| c.name().as_ref() == uv.name().as_ref() && !c.is_satisfied(uv))
    }

    /// The subset of `self` whose constraints are exact and whose name
    /// appears in `deps`.
    ///
    /// Used from both directions during propagation: once with a unit's own
    /// constraints against its own dependencies, and once with the
    /// accumulated search-state constraints against a unit's dependencies
    /// (see [`crate::resolver`]).
    pub fn exact_matching(&self, deps: &DependenciesList) -> Self {
        let mut result = Self::new();
        for c in self.items.iter() {
            if c.kind() == ConstraintKind::Exact && deps.contains(c.name()) {
                result = result.push(c.clone());
            }
        }
        result
    }
}

impl FromIterator<Rc<Constraint>> for ConstraintsList {
    fn from_iter<I: IntoIterator<Item = Rc<Constraint>>>(iter: I) -> Self {
        let mut list = Self::new();
        for c in iter {
            list = list.push(c);
        }
        list
    }
}
