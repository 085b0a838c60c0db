//! [`DependenciesList`] — an ordered set of package names still required but
//! not yet chosen.
//!
//! Backed by `im-rc`'s persistent vector and hash set, the same pairing
//! `rust-lang/cargo`'s own resolver uses (`im-rc`) to keep per-branch state
//! cheap to clone: operations return a new list; originals remain usable and
//! share structure with it.

use std::rc::Rc;

use im_rc::{HashSet, Vector};

/// An immutable, order-preserving set of package names.
///
/// `peek` is a deterministic function of insertion order (the order names
/// were first `push`ed or merged in via `union`), which is required for the
/// solver to produce reproducible results under deterministic cost
/// functions.
#[derive(Debug, Clone, Default)]
pub struct DependenciesList {
    order: Vector<Rc<str>>,
    seen: HashSet<Rc<str>>,
}

impl DependenciesList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from an iterator of names, keeping first-seen order and
    /// dropping duplicates.
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = Rc<str>>,
    {
        let mut list = Self::new();
        for name in names {
            list = list.push(name);
        }
        list
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// The deterministic head of the list under insertion order, or `None`
    /// if empty.
    pub fn peek(&self) -> Option<Rc<str>> {
        self.order.front().cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// Append `name`, returning a new list. A no-op (structurally, returns a
    /// clone) if `name` is already present.
    pub fn push(&self, name: Rc<str>) -> Self {
        if self.seen.contains(&name) {
            return self.clone();
        }
        let mut order = self.order.clone();
        order.push_back(name.clone());
        let mut seen = self.seen.clone();
        seen.insert(name);
        Self { order, seen }
    }

    /// Remove `name`, returning a new list. A no-op if not present.
    pub fn remove(&self, name: &str) -> Self {
        if !self.seen.contains(name) {
            return self.clone();
        }
        let order = self.order.iter().filter(|n| n.as_ref() != name).cloned().collect();
        let mut seen = self.seen.clone();
        seen.remove(name);
        Self { order, seen }
    }

    /// Left-side order first, then any names from `other` not already
    /// present.
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for name in other.order.iter() {
            result = result.push(name.clone());
        }
        result
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<str>> {
        self.order.iter()
    }

    pub fn each<F: FnMut(&Rc<str>)>(&self, mut f: F) {
        for name in self.order.iter() {
            f(name);
        }
    }
}

impl FromIterator<Rc<str>> for DependenciesList {
    fn from_iter<I: IntoIterator<Item = Rc<str>>>(iter: I) -> Self {
        Self::from_names(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn n(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    #[test]
    fn push_preserves_order_and_dedups() {
        let list = DependenciesList::new().push(n("a")).push(n("b")).push(n("a"));
        let names: Vec<_> = list.iter().map(|r| r.to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn peek_is_deterministic_head() {
        let list = DependenciesList::new().push(n("a")).push(n("b"));
        assert_eq!(list.peek().unwrap().as_ref(), "a");
    }

    #[test]
    fn remove_drops_name_only() {
        let list = DependenciesList::new().push(n("a")).push(n("b"));
        let removed = list.remove("a");
        assert!(!removed.contains("a"));
        assert!(removed.contains("b"));
        // original unaffected
        assert!(list.contains("a"));
    }

    #[test]
    fn union_appends_new_names_only() {
        let left = DependenciesList::new().push(n("a")).push(n("b"));
        let right = DependenciesList::new().push(n("b")).push(n("c"));
        let merged = left.union(&right);
        let names: Vec<_> = merged.iter().map(|r| r.to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn operations_do_not_mutate_original() {
        let list = DependenciesList::new().push(n("a"));
        let _ = list.push(n("b"));
        let _ = list.remove("a");
        assert_eq!(list.len(), 1);
        assert!(list.contains("a"));
    }

    #[test]
    fn empty_list_peek_is_none() {
        assert_eq!(DependenciesList::new().peek(), None);
        assert!(DependenciesList::new().is_empty());
    }

    proptest::proptest! {
        #[test]
        fn push_never_mutates_the_receiver(names in proptest::collection::vec("[a-z]{1,6}", 0..12), extra in "[a-z]{1,6}") {
            let list = DependenciesList::from_names(names.iter().map(|s| n(s)));
            let before: Vec<String> = list.iter().map(|r| r.to_string()).collect();
            let _ = list.push(n(&extra));
            let after: Vec<String> = list.iter().map(|r| r.to_string()).collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn remove_never_mutates_the_receiver(names in proptest::collection::vec("[a-z]{1,6}", 0..12), target in "[a-z]{1,6}") {
            let list = DependenciesList::from_names(names.iter().map(|s| n(s)));
            let before: Vec<String> = list.iter().map(|r| r.to_string()).collect();
            let _ = list.remove(&target);
            let after: Vec<String> = list.iter().map(|r| r.to_string()).collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn push_then_contains(names in proptest::collection::vec("[a-z]{1,6}", 0..12), extra in "[a-z]{1,6}") {
            let list = DependenciesList::from_names(names.iter().map(|s| n(s)));
            let grown = list.push(n(&extra));
            prop_assert!(grown.contains(&extra));
        }
    }
}
