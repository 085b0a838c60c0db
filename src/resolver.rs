//! The resolver: registry of known [`UnitVersion`]s and interned
//! [`Constraint`]s, plus the search driver — state construction,
//! exact-constraint propagation, neighbor expansion, and the best-first
//! priority-queue loop.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::rc::Rc;

use im_rc::{HashSet, Vector};
use ordered_float::OrderedFloat;
use semver::Version;
use tracing::{debug, instrument, trace};

use crate::constraint::{parse_combined, parse_version_part, Constraint};
use crate::constraints_list::ConstraintsList;
use crate::deps_list::DependenciesList;
use crate::error::ResolveError;
use crate::options::ResolveOptions;
use crate::unit_version::UnitVersion;

const TARGET_NAME: &str = "target";

/// An immutable, order-preserving, name-unique collection of chosen
/// [`UnitVersion`]s — the `choices` half of a search [`SearchState`].
#[derive(Debug, Clone, Default)]
pub struct ChoiceList {
    order: Vector<Rc<UnitVersion>>,
    by_name: HashSet<Rc<str>>,
}

impl ChoiceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains(name)
    }

    /// Append `uv`, returning a new list. A no-op if a choice for
    /// `uv.name()` already exists (the invariant "no two entries share a
    /// name" is preserved by construction).
    pub fn push(&self, uv: Rc<UnitVersion>) -> Self {
        if self.by_name.contains(uv.name()) {
            return self.clone();
        }
        let mut order = self.order.clone();
        order.push_back(uv.clone());
        let mut by_name = self.by_name.clone();
        by_name.insert(uv.name().clone());
        Self { order, by_name }
    }

    pub fn union<I: IntoIterator<Item = Rc<UnitVersion>>>(&self, items: I) -> Self {
        let mut result = self.clone();
        for uv in items {
            result = result.push(uv);
        }
        result
    }

    /// Drop the entry named `name`, if any. Used only by the resolve driver
    /// to strip the synthetic `"target"` root before returning a result.
    fn without_name(&self, name: &str) -> Self {
        if !self.by_name.contains(name) {
            return self.clone();
        }
        let order: Vector<_> = self
            .order
            .iter()
            .filter(|uv| uv.name().as_ref() != name)
            .cloned()
            .collect();
        let mut by_name = self.by_name.clone();
        by_name.remove(name);
        Self { order, by_name }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<UnitVersion>> {
        self.order.iter()
    }

    pub fn as_vec(&self) -> Vec<Rc<UnitVersion>> {
        self.order.iter().cloned().collect()
    }

    pub fn into_unit_versions(self) -> Vec<UnitVersion> {
        self.order.iter().map(|rc| (**rc).clone()).collect()
    }
}

impl FromIterator<Rc<UnitVersion>> for ChoiceList {
    fn from_iter<I: IntoIterator<Item = Rc<UnitVersion>>>(iter: I) -> Self {
        let mut list = Self::new();
        for uv in iter {
            list = list.push(uv);
        }
        list
    }
}

/// A partial (or terminal) search state: the names still required, the
/// constraints currently in force, and the versions chosen so far.
///
/// Terminal when `dependencies.is_empty()`.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub dependencies: DependenciesList,
    pub constraints: ConstraintsList,
    pub choices: ChoiceList,
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        self.dependencies.is_empty()
    }
}

enum NeighborError {
    Fatal(ResolveError),
    DeadEnd(ResolveError),
}

/// Registry of all known [`UnitVersion`]s and interned [`Constraint`]s, plus
/// the search driver.
///
/// `resolve()` is a pure function of this registry plus its inputs; it may
/// be called concurrently from independent threads only if the registry is
/// treated as immutable for the duration of all concurrent calls.
#[derive(Default)]
pub struct Resolver {
    units_versions: HashMap<Rc<str>, Vec<Rc<UnitVersion>>>,
    units_versions_map: HashMap<String, Rc<UnitVersion>>,
    latest_version: HashMap<Rc<str>, Version>,
    constraints: HashMap<(Rc<str>, String), Rc<Constraint>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one release. Idempotent on `uv.to_string()`: a second call
    /// for the same `"name@version"` leaves the registry unchanged and
    /// returns the original interned value.
    pub fn add_unit_version(&mut self, uv: UnitVersion) -> Rc<UnitVersion> {
        let key = uv.to_string();
        if let Some(existing) = self.units_versions_map.get(&key) {
            debug!(unit_version = %key, "add_unit_version: already registered");
            return existing.clone();
        }
        let name = uv.name().clone();
        let version = uv.version().clone();
        let rc = Rc::new(uv);
        self.units_versions
            .entry(name.clone())
            .or_default()
            .push(rc.clone());
        self.units_versions_map.insert(key, rc.clone());
        let slot = self.latest_version.entry(name).or_insert_with(|| version.clone());
        if version > *slot {
            *slot = version;
        }
        rc
    }

    /// Look up a `"name@version"` interned [`UnitVersion`].
    pub fn lookup_unit_version(&self, key: &str) -> Option<Rc<UnitVersion>> {
        self.units_versions_map.get(key).cloned()
    }

    /// All registered versions of `name`, in registration order.
    pub fn versions_of(&self, name: &str) -> &[Rc<UnitVersion>] {
        self.units_versions
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The maximum version registered for `name`, if any.
    pub fn latest_version(&self, name: &str) -> Option<&Version> {
        self.latest_version.get(name)
    }

    /// Intern a `(name, versionConstraint)` pair — the key is the literal
    /// input pair, so repeating the call with the same arguments returns the
    /// same object even across different textual spellings of an equal
    /// version.
    pub fn get_constraint(
        &mut self,
        name: &str,
        version_constraint: &str,
    ) -> Result<Rc<Constraint>, ResolveError> {
        let key = (Rc::<str>::from(name), version_constraint.to_string());
        if let Some(existing) = self.constraints.get(&key) {
            trace!(%name, %version_constraint, "get_constraint: intern hit");
            return Ok(existing.clone());
        }
        let (kind, version) = parse_version_part(version_constraint).map_err(|_| {
            ResolveError::NoUnitVersionForConstraint {
                constraint: format!("{name}@{version_constraint}"),
            }
        })?;
        let constraint = Rc::new(Constraint::new(key.0.clone(), kind, version));
        self.constraints.insert(key, constraint.clone());
        trace!(%name, %version_constraint, "get_constraint: intern miss, new constraint registered");
        Ok(constraint)
    }

    /// Intern a combined `"name@version"` / `"name@=version"` constraint
    /// string.
    pub fn get_constraint_str(&mut self, combined: &str) -> Result<Rc<Constraint>, ResolveError> {
        let (name, version_constraint) = parse_combined(combined).ok_or_else(|| {
            ResolveError::NoUnitVersionForConstraint {
                constraint: combined.to_string(),
            }
        })?;
        self.get_constraint(name, version_constraint)
    }

    // ---- propagation ----

    /// The exact constraints `u` imposes, transitively, on names it reaches
    /// via exact closure. Iterative worklist, not recursive — the closure
    /// can be deep.
    fn exact_transitive_constraints(
        &self,
        u: &UnitVersion,
    ) -> Result<ConstraintsList, ResolveError> {
        let seed = u.constraints().exact_matching(u.dependencies());
        let mut acc = ConstraintsList::new();
        let mut queue: VecDeque<Rc<Constraint>> = seed.iter().cloned().collect();
        let mut seen: std::collections::HashSet<Rc<Constraint>> = std::collections::HashSet::new();
        while let Some(c) = queue.pop_front() {
            if !seen.insert(c.clone()) {
                continue;
            }
            acc = acc.push(c.clone());
            let uv = c.get_satisfying_unit_version(self).ok_or_else(|| {
                ResolveError::NoUnitVersionForConstraint {
                    constraint: c.to_string(),
                }
            })?;
            for c2 in uv.constraints().exact_matching(uv.dependencies()).iter() {
                queue.push_back(c2.clone());
            }
        }
        Ok(acc)
    }

    /// Map each constraint in the exact-transitive closure to its
    /// satisfying [`UnitVersion`].
    fn exact_transitive_dependencies_versions(
        &self,
        u: &UnitVersion,
    ) -> Result<Vec<Rc<UnitVersion>>, ResolveError> {
        self.exact_transitive_constraints(u)?
            .iter()
            .map(|c| {
                c.get_satisfying_unit_version(self).ok_or_else(|| {
                    ResolveError::NoUnitVersionForConstraint {
                        constraint: c.to_string(),
                    }
                })
            })
            .collect()
    }

    /// `u`'s own deps, plus the deps of everything reached by its exact
    /// closure, minus names already pinned by that closure.
    fn inexact_transitive_dependencies(
        &self,
        u: &UnitVersion,
    ) -> Result<DependenciesList, ResolveError> {
        let exact = self.exact_transitive_constraints(u)?;
        let mut deps = u.dependencies().clone();
        for c in exact.iter() {
            let uv = c.get_satisfying_unit_version(self).ok_or_else(|| {
                ResolveError::NoUnitVersionForConstraint {
                    constraint: c.to_string(),
                }
            })?;
            deps = deps.union(uv.dependencies());
        }
        for c in exact.iter() {
            deps = deps.remove(c.name());
        }
        Ok(deps)
    }

    /// Breadth-first closure of forced (exact) choices starting from `uv`,
    /// keyed by package name to avoid re-enqueueing the same name twice.
    #[instrument(level = "trace", skip_all, fields(unit_version = %uv))]
    pub(crate) fn propagate_exact_trans_deps(
        &self,
        uv: Rc<UnitVersion>,
        mut dependencies: DependenciesList,
        mut constraints: ConstraintsList,
        mut choices: ChoiceList,
    ) -> Result<SearchState, ResolveError> {
        let mut queue: VecDeque<Rc<UnitVersion>> = VecDeque::new();
        let mut enqueued: std::collections::HashSet<Rc<str>> = std::collections::HashSet::new();
        enqueued.insert(uv.name().clone());
        queue.push_back(uv);

        while let Some(u) = queue.pop_front() {
            choices = choices.push(u.clone());

            let exact_versions = self.exact_transitive_dependencies_versions(&u)?;
            let inexact_deps = self.inexact_transitive_dependencies(&u)?;

            let mut transitive_constraints = u.constraints().clone();
            for ev in &exact_versions {
                transitive_constraints = transitive_constraints.union(ev.constraints());
            }

            dependencies = dependencies.union(&inexact_deps);
            constraints = constraints.union(&transitive_constraints);
            choices = choices.union(exact_versions.iter().cloned());

            for chosen in choices.iter() {
                dependencies = dependencies.remove(chosen.name());
            }

            let a = constraints.exact_matching(u.dependencies());
            let b = u.constraints().exact_matching(u.dependencies());
            let new_exact = a.union(&b);

            for c in new_exact.iter() {
                let resolved = c.get_satisfying_unit_version(self).ok_or_else(|| {
                    ResolveError::NoUnitVersionForConstraint {
                        constraint: c.to_string(),
                    }
                })?;
                if enqueued.insert(resolved.name().clone()) {
                    trace!(forced = %resolved, constraint = %c, "propagation enqueued forced choice");
                    queue.push_back(resolved);
                }
            }
        }

        Ok(SearchState {
            dependencies,
            constraints,
            choices,
        })
    }

    /// Pick the next pending dependency name, enumerate its non-violating
    /// candidates in registration order, and propagate each into a
    /// successor state.
    #[instrument(level = "trace", skip_all)]
    fn state_neighbors(&self, state: &SearchState) -> Result<Vec<SearchState>, NeighborError> {
        let name = state
            .dependencies
            .peek()
            .expect("state_neighbors called on a terminal state");
        let remaining_deps = state.dependencies.remove(&name);

        let candidates: Vec<Rc<UnitVersion>> = self
            .versions_of(&name)
            .iter()
            .filter(|uv| !state.constraints.violated(uv))
            .cloned()
            .collect();

        if candidates.is_empty() {
            return Err(NeighborError::DeadEnd(ResolveError::NoSatisfyingVersion {
                name: name.to_string(),
            }));
        }

        let mut results = Vec::new();
        let mut last_invalid: Option<String> = None;

        for candidate in candidates {
            let choices_with = state.choices.push(candidate.clone());
            let next = self
                .propagate_exact_trans_deps(
                    candidate.clone(),
                    remaining_deps.clone(),
                    state.constraints.clone(),
                    choices_with,
                )
                .map_err(NeighborError::Fatal)?;

            let all_choices_satisfied = next.choices.iter().all(|c| !next.constraints.violated(c));
            if all_choices_satisfied {
                results.push(next);
            } else {
                last_invalid = Some(candidate.to_string());
            }
        }

        if results.is_empty() {
            return Err(NeighborError::DeadEnd(ResolveError::NoSensibleNeighbor {
                name: name.to_string(),
                last_invalid: last_invalid.unwrap_or_default(),
            }));
        }

        Ok(results)
    }

    fn priority_key(state: &SearchState, options: &ResolveOptions) -> (OrderedFloat<f64>, isize) {
        let choices = state.choices.as_vec();
        let cost = (options.cost_function)(&choices);
        let estimate = (options.estimate_cost_function)(state);
        let combined = (options.combine_cost_function)(cost, estimate);
        (OrderedFloat(combined), -(state.choices.len() as isize))
    }

    /// Resolve `dependencies` (subject to `constraints`, with `choices`
    /// already fixed) into a complete assignment.
    ///
    /// Synthesizes a virtual `"target"` root carrying the supplied
    /// dependencies/constraints, propagates it to a fixed point, then (unless
    /// `options.stop_after_first_propagation`) runs best-first search until a
    /// terminal state is reached.
    #[instrument(level = "debug", skip_all)]
    pub fn resolve(
        &self,
        dependencies: &[&str],
        constraints: &[Rc<Constraint>],
        choices: &[Rc<UnitVersion>],
        options: &ResolveOptions,
    ) -> Result<Vec<UnitVersion>, ResolveError> {
        let mut target = UnitVersion::new(Rc::from(TARGET_NAME), Version::new(0, 0, 0), Version::new(0, 0, 0));
        for name in dependencies {
            target.add_dependency(Rc::from(*name))?;
        }
        for c in constraints {
            target.add_constraint(c.clone())?;
        }

        let init_deps = DependenciesList::from_names(dependencies.iter().map(|s| Rc::from(*s)));
        let init_constraints: ConstraintsList = constraints.iter().cloned().collect();
        let init_choices: ChoiceList = choices.iter().cloned().collect();

        let propagated =
            self.propagate_exact_trans_deps(Rc::new(target), init_deps, init_constraints, init_choices)?;

        let start_state = SearchState {
            dependencies: propagated.dependencies,
            constraints: propagated.constraints,
            choices: propagated.choices.without_name(TARGET_NAME),
        };

        if options.stop_after_first_propagation {
            return Ok(start_state.choices.into_unit_versions());
        }

        let mut heap: BinaryHeap<Reverse<QueueEntry>> = BinaryHeap::new();
        let (priority, neg_len) = Self::priority_key(&start_state, options);
        heap.push(Reverse(QueueEntry {
            priority,
            neg_len,
            state: start_state,
        }));

        let mut last_failure: Option<ResolveError> = None;

        while let Some(Reverse(entry)) = heap.pop() {
            let estimate = (options.estimate_cost_function)(&entry.state);
            if estimate.is_infinite() && estimate > 0.0 {
                debug!("search aborted: popped state has +infinity estimate");
                break;
            }

            if entry.state.is_terminal() {
                return Ok(entry.state.choices.into_unit_versions());
            }

            match self.state_neighbors(&entry.state) {
                Ok(neighbors) => {
                    for neighbor in neighbors {
                        let (priority, neg_len) = Self::priority_key(&neighbor, options);
                        heap.push(Reverse(QueueEntry {
                            priority,
                            neg_len,
                            state: neighbor,
                        }));
                    }
                }
                Err(NeighborError::Fatal(e)) => return Err(e),
                Err(NeighborError::DeadEnd(e)) => {
                    last_failure = Some(e);
                }
            }
        }

        Err(last_failure.unwrap_or(ResolveError::Unresolvable { reason: None }))
    }
}

struct QueueEntry {
    priority: OrderedFloat<f64>,
    neg_len: isize,
    state: SearchState,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.neg_len == other.neg_len
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.neg_len.cmp(&other.neg_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintKind;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn add_unit_version_is_idempotent() {
        let mut r = Resolver::new();
        let a1 = r.add_unit_version(UnitVersion::new(Rc::from("a"), v("1.0.0"), v("1.0.0")));
        let a2 = r.add_unit_version(UnitVersion::new(Rc::from("a"), v("1.0.0"), v("1.0.0")));
        assert_eq!(r.versions_of("a").len(), 1);
        assert!(Rc::ptr_eq(&a1, &a2));
    }

    #[test]
    fn latest_version_tracks_max() {
        let mut r = Resolver::new();
        r.add_unit_version(UnitVersion::new(Rc::from("a"), v("1.0.0"), v("1.0.0")));
        r.add_unit_version(UnitVersion::new(Rc::from("a"), v("2.0.0"), v("2.0.0")));
        r.add_unit_version(UnitVersion::new(Rc::from("a"), v("1.5.0"), v("1.5.0")));
        assert_eq!(r.latest_version("a"), Some(&v("2.0.0")));
    }

    #[test]
    fn get_constraint_interns_by_pair() {
        let mut r = Resolver::new();
        let c1 = r.get_constraint("a", "1.0.0").unwrap();
        let c2 = r.get_constraint("a", "1.0.0").unwrap();
        assert!(Rc::ptr_eq(&c1, &c2));
    }

    #[test]
    fn resolve_trivial_no_deps() {
        let mut r = Resolver::new();
        r.add_unit_version(UnitVersion::new(Rc::from("A"), v("1.0.0"), v("1.0.0")));
        let options = ResolveOptions::default();
        let result = r.resolve(&["A"], &[], &[], &options).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].to_string(), "A@1.0.0");
    }

    #[test]
    fn resolve_exact_pin() {
        let mut r = Resolver::new();
        r.add_unit_version(UnitVersion::new(Rc::from("A"), v("1.0.0"), v("1.0.0")));
        r.add_unit_version(UnitVersion::new(Rc::from("A"), v("2.0.0"), v("2.0.0")));
        let constraint = r.get_constraint("A", "=1.0.0").unwrap();
        let options = ResolveOptions::default();
        let result = r.resolve(&["A"], &[constraint], &[], &options).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].to_string(), "A@1.0.0");
    }

    #[test]
    fn resolve_transitive_inexact() {
        let mut r = Resolver::new();
        let mut a = UnitVersion::new(Rc::from("A"), v("1.0.0"), v("1.0.0"));
        a.add_dependency(Rc::from("B")).unwrap();
        let b_constraint = Rc::new(Constraint::new(Rc::from("B"), ConstraintKind::AtLeast, v("1.0.0")));
        a.add_constraint(b_constraint).unwrap();
        r.add_unit_version(a);
        r.add_unit_version(UnitVersion::new(Rc::from("B"), v("1.0.0"), v("1.0.0")));
        r.add_unit_version(UnitVersion::new(Rc::from("B"), v("1.1.0"), v("1.0.0")));

        let options = ResolveOptions::default();
        let result = r.resolve(&["A"], &[], &[], &options).unwrap();
        assert_eq!(result.len(), 2);
        let b = result.iter().find(|uv| uv.name().as_ref() == "B").unwrap();
        assert!(*b.version() >= v("1.0.0"));
        assert!(*b.ecv() <= v("1.0.0"));
    }

    #[test]
    fn resolve_ecv_rejection() {
        let mut r = Resolver::new();
        let mut a = UnitVersion::new(Rc::from("A"), v("1.0.0"), v("1.0.0"));
        a.add_dependency(Rc::from("B")).unwrap();
        let b_constraint = Rc::new(Constraint::new(Rc::from("B"), ConstraintKind::AtLeast, v("1.0.0")));
        a.add_constraint(b_constraint).unwrap();
        r.add_unit_version(a);
        // ecv is above the constraint: this candidate never satisfies B@1.0.0.
        r.add_unit_version(UnitVersion::new(Rc::from("B"), v("2.0.0"), v("2.0.0")));

        let options = ResolveOptions::default();
        let result = r.resolve(&["A"], &[], &[], &options);
        assert!(result.is_err());
    }

    #[test]
    fn resolve_exact_propagation_forcing() {
        let mut r = Resolver::new();
        let mut a = UnitVersion::new(Rc::from("A"), v("1.0.0"), v("1.0.0"));
        a.add_dependency(Rc::from("B")).unwrap();
        let b_constraint = Rc::new(Constraint::new(Rc::from("B"), ConstraintKind::Exact, v("1.2.3")));
        a.add_constraint(b_constraint).unwrap();
        r.add_unit_version(a);
        r.add_unit_version(UnitVersion::new(Rc::from("B"), v("1.2.3"), v("1.0.0")));
        r.add_unit_version(UnitVersion::new(Rc::from("B"), v("1.2.4"), v("1.0.0")));

        let options = ResolveOptions::default();
        let result = r.resolve(&["A"], &[], &[], &options).unwrap();
        let mut names: Vec<String> = result.iter().map(|uv| uv.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["A@1.0.0".to_string(), "B@1.2.3".to_string()]);
    }

    #[test]
    fn resolve_unsatisfiable_exact_is_fatal() {
        let mut r = Resolver::new();
        let mut a = UnitVersion::new(Rc::from("A"), v("1.0.0"), v("1.0.0"));
        a.add_dependency(Rc::from("B")).unwrap();
        let b_constraint = Rc::new(Constraint::new(Rc::from("B"), ConstraintKind::Exact, v("1.2.3")));
        a.add_constraint(b_constraint).unwrap();
        r.add_unit_version(a);
        // B@1.2.3 is never registered.

        let options = ResolveOptions::default();
        let err = r.resolve(&["A"], &[], &[], &options).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoUnitVersionForConstraint {
                constraint: "B@=1.2.3".to_string()
            }
        );
    }

    #[test]
    fn stop_after_first_propagation_skips_search() {
        let mut r = Resolver::new();
        r.add_unit_version(UnitVersion::new(Rc::from("A"), v("1.0.0"), v("1.0.0")));
        let options = ResolveOptions::default().with_stop_after_first_propagation(true);
        let result = r.resolve(&["A"], &[], &[], &options).unwrap();
        assert!(result.is_empty() || result.iter().all(|uv| uv.name().as_ref() != "target"));
    }
}
