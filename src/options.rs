//! The `options` bag passed to [`Resolver::resolve`](crate::Resolver::resolve):
//! cost/estimate/combine callbacks plus the propagation-only escape hatch.

use std::rc::Rc;

use crate::resolver::SearchState;
use crate::unit_version::UnitVersion;

/// Cost of a (possibly partial) assignment. Must be pure and deterministic —
/// the solver caches nothing between invocations.
pub type CostFn = dyn Fn(&[Rc<UnitVersion>]) -> f64;

/// Admissible lower bound on the remaining cost to reach a terminal state.
pub type EstimateFn = dyn Fn(&SearchState) -> f64;

/// Combines an exact cost with an estimate. Must be monotone: the search
/// gives up on the first state whose *own* `estimate` is `+∞`, which assumes
/// `combine` never turns a finite estimate into an infinite one downstream.
pub type CombineFn = dyn Fn(f64, f64) -> f64;

/// Options controlling [`Resolver::resolve`](crate::Resolver::resolve).
///
/// All fields are optional in spirit — [`ResolveOptions::default`] supplies
/// zero-cost, sum-combine behavior.
pub struct ResolveOptions {
    pub cost_function: Box<CostFn>,
    pub estimate_cost_function: Box<EstimateFn>,
    pub combine_cost_function: Box<CombineFn>,
    /// When set, `resolve` returns right after the initial exact-constraint
    /// propagation, without running the best-first search.
    pub stop_after_first_propagation: bool,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cost_function<F: Fn(&[Rc<UnitVersion>]) -> f64 + 'static>(mut self, f: F) -> Self {
        self.cost_function = Box::new(f);
        self
    }

    pub fn with_estimate_cost_function<F: Fn(&SearchState) -> f64 + 'static>(
        mut self,
        f: F,
    ) -> Self {
        self.estimate_cost_function = Box::new(f);
        self
    }

    pub fn with_combine_cost_function<F: Fn(f64, f64) -> f64 + 'static>(mut self, f: F) -> Self {
        self.combine_cost_function = Box::new(f);
        self
    }

    pub fn with_stop_after_first_propagation(mut self, stop: bool) -> Self {
        self.stop_after_first_propagation = stop;
        self
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            cost_function: Box::new(|_choices| 0.0),
            estimate_cost_function: Box::new(|_state| 0.0),
            combine_cost_function: Box::new(|a, b| a + b),
            stop_after_first_propagation: false,
        }
    }
}
