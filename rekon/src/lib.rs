// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Seams of a reconciliation cycle.
//!
//! A cycle observes an external system, compares the observation with a requirement and
//! drives the system towards it. The traits here only name those steps; the switch
//! agent implements them for the switch configuration tree.

/// `Observe` is implemented by whatever reads the current state of an external system.
pub trait Observe {
    /// The returned data type of the observation.
    ///
    /// This is a [GAT] parameterized over a lifetime `'a where Self: 'a`, so an observation
    /// may borrow from the observer.
    ///
    /// [GAT]: https://rust-lang.github.io/generic-associated-types-initiative/explainer/motivation.html
    type Observation<'a>
    where
        Self: 'a;

    /// Observe the state of the system.
    ///
    /// # Contract
    ///
    /// Implementations must not mutate the state of the external system.
    fn observe<'a>(&'a self) -> impl Future<Output = Self::Observation<'a>> + Send
    where
        Self: 'a;
}

/// `Reconcile` drives an external system closer to a requirement, given an observation of
/// its current state.
pub trait Reconcile {
    /// The state the system is required to reach.
    type Requirement<'a>
    where
        Self: 'a;

    /// What [`Observe`] returned for the system.
    type Observation<'a>
    where
        Self: 'a;

    /// Data returned by the reconciliation. Often a `Result` with a report of what was done.
    type Outcome<'a>
    where
        Self: 'a;

    /// Attempt to drive the observed system towards the requirement.
    ///
    /// # Contract
    ///
    /// Reaching the requirement is not guaranteed by a single call. Reconciling a
    /// requirement against an observation that already satisfies it must do nothing, so
    /// that repeated calls converge.
    fn reconcile<'a>(
        &'a self,
        requirement: Self::Requirement<'a>,
        observation: Self::Observation<'a>,
    ) -> impl Future<Output = Self::Outcome<'a>> + Send
    where
        Self: 'a;
}
