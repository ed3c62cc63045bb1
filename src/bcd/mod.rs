// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Combination of exposures taken in the four BCD switch states.
//!
//! Swapping the input (BCD1) or output (BCD2) beams permutes which physical
//! baseline or triangle a data row belongs to, and reverses the direction of
//! some of them (flipping the sign of their phases). Each exposure is first
//! stacked over its repeats ([`StackedState`]), then the four stacked states
//! are aligned onto the canonical row order with the fixed topology tables in
//! [`crate::constants`] and averaged ([`combine`]).
//!
//! Phases are never averaged arithmetically; each phase becomes a unit phasor,
//! phasors are summed, and the argument of the sum is the combined phase.

mod combine;
mod error;
mod stack;

pub use combine::{aligned_state_mean, combine, CombinedObservation};
pub use error::BcdError;
pub use stack::StackedState;

use strum::IntoEnumIterator;

use crate::oifits::SwitchState;

/// One `T` for each switch state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwitchStates<T> {
    pub in_in: T,
    pub in_out: T,
    pub out_in: T,
    pub out_out: T,
}

impl<T> SwitchStates<T> {
    pub fn from_fn<F: FnMut(SwitchState) -> T>(mut f: F) -> SwitchStates<T> {
        SwitchStates {
            in_in: f(SwitchState::InIn),
            in_out: f(SwitchState::InOut),
            out_in: f(SwitchState::OutIn),
            out_out: f(SwitchState::OutOut),
        }
    }

    pub fn try_from_fn<E, F: FnMut(SwitchState) -> Result<T, E>>(
        mut f: F,
    ) -> Result<SwitchStates<T>, E> {
        Ok(SwitchStates {
            in_in: f(SwitchState::InIn)?,
            in_out: f(SwitchState::InOut)?,
            out_in: f(SwitchState::OutIn)?,
            out_out: f(SwitchState::OutOut)?,
        })
    }

    pub fn get(&self, state: SwitchState) -> &T {
        match state {
            SwitchState::InIn => &self.in_in,
            SwitchState::InOut => &self.in_out,
            SwitchState::OutIn => &self.out_in,
            SwitchState::OutOut => &self.out_out,
        }
    }

    /// Iterate over the states in the order In-In, In-Out, Out-In, Out-Out.
    pub fn iter(&self) -> impl Iterator<Item = (SwitchState, &T)> {
        SwitchState::iter().map(move |s| (s, self.get(s)))
    }
}
