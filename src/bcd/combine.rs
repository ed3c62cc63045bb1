// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::debug;
use ndarray::prelude::*;
use num_complex::Complex64;

use super::{BcdError, StackedState, SwitchStates};
use crate::{
    constants::{
        BASELINE_INDICES, CLOSURE_PHASE_INDICES, CLOSURE_PHASE_SIGNS, DIFFERENTIAL_PHASE_SIGNS,
        TOPOLOGY_STATE_ORDER,
    },
    oifits::{OiQuantity, SwitchState},
};

/// The result of combining the four switch states. Rows are in the canonical
/// order; exactly one repeat's worth of rows is present.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedObservation {
    /// The total number of repeats that went into the combination.
    pub num_repeats: usize,

    /// Dimensions: (triangles, channels) [degrees]
    pub closure_phase: Array2<f64>,

    /// Dimensions: (baselines, channels) [degrees]
    pub diff_phase: Array2<f64>,

    /// Dimensions: (baselines, channels)
    pub visamp: Array2<f64>,

    /// Dimensions: (baselines, channels)
    pub vis2: Array2<f64>,
}

impl CombinedObservation {
    pub fn data(&self, quantity: OiQuantity) -> ArrayView2<'_, f64> {
        match quantity {
            OiQuantity::ClosurePhase => self.closure_phase.view(),
            OiQuantity::DifferentialPhase => self.diff_phase.view(),
            OiQuantity::CorrelatedAmplitude => self.visamp.view(),
            OiQuantity::SquaredVisibility => self.vis2.view(),
        }
    }

    pub fn num_chans(&self) -> usize {
        self.visamp.len_of(Axis(1))
    }
}

/// Combine the stacked exposures of all four switch states. States that weren't
/// observed should be given as [`StackedState::empty`].
///
/// Every sum is divided by the total number of repeats over all states. For
/// phases this doesn't change the argument of the phasor sum, but it keeps the
/// intermediate quantities as true circular means.
pub fn combine(states: &SwitchStates<StackedState>) -> Result<CombinedObservation, BcdError> {
    let num_chans = states.in_in.num_chans();
    for (state, stacked) in states.iter() {
        if stacked.num_chans() != num_chans {
            return Err(BcdError::ShapeMismatch {
                state,
                got: stacked.num_chans(),
                expected: num_chans,
            });
        }
    }

    let num_repeats: usize = states.iter().map(|(_, s)| s.num_repeats).sum();
    if num_repeats == 0 {
        return Err(BcdError::InsufficientExposures);
    }
    debug!(
        "Combining {num_repeats} repeats (in-in: {}, in-out: {}, out-in: {}, out-out: {})",
        states.in_in.num_repeats,
        states.in_out.num_repeats,
        states.out_in.num_repeats,
        states.out_out.num_repeats
    );
    let norm = num_repeats as f64;

    Ok(CombinedObservation {
        num_repeats,
        closure_phase: combine_phases(
            states,
            |s| s.closure_phase.view(),
            &CLOSURE_PHASE_INDICES,
            &CLOSURE_PHASE_SIGNS,
            norm,
        ),
        diff_phase: combine_phases(
            states,
            |s| s.diff_phase.view(),
            &BASELINE_INDICES,
            &DIFFERENTIAL_PHASE_SIGNS,
            norm,
        ),
        visamp: combine_amplitudes(states, |s| s.visamp.view(), &BASELINE_INDICES, norm),
        vis2: combine_amplitudes(states, |s| s.vis2.view(), &BASELINE_INDICES, norm),
    })
}

/// For each canonical row, sum the (possibly conjugated) phasor sums of the
/// contributing row of each state, then take the argument [degrees].
fn combine_phases<'a, const N: usize>(
    states: &'a SwitchStates<StackedState>,
    phasors: impl Fn(&'a StackedState) -> ArrayView2<'a, Complex64>,
    indices: &[[usize; 4]; N],
    signs: &[[i8; 4]; N],
    norm: f64,
) -> Array2<f64> {
    let num_chans = states.in_in.num_chans();
    let mut combined = Array2::zeros((N, num_chans));
    for (i_row, mut combined_row) in combined.outer_iter_mut().enumerate() {
        let sum = TOPOLOGY_STATE_ORDER.iter().enumerate().fold(
            Array1::<Complex64>::zeros(num_chans),
            |acc, (i_col, &state)| {
                let contribution = phasors(states.get(state))
                    .index_axis_move(Axis(0), indices[i_row][i_col]);
                // A reversed baseline or triangle negates the phase; only the
                // sine (imaginary) part changes sign.
                if signs[i_row][i_col] < 0 {
                    acc + contribution.mapv(|z| z.conj())
                } else {
                    acc + contribution
                }
            },
        ) / norm;
        combined_row.assign(&sum.mapv(|z| z.arg().to_degrees()));
    }
    combined
}

/// For each canonical row, sum the contributing row of each state. Amplitudes
/// are never sign-flipped.
fn combine_amplitudes<'a, const N: usize>(
    states: &'a SwitchStates<StackedState>,
    sums: impl Fn(&'a StackedState) -> ArrayView2<'a, f64>,
    indices: &[[usize; 4]; N],
    norm: f64,
) -> Array2<f64> {
    let num_chans = states.in_in.num_chans();
    let mut combined = Array2::zeros((N, num_chans));
    for (i_row, mut combined_row) in combined.outer_iter_mut().enumerate() {
        let sum = TOPOLOGY_STATE_ORDER.iter().enumerate().fold(
            Array1::<f64>::zeros(num_chans),
            |acc, (i_col, &state)| {
                acc + sums(states.get(state)).index_axis_move(Axis(0), indices[i_row][i_col])
            },
        );
        combined_row.assign(&(sum / norm));
    }
    combined
}

/// The mean of a single switch state over its own repeats, re-ordered (and
/// for phases, sign-corrected) onto the canonical rows. This is what the state
/// would contribute if it were the only one observed. `None` is returned if
/// the state has no repeats.
pub fn aligned_state_mean(
    state: SwitchState,
    stacked: &StackedState,
    quantity: OiQuantity,
) -> Option<Array2<f64>> {
    if stacked.num_repeats == 0 {
        return None;
    }
    let i_col = TOPOLOGY_STATE_ORDER.iter().position(|&s| s == state)?;
    let norm = stacked.num_repeats as f64;

    let aligned = if quantity.is_phase() {
        let (indices, signs) = if quantity == OiQuantity::ClosurePhase {
            (&CLOSURE_PHASE_INDICES[..], &CLOSURE_PHASE_SIGNS[..])
        } else {
            (&BASELINE_INDICES[..], &DIFFERENTIAL_PHASE_SIGNS[..])
        };
        let phasors = stacked.phasors(quantity)?;
        let mut aligned = Array2::<f64>::zeros((indices.len(), stacked.num_chans()));
        for ((mut row, index), sign) in aligned.outer_iter_mut().zip(indices).zip(signs) {
            row.assign(&phasors.row(index[i_col]).mapv(|z| {
                let z = if sign[i_col] < 0 { z.conj() } else { z };
                z.arg().to_degrees()
            }));
        }
        aligned
    } else {
        let sums = stacked.sums(quantity)?;
        let mut aligned = Array2::<f64>::zeros((BASELINE_INDICES.len(), stacked.num_chans()));
        for (mut row, index) in aligned.outer_iter_mut().zip(&BASELINE_INDICES) {
            row.assign(&(&sums.row(index[i_col]) / norm));
        }
        aligned
    };
    Some(aligned)
}
