// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stacking the repeats of a single exposure.

use std::path::Path;

use log::trace;
use ndarray::prelude::*;
use num_complex::Complex64;

use super::BcdError;
use crate::{
    constants::{NUM_BASELINES, NUM_TRIANGLES},
    oifits::{OiExposure, OiQuantity},
};

/// The sums over all repeats of one switch state's exposure. Rows are in the
/// state's own order (not yet aligned onto the canonical order).
///
/// Phases are stored as sums of unit phasors, i.e. the real part is the sum of
/// cosines and the imaginary part is the sum of sines. Amplitudes are plain
/// sums. Nothing is normalised; that happens once all states are combined.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedState {
    pub num_repeats: usize,

    /// Dimensions: (triangles, channels)
    pub closure_phase: Array2<Complex64>,

    /// Dimensions: (baselines, channels)
    pub diff_phase: Array2<Complex64>,

    /// Dimensions: (baselines, channels)
    pub visamp: Array2<f64>,

    /// Dimensions: (baselines, channels)
    pub vis2: Array2<f64>,
}

impl StackedState {
    /// A switch state that wasn't observed. It contributes nothing to any sum.
    pub fn empty(num_chans: usize) -> StackedState {
        StackedState {
            num_repeats: 0,
            closure_phase: Array2::zeros((NUM_TRIANGLES, num_chans)),
            diff_phase: Array2::zeros((NUM_BASELINES, num_chans)),
            visamp: Array2::zeros((NUM_BASELINES, num_chans)),
            vis2: Array2::zeros((NUM_BASELINES, num_chans)),
        }
    }

    pub fn from_exposure(exposure: &OiExposure) -> Result<StackedState, BcdError> {
        let file = exposure.path.as_path();
        let t3 = count_repeats(
            exposure.closure_phase.len_of(Axis(0)),
            OiQuantity::ClosurePhase,
            file,
        )?;
        let vis = count_repeats(
            exposure.diff_phase.len_of(Axis(0)),
            OiQuantity::DifferentialPhase,
            file,
        )?;
        let vis2 = count_repeats(
            exposure.vis2.len_of(Axis(0)),
            OiQuantity::SquaredVisibility,
            file,
        )?;
        if t3 != vis || vis != vis2 {
            return Err(BcdError::InconsistentRepeats {
                file: file.to_path_buf(),
                t3,
                vis,
                vis2,
            });
        }
        trace!("{}: {t3} repeats", file.display());

        Ok(StackedState {
            num_repeats: t3,
            closure_phase: stack_phases(exposure.closure_phase.view(), NUM_TRIANGLES),
            diff_phase: stack_phases(exposure.diff_phase.view(), NUM_BASELINES),
            visamp: stack_amplitudes(exposure.visamp.view(), NUM_BASELINES),
            vis2: stack_amplitudes(exposure.vis2.view(), NUM_BASELINES),
        })
    }

    pub fn num_chans(&self) -> usize {
        self.visamp.len_of(Axis(1))
    }

    /// The phasor sums of a phase quantity, or `None` for an amplitude
    /// quantity.
    pub fn phasors(&self, quantity: OiQuantity) -> Option<ArrayView2<'_, Complex64>> {
        match quantity {
            OiQuantity::ClosurePhase => Some(self.closure_phase.view()),
            OiQuantity::DifferentialPhase => Some(self.diff_phase.view()),
            OiQuantity::CorrelatedAmplitude | OiQuantity::SquaredVisibility => None,
        }
    }

    /// The sums of an amplitude quantity, or `None` for a phase quantity.
    pub fn sums(&self, quantity: OiQuantity) -> Option<ArrayView2<'_, f64>> {
        match quantity {
            OiQuantity::CorrelatedAmplitude => Some(self.visamp.view()),
            OiQuantity::SquaredVisibility => Some(self.vis2.view()),
            OiQuantity::ClosurePhase | OiQuantity::DifferentialPhase => None,
        }
    }
}

/// How many repeats does a table with `num_rows` rows hold?
fn count_repeats(num_rows: usize, quantity: OiQuantity, file: &Path) -> Result<usize, BcdError> {
    let rows_per_repeat = quantity.rows_per_repeat();
    if num_rows % rows_per_repeat != 0 {
        return Err(BcdError::IncompleteRepeat {
            file: file.to_path_buf(),
            table: quantity.table(),
            rows: num_rows,
            rows_per_repeat,
        });
    }
    Ok(num_rows / rows_per_repeat)
}

/// Sum the unit phasors of phases [degrees] over repeats of `rows_per_repeat`
/// rows. The number of rows in `phases` must be a multiple of
/// `rows_per_repeat`.
pub(super) fn stack_phases(phases: ArrayView2<f64>, rows_per_repeat: usize) -> Array2<Complex64> {
    let num_chans = phases.len_of(Axis(1));
    phases
        .axis_chunks_iter(Axis(0), rows_per_repeat)
        .fold(Array2::zeros((rows_per_repeat, num_chans)), |acc, repeat| {
            acc + repeat.mapv(|p| Complex64::from_polar(1.0, p.to_radians()))
        })
}

/// Sum values over repeats of `rows_per_repeat` rows. The number of rows in
/// `values` must be a multiple of `rows_per_repeat`.
pub(super) fn stack_amplitudes(values: ArrayView2<f64>, rows_per_repeat: usize) -> Array2<f64> {
    let num_chans = values.len_of(Axis(1));
    values
        .axis_chunks_iter(Axis(0), rows_per_repeat)
        .fold(Array2::zeros((rows_per_repeat, num_chans)), |acc, repeat| acc + repeat)
}
