// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

The topology tables in here are fixed properties of the four-telescope beam
combiner. They were determined empirically against calibrated reference
datasets and must not be "re-derived"; treat them as physical constants.
 */

use static_assertions::const_assert;

use crate::oifits::SwitchState;

/// The number of closure triangles in one repeat of an exposure.
pub const NUM_TRIANGLES: usize = 4;

/// The number of baselines in one repeat of an exposure.
pub const NUM_BASELINES: usize = 6;

/// The order of the switch states in the columns of the topology tables.
pub const TOPOLOGY_STATE_ORDER: [SwitchState; 4] = [
    SwitchState::InIn,
    SwitchState::OutIn,
    SwitchState::InOut,
    SwitchState::OutOut,
];

/// For each canonical closure triangle (row), the triangle of each switch state
/// (column, ordered as [`TOPOLOGY_STATE_ORDER`]) that maps onto it.
pub const CLOSURE_PHASE_INDICES: [[usize; 4]; NUM_TRIANGLES] =
    [[0, 0, 3, 3], [1, 2, 1, 2], [2, 1, 2, 1], [3, 3, 0, 0]];

/// The sign applied to each contributing closure phase. Laid out like
/// [`CLOSURE_PHASE_INDICES`].
pub const CLOSURE_PHASE_SIGNS: [[i8; 4]; NUM_TRIANGLES] = [
    [1, -1, 1, -1],
    [1, 1, -1, -1],
    [1, 1, -1, -1],
    [1, -1, 1, -1],
];

/// For each canonical baseline (row), the baseline of each switch state
/// (column, ordered as [`TOPOLOGY_STATE_ORDER`]) that maps onto it. This
/// permutation is shared by differential phases, correlated amplitudes and
/// squared visibilities.
pub const BASELINE_INDICES: [[usize; 4]; NUM_BASELINES] = [
    [0, 0, 0, 0],
    [1, 1, 1, 1],
    [2, 3, 4, 5],
    [3, 2, 5, 4],
    [4, 5, 2, 3],
    [5, 4, 3, 2],
];

/// The sign applied to each contributing differential phase. Laid out like
/// [`BASELINE_INDICES`]. Amplitudes are never sign-flipped.
pub const DIFFERENTIAL_PHASE_SIGNS: [[i8; 4]; NUM_BASELINES] = [
    [1, -1, 1, -1],
    [1, 1, -1, -1],
    [1, 1, 1, 1],
    [1, 1, 1, 1],
    [1, 1, 1, 1],
    [1, 1, 1, 1],
];

/// Every column of an index table must be a permutation of `0..N`, otherwise a
/// canonical row would be fed twice (or never) by the same switch state.
const fn columns_are_permutations<const N: usize>(table: &[[usize; 4]; N]) -> bool {
    let mut col = 0;
    while col < 4 {
        let mut seen = [false; N];
        let mut row = 0;
        while row < N {
            let i = table[row][col];
            if i >= N || seen[i] {
                return false;
            }
            seen[i] = true;
            row += 1;
        }
        col += 1;
    }
    true
}

const fn signs_are_unit<const N: usize>(table: &[[i8; 4]; N]) -> bool {
    let mut row = 0;
    while row < N {
        let mut col = 0;
        while col < 4 {
            if table[row][col] != 1 && table[row][col] != -1 {
                return false;
            }
            col += 1;
        }
        row += 1;
    }
    true
}

const_assert!(columns_are_permutations(&CLOSURE_PHASE_INDICES));
const_assert!(columns_are_permutations(&BASELINE_INDICES));
const_assert!(signs_are_unit(&CLOSURE_PHASE_SIGNS));
const_assert!(signs_are_unit(&DIFFERENTIAL_PHASE_SIGNS));

// OIFITS table and column names.
pub(crate) const OI_WAVELENGTH: &str = "OI_WAVELENGTH";
pub(crate) const OI_T3: &str = "OI_T3";
pub(crate) const OI_VIS: &str = "OI_VIS";
pub(crate) const OI_VIS2: &str = "OI_VIS2";
pub(crate) const EFF_WAVE: &str = "EFF_WAVE";
pub(crate) const T3PHI: &str = "T3PHI";
pub(crate) const VISPHI: &str = "VISPHI";
pub(crate) const VISAMP: &str = "VISAMP";
pub(crate) const VIS2DATA: &str = "VIS2DATA";
pub(crate) const AMPTYP: &str = "AMPTYP";

/// The value of `AMPTYP` written when the In-In exposure holds correlated
/// fluxes.
pub(crate) const AMPTYP_CORRELATED_FLUX: &str = "correlated flux";

// Primary-header BCD identifiers. These are ESO HIERARCH keywords; cfitsio adds
// and strips the "HIERARCH" prefix itself.
pub(crate) const BCD1_ID: &str = "ESO INS BCD1 ID";
pub(crate) const BCD2_ID: &str = "ESO INS BCD2 ID";
pub(crate) const BCD1_NAME: &str = "ESO INS BCD1 NAME";
pub(crate) const BCD2_NAME: &str = "ESO INS BCD2 NAME";

/// The keys cleared in a combined file; it no longer corresponds to a single
/// BCD state.
pub(crate) const BCD_HEADER_KEYS: [&str; 4] = [BCD1_ID, BCD2_ID, BCD1_NAME, BCD2_NAME];

/// The value written into [`BCD_HEADER_KEYS`] of a combined file.
pub(crate) const BCD_BLANK: &str = " ";

/// The default limit of the phase axes on diagnostic plots [degrees].
pub const DEFAULT_PHASE_LIMIT: f64 = 180.0;

/// Wavelengths of different switch states that differ by more than this
/// relative amount trigger a warning.
pub(crate) const WAVELENGTH_RELATIVE_TOLERANCE: f64 = 1e-6;
