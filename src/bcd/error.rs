// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::oifits::SwitchState;

#[derive(Error, Debug)]
pub enum BcdError {
    #[error("There are no usable exposures; the total number of repeats over all switch states is 0")]
    InsufficientExposures,

    #[error("The {state} exposure has {got} spectral channels, but the in-in exposure has {expected}")]
    ShapeMismatch {
        state: SwitchState,
        got: usize,
        expected: usize,
    },

    #[error("{file}: {table} has {rows} rows, which isn't a whole number of {rows_per_repeat}-row repeats", file = file.display())]
    IncompleteRepeat {
        file: PathBuf,
        table: &'static str,
        rows: usize,
        rows_per_repeat: usize,
    },

    #[error("{file}: the tables disagree on the number of repeats (OI_T3: {t3}, OI_VIS: {vis}, OI_VIS2: {vis2})", file = file.display())]
    InconsistentRepeats {
        file: PathBuf,
        t3: usize,
        vis: usize,
        vis2: usize,
    },
}
