// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpful functions for tests. OIFITS files are synthesised on the fly rather
//! than kept in the repo.

use std::path::Path;

use fitsio::{
    tables::{ColumnDataType, ColumnDescription},
    FitsFile,
};
use ndarray::prelude::*;

use crate::{
    constants::*,
    io::{read::fits::fits_find_col, write::fits::fits_write_vector_col},
    oifits::{OiQuantity, SwitchState},
};

/// The contents of a synthetic OIFITS exposure.
#[derive(Debug, Clone)]
pub(crate) struct SyntheticExposure {
    /// The values of the BCD1 and BCD2 identifiers. `None` leaves the keys out
    /// of the primary header.
    pub(crate) bcd_ids: Option<(&'static str, &'static str)>,
    pub(crate) eff_wave: Vec<f64>,
    pub(crate) amp_type: Option<&'static str>,
    pub(crate) closure_phase: Array2<f64>,
    pub(crate) diff_phase: Array2<f64>,
    pub(crate) visamp: Array2<f64>,
    pub(crate) vis2: Array2<f64>,
    /// Tables to leave out of the file.
    pub(crate) skip_tables: Vec<&'static str>,
}

impl SyntheticExposure {
    /// An exposure of `state` filled with zeros.
    pub(crate) fn zeros(state: SwitchState, num_repeats: usize, num_chans: usize) -> Self {
        let ids = match state {
            SwitchState::InIn => ("IN", "IN"),
            SwitchState::InOut => ("IN", "OUT"),
            SwitchState::OutIn => ("OUT", "IN"),
            SwitchState::OutOut => ("OUT", "OUT"),
        };
        let triangles = (num_repeats * NUM_TRIANGLES, num_chans);
        let baselines = (num_repeats * NUM_BASELINES, num_chans);
        Self {
            bcd_ids: Some(ids),
            eff_wave: (0..num_chans)
                .map(|i| 3.0e-6 + i as f64 * 0.1e-6)
                .collect(),
            amp_type: Some("absolute"),
            closure_phase: Array2::zeros(triangles),
            diff_phase: Array2::zeros(baselines),
            visamp: Array2::zeros(baselines),
            vis2: Array2::zeros(baselines),
            skip_tables: vec![],
        }
    }

    /// Fill every repeat of a quantity with the same per-row values (one value
    /// per row, constant over channels).
    pub(crate) fn with_repeated_rows(mut self, quantity: OiQuantity, rows: &[f64]) -> Self {
        assert_eq!(rows.len(), quantity.rows_per_repeat());
        let data = match quantity {
            OiQuantity::ClosurePhase => &mut self.closure_phase,
            OiQuantity::DifferentialPhase => &mut self.diff_phase,
            OiQuantity::CorrelatedAmplitude => &mut self.visamp,
            OiQuantity::SquaredVisibility => &mut self.vis2,
        };
        for (i_row, mut row) in data.outer_iter_mut().enumerate() {
            row.fill(rows[i_row % rows.len()]);
        }
        self
    }

    pub(crate) fn write(&self, path: &Path) {
        let mut fptr = FitsFile::create(path).overwrite().open().unwrap();

        let primary = fptr.primary_hdu().unwrap();
        primary
            .write_key(&mut fptr, "INSTRUME", "SYNTHETIC")
            .unwrap();
        if let Some((bcd1, bcd2)) = self.bcd_ids {
            primary.write_key(&mut fptr, BCD1_ID, bcd1).unwrap();
            primary.write_key(&mut fptr, BCD2_ID, bcd2).unwrap();
            primary.write_key(&mut fptr, BCD1_NAME, bcd1).unwrap();
            primary.write_key(&mut fptr, BCD2_NAME, bcd2).unwrap();
        }

        if !self.skip_tables.contains(&OI_WAVELENGTH) {
            let col = ColumnDescription::new(EFF_WAVE)
                .with_type(ColumnDataType::Double)
                .create()
                .unwrap();
            let hdu = fptr.create_table(OI_WAVELENGTH, &[col]).unwrap();
            hdu.write_col(&mut fptr, EFF_WAVE, &self.eff_wave).unwrap();
        }

        let num_chans = self.eff_wave.len();
        for (table, columns) in [
            (OI_VIS, vec![(VISAMP, &self.visamp), (VISPHI, &self.diff_phase)]),
            (OI_VIS2, vec![(VIS2DATA, &self.vis2)]),
            (OI_T3, vec![(T3PHI, &self.closure_phase)]),
        ] {
            if self.skip_tables.contains(&table) {
                continue;
            }

            // A scalar column, to check that the writer leaves other columns
            // alone.
            let mut descriptions = vec![ColumnDescription::new("TARGET_ID")
                .with_type(ColumnDataType::Int)
                .create()
                .unwrap()];
            for (name, _) in &columns {
                descriptions.push(
                    ColumnDescription::new(*name)
                        .with_type(ColumnDataType::Double)
                        .that_repeats(num_chans)
                        .create()
                        .unwrap(),
                );
            }
            let hdu = fptr.create_table(table, &descriptions).unwrap();
            if table == OI_VIS {
                if let Some(amp_type) = self.amp_type {
                    hdu.write_key(&mut fptr, AMPTYP, amp_type).unwrap();
                }
            }

            let num_rows = columns[0].1.len_of(Axis(0));
            if num_rows > 0 {
                let target_ids: Vec<i32> = (0..num_rows as i32).collect();
                hdu.write_col(&mut fptr, "TARGET_ID", &target_ids).unwrap();
            }
            let hdu = fptr.hdu(table).unwrap();
            for (name, data) in columns {
                let col = fits_find_col(&fptr, &hdu, name).unwrap().unwrap();
                fits_write_vector_col(&mut fptr, &hdu, col, data.view()).unwrap();
            }
        }
    }
}

/// Read a whole vector column of a table, for checking written files.
pub(crate) fn read_vector_col(path: &Path, table: &str, column: &str) -> Array2<f64> {
    use crate::io::read::fits::{fits_get_vector_col, fits_open};

    let mut fptr = fits_open(path).unwrap();
    let hdu = fptr.hdu(table).unwrap();
    let col = fits_find_col(&fptr, &hdu, column).unwrap().unwrap();
    fits_get_vector_col(&mut fptr, &hdu, col).unwrap()
}

/// Read a string key from a HDU, for checking written files.
pub(crate) fn read_key(path: &Path, hdu_num: usize, key: &str) -> Option<String> {
    use crate::io::read::fits::{fits_get_optional_key, fits_open};

    let mut fptr = fits_open(path).unwrap();
    let hdu = fptr.hdu(hdu_num).unwrap();
    fits_get_optional_key(&mut fptr, &hdu, key).unwrap()
}
