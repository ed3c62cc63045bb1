// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod combine;
mod inspect;
mod no_stderr;

use std::{path::Path, process::Output, str::from_utf8};

use assert_cmd::{output::OutputError, Command};
use fitsio::{
    tables::{ColumnDataType, ColumnDescription},
    FitsFile,
};

fn bcdcal() -> Command {
    Command::cargo_bin("bcdcal").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

const NUM_CHANS: usize = 3;

/// A minimal OIFITS exposure. Every repeat holds the same rows, and every row
/// is constant over the spectral channels.
struct Exposure {
    bcd_ids: (&'static str, &'static str),
    num_repeats: usize,
    closure_phase: [f64; 4],
    visamp: [f64; 6],
}

impl Exposure {
    fn new(bcd_ids: (&'static str, &'static str), num_repeats: usize) -> Exposure {
        Exposure {
            bcd_ids,
            num_repeats,
            closure_phase: [0.0; 4],
            visamp: [1.0; 6],
        }
    }

    fn expand(&self, rows: &[f64]) -> Vec<f64> {
        (0..self.num_repeats)
            .flat_map(|_| rows.iter())
            .flat_map(|&v| std::iter::repeat(v).take(NUM_CHANS))
            .collect()
    }

    fn write(&self, path: &Path) {
        let mut fptr = FitsFile::create(path).overwrite().open().unwrap();
        let primary = fptr.primary_hdu().unwrap();
        primary.write_key(&mut fptr, "INSTRUME", "TEST").unwrap();
        primary
            .write_key(&mut fptr, "ESO INS BCD1 ID", self.bcd_ids.0)
            .unwrap();
        primary
            .write_key(&mut fptr, "ESO INS BCD2 ID", self.bcd_ids.1)
            .unwrap();

        let col = ColumnDescription::new("EFF_WAVE")
            .with_type(ColumnDataType::Double)
            .create()
            .unwrap();
        let hdu = fptr.create_table("OI_WAVELENGTH", &[col]).unwrap();
        hdu.write_col(&mut fptr, "EFF_WAVE", &[8.0e-6, 9.0e-6, 10.0e-6])
            .unwrap();

        let zeros = [0.0; 6];
        let vis2 = [0.5; 6];
        for (table, columns) in [
            ("OI_VIS", vec![("VISAMP", &self.visamp[..]), ("VISPHI", &zeros[..])]),
            ("OI_VIS2", vec![("VIS2DATA", &vis2[..])]),
            ("OI_T3", vec![("T3PHI", &self.closure_phase[..])]),
        ] {
            let descriptions: Vec<_> = columns
                .iter()
                .map(|(name, _)| {
                    ColumnDescription::new(*name)
                        .with_type(ColumnDataType::Double)
                        .that_repeats(NUM_CHANS)
                        .create()
                        .unwrap()
                })
                .collect();
            let hdu = fptr.create_table(table, &descriptions).unwrap();
            if table == "OI_VIS" {
                hdu.write_key(&mut fptr, "AMPTYP", "absolute").unwrap();
            }
            if self.num_repeats == 0 {
                continue;
            }
            for (name, rows) in columns {
                hdu.write_col(&mut fptr, name, &self.expand(rows)).unwrap();
            }
        }
    }
}
