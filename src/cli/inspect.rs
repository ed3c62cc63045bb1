// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use clap::Parser;
use log::debug;
use ndarray::Axis;
use strum::IntoEnumIterator;

use super::common::InfoPrinter;
use crate::{
    oifits::{OiExposure, OiQuantity},
    BcdcalError,
};

#[derive(Parser, Debug)]
pub(super) struct InspectArgs {
    /// Paths to OIFITS exposures.
    #[clap(required = true, parse(from_os_str))]
    files: Vec<PathBuf>,
}

impl InspectArgs {
    pub(super) fn run(self) -> Result<(), BcdcalError> {
        for file in self.files {
            debug!("Inspecting {}", file.display());
            let exposure = OiExposure::read(&file)?;

            let mut printer = InfoPrinter::new(file.display().to_string().into());
            printer.push_line(format!("BCD configuration: {}", exposure.bcd).into());
            // Wavelengths are in metres; microns read better.
            let (min, max) = exposure
                .eff_wave
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &w| {
                    (min.min(w), max.max(w))
                });
            printer.push_line(
                format!(
                    "{} spectral channels, {:.4} to {:.4} µm",
                    exposure.num_chans(),
                    min * 1e6,
                    max * 1e6
                )
                .into(),
            );
            printer.push_line(
                format!(
                    "AMPTYP: {}",
                    exposure.amp_type.as_deref().unwrap_or("<not set>")
                )
                .into(),
            );

            let mut block = vec!["Rows".into()];
            for quantity in OiQuantity::iter() {
                let num_rows = exposure.data(quantity).len_of(Axis(0));
                let per_repeat = quantity.rows_per_repeat();
                let mut line = format!(
                    "{} {}: {num_rows} ({} repeats)",
                    quantity.table(),
                    quantity.column(),
                    num_rows / per_repeat
                );
                if num_rows % per_repeat != 0 {
                    line.push_str(", incomplete repeat!");
                }
                block.push(line.into());
            }
            printer.push_block(block);
            printer.display();
        }

        Ok(())
    }
}
