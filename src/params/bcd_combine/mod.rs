// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters for the BCD combination of one epoch.


use std::path::{Path, PathBuf};

use log::{debug, info, trace};
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    bcd::{combine, BcdError, CombinedObservation, StackedState, SwitchStates},
    cli::Warn,
    constants::WAVELENGTH_RELATIVE_TOLERANCE,
    io::{write_combined, OiWriteError},
    oifits::{BcdConfiguration, OiExposure, OiReadError, SwitchState},
};

/// The exposure files of one epoch.
#[derive(Debug, Clone)]
pub(crate) struct BcdInputFiles {
    pub(crate) in_in: PathBuf,
    pub(crate) in_out: Option<PathBuf>,
    pub(crate) out_in: Option<PathBuf>,
    pub(crate) out_out: PathBuf,
}

impl BcdInputFiles {
    pub(crate) fn get(&self, state: SwitchState) -> Option<&Path> {
        match state {
            SwitchState::InIn => Some(&self.in_in),
            SwitchState::InOut => self.in_out.as_deref(),
            SwitchState::OutIn => self.out_in.as_deref(),
            SwitchState::OutOut => Some(&self.out_out),
        }
    }
}

/// The exposures of one epoch, read and checked for compatibility. In-In and
/// Out-Out are always present.
#[derive(Debug)]
pub(crate) struct BcdExposures {
    pub(crate) in_in: OiExposure,
    pub(crate) in_out: Option<OiExposure>,
    pub(crate) out_in: Option<OiExposure>,
    pub(crate) out_out: OiExposure,
}

impl BcdExposures {
    pub(crate) fn read(files: &BcdInputFiles) -> Result<BcdExposures, BcdCombineError> {
        let exposures = BcdExposures {
            in_in: OiExposure::read(&files.in_in)?,
            in_out: files.in_out.as_deref().map(OiExposure::read).transpose()?,
            out_in: files.out_in.as_deref().map(OiExposure::read).transpose()?,
            out_out: OiExposure::read(&files.out_out)?,
        };
        exposures.validate()?;
        Ok(exposures)
    }

    pub(crate) fn get(&self, state: SwitchState) -> Option<&OiExposure> {
        match state {
            SwitchState::InIn => Some(&self.in_in),
            SwitchState::InOut => self.in_out.as_ref(),
            SwitchState::OutIn => self.out_in.as_ref(),
            SwitchState::OutOut => Some(&self.out_out),
        }
    }

    /// Differing channel counts are fatal. Headers that disagree with the
    /// state a file was given as, and differing wavelengths, only produce
    /// warnings; the caller's assignment wins.
    fn validate(&self) -> Result<(), BcdCombineError> {
        let reference = &self.in_in;
        for state in SwitchState::iter() {
            let exposure = match self.get(state) {
                Some(e) => e,
                None => continue,
            };
            let file = exposure.path.display();

            match exposure.bcd {
                BcdConfiguration::Switched(s) if s == state => (),
                BcdConfiguration::Switched(s) => {
                    format!("{file} was given as the {state} exposure, but its header says {s}")
                        .warn()
                }
                BcdConfiguration::Combined => format!(
                    "{file} was given as the {state} exposure, but its header says it has already been combined"
                )
                .warn(),
                BcdConfiguration::Unknown => {
                    format!("{file} has no recognisable BCD state in its header; assuming {state}")
                        .warn()
                }
            }

            if state == SwitchState::InIn {
                continue;
            }
            if exposure.num_chans() != reference.num_chans() {
                return Err(BcdCombineError::ShapeMismatch {
                    file: exposure.path.clone(),
                    got: exposure.num_chans(),
                    reference: reference.path.clone(),
                    expected: reference.num_chans(),
                });
            }
            let max_relative_diff = exposure
                .eff_wave
                .iter()
                .zip(reference.eff_wave.iter())
                .map(|(w, r)| ((w - r) / r).abs())
                .fold(0.0, f64::max);
            trace!("{state}: max. relative wavelength difference {max_relative_diff:e}");
            if max_relative_diff > WAVELENGTH_RELATIVE_TOLERANCE {
                format!(
                    "The wavelengths of {file} differ from those of {} by up to {:.2e} (relative)",
                    reference.path.display(),
                    max_relative_diff
                )
                .warn();
            }
        }

        Ok(())
    }
}

/// Options for the diagnostic plots.
#[derive(Debug, Clone)]
pub(crate) struct DiagnosticsParams {
    pub(crate) plot_dir: PathBuf,

    /// The limit of the phase axes [degrees]. Cosmetic only.
    pub(crate) phase_limit: f64,
}

pub(crate) struct BcdCombineParams {
    pub(crate) exposures: BcdExposures,
    pub(crate) output: PathBuf,

    /// If set, diagnostic plots are drawn.
    pub(crate) diagnostics: Option<DiagnosticsParams>,
}

impl BcdCombineParams {
    /// Stack, combine and write out. The combined observation is also
    /// returned.
    pub(crate) fn run(&self) -> Result<CombinedObservation, BcdCombineError> {
        let num_chans = self.exposures.in_in.num_chans();

        debug!("Stacking repeats");
        let stacked = SwitchStates::try_from_fn(|state| match self.exposures.get(state) {
            Some(exposure) => StackedState::from_exposure(exposure),
            None => {
                debug!("No {state} exposure; it contributes nothing");
                Ok(StackedState::empty(num_chans))
            }
        })?;

        info!("Combining switch states");
        let combined = combine(&stacked)?;

        #[cfg(feature = "plotting")]
        if let Some(diagnostics) = &self.diagnostics {
            let base = self
                .output
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("bcd");
            let files = crate::plotting::plot_diagnostics(
                &self.exposures.in_in.eff_wave,
                &stacked,
                &combined,
                diagnostics,
                base,
            )?;
            info!("Wrote {files:?}");
        }

        let correlated_flux = self.exposures.in_in.has_correlated_flux();
        if correlated_flux {
            debug!("In-in amplitudes are correlated fluxes");
        }
        write_combined(
            &self.exposures.in_in.path,
            &self.output,
            &combined,
            correlated_flux,
        )?;
        info!("Wrote {}", self.output.display());

        Ok(combined)
    }
}

#[derive(Error, Debug)]
pub(crate) enum BcdCombineError {
    #[error("{file} has {got} spectral channels, but {reference} has {expected}", file = file.display(), reference = reference.display())]
    ShapeMismatch {
        file: PathBuf,
        got: usize,
        reference: PathBuf,
        expected: usize,
    },

    #[error(transparent)]
    Read(#[from] OiReadError),

    #[error(transparent)]
    Combine(#[from] BcdError),

    #[error(transparent)]
    Write(#[from] OiWriteError),

    #[cfg(feature = "plotting")]
    #[error(transparent)]
    Plot(#[from] crate::plotting::PlotError),
}
