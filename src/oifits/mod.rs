// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read interferometric exposures from OIFITS files.
//!
//! An exposure is the output of the upstream reduction for a single BCD switch
//! state. Each of its tables may hold several repeats stacked on top of each
//! other; e.g. a file with 3 repeats has 12 rows in `OI_T3` and 18 rows in
//! `OI_VIS` and `OI_VIS2`.

mod error;

pub use error::OiReadError;

use std::path::{Path, PathBuf};

use log::{debug, trace};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use vec1::Vec1;

use crate::{
    constants::*,
    io::read::fits::{
        fits_find_col, fits_get_optional_key, fits_get_vector_col, fits_open, fits_open_hdu_num,
        fits_open_optional_hdu,
    },
};

/// The position of a single beam-commutation device.
#[derive(Debug, Display, EnumString, Clone, Copy, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum BcdPosition {
    #[strum(serialize = "in")]
    In,

    #[strum(serialize = "out")]
    Out,
}

/// One of the four beam-routing configurations of the two BCDs. The first
/// position is that of BCD1 (input beams), the second that of BCD2 (output
/// beams).
#[derive(
    Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum SwitchState {
    #[strum(serialize = "in-in")]
    InIn,

    #[strum(serialize = "in-out")]
    InOut,

    #[strum(serialize = "out-in")]
    OutIn,

    #[strum(serialize = "out-out")]
    OutOut,
}

impl SwitchState {
    pub fn from_positions(bcd1: BcdPosition, bcd2: BcdPosition) -> SwitchState {
        match (bcd1, bcd2) {
            (BcdPosition::In, BcdPosition::In) => SwitchState::InIn,
            (BcdPosition::In, BcdPosition::Out) => SwitchState::InOut,
            (BcdPosition::Out, BcdPosition::In) => SwitchState::OutIn,
            (BcdPosition::Out, BcdPosition::Out) => SwitchState::OutOut,
        }
    }

    /// In-In and Out-Out exposures must always be supplied; the others may be
    /// absent.
    pub fn is_required(self) -> bool {
        matches!(self, SwitchState::InIn | SwitchState::OutOut)
    }
}

/// What the primary header of an OIFITS file says about its BCD state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcdConfiguration {
    Switched(SwitchState),

    /// The BCD identifiers are present but blank. This is what the combined
    /// output looks like.
    Combined,

    /// The BCD identifiers are missing or not recognised.
    Unknown,
}

impl BcdConfiguration {
    pub(crate) fn from_header(bcd1_id: Option<&str>, bcd2_id: Option<&str>) -> BcdConfiguration {
        match (bcd1_id.map(str::trim), bcd2_id.map(str::trim)) {
            (Some(""), Some("")) => BcdConfiguration::Combined,
            (Some(bcd1), Some(bcd2)) => match (bcd1.parse(), bcd2.parse()) {
                (Ok(bcd1), Ok(bcd2)) => {
                    BcdConfiguration::Switched(SwitchState::from_positions(bcd1, bcd2))
                }
                _ => BcdConfiguration::Unknown,
            },
            _ => BcdConfiguration::Unknown,
        }
    }
}

impl std::fmt::Display for BcdConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BcdConfiguration::Switched(s) => write!(f, "{s}"),
            BcdConfiguration::Combined => write!(f, "combined"),
            BcdConfiguration::Unknown => write!(f, "unknown"),
        }
    }
}

/// The quantities combined across switch states.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq)]
pub enum OiQuantity {
    #[strum(serialize = "closure_phase")]
    ClosurePhase,

    #[strum(serialize = "differential_phase")]
    DifferentialPhase,

    #[strum(serialize = "correlated_amplitude")]
    CorrelatedAmplitude,

    #[strum(serialize = "squared_visibility")]
    SquaredVisibility,
}

impl OiQuantity {
    /// The name of the binary table holding this quantity.
    pub fn table(self) -> &'static str {
        match self {
            OiQuantity::ClosurePhase => OI_T3,
            OiQuantity::DifferentialPhase | OiQuantity::CorrelatedAmplitude => OI_VIS,
            OiQuantity::SquaredVisibility => OI_VIS2,
        }
    }

    /// The name of the column holding this quantity.
    pub fn column(self) -> &'static str {
        match self {
            OiQuantity::ClosurePhase => T3PHI,
            OiQuantity::DifferentialPhase => VISPHI,
            OiQuantity::CorrelatedAmplitude => VISAMP,
            OiQuantity::SquaredVisibility => VIS2DATA,
        }
    }

    /// The number of rows this quantity has in a single repeat (triangles or
    /// baselines).
    pub fn rows_per_repeat(self) -> usize {
        match self {
            OiQuantity::ClosurePhase => NUM_TRIANGLES,
            _ => NUM_BASELINES,
        }
    }

    /// Phases [degrees] must be averaged as unit phasors.
    pub fn is_phase(self) -> bool {
        matches!(
            self,
            OiQuantity::ClosurePhase | OiQuantity::DifferentialPhase
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            OiQuantity::ClosurePhase => "Closure phase [deg]",
            OiQuantity::DifferentialPhase => "Differential phase [deg]",
            OiQuantity::CorrelatedAmplitude => "Correlated amplitude",
            OiQuantity::SquaredVisibility => "Squared visibility",
        }
    }
}

/// A single exposure, as read from an OIFITS file. All data arrays have
/// dimensions (rows, spectral channels); the rows hold `num_repeats` blocks of
/// triangles or baselines.
#[derive(Debug, Clone)]
pub struct OiExposure {
    pub path: PathBuf,

    /// What the primary header says this exposure is.
    pub bcd: BcdConfiguration,

    /// The effective wavelength of each spectral channel [metres].
    pub eff_wave: Vec1<f64>,

    /// The value of `AMPTYP` in `OI_VIS`, if it exists.
    pub amp_type: Option<String>,

    /// `OI_T3` `T3PHI` [degrees].
    pub closure_phase: Array2<f64>,

    /// `OI_VIS` `VISPHI` [degrees].
    pub diff_phase: Array2<f64>,

    /// `OI_VIS` `VISAMP`.
    pub visamp: Array2<f64>,

    /// `OI_VIS2` `VIS2DATA`.
    pub vis2: Array2<f64>,
}

impl OiExposure {
    /// Read all of the tables needed for BCD combination from an OIFITS file.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<OiExposure, OiReadError> {
        let path = path.as_ref();
        debug!("Reading OIFITS exposure {}", path.display());
        let mut fptr = fits_open(path)?;

        let primary = fits_open_hdu_num(&mut fptr, 0)?;
        let bcd1_id: Option<String> = fits_get_optional_key(&mut fptr, &primary, BCD1_ID)?;
        let bcd2_id: Option<String> = fits_get_optional_key(&mut fptr, &primary, BCD2_ID)?;
        trace!("{BCD1_ID}: {bcd1_id:?}, {BCD2_ID}: {bcd2_id:?}");
        let bcd = BcdConfiguration::from_header(bcd1_id.as_deref(), bcd2_id.as_deref());

        let eff_wave = {
            let hdu = fits_open_optional_hdu(&mut fptr, OI_WAVELENGTH)?.ok_or_else(|| {
                OiReadError::MissingTable {
                    table: OI_WAVELENGTH,
                    file: path.to_path_buf(),
                }
            })?;
            let col = fits_find_col(&fptr, &hdu, EFF_WAVE)?.ok_or_else(|| {
                OiReadError::MissingColumn {
                    table: OI_WAVELENGTH,
                    column: EFF_WAVE,
                    file: path.to_path_buf(),
                }
            })?;
            let eff_wave = fits_get_vector_col(&mut fptr, &hdu, col)?;
            Vec1::try_from_vec(eff_wave.into_iter().collect()).map_err(|_| {
                OiReadError::NoChannels {
                    file: path.to_path_buf(),
                }
            })?
        };
        let num_chans = eff_wave.len();
        trace!("{num_chans} spectral channels");

        let closure_phase = read_quantity(&mut fptr, path, OiQuantity::ClosurePhase, num_chans)?;
        let diff_phase =
            read_quantity(&mut fptr, path, OiQuantity::DifferentialPhase, num_chans)?;
        let visamp = read_quantity(&mut fptr, path, OiQuantity::CorrelatedAmplitude, num_chans)?;
        let vis2 = read_quantity(&mut fptr, path, OiQuantity::SquaredVisibility, num_chans)?;

        let amp_type: Option<String> = {
            let hdu = fits_open_optional_hdu(&mut fptr, OI_VIS)?.ok_or_else(|| {
                OiReadError::MissingTable {
                    table: OI_VIS,
                    file: path.to_path_buf(),
                }
            })?;
            fits_get_optional_key(&mut fptr, &hdu, AMPTYP)?
        };

        Ok(OiExposure {
            path: path.to_path_buf(),
            bcd,
            eff_wave,
            amp_type,
            closure_phase,
            diff_phase,
            visamp,
            vis2,
        })
    }

    pub fn num_chans(&self) -> usize {
        self.eff_wave.len()
    }

    pub fn data(&self, quantity: OiQuantity) -> ArrayView2<'_, f64> {
        match quantity {
            OiQuantity::ClosurePhase => self.closure_phase.view(),
            OiQuantity::DifferentialPhase => self.diff_phase.view(),
            OiQuantity::CorrelatedAmplitude => self.visamp.view(),
            OiQuantity::SquaredVisibility => self.vis2.view(),
        }
    }

    /// Does `AMPTYP` say that the amplitudes are correlated fluxes?
    pub fn has_correlated_flux(&self) -> bool {
        self.amp_type
            .as_deref()
            .map(|a| a.to_lowercase().contains("correlated"))
            .unwrap_or(false)
    }
}

fn read_quantity(
    fptr: &mut fitsio::FitsFile,
    path: &Path,
    quantity: OiQuantity,
    num_chans: usize,
) -> Result<Array2<f64>, OiReadError> {
    let table = quantity.table();
    let column = quantity.column();
    let hdu = fits_open_optional_hdu(fptr, table)?.ok_or_else(|| OiReadError::MissingTable {
        table,
        file: path.to_path_buf(),
    })?;
    let col = fits_find_col(fptr, &hdu, column)?.ok_or_else(|| OiReadError::MissingColumn {
        table,
        column,
        file: path.to_path_buf(),
    })?;
    if col.repeat != num_chans {
        return Err(OiReadError::ChannelCount {
            table,
            column,
            file: path.to_path_buf(),
            got: col.repeat,
            expected: num_chans,
        });
    }

    let data = fits_get_vector_col(fptr, &hdu, col)?;
    trace!("{table} {column}: {} rows", data.len_of(Axis(0)));
    Ok(data)
}
