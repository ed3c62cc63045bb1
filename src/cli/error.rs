// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all bcdcal-related errors. This should be the *only* error
//! enum that is publicly visible.

use thiserror::Error;

use super::combine::CombineArgsError;
use crate::{
    bcd::BcdError,
    io::{FileWriteError, OiWriteError},
    oifits::OiReadError,
    params::BcdCombineError,
};

/// The *only* publicly visible error from bcdcal. Each category carries a hint
/// for the user, unless it's "generic".
#[derive(Error, Debug)]
pub enum BcdcalError {
    /// An error related to reading OIFITS exposures.
    #[error("{0}\n\nExposures must be OIFITS files with OI_WAVELENGTH, OI_T3, OI_VIS and OI_VIS2 tables.")]
    Read(String),

    /// An error related to combining switch states.
    #[error("{0}\n\nAll switch states must share the same spectral channels, and at least one repeat must be present over all of them.")]
    Combine(String),

    /// An error related to writing the combined exposure.
    #[error("{0}\n\nThe combined exposure is written into a copy of the in-in exposure.")]
    Write(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files hold the same arguments as the command line, e.g. in_in = \"in_in.fits\".")]
    ArgFile(String),

    /// An error related to the diagnostic plots.
    #[error("{0}\n\nDiagnostic plots don't affect the combination; try again without --plot.")]
    Plot(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv).")]
    Cfitsio(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<CombineArgsError> for BcdcalError {
    fn from(e: CombineArgsError) -> Self {
        let s = e.to_string();
        match e {
            CombineArgsError::MissingRequiredState(_)
            | CombineArgsError::FileDoesNotExist { .. } => Self::Read(s),
            CombineArgsError::OutputIsInput(_) => Self::Write(s),
            CombineArgsError::BadPhaseLimit(_) => Self::Plot(s),
        }
    }
}

impl From<BcdCombineError> for BcdcalError {
    fn from(e: BcdCombineError) -> Self {
        match e {
            BcdCombineError::ShapeMismatch { .. } => Self::Combine(e.to_string()),
            BcdCombineError::Read(e) => Self::from(e),
            BcdCombineError::Combine(e) => Self::from(e),
            BcdCombineError::Write(e) => Self::from(e),
            #[cfg(feature = "plotting")]
            BcdCombineError::Plot(e) => Self::Plot(e.to_string()),
        }
    }
}

impl From<OiReadError> for BcdcalError {
    fn from(e: OiReadError) -> Self {
        let s = e.to_string();
        match e {
            OiReadError::MissingTable { .. }
            | OiReadError::MissingColumn { .. }
            | OiReadError::NoChannels { .. }
            | OiReadError::ChannelCount { .. } => Self::Read(s),
            OiReadError::Fits(_) => Self::Cfitsio(s),
        }
    }
}

impl From<BcdError> for BcdcalError {
    fn from(e: BcdError) -> Self {
        Self::Combine(e.to_string())
    }
}

impl From<OiWriteError> for BcdcalError {
    fn from(e: OiWriteError) -> Self {
        let s = e.to_string();
        match e {
            OiWriteError::MissingTable { .. }
            | OiWriteError::MissingColumn { .. }
            | OiWriteError::TooFewRows { .. }
            | OiWriteError::ChannelCount { .. } => Self::Write(s),
            OiWriteError::Fits(_) => Self::Cfitsio(s),
            OiWriteError::IO(e) => Self::from(e),
        }
    }
}

impl From<FileWriteError> for BcdcalError {
    fn from(e: FileWriteError) -> Self {
        Self::Write(e.to_string())
    }
}

impl From<std::io::Error> for BcdcalError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
