// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::io::read::fits::FitsError;

#[derive(Error, Debug)]
pub enum OiReadError {
    #[error("{file}: the required table {table} is missing", file = file.display())]
    MissingTable { table: &'static str, file: PathBuf },

    #[error("{file}: table {table} has no {column} column", file = file.display())]
    MissingColumn {
        table: &'static str,
        column: &'static str,
        file: PathBuf,
    },

    #[error("{file}: OI_WAVELENGTH has no spectral channels", file = file.display())]
    NoChannels { file: PathBuf },

    #[error("{file}: {table} {column} has {got} values per row, but there are {expected} spectral channels", file = file.display())]
    ChannelCount {
        table: &'static str,
        column: &'static str,
        file: PathBuf,
        got: usize,
        expected: usize,
    },

    #[error(transparent)]
    Fits(#[from] FitsError),
}
