// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from writing combined OIFITS files.

use std::path::PathBuf;

use thiserror::Error;

use crate::io::read::fits::FitsError;

#[derive(Error, Debug)]
pub enum OiWriteError {
    #[error("The template {file} has no {table} table", file = file.display())]
    MissingTable { table: &'static str, file: PathBuf },

    #[error("The template {file} has no {column} column in {table}", file = file.display())]
    MissingColumn {
        table: &'static str,
        column: &'static str,
        file: PathBuf,
    },

    #[error("The template {file} has only {rows} rows in {table}, but at least {expected} are needed", file = file.display())]
    TooFewRows {
        table: &'static str,
        file: PathBuf,
        rows: usize,
        expected: usize,
    },

    #[error("The template {file} has {got} spectral channels in {table} {column}, but the combined data has {expected}", file = file.display())]
    ChannelCount {
        table: &'static str,
        column: &'static str,
        file: PathBuf,
        got: usize,
        expected: usize,
    },

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum FileWriteError {
    #[error("Couldn't create directory '{0}'; is there a permissions issue?")]
    NewDirectory(PathBuf),

    #[error("Cannot write to '{file}'; is there a permissions issue?")]
    FileNotWritable { file: String },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
