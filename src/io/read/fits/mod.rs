// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading FITS files.

mod error;

pub use error::FitsError;

use fitsio::{hdu::*, FitsFile};
use ndarray::prelude::*;

/// Open a fits file.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<std::path::Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::open(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Open a fits file's HDU by its name (EXTNAME). If the HDU doesn't exist,
/// `None` is returned.
#[track_caller]
pub(crate) fn fits_open_optional_hdu(
    fits_fptr: &mut FitsFile,
    hdu_name: &str,
) -> Result<Option<FitsHdu>, FitsError> {
    match fits_fptr.hdu(hdu_name) {
        Ok(hdu) => Ok(Some(hdu)),
        // Status code 301 means "unavailable".
        Err(fitsio::errors::Error::Fits(fitsio::errors::FitsError { status: 301, .. })) => {
            Ok(None)
        }
        Err(e) => {
            let caller = std::panic::Location::caller();
            Err(FitsError::Fitsio {
                fits_error: Box::new(e),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_description: hdu_name.to_string().into_boxed_str(),
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Open a fits file's HDU by its number (0 is the primary HDU).
#[track_caller]
pub(crate) fn fits_open_hdu_num(
    fits_fptr: &mut FitsFile,
    hdu_num: usize,
) -> Result<FitsHdu, FitsError> {
    fits_fptr.hdu(hdu_num).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{}", hdu_num + 1).into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword that may
/// or may not exist, pull out the value of the keyword, parsing it into the
/// desired type.
#[track_caller]
pub(crate) fn fits_get_optional_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<Option<T>, FitsError> {
    let unparsed_value: String = match hdu.read_key(fits_fptr, keyword) {
        Ok(key_value) => key_value,
        Err(e) => match &e {
            fitsio::errors::Error::Fits(fe) if matches!(fe.status, 202 | 204) => return Ok(None),
            _ => {
                let caller = std::panic::Location::caller();
                return Err(FitsError::Fitsio {
                    fits_error: Box::new(e),
                    fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                    hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
                    source_file: caller.file(),
                    source_line: caller.line(),
                    source_column: caller.column(),
                });
            }
        },
    };

    match unparsed_value.parse() {
        Ok(parsed_value) => Ok(Some(parsed_value)),
        Err(_) => {
            let caller = std::panic::Location::caller();
            Err(FitsError::Parse {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Where a column lives in a binary table, and how big it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TableColumn {
    /// The cfitsio column number (1 = first column).
    pub(crate) col_num: i32,
    pub(crate) num_rows: usize,
    /// The number of elements in each cell of the column.
    pub(crate) repeat: usize,
}

/// Find a column in a binary-table HDU. If the column doesn't exist, `None` is
/// returned.
#[track_caller]
pub(crate) fn fits_find_col(
    fits_fptr: &FitsFile,
    hdu: &FitsHdu,
    col_name: &str,
) -> Result<Option<TableColumn>, FitsError> {
    match &hdu.info {
        HduInfo::TableInfo {
            column_descriptions,
            num_rows,
        } => Ok(column_descriptions
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(col_name))
            .map(|i| TableColumn {
                col_num: i as i32 + 1,
                num_rows: *num_rows,
                repeat: column_descriptions[i].data_type.repeat,
            })),
        _ => {
            let caller = std::panic::Location::caller();
            Err(FitsError::NotTable {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Read an array-in-a-column (e.g. one value per spectral channel per row) as
/// a 2D array with dimensions (rows, elements per row).
#[track_caller]
pub(crate) fn fits_get_vector_col(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    column: TableColumn,
) -> Result<Array2<f64>, FitsError> {
    let mut array = Array2::zeros((column.num_rows, column.repeat));
    if array.is_empty() {
        return Ok(array);
    }

    // It's more effort than it's worth to read the array-in-a-column values
    // via fitsio, so use fitsio-sys. cfitsio continues reading into the next
    // rows when more elements are requested than a single cell holds, so the
    // whole column is read in one call.
    fits_open_hdu_num(fits_fptr, hdu.number)?;
    let mut status = 0;
    unsafe {
        // ffgcv = fits_read_col
        fitsio_sys::ffgcv(
            fits_fptr.as_raw(),
            82, // TDOUBLE (fitsio.h)
            column.col_num,
            1,
            1,
            array.len() as i64,
            std::ptr::null_mut(),
            array.as_mut_ptr().cast(),
            &mut 0,
            &mut status,
        );
    }
    fits_check_status(fits_fptr, hdu, status)?;

    Ok(array)
}

/// Convert a cfitsio status code from a low-level call into a [`FitsError`].
#[track_caller]
pub(crate) fn fits_check_status(
    fits_fptr: &FitsFile,
    hdu: &FitsHdu,
    status: i32,
) -> Result<(), FitsError> {
    fitsio::errors::check_status(status).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}
