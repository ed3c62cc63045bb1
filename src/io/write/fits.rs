// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for editing FITS files in place.

use std::ffi::CString;

use fitsio::{hdu::FitsHdu, FitsFile};
use ndarray::prelude::*;

use crate::io::read::fits::{fits_check_status, fits_open_hdu_num, FitsError, TableColumn};

/// Open a fits file for reading and writing.
#[track_caller]
pub(crate) fn fits_edit<P: AsRef<std::path::Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::edit(file.as_ref()).map_err(|e| {
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

/// Set a string keyword on the HDU, replacing its value if it already exists
/// and appending it otherwise. The existing comment is kept.
#[track_caller]
pub(crate) fn fits_update_key_str(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
    value: &str,
) -> Result<(), FitsError> {
    // Make sure the right HDU is current before going through fitsio-sys.
    let hdu = fits_open_hdu_num(fits_fptr, hdu.number)?;

    let key_name = CString::new(keyword).expect("FITS keywords contain no NUL bytes");
    let value = CString::new(value).expect("FITS string values contain no NUL bytes");
    let mut status = 0;
    unsafe {
        // ffukys = fits_update_key_str
        fitsio_sys::ffukys(
            fits_fptr.as_raw(), /* I - FITS file pointer        */
            key_name.as_ptr(),  /* I - name of keyword to write */
            value.as_ptr(),     /* I - keyword value            */
            std::ptr::null(),   /* I - keyword comment          */
            &mut status,        /* IO - error status            */
        );
    }
    fits_check_status(fits_fptr, &hdu, status)
}

/// Delete every row of a binary table after the first `keep` rows.
#[track_caller]
pub(crate) fn fits_truncate_rows(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    num_rows: usize,
    keep: usize,
) -> Result<(), FitsError> {
    if num_rows <= keep {
        return Ok(());
    }

    let hdu = fits_open_hdu_num(fits_fptr, hdu.number)?;
    let mut status = 0;
    unsafe {
        // ffdrow = fits_delete_rows
        fitsio_sys::ffdrow(
            fits_fptr.as_raw(),       /* I - FITS file pointer               */
            keep as i64 + 1,          /* I - first row to delete (1 = 1st)   */
            (num_rows - keep) as i64, /* I - number of rows to delete        */
            &mut status,              /* IO - error status                   */
        );
    }
    fits_check_status(fits_fptr, &hdu, status)
}

/// Overwrite an array-in-a-column, starting at the first row. Each row of
/// `data` fills one cell.
#[track_caller]
pub(crate) fn fits_write_vector_col(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    column: TableColumn,
    data: ArrayView2<f64>,
) -> Result<(), FitsError> {
    let hdu = fits_open_hdu_num(fits_fptr, hdu.number)?;
    // Row-major order is the order of the cells in the table.
    let mut flat: Vec<f64> = data.iter().copied().collect();
    if flat.is_empty() {
        return Ok(());
    }

    let mut status = 0;
    unsafe {
        // ffpcld = fits_write_col_dbl
        fitsio_sys::ffpcld(
            fits_fptr.as_raw(), /* I - FITS file pointer                       */
            column.col_num,     /* I - number of column to write (1 = 1st col) */
            1,                  /* I - first row to write (1 = 1st row)        */
            1,                  /* I - first vector element to write (1 = 1st) */
            flat.len() as i64,  /* I - number of values to write               */
            flat.as_mut_ptr(),  /* I - array of values to write                */
            &mut status,        /* IO - error status                           */
        );
    }
    fits_check_status(fits_fptr, &hdu, status)
}
