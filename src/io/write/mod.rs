// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to write out combined OIFITS files.
//!
//! The combined file is a copy of the In-In exposure with the stacked rows of
//! `OI_T3`, `OI_VIS` and `OI_VIS2` truncated to a single repeat and the
//! combined values written over them. Everything else in the file is left
//! untouched.

mod error;
pub(crate) mod fits;

pub use error::{FileWriteError, OiWriteError};

use std::{
    ffi::OsString,
    fs::File,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use ndarray::prelude::*;
use strum::IntoEnumIterator;

use crate::{
    bcd::CombinedObservation,
    cli::Warn,
    constants::*,
    io::read::fits::{fits_find_col, fits_open_hdu_num, fits_open_optional_hdu},
    oifits::OiQuantity,
};
use fits::{fits_edit, fits_truncate_rows, fits_update_key_str, fits_write_vector_col};

/// Write `combined` into a copy of the `template` OIFITS file (the In-In
/// exposure), saving it at `output`. If `correlated_flux` is true, `AMPTYP` in
/// `OI_VIS` is set to "correlated flux".
///
/// All edits happen on a scratch file next to `output`, which is renamed over
/// `output` once it is complete. If anything goes wrong, the scratch file is
/// removed and `output` is not touched.
pub fn write_combined(
    template: &Path,
    output: &Path,
    combined: &CombinedObservation,
    correlated_flux: bool,
) -> Result<(), OiWriteError> {
    let scratch = scratch_path(output);
    debug!(
        "Copying {} to scratch file {}",
        template.display(),
        scratch.display()
    );
    let mut template_fh = File::open(template)?;
    // Copying the contents, rather than the file itself, means the scratch
    // file is writable even when the template isn't.
    let mut scratch_fh = File::create(&scratch)?;
    let scratch = scopeguard::guard(scratch, |scratch| {
        debug!("Removing scratch file {}", scratch.display());
        if let Err(e) = std::fs::remove_file(&scratch) {
            trace!("Couldn't remove {}: {e}", scratch.display());
        }
    });
    std::io::copy(&mut template_fh, &mut scratch_fh)?;
    drop(scratch_fh);

    edit_scratch(&scratch, template, combined, correlated_flux)?;

    trace!("Renaming {} to {}", scratch.display(), output.display());
    std::fs::rename(&*scratch, output)?;
    // The rename consumed the scratch file; don't try to remove it.
    let _ = scopeguard::ScopeGuard::into_inner(scratch);

    Ok(())
}

/// The path of the scratch file used while writing `output`.
pub(crate) fn scratch_path(output: &Path) -> PathBuf {
    let mut s: OsString = output.as_os_str().to_owned();
    s.push(".partial");
    PathBuf::from(s)
}

fn edit_scratch(
    scratch: &Path,
    template: &Path,
    combined: &CombinedObservation,
    correlated_flux: bool,
) -> Result<(), OiWriteError> {
    // The file is closed when `fptr` is dropped at the end of this function.
    let mut fptr = fits_edit(scratch)?;

    for quantity in OiQuantity::iter() {
        let table = quantity.table();
        let column = quantity.column();
        let data = combined.data(quantity);

        let hdu = fits_open_optional_hdu(&mut fptr, table)?.ok_or_else(|| {
            OiWriteError::MissingTable {
                table,
                file: template.to_path_buf(),
            }
        })?;
        let col = fits_find_col(&fptr, &hdu, column)?.ok_or_else(|| {
            OiWriteError::MissingColumn {
                table,
                column,
                file: template.to_path_buf(),
            }
        })?;

        let num_rows = data.len_of(Axis(0));
        if col.num_rows < num_rows {
            return Err(OiWriteError::TooFewRows {
                table,
                file: template.to_path_buf(),
                rows: col.num_rows,
                expected: num_rows,
            });
        }
        if col.repeat != data.len_of(Axis(1)) {
            return Err(OiWriteError::ChannelCount {
                table,
                column,
                file: template.to_path_buf(),
                got: col.repeat,
                expected: data.len_of(Axis(1)),
            });
        }

        // OI_VIS holds two quantities; the second time around, the table has
        // already been truncated.
        trace!("Truncating {table} from {} to {num_rows} rows", col.num_rows);
        fits_truncate_rows(&mut fptr, &hdu, col.num_rows, num_rows)?;
        trace!("Writing {table} {column}");
        fits_write_vector_col(&mut fptr, &hdu, col, data)?;
    }

    // The combined file no longer corresponds to a single BCD state.
    let primary = fits_open_hdu_num(&mut fptr, 0)?;
    for key in BCD_HEADER_KEYS {
        fits_update_key_str(&mut fptr, &primary, key, BCD_BLANK)?;
    }

    if correlated_flux {
        let hdu = fits_open_optional_hdu(&mut fptr, OI_VIS)?.ok_or_else(|| {
            OiWriteError::MissingTable {
                table: OI_VIS,
                file: template.to_path_buf(),
            }
        })?;
        fits_update_key_str(&mut fptr, &hdu, AMPTYP, AMPTYP_CORRELATED_FLUX)?;
    }

    Ok(())
}

/// Check if we are able to write to a file path. If we aren't able to write to
/// the file, it's either because the directory containing the file doesn't
/// exist, or there's another issue (probably bad permissions). In the former
/// case, create the parent directories, otherwise return an error.
/// Additionally, if the file exists, emit a warning that it will be
/// overwritten.
///
/// With this approach, we avoid reading and combining all of the exposures
/// only to be unable to write at the end. This code _doesn't_ alter the file
/// if it exists.
pub(crate) fn can_write_to_file(file: &Path) -> Result<(), FileWriteError> {
    trace!("Testing whether we can write to {}", file.display());

    let file_exists = file.exists();

    match std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(file)
        .map_err(|e| e.kind())
    {
        // File is writable.
        Ok(_) => {
            // If the file in question didn't already exist, `OpenOptions::new`
            // creates it as part of its work. We don't want to keep the 0-sized
            // file; remove it if it didn't exist before.
            if !file_exists {
                std::fs::remove_file(file)?;
            }
        }

        // File doesn't exist. Attempt to make the directories leading up to the
        // file; if this fails, then we can't write the file anyway.
        Err(std::io::ErrorKind::NotFound) => {
            if let Some(p) = file.parent() {
                match std::fs::DirBuilder::new()
                    .recursive(true)
                    .create(p)
                    .map_err(|e| e.kind())
                {
                    Ok(()) => (),
                    Err(std::io::ErrorKind::PermissionDenied) => {
                        return Err(FileWriteError::NewDirectory(p.to_path_buf()))
                    }
                    Err(e) => return Err(FileWriteError::IO(e.into())),
                }
            }
        }

        Err(std::io::ErrorKind::PermissionDenied) => {
            return Err(FileWriteError::FileNotWritable {
                file: file.display().to_string(),
            })
        }

        Err(e) => {
            return Err(FileWriteError::IO(e.into()));
        }
    }

    if file_exists {
        format!("Will overwrite the existing file '{}'", file.display()).warn();
    }

    Ok(())
}
