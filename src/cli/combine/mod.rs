// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use clap::Parser;
use log::{debug, info, trace};
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::common::{display_warnings, InfoPrinter, Warn, ARG_FILE_HELP, PHASE_LIMIT_HELP};
use crate::{
    constants::DEFAULT_PHASE_LIMIT,
    io::write::can_write_to_file,
    oifits::{OiExposure, OiQuantity, SwitchState},
    params::{BcdCombineParams, BcdExposures, BcdInputFiles, DiagnosticsParams},
    BcdcalError,
};

/// The suffix appended to the in-in file stem when no output is given.
const DEFAULT_OUTPUT_SUFFIX: &str = "_BCD_CAL.fits";

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct CombineArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    #[serde(skip)]
    pub(super) args_file: Option<PathBuf>,

    /// The exposure taken with both BCDs in. Required.
    #[clap(long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub(super) in_in: Option<PathBuf>,

    /// The exposure taken with BCD1 in and BCD2 out. If it isn't given, it
    /// contributes nothing to the combination.
    #[clap(long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub(super) in_out: Option<PathBuf>,

    /// The exposure taken with BCD1 out and BCD2 in. If it isn't given, it
    /// contributes nothing to the combination.
    #[clap(long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub(super) out_in: Option<PathBuf>,

    /// The exposure taken with both BCDs out. Required.
    #[clap(long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub(super) out_out: Option<PathBuf>,

    /// Path to the combined OIFITS file. The default is the in-in file name
    /// with "_BCD_CAL" appended, next to the in-in file.
    #[clap(short, long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,

    /// Draw diagnostic plots of each switch state and the combination.
    #[clap(long, help_heading = "DIAGNOSTICS")]
    #[serde(default)]
    pub(super) plot: bool,

    /// The directory to write diagnostic plots into. The default is the
    /// directory of the output file.
    #[clap(long, parse(from_os_str), help_heading = "DIAGNOSTICS")]
    pub(super) plot_dir: Option<PathBuf>,

    #[clap(long, help = PHASE_LIMIT_HELP.as_str(), help_heading = "DIAGNOSTICS")]
    pub(super) phase_limit: Option<f64>,
}

impl CombineArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<CombineArgs, BcdcalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Ensure all of the file args are accounted for by pattern
            // matching.
            let CombineArgs {
                args_file: _,
                in_in,
                in_out,
                out_in,
                out_out,
                output,
                plot,
                plot_dir,
                phase_limit,
            } = unpack_arg_file!(arg_file);

            Ok(CombineArgs {
                args_file: None,
                in_in: cli_args.in_in.or(in_in),
                in_out: cli_args.in_out.or(in_out),
                out_in: cli_args.out_in.or(out_in),
                out_out: cli_args.out_out.or(out_out),
                output: cli_args.output.or(output),
                plot: cli_args.plot || plot,
                plot_dir: cli_args.plot_dir.or(plot_dir),
                phase_limit: cli_args.phase_limit.or(phase_limit),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<BcdCombineParams, BcdcalError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            in_in,
            in_out,
            out_in,
            out_out,
            output,
            plot,
            plot_dir,
            phase_limit,
        } = self;

        let files = BcdInputFiles {
            in_in: required_file(SwitchState::InIn, in_in)?,
            in_out: input_file(SwitchState::InOut, in_out)?,
            out_in: input_file(SwitchState::OutIn, out_in)?,
            out_out: required_file(SwitchState::OutOut, out_out)?,
        };

        let output = output.unwrap_or_else(|| default_output(&files.in_in));
        for state in SwitchState::iter() {
            if let Some(input) = files.get(state) {
                if same_file(input, &output) {
                    return Err(CombineArgsError::OutputIsInput(output).into());
                }
            }
        }
        can_write_to_file(&output)?;

        let phase_limit = match phase_limit {
            Some(l) if !l.is_finite() || l <= 0.0 => {
                return Err(CombineArgsError::BadPhaseLimit(l).into())
            }
            Some(l) => l,
            None => DEFAULT_PHASE_LIMIT,
        };
        let diagnostics = if plot {
            if cfg!(feature = "plotting") {
                let plot_dir = plot_dir.unwrap_or_else(|| match output.parent() {
                    Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                    _ => PathBuf::from("."),
                });
                Some(DiagnosticsParams {
                    plot_dir,
                    phase_limit,
                })
            } else {
                "bcdcal was compiled without the \"plotting\" feature; --plot is ignored".warn();
                None
            }
        } else {
            if plot_dir.is_some() {
                "--plot-dir has no effect without --plot".warn();
            }
            None
        };

        let exposures = BcdExposures::read(&files)?;

        let mut printer = InfoPrinter::new("BCD combination".into());
        for state in SwitchState::iter() {
            match exposures.get(state) {
                Some(exposure) => printer.push_block(describe_exposure(state, exposure)),
                None => printer.push_line(format!("{state}: absent").into()),
            }
        }
        printer.push_line(format!("Output: {}", output.display()).into());
        if let Some(d) = &diagnostics {
            printer.push_line(format!("Diagnostic plots: {}", d.plot_dir.display()).into());
        }
        printer.display();
        display_warnings();

        Ok(BcdCombineParams {
            exposures,
            output,
            diagnostics,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), BcdcalError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

/// Check the exposure given for a switch state. Required states must be given
/// and exist; an optional exposure that was given but doesn't exist is treated
/// as absent.
fn input_file(
    state: SwitchState,
    file: Option<PathBuf>,
) -> Result<Option<PathBuf>, CombineArgsError> {
    match file {
        None if state.is_required() => Err(CombineArgsError::MissingRequiredState(state)),
        Some(file) if !file.exists() => {
            if state.is_required() {
                return Err(CombineArgsError::FileDoesNotExist { state, file });
            }
            format!(
                "The {state} exposure {} doesn't exist; combining without it",
                file.display()
            )
            .warn();
            Ok(None)
        }
        file => Ok(file),
    }
}

fn required_file(state: SwitchState, file: Option<PathBuf>) -> Result<PathBuf, CombineArgsError> {
    input_file(state, file)?.ok_or(CombineArgsError::MissingRequiredState(state))
}

fn default_output(in_in: &Path) -> PathBuf {
    let stem = in_in
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| "bcd".into());
    in_in.with_file_name(format!("{stem}{DEFAULT_OUTPUT_SUFFIX}"))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn describe_exposure(state: SwitchState, exposure: &OiExposure) -> Vec<Cow<'static, str>> {
    let rows = exposure.data(OiQuantity::ClosurePhase).len_of(Axis(0));
    vec![
        format!("{state}: {}", exposure.path.display()).into(),
        format!(
            "header BCD state: {}, {} channels, {} repeats",
            exposure.bcd,
            exposure.num_chans(),
            rows / OiQuantity::ClosurePhase.rows_per_repeat()
        )
        .into(),
    ]
}

#[derive(thiserror::Error, Debug)]
pub(super) enum CombineArgsError {
    #[error("No {0} exposure was specified; it is always required")]
    MissingRequiredState(SwitchState),

    #[error("The {state} exposure {file} doesn't exist", file = file.display())]
    FileDoesNotExist { state: SwitchState, file: PathBuf },

    #[error("The output {} is also one of the input exposures", .0.display())]
    OutputIsInput(PathBuf),

    #[error("The phase limit must be a positive number of degrees, but got {0}")]
    BadPhaseLimit(f64),
}
