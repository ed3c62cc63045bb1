// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Diagnostic plots of a BCD combination. For each combined quantity, every
//! canonical triangle or baseline gets a panel showing each switch state's own
//! mean (aligned onto the canonical rows) and the combined result, against
//! wavelength.


use std::path::{Path, PathBuf};

use log::debug;
use ndarray::prelude::*;
use plotters::prelude::*;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    bcd::{aligned_state_mean, CombinedObservation, StackedState, SwitchStates},
    oifits::{OiQuantity, SwitchState},
    params::DiagnosticsParams,
};

/// The number of X pixels on the plots.
const X_PIXELS: u32 = 1800;
/// The number of Y pixels on the plots.
const Y_PIXELS: u32 = 1200;

fn state_colour(state: SwitchState) -> RGBColor {
    match state {
        SwitchState::InIn => BLUE,
        SwitchState::InOut => GREEN,
        SwitchState::OutIn => MAGENTA,
        SwitchState::OutOut => RED,
    }
}

/// Write one PNG per combined quantity into the plot directory. The files are
/// named `<filename_base>_<quantity>.png`; their paths are returned.
pub(crate) fn plot_diagnostics(
    eff_wave: &[f64],
    states: &SwitchStates<StackedState>,
    combined: &CombinedObservation,
    params: &DiagnosticsParams,
    filename_base: &str,
) -> Result<Vec<PathBuf>, PlotError> {
    if !params.plot_dir.exists() {
        std::fs::create_dir_all(&params.plot_dir)?;
    }
    let wavelengths_um: Vec<f64> = eff_wave.iter().map(|w| w * 1e6).collect();

    let mut files = Vec::with_capacity(4);
    for quantity in OiQuantity::iter() {
        let file = params
            .plot_dir
            .join(format!("{filename_base}_{quantity}.png"));
        debug!("Plotting {quantity} to {}", file.display());

        let per_state: Vec<(SwitchState, Array2<f64>)> = states
            .iter()
            .filter_map(|(state, stacked)| {
                aligned_state_mean(state, stacked, quantity).map(|mean| (state, mean))
            })
            .collect();
        plot_quantity(
            &file,
            quantity,
            &wavelengths_um,
            &per_state,
            combined.data(quantity),
            params.phase_limit,
        )?;
        files.push(file);
    }

    Ok(files)
}

fn plot_quantity(
    file: &Path,
    quantity: OiQuantity,
    wavelengths_um: &[f64],
    per_state: &[(SwitchState, Array2<f64>)],
    combined: ArrayView2<f64>,
    phase_limit: f64,
) -> Result<(), PlotError> {
    let root = BitMapBackend::new(file, (X_PIXELS, Y_PIXELS)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::Plotters(Box::new(e)))?;
    let root = root
        .titled(quantity.description(), ("sans-serif", 40))
        .map_err(|e| PlotError::Plotters(Box::new(e)))?;

    let num_rows = combined.len_of(Axis(0));
    let panels = root.split_evenly((2, num_rows / 2));
    let (x_min, x_max) = x_range(wavelengths_um);
    let (y_min, y_max) = y_range(
        quantity,
        per_state
            .iter()
            .flat_map(|(_, mean)| mean.iter())
            .chain(combined.iter())
            .copied(),
        phase_limit,
    );
    let row_name = if quantity == OiQuantity::ClosurePhase {
        "Triangle"
    } else {
        "Baseline"
    };
    let draw_error = |e: &dyn std::fmt::Display| PlotError::Draw {
        quantity,
        message: e.to_string(),
    };

    for (i_row, panel) in panels.iter().enumerate() {
        let mut chart = ChartBuilder::on(panel)
            .caption(format!("{row_name} {i_row}"), ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| draw_error(&e))?;
        chart
            .configure_mesh()
            .x_desc("Wavelength [µm]")
            .light_line_style(WHITE)
            .draw()
            .map_err(|e| draw_error(&e))?;

        for (state, mean) in per_state {
            let colour = state_colour(*state);
            chart
                .draw_series(LineSeries::new(
                    points(wavelengths_um, mean.row(i_row), y_min, y_max),
                    colour.stroke_width(1),
                ))
                .map_err(|e| draw_error(&e))?
                .label(state.to_string())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour));
        }
        chart
            .draw_series(LineSeries::new(
                points(wavelengths_um, combined.row(i_row), y_min, y_max),
                BLACK.stroke_width(2),
            ))
            .map_err(|e| draw_error(&e))?
            .label("combined")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

        if i_row == 0 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(|e| draw_error(&e))?;
        }
    }

    root.present()
        .map_err(|e| PlotError::Plotters(Box::new(e)))?;
    Ok(())
}

/// The wavelength extent of the plots. A single channel still gets a
/// non-degenerate axis.
fn x_range(wavelengths: &[f64]) -> (f64, f64) {
    let (min, max) = wavelengths
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &w| {
            (min.min(w), max.max(w))
        });
    if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else if (max - min).abs() < f64::EPSILON {
        (min - 0.01, max + 0.01)
    } else {
        (min, max)
    }
}

/// Phases are shown within +/- the phase limit and squared visibilities within
/// [0, 1]. Amplitudes are scaled to the data.
fn y_range(
    quantity: OiQuantity,
    values: impl Iterator<Item = f64>,
    phase_limit: f64,
) -> (f64, f64) {
    match quantity {
        q if q.is_phase() => (-phase_limit, phase_limit),
        OiQuantity::SquaredVisibility => (0.0, 1.0),
        _ => {
            let (min, max) = values
                .filter(|v| v.is_finite())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
                    (min.min(v), max.max(v))
                });
            if !min.is_finite() {
                (0.0, 1.0)
            } else if (max - min).abs() < f64::EPSILON {
                (min - 1.0, max + 1.0)
            } else {
                let pad = 0.05 * (max - min);
                (min - pad, max + pad)
            }
        }
    }
}

/// Pair wavelengths with values, dropping non-finite values and clamping the
/// rest into the plotted range.
fn points<'a>(
    wavelengths: &'a [f64],
    values: ArrayView1<'a, f64>,
    y_min: f64,
    y_max: f64,
) -> impl Iterator<Item = (f64, f64)> + 'a {
    wavelengths
        .iter()
        .copied()
        .zip(values.into_iter().copied())
        .filter(|(_, y)| y.is_finite())
        .map(move |(x, y)| (x, y.clamp(y_min, y_max)))
}

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("While plotting {quantity}: {message}")]
    Draw {
        quantity: OiQuantity,
        message: String,
    },

    #[error("Error from the plotters library: {0}")]
    Plotters(Box<dyn std::error::Error>),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
