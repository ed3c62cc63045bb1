// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use fitsio::{
    tables::{ColumnDataType, ColumnDescription},
    FitsFile,
};
use indoc::formatdoc;
use tempfile::TempDir;

use bcdcal::{oifits::BcdConfiguration, OiExposure};

use crate::{bcdcal, get_cmd_output, Exposure};

/// In-In and Out-Out exposures whose closure phases agree once aligned.
fn write_epoch(dir: &TempDir) -> (PathBuf, PathBuf) {
    let in_in = dir.path().join("in_in.fits");
    let out_out = dir.path().join("out_out.fits");

    let mut e = Exposure::new(("IN", "IN"), 1);
    e.closure_phase = [10.0, 20.0, 30.0, 40.0];
    e.visamp = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    e.write(&in_in);

    let mut e = Exposure::new(("OUT", "OUT"), 1);
    e.closure_phase = [-40.0, -30.0, -20.0, -10.0];
    e.visamp = [11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
    e.write(&out_out);

    (in_in, out_out)
}

#[test]
fn test_combine_in_in_and_out_out() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let (in_in, out_out) = write_epoch(&tmp_dir);
    let output = tmp_dir.path().join("combined.fits");

    #[rustfmt::skip]
    let cmd = bcdcal()
        .args([
            "combine",
            "--in-in", &in_in.display().to_string(),
            "--out-out", &out_out.display().to_string(),
            "--output", &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "combine failed: {}", cmd.err().unwrap());

    let combined = OiExposure::read(&output).unwrap();
    assert_eq!(combined.bcd, BcdConfiguration::Combined);
    assert_eq!(combined.num_chans(), 3);
    assert_eq!(combined.closure_phase.dim(), (4, 3));
    for (row, expected) in combined
        .closure_phase
        .outer_iter()
        .zip([10.0, 20.0, 30.0, 40.0])
    {
        for &v in row {
            assert_abs_diff_eq!(v, expected, epsilon = 1e-9);
        }
    }
    // Baselines 2 to 5 are swapped pairwise when both BCDs are out.
    for (row, expected) in combined
        .visamp
        .outer_iter()
        .zip([6.0, 7.0, 9.5, 9.5, 9.5, 9.5])
    {
        for &v in row {
            assert_abs_diff_eq!(v, expected, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_combine_default_output() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let (in_in, out_out) = write_epoch(&tmp_dir);

    #[rustfmt::skip]
    let cmd = bcdcal()
        .args([
            "combine",
            "--in-in", &in_in.display().to_string(),
            "--out-out", &out_out.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "combine failed: {}", cmd.err().unwrap());
    assert!(tmp_dir.path().join("in_in_BCD_CAL.fits").exists());
}

#[test]
fn test_combine_missing_in_in() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let (_, out_out) = write_epoch(&tmp_dir);

    let cmd = bcdcal()
        .args(["combine", "--out-out", &out_out.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(
        stderr.contains("No in-in exposure was specified"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn test_combine_rejects_channel_mismatch() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let (in_in, _) = write_epoch(&tmp_dir);
    let out_out = tmp_dir.path().join("short.fits");
    {
        // A valid exposure, but with only one wavelength.
        let mut fptr = FitsFile::create(&out_out).open().unwrap();
        let col = ColumnDescription::new("EFF_WAVE")
            .with_type(ColumnDataType::Double)
            .create()
            .unwrap();
        let hdu = fptr.create_table("OI_WAVELENGTH", &[col]).unwrap();
        hdu.write_col(&mut fptr, "EFF_WAVE", &[8.0e-6]).unwrap();
        for (table, columns) in [
            ("OI_VIS", vec!["VISAMP", "VISPHI"]),
            ("OI_VIS2", vec!["VIS2DATA"]),
            ("OI_T3", vec!["T3PHI"]),
        ] {
            let descriptions: Vec<_> = columns
                .into_iter()
                .map(|name| {
                    ColumnDescription::new(name)
                        .with_type(ColumnDataType::Double)
                        .create()
                        .unwrap()
                })
                .collect();
            fptr.create_table(table, &descriptions).unwrap();
        }
    }
    let output = tmp_dir.path().join("combined.fits");

    #[rustfmt::skip]
    let cmd = bcdcal()
        .args([
            "combine",
            "--in-in", &in_in.display().to_string(),
            "--out-out", &out_out.display().to_string(),
            "--output", &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("spectral channels"), "unexpected stderr: {stderr}");
    assert!(!output.exists());
}

#[test]
fn test_combine_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let (in_in, out_out) = write_epoch(&tmp_dir);
    let output = tmp_dir.path().join("combined.fits");

    #[rustfmt::skip]
    let cmd = bcdcal()
        .args([
            "combine",
            "--in-in", &in_in.display().to_string(),
            "--out-out", &out_out.display().to_string(),
            "--output", &output.display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "combine failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "unexpected stdout: {stdout}");
    assert!(!output.exists());
}

#[test]
fn test_combine_from_arg_file_and_save_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let (in_in, out_out) = write_epoch(&tmp_dir);
    let output = tmp_dir.path().join("combined.fits");
    let arg_file = tmp_dir.path().join("args.toml");
    std::fs::write(
        &arg_file,
        formatdoc! {r#"
            in_in = "{}"
            out_out = "{}"
            output = "{}"
        "#, in_in.display(), out_out.display(), output.display()},
    )
    .unwrap();
    let saved = tmp_dir.path().join("saved.toml");

    #[rustfmt::skip]
    let cmd = bcdcal()
        .args([
            "combine",
            &arg_file.display().to_string(),
            "--save-toml", &saved.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "combine failed: {}", cmd.err().unwrap());
    assert!(output.exists());

    let saved = std::fs::read_to_string(saved).unwrap();
    assert!(saved.contains("in_in = "), "{saved}");
    assert!(saved.contains("plot = false"), "{saved}");
}
