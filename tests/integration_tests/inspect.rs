// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{bcdcal, get_cmd_output, Exposure};

#[test]
fn test_inspect_exposures() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let out_in = tmp_dir.path().join("out_in.fits");
    let in_out = tmp_dir.path().join("in_out.fits");
    Exposure::new(("OUT", "IN"), 3).write(&out_in);
    Exposure::new(("IN", "OUT"), 0).write(&in_out);

    let cmd = bcdcal()
        .args([
            "inspect",
            &out_in.display().to_string(),
            &in_out.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "inspect failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");

    assert!(stdout.contains("BCD configuration: out-in"), "{stdout}");
    assert!(stdout.contains("BCD configuration: in-out"), "{stdout}");
    assert!(stdout.contains("3 spectral channels"), "{stdout}");
    assert!(stdout.contains("OI_T3 T3PHI: 12 (3 repeats)"), "{stdout}");
    assert!(stdout.contains("OI_VIS2 VIS2DATA: 18 (3 repeats)"), "{stdout}");
    assert!(stdout.contains("OI_T3 T3PHI: 0 (0 repeats)"), "{stdout}");
    assert!(stdout.contains("AMPTYP: absolute"), "{stdout}");
}

#[test]
fn test_inspect_requires_files() {
    let cmd = bcdcal().arg("inspect").ok();
    assert!(cmd.is_err());
}

#[test]
fn test_inspect_missing_table() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("empty.fits");
    fitsio::FitsFile::create(&file).open().unwrap();

    let cmd = bcdcal()
        .args(["inspect", &file.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("OI_WAVELENGTH"), "unexpected stderr: {stderr}");
}
