// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{bcdcal, get_cmd_output, Exposure};

#[test]
fn test_combine_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let path = |name: &str| tmp_dir.path().join(name).display().to_string();
    Exposure::new(("IN", "IN"), 2).write(tmp_dir.path().join("ii.fits").as_path());
    Exposure::new(("IN", "OUT"), 1).write(tmp_dir.path().join("io.fits").as_path());
    Exposure::new(("OUT", "IN"), 1).write(tmp_dir.path().join("oi.fits").as_path());
    Exposure::new(("OUT", "OUT"), 2).write(tmp_dir.path().join("oo.fits").as_path());

    #[rustfmt::skip]
    let cmd = bcdcal()
        .args([
            "combine",
            "--in-in", &path("ii.fits"),
            "--in-out", &path("io.fits"),
            "--out-in", &path("oi.fits"),
            "--out-out", &path("oo.fits"),
            "--output", &path("combined.fits"),
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "combine failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[cfg(feature = "plotting")]
#[test]
fn test_combine_with_plots_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let path = |name: &str| tmp_dir.path().join(name).display().to_string();
    Exposure::new(("IN", "IN"), 1).write(tmp_dir.path().join("ii.fits").as_path());
    Exposure::new(("OUT", "OUT"), 1).write(tmp_dir.path().join("oo.fits").as_path());

    #[rustfmt::skip]
    let cmd = bcdcal()
        .args([
            "combine",
            "--in-in", &path("ii.fits"),
            "--out-out", &path("oo.fits"),
            "--output", &path("combined.fits"),
            "--plot",
            "--plot-dir", &path("plots"),
        ])
        .ok();
    assert!(cmd.is_ok(), "combine failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(tmp_dir.path().join("plots/combined_closure_phase.png").exists());
}
