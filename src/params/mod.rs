// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters that have been parsed from user input and are ready to be used.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters have
//! been validated and carry everything a run needs explicitly.

mod bcd_combine;

pub(crate) use bcd_combine::{
    BcdCombineError, BcdCombineParams, BcdExposures, BcdInputFiles, DiagnosticsParams,
};
