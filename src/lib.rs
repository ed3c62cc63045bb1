// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Beam-commutation-device (BCD) combination of four-telescope optical
interferometry exposures.

An epoch is observed in up to four BCD switch states. Each state swaps the
input and/or output beams, which flips the sign and reorders the closure and
differential phases. Aligning and averaging the states cancels the
instrumental phase signature; the result is written as a single OIFITS
exposure.
 */

pub mod bcd;
mod cli;
pub mod constants;
pub(crate) mod io;
pub mod oifits;
pub(crate) mod params;
#[cfg(feature = "plotting")]
mod plotting;

#[cfg(test)]
mod tests;

// Re-exports.
pub use bcd::{combine, BcdError, CombinedObservation, StackedState, SwitchStates};
pub use cli::{Bcdcal, BcdcalError};
pub use io::{write_combined, FileWriteError, FitsError, OiWriteError};
pub use oifits::{OiExposure, OiQuantity, OiReadError, SwitchState};
