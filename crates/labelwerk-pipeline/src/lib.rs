// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelwerk-pipeline — The routing/staging core of Labelwerk.
//
// Matches an incoming filename to a label profile (`profiles`), tracks the
// file's lifecycle across the four staging directories (`staging`), and
// drives classify → transform → dispatch → stage for one file per
// invocation (`runner`).

pub mod profiles;
pub mod runner;
pub mod staging;

pub use profiles::{LabelProfile, OutputKind, classify};
pub use runner::{Outcome, Pipeline};
pub use staging::{Stage, StagedFile, StagingArea};
