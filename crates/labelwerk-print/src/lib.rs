// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelwerk-print — Printer-facing back end of the Labelwerk pipeline.
//
// Packs binarized bitmaps into ZPL command streams (`zpl`), delivers
// artifacts over raw TCP or LPR (`dispatch`), and toggles the printer's
// smart plug on a best-effort basis (`power`).

pub mod dispatch;
pub mod power;
pub mod zpl;

pub use dispatch::{DispatchOptions, NetworkDispatcher, PrintDispatcher};
pub use zpl::MonoBitmap;
