//! Output renderers for the repaired record set.
//!
//! - [`appendix`] — the consolidated appendix document, plain text or JSON.
//! - [`summary`] — the optional plain-text repair log with per-stage buckets.
//! - [`terminal`] — colored console summary; respects `--verbose` / `--quiet`.

pub mod appendix;
pub mod summary;
pub mod terminal;
