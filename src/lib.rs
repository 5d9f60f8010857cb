//! The library code for the `squish` template minifier. The tool works on
//! "target directories", typically a static site's `_layouts` and `_includes`
//! folders, and has two halves:
//!
//! 1. Minifying a directory ([`crate::minify`]): every regular file is backed
//!    up into a hidden cache folder ([`crate::cache`]) and then rewritten in
//!    place without newline or tab characters ([`crate::strip`]).
//! 2. Restoring a directory ([`crate::restore`]): every cached original is
//!    copied back over its live file and the cache folder is removed.
//!
//! Both halves process a directory as a batch. A failure on one file doesn't
//! stop the others; instead every file's outcome is collected into a
//! [`crate::report::Report`] so the caller can decide how to surface it.
//!
//! Invocations on the same directory must be serialized by the caller. Nothing
//! here locks the directory or its cache folder.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod cache;
pub mod config;
pub mod minify;
pub mod report;
pub mod restore;
pub mod status;
pub mod strip;
pub mod util;
