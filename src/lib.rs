//! Layered INI configuration: command-line, environment, and config-file
//! values resolved through one lookup, with typed conversion declared inline
//! in the config text.
//!
//! ```no_run
//! use confetch::ConfigFetch;
//!
//! let conf = ConfigFetch::builder().load_path("app.ini")?;
//! let targets = conf.section("build")?.get("targets")?;
//! # Ok::<(), confetch::FetchError>(())
//! ```
//!
//! # Why confetch
//!
//! Most tools end up consulting three places for every setting: a flag on
//! the command line, an environment variable, and a config file — and the
//! plumbing to merge them grows with every option. Confetch keeps the
//! plumbing in one place. An option is looked up once; the three sources are
//! merged under a fixed precedence; the value comes back already converted
//! to the type the config text declared for it.
//!
//! # Layer precedence
//!
//! ```text
//! Config file value     [section] option = value, default-section fallback
//!        ↑ overridden by
//! Environment variable  when mapped for the option, set, and non-empty
//!        ↑ overridden by
//! Command-line value    when actually supplied — even an empty string wins
//! ```
//!
//! Every layer is sparse: an option missing from one source falls through to
//! the layer below, and only an option missing from all three is an error
//! ([`FetchError::NoOption`]). A present-but-empty environment variable does
//! not win; a present-but-empty argument or config value does.
//!
//! # The extended syntax
//!
//! Plain INI remains plain. A directive block at the start of a value
//! declares how the value converts and how it maps to a CLI argument:
//!
//! ```ini
//! [build]
//! # bracket form: conversion functions only
//! targets = [=COMMA] linux, macos, windows
//!
//! # line form: functions, argparse metadata, and help text
//! exclude = :: f: plus
//!           :: names: x, exclude
//!           : names to drop from the target list
//!           tests, docs
//! ```
//!
//! Functions chain left to right: `[=COMMA][=BAR]` splits on commas, then
//! joins with `|`. The built-in catalog (`BOOL`, `COMMA`, `LINE`, `BAR`,
//! `CMD`, `CMDS`, `FMT`, `PLUS`) lives in [`FuncRegistry`], and
//! [`FetchBuilder::register`] adds your own without touching it.
//!
//! # Incremental lists
//!
//! The `PLUS` function merges a list across all layers instead of letting
//! one layer shadow the rest. A layer of bare names replaces the list; a
//! layer of `+name` / `-name` adjustments edits it:
//!
//! ```text
//! config   : aaa, bbb
//! env      : +ccc
//! argument : -aaa
//! result   : ["bbb", "ccc"]
//! ```
//!
//! # Two-level fallback
//!
//! The INI default section is a global, unconditional fallback. [`Double`]
//! adds a scoped one: pair a section with a parent section, and options
//! missing or blank in the child resolve against the parent before the
//! default section applies. Blank means an empty string or list — `false`
//! is a real value and is kept.
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) synthesizes
//! a clap `Command` from the declared metadata — [`build_command`] — and
//! converts parsed matches back into the [`ArgValues`] the builder consumes
//! — [`matches_to_args`]. A `BOOL` option becomes a `--name` / `--no-name`
//! flag pair storing `"yes"` / `"no"`, so the same conversion chain handles
//! flags and config text alike. To use confetch without clap:
//!
//! ```toml
//! confetch = { version = "...", default-features = false }
//! ```
//!
//! # Reading modes
//!
//! The first read of a source extracts directives ([`ReadMode::Full`]).
//! Later reads merge plain INI values over the stores without touching the
//! extracted metadata ([`ReadMode::ValuesOnly`]); [`ReadMode::Auto`], the
//! default, picks between them by whether metadata exists yet. Re-reading
//! never tears metadata down.
//!
//! # Error handling
//!
//! All fallible operations return [`FetchError`]. Errors are user-facing:
//! parse errors carry line numbers, conversion errors name the section and
//! option, and file errors carry the path. Option lookups accept an explicit
//! fallback (`get_or`) to downgrade only the missing-option case —
//! malformed values always fail.

pub mod error;
pub mod plusminus;
pub mod split;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod directive;
mod double;
mod export;
mod funcs;
mod ini;
mod resolve;
mod section;
mod store;

#[cfg(test)]
mod fixtures;

pub use builder::{ConfigFetch, FetchBuilder};
#[cfg(feature = "clap")]
pub use cli::{adapt_minus_args, build_command, matches_to_args, value_option_strings};
pub use directive::OptionMeta;
pub use double::Double;
pub use error::FetchError;
pub use funcs::{FuncContext, FuncRegistry, ValueFn};
pub use resolve::Sources;
pub use section::SectionProxy;
pub use types::{ArgValues, ReadMode, Value};
