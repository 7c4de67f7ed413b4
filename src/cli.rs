//! Clap adapter for confetch.
//!
//! This module is the **optional integration layer** between the
//! framework-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! [`build_command`] synthesizes one clap argument per metadata-bearing
//! option, honoring the `names`, `dest`, `default`, `choices`, and help-text
//! declarations from the config's directive blocks. A `BOOL`-chain option
//! with no declared opposite becomes a flag pair `--name` / `--no-name`
//! storing the fixed strings `"yes"` / `"no"`, so the option's own chain
//! converts the flag like any other value.
//!
//! [`matches_to_args`] is the bridge back: it turns parsed matches into the
//! [`ArgValues`] the builder consumes, keeping only values clap actually
//! received (plus declared defaults) and folding the `--no-*` halves of flag
//! pairs onto their option.
//!
//! If you use a different CLI parser (or none), skip this module and fill an
//! [`ArgValues`] yourself.

use clap::builder::PossibleValuesParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::builder::ConfigFetch;
use crate::directive::OptionMeta;
use crate::split::split_comma;
use crate::types::ArgValues;

struct ArgSpec {
    option: String,
    dest: String,
    shorts: Vec<char>,
    longs: Vec<String>,
    help: Option<String>,
    default: Option<String>,
    choices: Vec<String>,
    flag_pair: bool,
}

impl ArgSpec {
    fn from_meta(option: &str, meta: &OptionMeta) -> Self {
        let dest = meta
            .argparse
            .get("dest")
            .cloned()
            .unwrap_or_else(|| option.to_string());
        let mut shorts = Vec::new();
        let mut longs = Vec::new();
        if let Some(names) = meta.argparse.get("names") {
            for name in split_comma(names) {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => shorts.push(c),
                    _ => longs.push(name),
                }
            }
        }
        let flag_pair = meta.chain == ["BOOL"] && !meta.argparse.contains_key("opposite");
        Self {
            option: option.to_string(),
            dest,
            shorts,
            longs,
            help: meta.help.clone(),
            default: meta.argparse.get("default").cloned(),
            choices: meta
                .argparse
                .get("choices")
                .map(|c| split_comma(c))
                .unwrap_or_default(),
            flag_pair,
        }
    }

    fn primary_long(&self) -> String {
        self.longs
            .first()
            .cloned()
            .unwrap_or_else(|| self.option.replace('_', "-"))
    }

    fn no_id(&self) -> String {
        format!("no_{}", self.dest)
    }

    fn apply_names(&self, mut arg: Arg) -> Arg {
        if let Some(&short) = self.shorts.first() {
            arg = arg.short(short);
        }
        for &short in self.shorts.iter().skip(1) {
            arg = arg.short_alias(short);
        }
        if self.shorts.is_empty() || !self.longs.is_empty() {
            arg = arg.long(self.primary_long());
        }
        for long in self.longs.iter().skip(1) {
            arg = arg.alias(long.clone());
        }
        arg
    }
}

fn collect_arg_specs(conf: &ConfigFetch) -> Vec<ArgSpec> {
    conf.metadata_entries()
        .into_iter()
        .map(|(option, meta)| ArgSpec::from_meta(option, meta))
        .collect()
}

/// Register one argument per metadata-bearing option onto `cmd`.
pub fn build_command(conf: &ConfigFetch, mut cmd: Command) -> Command {
    for spec in collect_arg_specs(conf) {
        if spec.flag_pair {
            let mut yes = spec
                .apply_names(Arg::new(spec.dest.clone()))
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("yes")
                .overrides_with(spec.no_id());
            if let Some(help) = &spec.help {
                yes = yes.help(help.clone());
            }
            if let Some(default) = &spec.default {
                yes = yes.default_value(default.clone());
            }
            let no = Arg::new(spec.no_id())
                .long(format!("no-{}", spec.primary_long()))
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("no")
                .overrides_with(spec.dest.clone());
            cmd = cmd.arg(yes).arg(no);
        } else {
            let mut arg = spec
                .apply_names(Arg::new(spec.dest.clone()))
                .action(ArgAction::Set);
            if let Some(help) = &spec.help {
                arg = arg.help(help.clone());
            }
            if let Some(default) = &spec.default {
                arg = arg.default_value(default.clone());
            }
            if !spec.choices.is_empty() {
                arg = arg.value_parser(PossibleValuesParser::new(
                    spec.choices
                        .iter()
                        .map(|c| clap::builder::PossibleValue::new(c.clone())),
                ));
            }
            cmd = cmd.arg(arg);
        }
    }
    cmd
}

/// Convert parsed matches into [`ArgValues`] for the builder.
///
/// Only values clap received on the command line (or from a declared
/// `default`) are included — an argument left at its absent state falls
/// through to the environment and config layers. The `matches` must come
/// from a command built by [`build_command`] over the same configuration.
pub fn matches_to_args(conf: &ConfigFetch, matches: &ArgMatches) -> ArgValues {
    let mut args = ArgValues::new();
    for spec in collect_arg_specs(conf) {
        if let Some(value) = supplied_string(matches, &spec.dest) {
            args.set(&spec.option, value);
        }
        if spec.flag_pair
            && let Some(value) = supplied_string(matches, &spec.no_id())
        {
            args.set(&spec.option, value);
        }
    }
    args
}

fn supplied_string(matches: &ArgMatches, id: &str) -> Option<String> {
    if !matches.try_contains_id(id).unwrap_or(false) {
        return None;
    }
    match matches.value_source(id) {
        Some(ValueSource::CommandLine) | Some(ValueSource::DefaultValue) => {}
        _ => return None,
    }
    matches.try_get_one::<String>(id).ok().flatten().cloned()
}

/// Option strings (`--long`, `-s`) of the value-taking arguments
/// [`build_command`] would register. Input for [`adapt_minus_args`].
pub fn value_option_strings(conf: &ConfigFetch) -> Vec<String> {
    let mut out = Vec::new();
    for spec in collect_arg_specs(conf) {
        if spec.flag_pair {
            continue;
        }
        for short in &spec.shorts {
            out.push(format!("-{short}"));
        }
        if spec.shorts.is_empty() || !spec.longs.is_empty() {
            out.push(format!("--{}", spec.primary_long()));
        }
        for long in spec.longs.iter().skip(1) {
            out.push(format!("--{long}"));
        }
    }
    out
}

/// Unite a value-taking option and a following `-`-leading value into one
/// token (`--xx -value` → `--xx=-value`, `-x -value` → `-x-value`).
///
/// Argument parsers read a leading dash as a new option, but plus/minus
/// options take values like `-yyy` routinely; this rewrite makes them
/// parseable.
pub fn adapt_minus_args(args: &[String], value_opts: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if value_opts.iter().any(|opt| opt == arg)
            && !arg.contains('=')
            && iter.peek().is_some_and(|next| next.starts_with('-'))
        {
            let value = iter.next().expect("peeked");
            if arg.starts_with("--") {
                out.push(format!("{arg}={value}"));
            } else {
                out.push(format!("{arg}{value}"));
            }
            continue;
        }
        out.push(arg.clone());
    }
    out
}
