//! Extraction of the directive block that may lead an option's raw text.
//!
//! Two notations coexist. Bracket markers declare conversion functions inline:
//!
//! ```ini
//! aa = [=COMMA] xxx1, xxx2, xxx3
//! ```
//!
//! Line directives declare a function chain, help text, and argument-parser
//! metadata, one declaration per line:
//!
//! ```ini
//! aa = :: f: comma
//!      :: names: a, aa
//!      : pick one or more targets
//!      xxx1, xxx2, xxx3
//! ```
//!
//! `::` lines are `key: value` metadata (`f` is the function chain; other
//! keys pass through verbatim). Single-`:` lines accumulate into the help
//! string, one help line each. The block ends at the first line that is
//! neither, and everything from that line on is the literal payload.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::FetchError;
use crate::funcs::FuncRegistry;
use crate::split::split_comma;

/// Parsed directives for one option: its function chain, help text, and
/// argument-parser metadata. Options without a directive block have no
/// metadata record at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMeta {
    /// Conversion functions, uppercase registry names, applied left to right.
    pub chain: Vec<String>,
    /// Help text accumulated from `:` directive lines.
    pub help: Option<String>,
    /// `key: value` declarations from `::` directive lines, `f` excluded.
    pub argparse: BTreeMap<String, String>,
}

impl OptionMeta {
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty() && self.help.is_none() && self.argparse.is_empty()
    }
}

#[derive(Debug)]
pub(crate) struct Extracted {
    pub payload: String,
    pub meta: OptionMeta,
}

fn bracket_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\[=([A-Za-z][A-Za-z0-9_]*)\]").unwrap())
}

/// Split one option's raw text into directives and payload.
///
/// Bracket tokens are consumed greedily from the start; a token naming an
/// unregistered function is an unrecoverable error. Line directives follow.
/// Leading blank lines are dropped only when a directive block actually
/// follows them, so directive-free payloads come back byte-identical.
pub(crate) fn extract(raw: &str, registry: &FuncRegistry) -> Result<Extracted, FetchError> {
    let mut meta = OptionMeta::default();

    let mut rest = raw;
    let mut any_bracket = false;
    while let Some(caps) = bracket_token().captures(rest) {
        let name = caps[1].to_uppercase();
        if !registry.contains(&name) {
            return Err(FetchError::UnknownFunction(name));
        }
        meta.chain.push(name);
        rest = &rest[caps.get(0).unwrap().end()..];
        any_bracket = true;
    }
    let text = if any_bracket { rest.trim_start() } else { rest };

    let lines: Vec<&str> = text.split('\n').collect();
    let mut idx = 0;
    while idx < lines.len() && lines[idx].trim().is_empty() {
        idx += 1;
    }

    let mut help_lines: Vec<String> = Vec::new();
    let mut consumed = false;
    while idx < lines.len() {
        let line = lines[idx].trim_start();
        if let Some(decl) = line.strip_prefix("::") {
            parse_declaration(decl.trim(), &mut meta, registry)?;
            consumed = true;
        } else if let Some(help) = line.strip_prefix(':') {
            help_lines.push(help.strip_prefix(' ').unwrap_or(help).to_string());
            consumed = true;
        } else {
            break;
        }
        idx += 1;
    }
    if !help_lines.is_empty() {
        meta.help = Some(help_lines.join("\n"));
    }

    let payload = if consumed {
        lines[idx..].join("\n")
    } else {
        text.to_string()
    };
    Ok(Extracted { payload, meta })
}

fn parse_declaration(
    decl: &str,
    meta: &mut OptionMeta,
    registry: &FuncRegistry,
) -> Result<(), FetchError> {
    if decl.is_empty() {
        return Ok(());
    }
    let (key, value) = match decl.split_once(':') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (decl, ""),
    };
    if key.eq_ignore_ascii_case("f") {
        for name in split_comma(value) {
            let name = name.to_uppercase();
            if !registry.contains(&name) {
                return Err(FetchError::UnknownFunction(name));
            }
            meta.chain.push(name);
        }
    } else {
        meta.argparse.insert(key.to_string(), value.to_string());
    }
    Ok(())
}
