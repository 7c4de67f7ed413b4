//! The value-function registry and the built-in conversions.
//!
//! Functions are looked up by uppercase name and applied left-to-right over
//! an option's winning raw value. The registry is owned by each
//! [`ConfigFetch`](crate::ConfigFetch) instance, so configurations with
//! different custom functions coexist without shared state.
//!
//! | name  | input  | output |
//! |-------|--------|--------|
//! | BOOL  | string | boolean (`1/yes/true/on`, `0/no/false/off`) |
//! | COMMA | string | list, escape-aware comma split |
//! | LINE  | string | list, escape-aware line split |
//! | BAR   | list   | string joined with `\|` |
//! | CMD   | string | shell tokens, `#` starts a comment |
//! | CMDS  | list   | list of shell token lists |
//! | FMT   | string | `{NAME}` template substitution |
//! | PLUS  | —      | plus/minus merge over the full source set |

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::FetchError;
use crate::plusminus;
use crate::resolve::Sources;
use crate::split::{split_comma, split_line};
use crate::types::Value;

/// Context handed to every value function.
///
/// Carries the `FMT` substitution map and the full three-way source set, so
/// context-sensitive functions (`PLUS`) read their inputs explicitly instead
/// of through hidden state.
pub struct FuncContext<'a> {
    pub fmts: &'a HashMap<String, String>,
    pub sources: &'a Sources,
}

/// A registered value conversion.
pub type ValueFn = Arc<dyn Fn(&FuncContext<'_>, Value) -> Result<Value, FetchError> + Send + Sync>;

/// An open catalog of named value conversions.
pub struct FuncRegistry {
    funcs: HashMap<String, ValueFn>,
}

impl std::fmt::Debug for FuncRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuncRegistry")
            .field("funcs", &self.funcs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FuncRegistry {
    /// A registry pre-populated with the built-in conversions.
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            funcs: HashMap::new(),
        };
        registry.register("bool", |_ctx, value| {
            parse_bool(&expect_str("bool", value)?).map(Value::Bool)
        });
        registry.register("comma", |_ctx, value| {
            Ok(Value::List(split_comma(&expect_str("comma", value)?)))
        });
        registry.register("line", |_ctx, value| {
            Ok(Value::List(split_line(&expect_str("line", value)?)))
        });
        registry.register("bar", |_ctx, value| {
            let list = match value {
                Value::List(list) => list,
                other => return Err(FetchError::NotAList(format!("{other:?}"))),
            };
            if list.iter().any(|item| !item.is_empty()) {
                Ok(Value::Str(list.join("|")))
            } else {
                Ok(Value::Str(String::new()))
            }
        });
        registry.register("cmd", |_ctx, value| {
            shell_split(&expect_str("cmd", value)?).map(Value::List)
        });
        registry.register("cmds", |_ctx, value| {
            let list = match value {
                Value::List(list) => list,
                other => {
                    return Err(FetchError::InvalidValue(format!(
                        "'cmds' expects a list, got {other:?}"
                    )));
                }
            };
            let commands = list
                .iter()
                .map(|item| shell_split(item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Commands(commands))
        });
        registry.register("fmt", |ctx, value| {
            format_str(&expect_str("fmt", value)?, ctx.fmts).map(Value::Str)
        });
        registry.register("plus", |ctx, _value| {
            let layers = ctx.sources.plus_layers()?;
            plusminus::merge(&layers, None).map(Value::List)
        });
        registry
    }

    /// Register a custom conversion under `name` (case-insensitive).
    ///
    /// Replaces any existing function of the same name, so built-ins can be
    /// shadowed deliberately.
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&FuncContext<'_>, Value) -> Result<Value, FetchError> + Send + Sync + 'static,
    {
        self.funcs.insert(name.to_uppercase(), Arc::new(func));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(&name.to_uppercase())
    }

    pub(crate) fn get(&self, name: &str) -> Option<&ValueFn> {
        self.funcs.get(&name.to_uppercase())
    }
}

fn expect_str(func: &str, value: Value) -> Result<String, FetchError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(FetchError::InvalidValue(format!(
            "'{func}' expects a string, got {other:?}"
        ))),
    }
}

fn parse_bool(value: &str) -> Result<bool, FetchError> {
    match value.to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(FetchError::NotABoolean(value.to_string())),
    }
}

/// Shell-style tokenization. `#` outside quotes starts a comment running to
/// the end of the line.
fn shell_split(value: &str) -> Result<Vec<String>, FetchError> {
    let stripped = strip_comments(value);
    shlex::split(&stripped)
        .ok_or_else(|| FetchError::InvalidValue(format!("invalid shell syntax: '{value}'")))
}

fn strip_comments(text: &str) -> String {
    let mut out = String::new();
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut in_single = false;
        let mut in_double = false;
        let mut escaped = false;
        for ch in line.chars() {
            if escaped {
                out.push(ch);
                escaped = false;
                continue;
            }
            match ch {
                '\\' if !in_single => {
                    out.push(ch);
                    escaped = true;
                }
                '\'' if !in_double => {
                    out.push(ch);
                    in_single = !in_single;
                }
                '"' if !in_single => {
                    out.push(ch);
                    in_double = !in_double;
                }
                '#' if !in_single && !in_double => break,
                ch => out.push(ch),
            }
        }
    }
    out
}

/// `{NAME}` template substitution; `{{` and `}}` are literal braces.
fn format_str(template: &str, fmts: &HashMap<String, String>) -> Result<String, FetchError> {
    let mut out = String::new();
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(FetchError::InvalidValue(format!(
                                "unclosed '{{' in format template: '{template}'"
                            )));
                        }
                    }
                }
                match fmts.get(&name) {
                    Some(replacement) => out.push_str(replacement),
                    None => {
                        return Err(FetchError::InvalidValue(format!(
                            "unknown format name '{name}'"
                        )));
                    }
                }
            }
            '}' => {
                return Err(FetchError::InvalidValue(format!(
                    "single '}}' in format template: '{template}'"
                )));
            }
            ch => out.push(ch),
        }
    }
    Ok(out)
}
