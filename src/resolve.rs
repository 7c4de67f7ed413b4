//! Core resolution: pick the winning value among the three sources and drive
//! the option's function chain over it.
//!
//! Operates on pre-gathered data (`Sources`) with no I/O or store access,
//! making the precedence rule testable with synthetic inputs. Precedence:
//!
//! 1. Argument — wins whenever present, even as an empty string
//! 2. Environment — wins when present and non-empty
//! 3. Config — wins when present, even as an empty string
//!
//! A non-string argument value (a native value injected by a pre-parsed
//! namespace, such as a boolean flag result) short-circuits: it is returned
//! unconverted, since function chains only operate on string content.

use std::collections::HashMap;

use crate::error::FetchError;
use crate::funcs::{FuncContext, FuncRegistry};
use crate::types::Value;

/// The three candidate values for one resolution, each independently
/// possibly-absent. Transient: built per lookup, dropped after it.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    /// Command-line value, if the option was supplied.
    pub arg: Option<Value>,
    /// Environment value, if an env var is mapped for the option and set.
    pub env: Option<String>,
    /// Config-file value, with default-section fallback already applied.
    pub conf: Option<String>,
}

impl Sources {
    pub(crate) fn is_all_absent(&self) -> bool {
        self.arg.is_none() && self.env.is_none() && self.conf.is_none()
    }

    /// The sources as plus/minus layers, least specific first:
    /// config, environment, argument.
    ///
    /// Blank layers become `None` (skipped by the merge); a non-string,
    /// non-blank argument value cannot be a layer.
    pub(crate) fn plus_layers(&self) -> Result<Vec<Option<String>>, FetchError> {
        let arg = match &self.arg {
            None => None,
            Some(Value::Str(s)) => Some(s.clone()),
            Some(value) if value.is_blank() => None,
            Some(value) => {
                return Err(FetchError::InvalidValue(format!(
                    "plus/minus layers must be strings, got {value:?}"
                )));
            }
        };
        Ok(vec![self.conf.clone(), self.env.clone(), arg])
    }
}

/// Resolve one option from its gathered sources and declared chain.
pub(crate) fn resolve(
    section: &str,
    option: &str,
    sources: &Sources,
    chain: &[String],
    registry: &FuncRegistry,
    fmts: &HashMap<String, String>,
) -> Result<Value, FetchError> {
    let raw = match (&sources.arg, &sources.env, &sources.conf) {
        (Some(Value::Str(s)), _, _) => s.clone(),
        (Some(native), _, _) => return Ok(native.clone()),
        (None, Some(env), _) if !env.is_empty() => env.clone(),
        (None, _, Some(conf)) => conf.clone(),
        _ => {
            return Err(FetchError::NoOption {
                section: section.to_string(),
                option: option.to_string(),
            });
        }
    };

    let ctx = FuncContext { fmts, sources };
    let mut value = Value::Str(raw);
    for name in chain {
        let func = registry
            .get(name)
            .ok_or_else(|| FetchError::UnknownFunction(name.clone()))?;
        value = func(&ctx, value).map_err(|e| FetchError::conversion(section, option, e))?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(sources: &Sources, chain: &[&str]) -> Result<Value, FetchError> {
        let registry = FuncRegistry::with_builtins();
        let chain: Vec<String> = chain.iter().map(|s| s.to_string()).collect();
        resolve("sec1", "aa", sources, &chain, &registry, &HashMap::new())
    }

    #[test]
    fn argument_wins() {
        let sources = Sources {
            arg: Some(Value::Str("A".into())),
            env: Some("E".into()),
            conf: Some("C".into()),
        };
        assert_eq!(run(&sources, &[]).unwrap(), Value::Str("A".into()));
    }

    #[test]
    fn empty_argument_still_wins() {
        let sources = Sources {
            arg: Some(Value::Str(String::new())),
            env: Some("E".into()),
            conf: Some("C".into()),
        };
        assert_eq!(run(&sources, &[]).unwrap(), Value::Str(String::new()));
    }

    #[test]
    fn environment_beats_config() {
        let sources = Sources {
            arg: None,
            env: Some("E".into()),
            conf: Some("C".into()),
        };
        assert_eq!(run(&sources, &[]).unwrap(), Value::Str("E".into()));
    }

    #[test]
    fn empty_environment_does_not_win() {
        let sources = Sources {
            arg: None,
            env: Some(String::new()),
            conf: Some("C".into()),
        };
        assert_eq!(run(&sources, &[]).unwrap(), Value::Str("C".into()));
    }

    #[test]
    fn empty_config_wins_over_nothing() {
        let sources = Sources {
            arg: None,
            env: None,
            conf: Some(String::new()),
        };
        assert_eq!(run(&sources, &[]).unwrap(), Value::Str(String::new()));
    }

    #[test]
    fn all_absent_is_no_option() {
        let err = run(&Sources::default(), &[]).unwrap_err();
        assert!(matches!(err, FetchError::NoOption { .. }));
    }

    #[test]
    fn empty_env_and_absent_config_is_no_option() {
        let sources = Sources {
            arg: None,
            env: Some(String::new()),
            conf: None,
        };
        let err = run(&sources, &[]).unwrap_err();
        assert!(matches!(err, FetchError::NoOption { .. }));
    }

    #[test]
    fn native_argument_bypasses_chain() {
        let sources = Sources {
            arg: Some(Value::Bool(true)),
            env: None,
            conf: None,
        };
        // a BOOL chain would fail on a non-string; the native value skips it
        assert_eq!(run(&sources, &["BOOL"]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn string_argument_goes_through_chain() {
        let sources = Sources {
            arg: Some(Value::Str("yes".into())),
            env: None,
            conf: None,
        };
        assert_eq!(run(&sources, &["BOOL"]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn chain_failure_names_the_option() {
        let sources = Sources {
            arg: None,
            env: None,
            conf: Some("maybe".into()),
        };
        let err = run(&sources, &["BOOL"]).unwrap_err();
        match err {
            FetchError::Conversion {
                section,
                option,
                reason,
            } => {
                assert_eq!(section, "sec1");
                assert_eq!(option, "aa");
                assert!(reason.contains("maybe"));
            }
            other => panic!("expected Conversion, got {other:?}"),
        }
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let sources = Sources {
            arg: None,
            env: None,
            conf: Some("a, b".into()),
        };
        let first = run(&sources, &["COMMA"]).unwrap();
        let second = run(&sources, &["COMMA"]).unwrap();
        assert_eq!(first, second);
    }
}
