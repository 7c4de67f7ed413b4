//! Two-level section fallback.
//!
//! The default section of the INI format is a useful fallback, but it is
//! global and unconditional. `Double` composes two section proxies so that a
//! primary section can fall back to a chosen parent section first, before
//! the default section applies inside each proxy.
//!
//! A primary value that is blank (empty string or empty list — not `false`)
//! is replaced by the parent's value when the parent has one. Options whose
//! chain is exactly the plus function skip blank substitution and instead
//! merge across every source of both proxies.

use crate::error::FetchError;
use crate::plusminus;
use crate::section::SectionProxy;
use crate::types::Value;

pub struct Double<'a> {
    sec: SectionProxy<'a>,
    parent: SectionProxy<'a>,
}

impl<'a> Double<'a> {
    pub fn new(sec: SectionProxy<'a>, parent: SectionProxy<'a>) -> Self {
        Self { sec, parent }
    }

    /// Resolve `option` against the primary section, falling back to the
    /// parent when the primary has no value or a blank one.
    pub fn get(&self, option: &str) -> Result<Value, FetchError> {
        if self.sec.chain(option) == ["PLUS"] {
            return self.get_plus(option);
        }
        match self.sec.get(option) {
            Err(FetchError::NoOption { .. }) => self.parent.get(option),
            Ok(value) if value.is_blank() => match self.parent.get(option) {
                Ok(parent_value) => Ok(parent_value),
                Err(FetchError::NoOption { .. }) => Ok(value),
                Err(other) => Err(other),
            },
            other => other,
        }
    }

    /// Like [`get`](Self::get), but an option missing from every source
    /// yields `fallback` instead of an error.
    pub fn get_or(&self, option: &str, fallback: impl Into<Value>) -> Result<Value, FetchError> {
        match self.get(option) {
            Err(FetchError::NoOption { .. }) => Ok(fallback.into()),
            other => other,
        }
    }

    /// Plus/minus merge across the primary's three sources plus the parent's
    /// raw config value, least specific first.
    fn get_plus(&self, option: &str) -> Result<Value, FetchError> {
        let sources = self.sec.gather(option);
        let parent_conf = self.parent.conf_value(option);
        if sources.is_all_absent() && parent_conf.is_none() {
            return Err(FetchError::NoOption {
                section: self.sec.name().to_string(),
                option: option.to_string(),
            });
        }
        let mut layers = sources.plus_layers()?;
        layers.insert(0, parent_conf);
        plusminus::merge(&layers, None).map(Value::List)
    }
}
