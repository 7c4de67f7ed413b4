//! Per-section facade over a loaded configuration.
//!
//! A proxy gathers the three candidate values for an option — command-line
//! argument, environment variable, config value — and hands them to the
//! resolver together with the option's declared function chain. Proxies are
//! cheap read-only borrows, created per access.

use crate::builder::ConfigFetch;
use crate::error::FetchError;
use crate::resolve::{self, Sources};
use crate::types::Value;

#[derive(Debug)]
pub struct SectionProxy<'a> {
    conf: &'a ConfigFetch,
    name: String,
}

impl<'a> SectionProxy<'a> {
    pub(crate) fn new(conf: &'a ConfigFetch, name: &str) -> Result<Self, FetchError> {
        if !conf.raw_store().knows(name) {
            return Err(FetchError::NoSection(name.to_string()));
        }
        Ok(Self {
            conf,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve `option` to its converted value.
    pub fn get(&self, option: &str) -> Result<Value, FetchError> {
        let option = self.conf.normalize_option(option);
        let sources = self.gather(&option);
        let chain = self.chain(&option);
        resolve::resolve(
            &self.name,
            &option,
            &sources,
            &chain,
            self.conf.registry(),
            self.conf.fmts(),
        )
    }

    /// Like [`get`](Self::get), but an option missing from every source
    /// yields `fallback` instead of an error. Conversion errors stay fatal.
    pub fn get_or(&self, option: &str, fallback: impl Into<Value>) -> Result<Value, FetchError> {
        match self.get(option) {
            Err(FetchError::NoOption { .. }) => Ok(fallback.into()),
            other => other,
        }
    }

    /// Whether the option has a config value, defaults included. Argument
    /// and environment sources do not count.
    pub fn has_option(&self, option: &str) -> bool {
        let option = self.conf.normalize_option(option);
        self.conf.raw_store().get(&self.name, &option).is_some()
    }

    /// Option names visible in this section, inherited defaults included.
    pub fn options(&self) -> Vec<&str> {
        self.conf.raw_store().options(&self.name)
    }

    pub(crate) fn gather(&self, option: &str) -> Sources {
        let option = self.conf.normalize_option(option);
        Sources {
            arg: self.conf.args().get(&option).cloned(),
            env: self.env_value(&option),
            conf: self.conf_value(&option),
        }
    }

    /// The raw config value with default-section fallback, conversion not
    /// applied. Used directly by the two-level fallback's plus handling.
    pub(crate) fn conf_value(&self, option: &str) -> Option<String> {
        let option = self.conf.normalize_option(option);
        self.conf.raw_store().get(&self.name, &option).cloned()
    }

    fn env_value(&self, option: &str) -> Option<String> {
        let var = self.conf.envs().get(option)?;
        self.conf.env_vars().get(var).cloned()
    }

    pub(crate) fn chain(&self, option: &str) -> Vec<String> {
        let option = self.conf.normalize_option(option);
        self.conf
            .ctx_store()
            .get(&self.name, &option)
            .map(|meta| meta.chain.clone())
            .unwrap_or_default()
    }
}
