//! The configuration object and its builder.
//!
//! `ConfigFetch` keeps two stores in step: raw option values, and the
//! directive metadata extracted from them. The builder wires up the external
//! collaborators — command-line values, an option → env-var mapping, the
//! `FMT` substitution map, custom value functions — and then reads config
//! text from a string or a file.

use std::collections::HashMap;
use std::path::Path;

use crate::directive::{self, OptionMeta};
use crate::error::FetchError;
use crate::export;
use crate::funcs::{FuncContext, FuncRegistry};
use crate::ini;
use crate::section::SectionProxy;
use crate::store::Store;
use crate::types::{ArgValues, ReadMode, Value};

/// A loaded, layered configuration.
#[derive(Debug)]
pub struct ConfigFetch {
    raw: Store<String>,
    ctx: Store<OptionMeta>,
    fmts: HashMap<String, String>,
    args: ArgValues,
    envs: HashMap<String, String>,
    env_vars: HashMap<String, String>,
    registry: FuncRegistry,
    use_dash: bool,
    use_uppercase: bool,
}

impl ConfigFetch {
    pub fn builder() -> FetchBuilder {
        FetchBuilder::new()
    }

    /// Read config text and merge it into the stores.
    ///
    /// [`ReadMode::Full`] extracts directives, overwriting earlier
    /// declarations for re-declared options. [`ReadMode::ValuesOnly`] stores
    /// values verbatim and never touches the metadata store.
    pub fn read_str(&mut self, text: &str, mode: ReadMode) -> Result<(), FetchError> {
        let full = match mode {
            ReadMode::Full => true,
            ReadMode::ValuesOnly => false,
            ReadMode::Auto => self.ctx.is_unpopulated(),
        };
        let doc = ini::parse(text)?;
        for section in doc.sections {
            self.raw.add_section(&section.name);
            if full {
                self.ctx.add_section(&section.name);
            }
            for (key, value) in section.options {
                let key = self.normalize_option(&key);
                if full {
                    let extracted = directive::extract(&value, &self.registry)?;
                    self.raw.set(&section.name, &key, extracted.payload);
                    if !extracted.meta.is_empty() {
                        self.ctx.set(&section.name, &key, extracted.meta);
                    }
                } else {
                    self.raw.set(&section.name, &key, value);
                }
            }
        }
        Ok(())
    }

    /// Read a config file with [`ReadMode::Auto`].
    pub fn read_path(&mut self, path: impl AsRef<Path>) -> Result<(), FetchError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.read_str(&text, ReadMode::Auto)
    }

    /// The proxy for `name`, or `NoSection` if the store does not know it.
    pub fn section(&self, name: &str) -> Result<SectionProxy<'_>, FetchError> {
        SectionProxy::new(self, name)
    }

    /// Section names in read order, the default section first.
    pub fn sections(&self) -> Vec<&str> {
        self.raw.section_names()
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.raw.knows(name)
    }

    /// Overwrite one raw value in place. The section must already exist.
    pub fn set_value(
        &mut self,
        section: &str,
        option: &str,
        value: &str,
    ) -> Result<(), FetchError> {
        if !self.raw.knows(section) {
            return Err(FetchError::NoSection(section.to_string()));
        }
        let option = self.normalize_option(option);
        self.raw.set(section, &option, value.to_string());
        Ok(())
    }

    /// Register a custom value function after construction.
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&FuncContext<'_>, Value) -> Result<Value, FetchError> + Send + Sync + 'static,
    {
        self.registry.register(name, func);
    }

    /// Directive metadata for one option, default-section fallback applied.
    pub fn metadata(&self, section: &str, option: &str) -> Option<&OptionMeta> {
        let option = self.normalize_option(option);
        self.ctx.get(section, &option)
    }

    /// Every option with a metadata record, defaults first then sections in
    /// read order, deduplicated by option name (first declaration wins).
    pub(crate) fn metadata_entries(&self) -> Vec<(&str, &OptionMeta)> {
        let mut entries: Vec<(&str, &OptionMeta)> = Vec::new();
        let all = self
            .ctx
            .defaults()
            .iter()
            .chain(self.ctx.sections().iter().flat_map(|s| s.entries.iter()));
        for (name, meta) in all {
            if !entries.iter().any(|(seen, _)| *seen == name.as_str()) {
                entries.push((name.as_str(), meta));
            }
        }
        entries
    }

    /// Section → option → raw value, sorted.
    pub fn to_map(&self) -> std::collections::BTreeMap<String, std::collections::BTreeMap<String, String>> {
        export::to_map(self)
    }

    /// Serialize the stores back to INI text.
    pub fn to_ini_string(&self) -> String {
        export::to_ini_string(self)
    }

    /// Pretty JSON rendering of [`to_map`](Self::to_map).
    pub fn to_json(&self) -> Result<String, FetchError> {
        export::to_json(self)
    }

    pub(crate) fn raw_store(&self) -> &Store<String> {
        &self.raw
    }

    pub(crate) fn ctx_store(&self) -> &Store<OptionMeta> {
        &self.ctx
    }

    pub(crate) fn args(&self) -> &ArgValues {
        &self.args
    }

    pub(crate) fn envs(&self) -> &HashMap<String, String> {
        &self.envs
    }

    pub(crate) fn env_vars(&self) -> &HashMap<String, String> {
        &self.env_vars
    }

    pub(crate) fn fmts(&self) -> &HashMap<String, String> {
        &self.fmts
    }

    pub(crate) fn registry(&self) -> &FuncRegistry {
        &self.registry
    }

    pub(crate) fn normalize_option(&self, option: &str) -> String {
        let mut option = if self.use_dash {
            option.replace('-', "_")
        } else {
            option.to_string()
        };
        if !self.use_uppercase {
            option = option.to_lowercase();
        }
        option
    }
}

/// Builder for [`ConfigFetch`].
///
/// All collaborators are optional; the zero-configuration path is
/// `ConfigFetch::builder().load_str(text)`.
pub struct FetchBuilder {
    fmts: HashMap<String, String>,
    args: ArgValues,
    envs: HashMap<String, String>,
    env_source: Option<Vec<(String, String)>>,
    registry: FuncRegistry,
    default_section: String,
    use_dash: bool,
    use_uppercase: bool,
}

impl FetchBuilder {
    fn new() -> Self {
        Self {
            fmts: HashMap::new(),
            args: ArgValues::new(),
            envs: HashMap::new(),
            env_source: None,
            registry: FuncRegistry::with_builtins(),
            default_section: "DEFAULT".to_string(),
            use_dash: true,
            use_uppercase: true,
        }
    }

    /// Add one `{NAME}` → replacement pair for the `FMT` function.
    pub fn fmt(mut self, name: &str, value: &str) -> Self {
        self.fmts.insert(name.to_string(), value.to_string());
        self
    }

    /// Supply the already-parsed command-line values.
    pub fn args(mut self, args: ArgValues) -> Self {
        self.args = args;
        self
    }

    /// Map `option` to the environment variable consulted for it.
    pub fn env(mut self, option: &str, var: &str) -> Self {
        self.envs.insert(option.to_string(), var.to_string());
        self
    }

    /// Replace the process environment with synthetic variables.
    /// Without this, `std::env::vars()` is snapshotted at build time.
    pub fn env_source<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env_source = Some(vars.into_iter().collect());
        self
    }

    /// Rename the default section (default: `"DEFAULT"`).
    pub fn default_section(mut self, name: &str) -> Self {
        self.default_section = name.to_string();
        self
    }

    /// Convert dashes in option names to underscores (default: on).
    pub fn use_dash(mut self, yes: bool) -> Self {
        self.use_dash = yes;
        self
    }

    /// Keep option names case-sensitive (default: on). When off, option
    /// names are lowercased.
    pub fn use_uppercase(mut self, yes: bool) -> Self {
        self.use_uppercase = yes;
        self
    }

    /// Register a custom value function before any parsing occurs.
    pub fn register<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&FuncContext<'_>, Value) -> Result<Value, FetchError> + Send + Sync + 'static,
    {
        self.registry.register(name, func);
        self
    }

    /// Finish with empty stores; read sources afterwards.
    pub fn build(self) -> ConfigFetch {
        let env_vars = self
            .env_source
            .unwrap_or_else(|| std::env::vars().collect())
            .into_iter()
            .collect();
        ConfigFetch {
            raw: Store::new(&self.default_section),
            ctx: Store::new(&self.default_section),
            fmts: self.fmts,
            args: self.args,
            envs: self.envs,
            env_vars,
            registry: self.registry,
            use_dash: self.use_dash,
            use_uppercase: self.use_uppercase,
        }
    }

    /// Build and read config text with [`ReadMode::Auto`].
    pub fn load_str(self, text: &str) -> Result<ConfigFetch, FetchError> {
        let mut conf = self.build();
        conf.read_str(text, ReadMode::Auto)?;
        Ok(conf)
    }

    /// Build and read a config file with [`ReadMode::Auto`].
    pub fn load_path(self, path: impl AsRef<Path>) -> Result<ConfigFetch, FetchError> {
        let mut conf = self.build();
        conf.read_path(path)?;
        Ok(conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::fetch;
    use std::io::Write;

    #[test]
    fn end_to_end_plain_value() {
        let conf = fetch("[sec1]\naa = xxx");
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Str("xxx".into())
        );
    }

    #[test]
    fn end_to_end_comma_chain() {
        let conf = fetch("[sec1]\naa = [=COMMA] xxx1, xxx2, xxx3");
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::List(vec!["xxx1".into(), "xxx2".into(), "xxx3".into()])
        );
    }

    #[test]
    fn end_to_end_comma_bar_chain() {
        let conf = fetch("[sec1]\naa = [=COMMA][=BAR] xxx1, xxx2, xxx3");
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Str("xxx1|xxx2|xxx3".into())
        );
    }

    #[test]
    fn end_to_end_line_directive_form() {
        let conf = fetch("[sec1]\naa = :: f: comma\n    : target list\n    xxx1, xxx2");
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::List(vec!["xxx1".into(), "xxx2".into()])
        );
        let meta = conf.metadata("sec1", "aa").unwrap();
        assert_eq!(meta.help.as_deref(), Some("target list"));
    }

    #[test]
    fn chain_declared_in_default_applies_to_sections() {
        let conf = fetch("[DEFAULT]\naa = [=BOOL]\n[sec1]\naa = no");
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn default_value_and_chain_inherited_together() {
        let conf = fetch("[DEFAULT]\naa = [=BOOL] no\n[sec1]");
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn bool_on_continuation_line() {
        let conf = fetch("[sec1]\naa =\n    [=BOOL] no");
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn fmt_substitution() {
        let conf = ConfigFetch::builder()
            .fmt("USER", "/home/john")
            .env_source(Vec::new())
            .load_str("[sec1]\naa = [=FMT] {USER}/data/my.css")
            .unwrap();
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Str("/home/john/data/my.css".into())
        );
    }

    #[test]
    fn custom_function() {
        let conf = ConfigFetch::builder()
            .register("custom", |_ctx, _value| Ok(Value::Str("test".into())))
            .env_source(Vec::new())
            .load_str("[sec1]\naa = [=CUSTOM] xxx")
            .unwrap();
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Str("test".into())
        );
    }

    #[test]
    fn later_values_only_read_keeps_metadata() {
        let mut conf = fetch("[sec1]\naa = [=COMMA] one, two");
        conf.read_str("[sec1]\naa = three, four", ReadMode::ValuesOnly)
            .unwrap();
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::List(vec!["three".into(), "four".into()])
        );
    }

    #[test]
    fn auto_mode_switches_to_values_only() {
        let mut conf = fetch("[sec1]\naa = [=COMMA] one");
        // metadata store is populated, so Auto now reads values only and the
        // marker text stays in the value
        conf.read_str("[sec1]\nbb = [=COMMA] x", ReadMode::Auto)
            .unwrap();
        assert_eq!(
            conf.section("sec1").unwrap().get("bb").unwrap(),
            Value::Str("[=COMMA] x".into())
        );
    }

    #[test]
    fn new_section_after_first_read_inherits_defaults() {
        let mut conf = fetch("[DEFAULT]\naa = xxx");
        conf.read_str("[sec1]", ReadMode::ValuesOnly).unwrap();
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Str("xxx".into())
        );
    }

    #[test]
    fn full_reread_overwrites_metadata() {
        let mut conf = fetch("[sec1]\naa = [=COMMA] one, two");
        conf.read_str("[sec1]\naa = [=LINE]\n    one\n    two", ReadMode::Full)
            .unwrap();
        let meta = conf.metadata("sec1", "aa").unwrap();
        assert_eq!(meta.chain, ["LINE"]);
    }

    #[test]
    fn sections_listing() {
        let conf = fetch("[sec1]\n[sec2]");
        assert_eq!(conf.sections(), ["DEFAULT", "sec1", "sec2"]);
        assert!(conf.has_section("sec2"));
        assert!(!conf.has_section("sec3"));
    }

    #[test]
    fn set_value_overwrites_raw() {
        let mut conf = fetch("[sec1]\naa = [=COMMA] one");
        conf.set_value("sec1", "aa", "two, three").unwrap();
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::List(vec!["two".into(), "three".into()])
        );
    }

    #[test]
    fn set_value_on_unknown_section_fails() {
        let mut conf = fetch("[sec1]");
        assert!(matches!(
            conf.set_value("nope", "aa", "x").unwrap_err(),
            FetchError::NoSection(_)
        ));
    }

    #[test]
    fn custom_default_section_name() {
        let conf = ConfigFetch::builder()
            .default_section("common")
            .env_source(Vec::new())
            .load_str("[common]\naa = xxx\n[sec1]")
            .unwrap();
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Str("xxx".into())
        );
    }

    #[test]
    fn lowercasing_option_names() {
        let conf = ConfigFetch::builder()
            .use_uppercase(false)
            .env_source(Vec::new())
            .load_str("[sec1]\nAA = xxx")
            .unwrap();
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Str("xxx".into())
        );
    }

    #[test]
    fn load_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[sec1]\naa = [=BOOL] yes\n").unwrap();
        let conf = ConfigFetch::builder()
            .env_source(Vec::new())
            .load_path(file.path())
            .unwrap();
        assert_eq!(
            conf.section("sec1").unwrap().get("aa").unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn load_path_missing_file_is_io_error() {
        let err = ConfigFetch::builder()
            .env_source(Vec::new())
            .load_path("/nonexistent/confetch-test.ini")
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[test]
    fn unknown_bracket_function_fails_loading() {
        let err = ConfigFetch::builder()
            .env_source(Vec::new())
            .load_str("[sec1]\naa = [=NOPE] x")
            .unwrap_err();
        assert!(matches!(err, FetchError::UnknownFunction(_)));
    }
}
