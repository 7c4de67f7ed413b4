#[cfg(test)]
pub mod test {
    use crate::builder::ConfigFetch;

    /// Load config text with an empty environment snapshot, so tests never
    /// depend on the process environment.
    pub fn fetch(text: &str) -> ConfigFetch {
        ConfigFetch::builder()
            .env_source(Vec::new())
            .load_str(text)
            .expect("fixture config must parse")
    }

    #[test]
    fn fixture_loads() {
        let conf = fetch("[sec1]\naa = xxx");
        assert!(conf.has_section("sec1"));
    }
}
