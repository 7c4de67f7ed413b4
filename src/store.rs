//! The section/option store, generic over its entry type.
//!
//! Two instances back a configuration: `Store<String>` for raw values and
//! `Store<OptionMeta>` for directive metadata. Both are keyed identically by
//! (section, option) and share the same default-section fallback: an option
//! missing from a concrete section is looked up in the default section.
//!
//! Structural containment (`knows`) is stricter than option fallback — a
//! section name is known only if it exists concretely or is the default
//! section's own name.

#[derive(Debug, Clone)]
pub(crate) struct Store<T> {
    default_section: String,
    defaults: Vec<(String, T)>,
    sections: Vec<Section<T>>,
}

#[derive(Debug, Clone)]
pub(crate) struct Section<T> {
    pub name: String,
    pub entries: Vec<(String, T)>,
}

impl<T> Store<T> {
    pub fn new(default_section: &str) -> Self {
        Self {
            default_section: default_section.to_string(),
            defaults: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn default_section(&self) -> &str {
        &self.default_section
    }

    /// True while no concrete section has been added. The default section
    /// does not count; this drives the auto read-mode switch.
    pub fn is_unpopulated(&self) -> bool {
        self.sections.is_empty()
    }

    /// Structural containment: concrete section, or the default name itself.
    pub fn knows(&self, name: &str) -> bool {
        name == self.default_section || self.index_of(name).is_some()
    }

    /// Ensure a concrete section exists. The default name is a no-op.
    pub fn add_section(&mut self, name: &str) {
        if name == self.default_section || self.index_of(name).is_some() {
            return;
        }
        self.sections.push(Section {
            name: name.to_string(),
            entries: Vec::new(),
        });
    }

    pub fn set(&mut self, section: &str, option: &str, value: T) {
        if section == self.default_section {
            upsert(&mut self.defaults, option, value);
            return;
        }
        self.add_section(section);
        let idx = self.index_of(section).expect("section just added");
        upsert(&mut self.sections[idx].entries, option, value);
    }

    /// Look up an option in `section`, falling back to the default section.
    pub fn get(&self, section: &str, option: &str) -> Option<&T> {
        if section != self.default_section
            && let Some(idx) = self.index_of(section)
            && let Some(value) = lookup(&self.sections[idx].entries, option)
        {
            return Some(value);
        }
        lookup(&self.defaults, option)
    }

    /// Section names in read order, the default section first.
    pub fn section_names(&self) -> Vec<&str> {
        let mut names = vec![self.default_section.as_str()];
        names.extend(self.sections.iter().map(|s| s.name.as_str()));
        names
    }

    /// Option names visible in `section`: inherited defaults first, then the
    /// section's own (unshadowed defaults only appear once).
    pub fn options(&self, section: &str) -> Vec<&str> {
        let own: &[(String, T)] = if section == self.default_section {
            &[]
        } else {
            self.index_of(section)
                .map(|idx| self.sections[idx].entries.as_slice())
                .unwrap_or(&[])
        };
        let mut names: Vec<&str> = self
            .defaults
            .iter()
            .map(|(k, _)| k.as_str())
            .filter(|k| lookup(own, k).is_none())
            .collect();
        names.extend(own.iter().map(|(k, _)| k.as_str()));
        names
    }

    pub fn defaults(&self) -> &[(String, T)] {
        &self.defaults
    }

    pub fn sections(&self) -> &[Section<T>] {
        &self.sections
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }
}

fn upsert<T>(entries: &mut Vec<(String, T)>, option: &str, value: T) {
    match entries.iter_mut().find(|(k, _)| k == option) {
        Some((_, existing)) => *existing = value,
        None => entries.push((option.to_string(), value)),
    }
}

fn lookup<'a, T>(entries: &'a [(String, T)], option: &str) -> Option<&'a T> {
    entries
        .iter()
        .find(|(k, _)| k == option)
        .map(|(_, v)| v)
}
