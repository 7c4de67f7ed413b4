//! Reader for the INI-style input grammar.
//!
//! Supported surface: `[section]` headers, `option = value` assignments,
//! values continued on indented lines (joined with newlines, blank lines
//! inside a value kept, trailing blanks dropped), and full-line `#` / `;`
//! comments. Anything beyond that is rejected with a line-numbered error
//! rather than guessed at.
//!
//! The reader produces raw text only; directive extraction and option-name
//! normalization happen in the layers above.

use crate::error::FetchError;

#[derive(Debug, Default)]
pub(crate) struct Document {
    pub sections: Vec<RawSection>,
}

#[derive(Debug)]
pub(crate) struct RawSection {
    pub name: String,
    pub options: Vec<(String, String)>,
}

pub(crate) fn parse(text: &str) -> Result<Document, FetchError> {
    let mut doc = Document::default();
    let mut current_section: Option<usize> = None;
    // option name plus its value lines, pending until the block ends
    let mut pending: Option<(String, Vec<String>)> = None;

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let stripped = line.trim();

        if stripped.is_empty() {
            if let Some((_, lines)) = pending.as_mut() {
                lines.push(String::new());
            }
            continue;
        }
        if stripped.starts_with('#') || stripped.starts_with(';') {
            continue;
        }

        let indented = line.starts_with(' ') || line.starts_with('\t');
        if indented {
            match pending.as_mut() {
                Some((_, lines)) => lines.push(stripped.to_string()),
                None => {
                    return Err(FetchError::Parse {
                        line: lineno,
                        message: format!("continuation line without an option: '{stripped}'"),
                    });
                }
            }
            continue;
        }

        if stripped.starts_with('[') && stripped.ends_with(']') {
            flush(&mut doc, current_section, pending.take());
            let name = stripped[1..stripped.len() - 1].trim();
            if name.is_empty() {
                return Err(FetchError::Parse {
                    line: lineno,
                    message: "empty section name".into(),
                });
            }
            current_section = Some(section_index(&mut doc, name));
            continue;
        }

        let Some((key, value)) = stripped.split_once('=') else {
            return Err(FetchError::Parse {
                line: lineno,
                message: format!("expected 'option = value', got '{stripped}'"),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(FetchError::Parse {
                line: lineno,
                message: "option name is empty".into(),
            });
        }
        if current_section.is_none() {
            return Err(FetchError::Parse {
                line: lineno,
                message: format!("option '{key}' appears before any section header"),
            });
        }
        flush(&mut doc, current_section, pending.take());
        pending = Some((key.to_string(), vec![value.trim().to_string()]));
    }
    flush(&mut doc, current_section, pending.take());
    Ok(doc)
}

fn section_index(doc: &mut Document, name: &str) -> usize {
    if let Some(idx) = doc.sections.iter().position(|s| s.name == name) {
        return idx;
    }
    doc.sections.push(RawSection {
        name: name.to_string(),
        options: Vec::new(),
    });
    doc.sections.len() - 1
}

fn flush(doc: &mut Document, section: Option<usize>, pending: Option<(String, Vec<String>)>) {
    let (Some(idx), Some((key, mut lines))) = (section, pending) else {
        return;
    };
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let value = lines.join("\n");
    let options = &mut doc.sections[idx].options;
    match options.iter_mut().find(|(k, _)| *k == key) {
        Some((_, existing)) => *existing = value,
        None => options.push((key, value)),
    }
}
