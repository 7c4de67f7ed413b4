//! Incremental add/remove merging for list-valued options.
//!
//! Layers are processed least-specific first. A layer whose elements carry no
//! `+`/`-` marker replaces the accumulated list wholesale; a layer with
//! markers adjusts it element by element. The result is an ordered,
//! duplicate-free list in first-occurrence order.

use crate::error::FetchError;
use crate::split::split_comma;

/// Merge `adjusts` into an ordered set seeded from `initial`.
///
/// Each layer is comma-split with escape rules before processing. Absent
/// (`None`) and empty-string layers are skipped entirely — they neither reset
/// nor adjust the accumulation. Within one layer, `+name` appends `name` if
/// absent and `-name` removes it if present; mixing marked and bare elements
/// is an error.
pub fn merge(
    adjusts: &[Option<String>],
    initial: Option<&[String]>,
) -> Result<Vec<String>, FetchError> {
    let mut values: Vec<String> = Vec::new();
    if let Some(initial) = initial {
        for item in initial {
            push_unique(&mut values, item);
        }
    }

    for adjust in adjusts {
        let Some(adjust) = adjust else { continue };
        if adjust.is_empty() {
            continue;
        }
        let elements = split_comma(adjust);

        if !elements
            .iter()
            .any(|e| e.starts_with('+') || e.starts_with('-'))
        {
            // no markers: the layer is a full replacement
            values.clear();
            for element in &elements {
                push_unique(&mut values, element);
            }
            continue;
        }

        for element in &elements {
            let mut chars = element.chars();
            let marker = chars.next();
            let name = chars.as_str();
            match marker {
                Some('+') if !name.is_empty() => push_unique(&mut values, name),
                Some('-') if !name.is_empty() => values.retain(|v| v != name),
                _ => return Err(FetchError::MixedPlusMinus(element.clone())),
            }
        }
    }
    Ok(values)
}

fn push_unique(values: &mut Vec<String>, item: &str) {
    if !values.iter().any(|v| v == item) {
        values.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers(items: &[&str]) -> Vec<Option<String>> {
        items.iter().map(|s| Some(s.to_string())).collect()
    }

    fn initial() -> Vec<String> {
        vec!["aaa".into(), "bbb".into(), "ccc".into()]
    }

    #[test]
    fn bare_layer_replaces() {
        assert_eq!(merge(&layers(&["ddd"]), None).unwrap(), ["ddd"]);
        assert_eq!(merge(&layers(&["ddd"]), Some(&initial())).unwrap(), ["ddd"]);
        assert_eq!(merge(&layers(&["xxx,yyy"]), None).unwrap(), ["xxx", "yyy"]);
    }

    #[test]
    fn plus_appends() {
        assert_eq!(merge(&layers(&["+ddd"]), None).unwrap(), ["ddd"]);
        assert_eq!(
            merge(&layers(&["+ddd"]), Some(&initial())).unwrap(),
            ["aaa", "bbb", "ccc", "ddd"]
        );
    }

    #[test]
    fn plus_existing_is_noop() {
        assert_eq!(
            merge(&layers(&["+bbb"]), Some(&initial())).unwrap(),
            ["aaa", "bbb", "ccc"]
        );
    }

    #[test]
    fn minus_removes() {
        assert_eq!(
            merge(&layers(&["-bbb"]), Some(&initial())).unwrap(),
            ["aaa", "ccc"]
        );
        assert_eq!(merge(&layers(&["-bbb"]), None).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn mixed_markers_in_one_layer() {
        assert_eq!(
            merge(&layers(&["-aaa, -bbb"]), Some(&initial())).unwrap(),
            ["ccc"]
        );
        assert_eq!(
            merge(&layers(&["-aaa, +ddd, +eee"]), Some(&initial())).unwrap(),
            ["bbb", "ccc", "ddd", "eee"]
        );
    }

    #[test]
    fn marked_and_bare_mix_is_an_error() {
        let err = merge(&layers(&["+x, y"]), None).unwrap_err();
        assert!(matches!(err, FetchError::MixedPlusMinus(_)));
    }

    #[test]
    fn lone_marker_is_an_error() {
        let err = merge(&layers(&["+ddd, -"]), None).unwrap_err();
        assert!(matches!(err, FetchError::MixedPlusMinus(_)));
    }

    #[test]
    fn absent_and_empty_layers_skipped() {
        let adjusts = vec![None, Some(String::new()), Some("+ddd".to_string())];
        assert_eq!(
            merge(&adjusts, Some(&initial())).unwrap(),
            ["aaa", "bbb", "ccc", "ddd"]
        );
    }

    #[test]
    fn later_layers_apply_to_earlier_replacement() {
        assert_eq!(
            merge(&layers(&["xxx, yyy", "-yyy"]), None).unwrap(),
            ["xxx"]
        );
    }

    #[test]
    fn duplicates_suppressed_first_occurrence_wins() {
        assert_eq!(merge(&layers(&["a, b, a"]), None).unwrap(), ["a", "b"]);
    }
}
