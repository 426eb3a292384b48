//! Field projection by dotted path.
//!
//! Records expose their top-level fields through [`FieldView`]; everything
//! below the top level is walked as JSON, so structs and keyed maps are
//! traversed the same way. Every segment matches case-insensitively.
//!
//! A path that fails to resolve at any segment is left out of the result.
//! This is the contract that lets callers ask for optional fields without
//! checking for them first.

use serde_json::{Map, Value};

/// Named access to a record's top-level fields.
pub trait FieldView {
    /// Canonical spelling of every top-level field, in declaration order.
    fn field_names(&self) -> &'static [&'static str];

    /// Value of the field whose canonical name is `name`.
    ///
    /// Returns `None` when the field is absent on this record.
    fn field_value(&self, name: &str) -> Option<Value>;

    /// Canonical name for a case-insensitive field name.
    fn canonical_field(&self, name: &str) -> Option<&'static str> {
        self.field_names()
            .iter()
            .copied()
            .find(|field| field.eq_ignore_ascii_case(name))
    }
}

/// Project the requested `paths` out of `record`.
///
/// The result is keyed by each path's top-level field (canonical spelling),
/// with nested segments rebuilt as the minimal object along the path. Paths
/// sharing a top-level field merge. Keys appear in the order their
/// top-level field was first requested.
///
/// A purely numeric segment indexes into a list. The rebuilt parent is then
/// an object keyed by that index (`{"sizes": {"1": 32}}`), not an array, so
/// the list type is not kept; request the list itself to get an array back.
pub fn project<R, S>(record: &R, paths: &[S]) -> Map<String, Value>
where
    R: FieldView + ?Sized,
    S: AsRef<str>,
{
    let mut result = Map::new();
    let mut written: Vec<Vec<String>> = Vec::new();

    for path in paths {
        let Some((keys, leaf)) = resolve_path(record, path.as_ref()) else {
            continue;
        };
        // A shorter path already copied this whole subtree.
        if written.iter().any(|done| keys.starts_with(done)) {
            continue;
        }
        insert_at(&mut result, &keys, leaf);
        written.push(keys);
    }

    result
}

/// Project every record in `records` with the same paths.
pub fn project_all<'a, R, S, I>(records: I, paths: &[S]) -> Vec<Value>
where
    R: FieldView + 'a,
    S: AsRef<str>,
    I: IntoIterator<Item = &'a R>,
{
    records
        .into_iter()
        .map(|record| Value::Object(project(record, paths)))
        .collect()
}

/// Resolve one dotted path to its canonical key chain and leaf value.
fn resolve_path<R: FieldView + ?Sized>(record: &R, path: &str) -> Option<(Vec<String>, Value)> {
    let mut segments = path.split('.').map(str::trim);
    let first = segments.next().filter(|s| !s.is_empty())?;

    let field = record.canonical_field(first)?;
    let root = record.field_value(field)?;

    let mut keys = vec![field.to_string()];
    let mut current = &root;
    for segment in segments {
        if segment.is_empty() {
            return None;
        }
        let (key, child) = descend(current, segment)?;
        keys.push(key);
        current = child;
    }

    Some((keys, current.clone()))
}

/// Step one segment into `value`.
fn descend<'v>(value: &'v Value, segment: &str) -> Option<(String, &'v Value)> {
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(segment) {
                return Some((segment.to_string(), child));
            }
            map.iter()
                .find(|(key, _)| key.to_lowercase() == segment.to_lowercase())
                .map(|(key, child)| (key.clone(), child))
        }
        Value::Array(items) => {
            let index: usize = segment.parse().ok()?;
            items.get(index).map(|child| (index.to_string(), child))
        }
        _ => None,
    }
}

fn insert_at(target: &mut Map<String, Value>, keys: &[String], leaf: Value) {
    let Some((last, parents)) = keys.split_last() else {
        return;
    };
    let mut map = target;
    for key in parents {
        let slot = map
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        map = match slot {
            Value::Object(inner) => inner,
            _ => return,
        };
    }
    map.insert(last.clone(), leaf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Sample {
        name: Value,
        flags: Value,
        motto: Option<String>,
    }

    impl FieldView for Sample {
        fn field_names(&self) -> &'static [&'static str] {
            &["name", "flags", "motto"]
        }

        fn field_value(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some(self.name.clone()),
                "flags" => Some(self.flags.clone()),
                "motto" => self.motto.clone().map(Value::String),
                _ => None,
            }
        }
    }

    fn sample() -> Sample {
        Sample {
            name: json!({
                "common": "Norway",
                "nativeName": { "nno": { "common": "Noreg" } }
            }),
            flags: json!({ "png": "no.png", "svg": "no.svg", "sizes": [16, 32] }),
            motto: None,
        }
    }

    #[test]
    fn zero_paths_is_empty() {
        let paths: [&str; 0] = [];
        assert!(project(&sample(), &paths).is_empty());
    }

    #[test]
    fn top_level_field() {
        let result = project(&sample(), &["NAME"]);
        assert_eq!(Value::Object(result), json!({ "name": sample().name }));
    }

    #[test]
    fn nested_path_keyed_by_top_level() {
        let result = project(&sample(), &["flags.SVG"]);
        assert_eq!(Value::Object(result), json!({ "flags": { "svg": "no.svg" } }));
    }

    #[test]
    fn map_keys_match_case_insensitively() {
        let result = project(&sample(), &["name.nativename.NNO.common"]);
        assert_eq!(
            Value::Object(result),
            json!({ "name": { "nativeName": { "nno": { "common": "Noreg" } } } })
        );
    }

    #[test]
    fn invalid_segment_omits_path() {
        let result = project(&sample(), &["flags.gif", "name.common", "nope", "flags..svg"]);
        assert_eq!(Value::Object(result), json!({ "name": { "common": "Norway" } }));
    }

    #[test]
    fn absent_optional_field_is_omitted() {
        let result = project(&sample(), &["motto"]);
        assert!(result.is_empty());
    }

    #[test]
    fn sibling_paths_merge() {
        let result = project(&sample(), &["flags.png", "flags.svg"]);
        assert_eq!(
            Value::Object(result),
            json!({ "flags": { "png": "no.png", "svg": "no.svg" } })
        );
    }

    #[test]
    fn wider_path_wins_in_either_order() {
        let full = json!({ "flags": sample().flags });
        assert_eq!(Value::Object(project(&sample(), &["flags", "flags.svg"])), full);
        assert_eq!(Value::Object(project(&sample(), &["flags.svg", "flags"])), full);
    }

    #[test]
    fn output_follows_first_request_order() {
        let result = project(&sample(), &["flags.svg", "name.common", "flags.png"]);
        let keys: Vec<&String> = result.keys().collect();
        assert_eq!(keys, vec!["flags", "name"]);
    }

    #[test]
    fn list_index_segment() {
        let result = project(&sample(), &["flags.sizes.1", "flags.sizes.9"]);
        assert_eq!(Value::Object(result), json!({ "flags": { "sizes": { "1": 32 } } }));

        let whole = project(&sample(), &["flags.sizes"]);
        assert!(whole["flags"]["sizes"].is_array());
    }

    #[test]
    fn project_all_applies_same_paths() {
        let records = vec![sample(), sample()];
        let projected = project_all(&records, &["flags.png"]);
        assert_eq!(projected.len(), 2);
        assert_eq!(projected[1], json!({ "flags": { "png": "no.png" } }));
    }
}
