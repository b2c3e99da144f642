use serde_yaml::Value;
use sha2::{Digest, Sha256};

/// Digest over the canonical rendering of every bundle document.
///
/// Documents are combined in the fixed order supplied by the caller; inside a
/// document the rendering sorts mapping keys, so two loads of identical
/// content always hash identically regardless of key ordering on disk.
pub(crate) fn bundle_checksum<'a, I>(documents: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut hasher = Sha256::new();
    for (label, document) in documents {
        let mut rendered = String::new();
        canonical_fragment(document, &mut rendered);
        hasher.update(label.as_bytes());
        hasher.update(b"\n");
        hasher.update(rendered.as_bytes());
        hasher.update(b"\n");
    }

    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn canonical_fragment(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                out.push_str(&int.to_string());
            } else if let Some(uint) = number.as_u64() {
                out.push_str(&uint.to_string());
            } else {
                out.push_str(&format!("{}", number.as_f64().unwrap_or(f64::NAN)));
            }
        }
        Value::String(text) => out.push_str(&format!("{text:?}")),
        Value::Sequence(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                canonical_fragment(item, out);
            }
            out.push(']');
        }
        Value::Mapping(mapping) => {
            let mut entries: Vec<(String, String)> = mapping
                .iter()
                .map(|(key, entry)| {
                    let mut key_fragment = String::new();
                    canonical_fragment(key, &mut key_fragment);
                    let mut entry_fragment = String::new();
                    canonical_fragment(entry, &mut entry_fragment);
                    (key_fragment, entry_fragment)
                })
                .collect();
            entries.sort();

            out.push('{');
            for (index, (key, entry)) in entries.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                out.push_str(key);
                out.push(':');
                out.push_str(entry);
            }
            out.push('}');
        }
        Value::Tagged(tagged) => {
            out.push_str(&format!("!{} ", tagged.tag));
            canonical_fragment(&tagged.value, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Value {
        serde_yaml::from_str(raw).expect("fixture yaml parses")
    }

    #[test]
    fn checksum_independent_of_key_order() {
        let a = parse("id: alpha\nversion: '1'\nweights:\n  x: 1\n  y: 2\n");
        let b = parse("weights:\n  y: 2\n  x: 1\nversion: '1'\nid: alpha\n");
        assert_eq!(
            bundle_checksum([("manifest", &a)]),
            bundle_checksum([("manifest", &b)]),
        );
    }

    #[test]
    fn checksum_sensitive_to_content_edits() {
        let a = parse("id: alpha\nversion: '1'\n");
        let b = parse("id: alpha\nversion: '2'\n");
        assert_ne!(
            bundle_checksum([("manifest", &a)]),
            bundle_checksum([("manifest", &b)]),
        );
    }

    #[test]
    fn checksum_sensitive_to_document_label() {
        let doc = parse("signals: [hiring_surge]\n");
        assert_ne!(
            bundle_checksum([("taxonomy", &doc)]),
            bundle_checksum([("policy", &doc)]),
        );
    }
}
