//! Merging of several compose documents into one
//!
//! Later documents override earlier ones: mappings merge key by key,
//! sequences are unioned in order of first appearance and scalars are
//! replaced. `command` and `entrypoint` are replaced wholesale since their
//! elements are positional.

use serde_yaml::Value;

const REPLACED_SEQUENCES: &[&str] = &["command", "entrypoint"];

pub fn merge_documents(base: &mut Value, overlay: Value) {
    merge_value(base, overlay, None);
}

fn merge_value(base: &mut Value, overlay: Value, key: Option<&str>) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (k, v) in overlay_map {
                let child_key = k.as_str().map(str::to_string);
                match base_map.get_mut(&k) {
                    Some(existing) => merge_value(existing, v, child_key.as_deref()),
                    None => {
                        base_map.insert(k, v);
                    }
                }
            }
        }
        (Value::Sequence(base_seq), Value::Sequence(overlay_seq))
            if !key.is_some_and(|k| REPLACED_SEQUENCES.contains(&k)) =>
        {
            for item in overlay_seq {
                if !base_seq.contains(&item) {
                    base_seq.push(item);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
