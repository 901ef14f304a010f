use crate::collection::Document;
use crate::common::{Value, TAG_MAP_METADATA};
use std::collections::HashSet;

pub trait Metadata {
    fn get_info(&self) -> Document;
}

pub(crate) struct MapMeta {
    pub(crate) map_names: HashSet<String>,
}

impl MapMeta {
    pub fn new(metadata: &Document) -> Self {
        let mut map_names = HashSet::new();
        if let Ok(names) = metadata.get(TAG_MAP_METADATA) {
            if let Some(names) = names.as_array() {
                map_names.reserve(names.len());
                for name in names {
                    // Validate that array elements are strings before unwrapping
                    // This prevents panics on corrupted metadata
                    if let Some(name_str) = name.as_string() {
                        map_names.insert(name_str.to_string());
                    } else {
                        log::warn!("Non-string value in map metadata, skipping: {:?}", name);
                    }
                }
            }
        }

        MapMeta { map_names }
    }
}

impl Metadata for MapMeta {
    fn get_info(&self) -> Document {
        let mut doc = Document::new();
        let mut names_vec = Vec::with_capacity(self.map_names.len());
        for name in &self.map_names {
            names_vec.push(Value::String(name.clone()));
        }
        let names = Value::Array(names_vec);
        doc.put(TAG_MAP_METADATA, names).unwrap();
        doc
    }
}
