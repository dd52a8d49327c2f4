use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Reference-file keyword assembly
// ---------------------------------------------------------------------------

/// Optional metadata for [`reference_file_keywords`], with the standard
/// defaults used across the NIRISS reference products.
#[derive(Debug, Clone)]
pub struct KeywordOptions {
    pub author: String,
    pub description: String,
    pub title: String,
    /// ISO-8601 timestamp after which the reference file applies.
    pub useafter: String,
    pub filename: String,
    pub filtername: Option<String>,
    pub pupil: Option<String>,
}

impl Default for KeywordOptions {
    fn default() -> Self {
        Self {
            author: "STScI".to_string(),
            description: "NIRISS Reference File".to_string(),
            title: "NIRISS Reference File".to_string(),
            useafter: "2014-01-01T00:00:00".to_string(),
            filename: String::new(),
            filtername: None,
            pupil: None,
        }
    }
}

/// Build the common keyword mapping for a reference file.
///
/// `exp_type` may also be `"N/A"` or `"ANY"`. Caller-supplied `overrides`
/// are merged last and win on key collision, including replacing whole
/// nested objects such as `instrument`.
pub fn reference_file_keywords(
    reftype: &str,
    exp_type: &str,
    options: &KeywordOptions,
    overrides: BTreeMap<String, Value>,
) -> Result<Map<String, Value>, ConfigError> {
    if reftype.is_empty() {
        return Err(ConfigError::InvalidInput("expected a reftype".to_string()));
    }
    if exp_type.is_empty() {
        return Err(ConfigError::InvalidInput("expected an exp_type".to_string()));
    }

    let mut instrument = Map::new();
    instrument.insert("name".to_string(), json!("NIRISS"));
    instrument.insert("detector".to_string(), json!("NIS"));
    if let Some(filtername) = &options.filtername {
        instrument.insert("filter".to_string(), json!(filtername));
    }
    if let Some(pupil) = &options.pupil {
        instrument.insert("pupil".to_string(), json!(pupil));
    }

    let mut keywords = Map::new();
    keywords.insert("author".to_string(), json!(options.author));
    keywords.insert("description".to_string(), json!(options.description));
    keywords.insert("exposure".to_string(), json!({ "type": exp_type }));
    keywords.insert("instrument".to_string(), Value::Object(instrument));
    keywords.insert("pedigree".to_string(), json!("ground"));
    keywords.insert("reftype".to_string(), json!(reftype));
    keywords.insert("telescope".to_string(), json!("JWST"));
    keywords.insert("title".to_string(), json!(options.title));
    keywords.insert("useafter".to_string(), json!(options.useafter));
    keywords.insert("filename".to_string(), json!(options.filename));

    for (key, value) in overrides {
        keywords.insert(key, value);
    }

    Ok(keywords)
}
