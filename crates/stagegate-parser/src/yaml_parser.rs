//! YAML Parser
//!
//! Field accessors and conversions shared by the document parsers.

use crate::error::{ParseError, Result};
use serde_yaml::Value as YamlValue;
use stagegate_core::Value;
use std::collections::HashMap;

/// YAML parser utilities
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML string into a YAML value
    pub fn parse(yaml_str: &str) -> Result<YamlValue> {
        serde_yaml::from_str(yaml_str).map_err(|e| ParseError::ParseError(e.to_string()))
    }

    /// Parse YAML string containing multiple documents
    ///
    /// Documents are separated by `---`. A `parameter:` key at column 0 also
    /// starts a new document, so several wrapped definitions can share a file
    /// without explicit separators. Empty documents are skipped.
    pub fn parse_multi_document(yaml_str: &str) -> Result<Vec<YamlValue>> {
        use serde::Deserialize;

        let preprocessed = Self::preprocess_multi_document(yaml_str);
        let deserializer = serde_yaml::Deserializer::from_str(&preprocessed);
        let mut documents = Vec::new();

        for document in deserializer {
            let value = YamlValue::deserialize(document)
                .map_err(|e| ParseError::ParseError(e.to_string()))?;
            if !value.is_null() {
                documents.push(value);
            }
        }

        Ok(documents)
    }

    /// Insert `---` before every `parameter:` line after the first one
    fn preprocess_multi_document(yaml_str: &str) -> String {
        let mut result = String::with_capacity(yaml_str.len() + 64);
        let mut seen_definition = false;
        let mut recent_separator = false;

        for line in yaml_str.lines() {
            let trimmed = line.trim();
            let is_definition_start = !line.starts_with(' ')
                && !line.starts_with('\t')
                && trimmed.starts_with("parameter:");

            if is_definition_start && seen_definition && !recent_separator {
                result.push_str("---\n");
            }
            if is_definition_start {
                seen_definition = true;
            }

            result.push_str(line);
            result.push('\n');

            if trimmed == "---" {
                recent_separator = true;
            } else if !trimmed.is_empty() && !trimmed.starts_with('#') {
                recent_separator = false;
            }
        }

        result
    }

    /// Get a required string field from YAML object
    pub fn get_string(obj: &YamlValue, field: &str) -> Result<String> {
        obj.get(field)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ParseError::MissingField {
                field: field.to_string(),
            })
    }

    /// Get an optional string field from YAML object
    pub fn get_optional_string(obj: &YamlValue, field: &str) -> Option<String> {
        obj.get(field)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Get the first present string among several accepted spellings
    pub fn get_string_any(obj: &YamlValue, fields: &[&str]) -> Result<String> {
        fields
            .iter()
            .find_map(|field| Self::get_optional_string(obj, field))
            .ok_or_else(|| ParseError::MissingField {
                field: fields.first().copied().unwrap_or_default().to_string(),
            })
    }

    /// Get an optional unsigned integer field from YAML object
    pub fn get_optional_u64(obj: &YamlValue, field: &str) -> Option<u64> {
        obj.get(field).and_then(|v| v.as_u64())
    }

    /// Get a required array field from YAML object
    pub fn get_array<'a>(obj: &'a YamlValue, field: &str) -> Result<&'a Vec<YamlValue>> {
        obj.get(field)
            .and_then(|v| v.as_sequence())
            .ok_or_else(|| ParseError::MissingField {
                field: field.to_string(),
            })
    }

    /// Get an optional array field from YAML object
    pub fn get_optional_array<'a>(obj: &'a YamlValue, field: &str) -> Option<&'a Vec<YamlValue>> {
        obj.get(field).and_then(|v| v.as_sequence())
    }

    /// Get an optional object field from YAML object
    pub fn get_optional_object<'a>(
        obj: &'a YamlValue,
        field: &str,
    ) -> Option<&'a serde_yaml::Mapping> {
        obj.get(field).and_then(|v| v.as_mapping())
    }

    /// Check if a field exists in YAML object
    pub fn has_field(obj: &YamlValue, field: &str) -> bool {
        obj.get(field).is_some()
    }

    /// Get all keys from a YAML mapping
    pub fn get_keys(obj: &YamlValue) -> Vec<String> {
        if let Some(mapping) = obj.as_mapping() {
            mapping
                .keys()
                .filter_map(|k| k.as_str())
                .map(|s| s.to_string())
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Name of a YAML value's type, used in error messages
    pub fn type_name(value: &YamlValue) -> &'static str {
        match value {
            YamlValue::Null => "null",
            YamlValue::Bool(_) => "bool",
            YamlValue::Number(_) => "number",
            YamlValue::String(_) => "string",
            YamlValue::Sequence(_) => "sequence",
            YamlValue::Mapping(_) => "mapping",
            YamlValue::Tagged(_) => "tagged value",
        }
    }

    /// Convert a YAML value into a model [`Value`]
    ///
    /// Mapping keys must be strings; `field` names the location for errors.
    pub fn to_value(value: &YamlValue, field: &str) -> Result<Value> {
        match value {
            YamlValue::Null => Ok(Value::Null),
            YamlValue::Bool(b) => Ok(Value::Bool(*b)),
            YamlValue::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| ParseError::invalid(field, format!("unsupported number {}", n))),
            YamlValue::String(s) => Ok(Value::String(s.clone())),
            YamlValue::Sequence(items) => items
                .iter()
                .map(|item| Self::to_value(item, field))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            YamlValue::Mapping(mapping) => {
                let mut map = HashMap::new();
                for (key, item) in mapping {
                    let key = key.as_str().ok_or_else(|| ParseError::TypeMismatch {
                        field: field.to_string(),
                        expected: "string key".to_string(),
                        actual: Self::type_name(key).to_string(),
                    })?;
                    map.insert(key.to_string(), Self::to_value(item, field)?);
                }
                Ok(Value::Object(map))
            }
            YamlValue::Tagged(tagged) => Self::to_value(&tagged.value, field),
        }
    }

    /// Validate YAML structure has required fields
    pub fn validate_required_fields(obj: &YamlValue, fields: &[&str]) -> Result<()> {
        for field in fields {
            if !Self::has_field(obj, field) {
                return Err(ParseError::MissingField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Validate fields in a YAML object against a list of known fields
    ///
    /// Returns one warning per unknown field, with a suggestion when a known
    /// field is close enough.
    pub fn validate_fields(obj: &YamlValue, known_fields: &[&str], context: &str) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(mapping) = obj.as_mapping() {
            for (key, _) in mapping {
                if let Some(field_name) = key.as_str() {
                    if !known_fields.contains(&field_name) {
                        let typo_correction = FIELD_CORRECTIONS
                            .iter()
                            .find(|(typo, _)| *typo == field_name)
                            .map(|(_, correct)| *correct);

                        let suggestion = if let Some(correct) = typo_correction {
                            format!(" Did you mean '{}'?", correct)
                        } else if let Some(similar) =
                            Self::find_similar_field(field_name, known_fields)
                        {
                            format!(" Did you mean '{}'?", similar)
                        } else {
                            String::new()
                        };

                        warnings.push(format!(
                            "Unknown field '{}' in {}.{}",
                            field_name, context, suggestion
                        ));
                    }
                }
            }
        }

        warnings
    }

    /// Validate fields strictly - returns error if unknown fields found
    pub fn validate_fields_strict(
        obj: &YamlValue,
        known_fields: &[&str],
        context: &str,
    ) -> Result<()> {
        let errors = Self::validate_fields(obj, known_fields, context);

        if !errors.is_empty() {
            for error in &errors {
                log::error!("Field validation error: {}", error);
            }
            return Err(ParseError::UnknownField(errors.join("; ")));
        }

        Ok(())
    }

    /// Find similar field names using Levenshtein distance
    fn find_similar_field(field: &str, known_fields: &[&str]) -> Option<String> {
        known_fields
            .iter()
            .filter(|known| levenshtein_distance(field, known) <= 2)
            .min_by_key(|known| levenshtein_distance(field, known))
            .map(|s| s.to_string())
    }
}

/// Common field name typos and their corrections
const FIELD_CORRECTIONS: &[(&str, &str)] = &[
    ("default_val", "default"),
    ("defaults", "default"),
    ("datatype", "data_type"),
    ("rule", "rules"),
    ("filter", "filters"),
    ("condition", "conditions"),
    ("operand", "operands"),
    ("desc", "description"),
    ("staging", "test"),
    ("development", "dev"),
    ("production", "prod"),
];

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for (i, &c1) in s1_chars.iter().enumerate() {
        for (j, &c2) in s2_chars.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            matrix[i + 1][j + 1] = std::cmp::min(
                std::cmp::min(matrix[i][j + 1] + 1, matrix[i + 1][j] + 1),
                matrix[i][j] + cost,
            );
        }
    }

    matrix[len1][len2]
}
