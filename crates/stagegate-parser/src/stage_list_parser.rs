//! Stage-list parser
//!
//! Parses the per-stage declaration of parameter names:
//!
//! ```yaml
//! stages:
//!   dev: [search_v2]
//!   test: [new_checkout]
//!   prod: [dark_mode]
//!   deprecated: []
//! ```
//!
//! The `stages:` wrapper is optional. Missing stages are empty.

use crate::error::{ParseError, Result};
use crate::yaml_parser::YamlParser;
use serde_yaml::Value as YamlValue;
use stagegate_core::{ParamName, Stage, StageLists};

const STAGE_FIELDS: &[&str] = &["dev", "test", "prod", "deprecated"];

/// Stage-list parser
pub struct StageListParser;

impl StageListParser {
    /// Parse stage lists from a YAML string
    pub fn parse(yaml_str: &str) -> Result<StageLists> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    /// Parse stage lists from a YAML value
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<StageLists> {
        let obj = yaml.get("stages").unwrap_or(yaml);
        if obj.is_null() {
            return Ok(StageLists::new());
        }
        if !obj.is_mapping() {
            return Err(ParseError::TypeMismatch {
                field: "stages".to_string(),
                expected: "mapping".to_string(),
                actual: YamlParser::type_name(obj).to_string(),
            });
        }

        YamlParser::validate_fields_strict(obj, STAGE_FIELDS, "stages")?;

        let mut lists = StageLists::new();
        for stage in Stage::ALL {
            let field = format!("stages.{}", stage);
            let entries = match obj.get(stage.as_str()) {
                None | Some(YamlValue::Null) => continue,
                Some(YamlValue::Sequence(entries)) => entries,
                Some(other) => {
                    return Err(ParseError::TypeMismatch {
                        field,
                        expected: "sequence".to_string(),
                        actual: YamlParser::type_name(other).to_string(),
                    });
                }
            };

            for entry in entries {
                let raw = entry.as_str().ok_or_else(|| ParseError::TypeMismatch {
                    field: field.clone(),
                    expected: "string".to_string(),
                    actual: YamlParser::type_name(entry).to_string(),
                })?;
                let name = ParamName::new(raw).map_err(|e| ParseError::invalid(field.clone(), e))?;
                lists = lists.with(stage, name);
            }
        }

        log::debug!("Parsed stage lists with {} names", lists.len());
        Ok(lists)
    }
}
