//! Parameter parser
//!
//! Parses YAML parameter definitions into [`ParameterDefinition`]s.
//!
//! A definition may be wrapped in a `parameter:` key or written bare. Rules use
//! either the explicit `filters` form or the `when:` shorthand:
//!
//! ```yaml
//! parameter:
//!   name: new_checkout
//!   stage: test
//!   default: false
//!   rules:
//!     - when:
//!         server_mode: [dev, test]
//!         app_version: ">= 2.1.0"
//!       value: true
//!     - filters:
//!         - type: client_platform
//!           conditions:
//!             - op: in
//!               operands: [ios, android]
//!       value: true
//! ```
//!
//! Rule contents are not validated here; that happens when the definition is
//! loaded into a registry.

use crate::error::{ParseError, Result};
use crate::yaml_parser::YamlParser;
use serde_yaml::Value as YamlValue;
use stagegate_core::{
    AttributeKind, ConditionSpec, DataType, FilterSpec, FilterType, ParamName,
    ParameterDefinition, RuleSpec, Stage, Value,
};

const PARAMETER_FIELDS: &[&str] = &[
    "name",
    "description",
    "stage",
    "data_type",
    "type",
    "default",
    "default_value",
    "rules",
    "revision",
];

const RULE_FIELDS: &[&str] = &["filters", "when", "value", "value_when_matched"];

/// Operator prefixes recognised in `when:` shorthand values, longest first
const SHORTHAND_OPERATORS: &[(&str, &str)] = &[
    (">=", "ge"),
    ("<=", "le"),
    ("!=", "ne"),
    ("==", "eq"),
    (">", "gt"),
    ("<", "lt"),
    ("=", "eq"),
];

/// Parameter definition parser
pub struct ParameterParser;

impl ParameterParser {
    /// Parse a single parameter definition from a YAML string
    pub fn parse(yaml_str: &str) -> Result<ParameterDefinition> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    /// Parse every parameter definition in a (possibly multi-document) YAML string
    pub fn parse_all(yaml_str: &str) -> Result<Vec<ParameterDefinition>> {
        YamlParser::parse_multi_document(yaml_str)?
            .iter()
            .map(Self::parse_from_yaml)
            .collect()
    }

    /// Parse a parameter definition from a YAML value
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<ParameterDefinition> {
        let obj = yaml.get("parameter").unwrap_or(yaml);

        for warning in YamlParser::validate_fields(obj, PARAMETER_FIELDS, "parameter") {
            log::warn!("{}", warning);
        }

        let raw_name = YamlParser::get_string(obj, "name")?;
        let name = ParamName::new(raw_name).map_err(|e| ParseError::invalid("name", e))?;

        let stage = YamlParser::get_string(obj, "stage")?
            .parse::<Stage>()
            .map_err(|e| ParseError::invalid("stage", e))?;

        let data_type = match YamlParser::get_optional_string(obj, "data_type")
            .or_else(|| YamlParser::get_optional_string(obj, "type"))
        {
            Some(raw) => raw
                .parse::<DataType>()
                .map_err(|e| ParseError::invalid("data_type", e))?,
            None => DataType::Bool,
        };

        let default_yaml = obj
            .get("default")
            .or_else(|| obj.get("default_value"))
            .ok_or_else(|| ParseError::MissingField {
                field: "default".to_string(),
            })?;
        let default_value = YamlParser::to_value(default_yaml, "default")?;

        let rules = match YamlParser::get_optional_array(obj, "rules") {
            Some(items) => items
                .iter()
                .enumerate()
                .map(|(index, rule)| Self::parse_rule(rule, index))
                .collect::<Result<Vec<_>>>()?,
            None if YamlParser::has_field(obj, "rules") && !obj["rules"].is_null() => {
                return Err(ParseError::TypeMismatch {
                    field: "rules".to_string(),
                    expected: "sequence".to_string(),
                    actual: YamlParser::type_name(&obj["rules"]).to_string(),
                });
            }
            None => Vec::new(),
        };

        Ok(ParameterDefinition {
            name,
            description: YamlParser::get_optional_string(obj, "description").unwrap_or_default(),
            stage,
            data_type,
            default_value,
            rules,
            revision: YamlParser::get_optional_u64(obj, "revision").unwrap_or(0),
        })
    }

    /// Parse one rule entry
    fn parse_rule(rule: &YamlValue, index: usize) -> Result<RuleSpec> {
        let context = format!("rules[{}]", index);
        for warning in YamlParser::validate_fields(rule, RULE_FIELDS, &context) {
            log::warn!("{}", warning);
        }

        let value_yaml = rule
            .get("value")
            .or_else(|| rule.get("value_when_matched"))
            .ok_or_else(|| ParseError::MissingField {
                field: format!("{}.value", context),
            })?;
        let value = YamlParser::to_value(value_yaml, &format!("{}.value", context))?;

        let mut filters = Vec::new();
        if let Some(items) = YamlParser::get_optional_array(rule, "filters") {
            for (i, filter) in items.iter().enumerate() {
                filters.push(Self::parse_filter(filter, &format!("{}.filters[{}]", context, i))?);
            }
        }
        if let Some(when) = YamlParser::get_optional_object(rule, "when") {
            for (key, spec) in when {
                let filter_type = key.as_str().ok_or_else(|| ParseError::TypeMismatch {
                    field: format!("{}.when", context),
                    expected: "string key".to_string(),
                    actual: YamlParser::type_name(key).to_string(),
                })?;
                filters.push(Self::parse_shorthand(
                    filter_type,
                    spec,
                    &format!("{}.when.{}", context, filter_type),
                )?);
            }
        }

        Ok(RuleSpec { filters, value })
    }

    /// Parse an explicit `{type, conditions}` filter
    fn parse_filter(filter: &YamlValue, context: &str) -> Result<FilterSpec> {
        let filter_type = YamlParser::get_string_any(filter, &["type", "filter_type", "filterType"])
            .map_err(|_| ParseError::MissingField {
                field: format!("{}.type", context),
            })?;

        let conditions = match YamlParser::get_optional_array(filter, "conditions") {
            Some(items) => items
                .iter()
                .enumerate()
                .map(|(i, c)| Self::parse_condition(c, &format!("{}.conditions[{}]", context, i)))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(FilterSpec {
            filter_type,
            conditions,
        })
    }

    /// Parse an explicit `{op, operands}` condition
    ///
    /// `operands` may be a single scalar or a list.
    fn parse_condition(condition: &YamlValue, context: &str) -> Result<ConditionSpec> {
        let operator = YamlParser::get_string_any(condition, &["op", "operator"]).map_err(|_| {
            ParseError::MissingField {
                field: format!("{}.op", context),
            }
        })?;

        let field = format!("{}.operands", context);
        let operands = match condition.get("operands").or_else(|| condition.get("operand")) {
            Some(YamlValue::Sequence(items)) => items
                .iter()
                .map(|item| YamlParser::to_value(item, &field))
                .collect::<Result<Vec<_>>>()?,
            Some(YamlValue::Null) | None => Vec::new(),
            Some(scalar) => vec![YamlParser::to_value(scalar, &field)?],
        };

        Ok(ConditionSpec { operator, operands })
    }

    /// Parse a `when:` shorthand entry into a filter
    ///
    /// A list yields one condition per element (OR); a scalar yields one
    /// condition. String elements may carry an operator prefix such as `>= 2.1`.
    fn parse_shorthand(filter_type: &str, spec: &YamlValue, context: &str) -> Result<FilterSpec> {
        let kind = filter_type.parse::<FilterType>().ok().map(|ft| ft.kind());

        let conditions = match spec {
            YamlValue::Sequence(items) => items
                .iter()
                .map(|item| Self::parse_shorthand_condition(item, kind, context))
                .collect::<Result<Vec<_>>>()?,
            other => vec![Self::parse_shorthand_condition(other, kind, context)?],
        };

        Ok(FilterSpec {
            filter_type: filter_type.to_string(),
            conditions,
        })
    }

    fn parse_shorthand_condition(
        item: &YamlValue,
        kind: Option<AttributeKind>,
        context: &str,
    ) -> Result<ConditionSpec> {
        let Some(text) = item.as_str() else {
            if item.is_sequence() || item.is_mapping() {
                return Err(ParseError::TypeMismatch {
                    field: context.to_string(),
                    expected: "scalar".to_string(),
                    actual: YamlParser::type_name(item).to_string(),
                });
            }
            return Ok(ConditionSpec::new("eq", vec![YamlParser::to_value(item, context)?]));
        };

        let text = text.trim();
        let (operator, rest) = SHORTHAND_OPERATORS
            .iter()
            .find_map(|(prefix, op)| text.strip_prefix(prefix).map(|rest| (*op, rest.trim())))
            .unwrap_or(("eq", text));

        if rest.is_empty() {
            return Err(ParseError::invalid(context, format!("missing operand in '{}'", text)));
        }

        let operand = match kind {
            Some(AttributeKind::Number) => rest
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::from(rest)),
            _ => Value::from(rest),
        };

        Ok(ConditionSpec::new(operator, vec![operand]))
    }
}
