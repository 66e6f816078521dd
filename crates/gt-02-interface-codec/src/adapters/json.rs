//! # JSON Interface Documents
//!
//! Two document shapes are accepted:
//!
//! - the compact catalog shape, an object keyed by method name:
//!   `{"setUnlockingPeriod": {"inputs": [["value", "uint256"]], "outputs": []}}`
//!   where each parameter is either a `[name, type]` pair or an object;
//! - a standard Ethereum JSON ABI array. Entries other than functions
//!   (events, errors, constructor, fallback) are ignored.

use crate::domain::interface::{InterfaceDescription, MethodDescriptor, Param};
use crate::domain::param_type::ParamType;
use crate::errors::CodecError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct AbiParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    components: Vec<AbiParam>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParamSpec {
    Pair(String, String),
    Object(AbiParam),
}

#[derive(Debug, Deserialize)]
struct AbiEntry {
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Deserialize)]
struct CompactMethod {
    #[serde(default)]
    inputs: Vec<ParamSpec>,
    #[serde(default)]
    outputs: Vec<ParamSpec>,
}

/// Parse an interface document in either accepted shape.
pub fn parse_interface(text: &str) -> Result<InterfaceDescription, CodecError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| CodecError::InvalidDescription(e.to_string()))?;
    match value {
        Value::Array(_) => parse_abi(value),
        Value::Object(_) => parse_compact(value),
        _ => Err(CodecError::InvalidDescription(
            "expected an ABI array or a method table".into(),
        )),
    }
}

fn parse_abi(value: Value) -> Result<InterfaceDescription, CodecError> {
    let entries: Vec<AbiEntry> =
        serde_json::from_value(value).map_err(|e| CodecError::InvalidDescription(e.to_string()))?;
    let methods = entries
        .into_iter()
        .filter(|entry| entry.kind == "function")
        .map(|entry| {
            Ok(MethodDescriptor::new(
                entry.name,
                resolve_params(entry.inputs)?,
                resolve_params(entry.outputs)?,
            ))
        })
        .collect::<Result<Vec<_>, CodecError>>()?;
    InterfaceDescription::new(methods)
}

fn parse_compact(value: Value) -> Result<InterfaceDescription, CodecError> {
    let table: BTreeMap<String, CompactMethod> =
        serde_json::from_value(value).map_err(|e| CodecError::InvalidDescription(e.to_string()))?;
    let methods = table
        .into_iter()
        .map(|(name, method)| {
            Ok(MethodDescriptor::new(
                name,
                resolve_specs(method.inputs)?,
                resolve_specs(method.outputs)?,
            ))
        })
        .collect::<Result<Vec<_>, CodecError>>()?;
    InterfaceDescription::new(methods)
}

fn resolve_specs(specs: Vec<ParamSpec>) -> Result<Vec<Param>, CodecError> {
    specs
        .into_iter()
        .map(|spec| match spec {
            ParamSpec::Pair(name, kind) => Param::new(name, &kind),
            ParamSpec::Object(param) => resolve_param(param),
        })
        .collect()
}

fn resolve_params(params: Vec<AbiParam>) -> Result<Vec<Param>, CodecError> {
    params.into_iter().map(resolve_param).collect()
}

fn resolve_param(param: AbiParam) -> Result<Param, CodecError> {
    Ok(Param {
        kind: resolve_type(&param.kind, param.components)?,
        name: param.name,
    })
}

/// `tuple`, `tuple[]`, `tuple[2][]` take their members from `components`.
fn resolve_type(kind: &str, components: Vec<AbiParam>) -> Result<ParamType, CodecError> {
    let Some(suffix) = kind.strip_prefix("tuple") else {
        return kind.parse();
    };
    let members = components
        .into_iter()
        .map(|c| resolve_type(&c.kind, c.components))
        .collect::<Result<Vec<_>, _>>()?;
    let tuple = ParamType::Tuple(members);
    format!("{tuple}{suffix}").parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_shape() {
        let description = parse_interface(
            r#"{
                "electableValidators": {
                    "inputs": [],
                    "outputs": [["min", "uint256"], {"name": "max", "type": "uint256"}]
                },
                "setElectableValidators": {
                    "inputs": [["min", "uint256"], ["max", "uint256"]]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(description.len(), 2);
        let getter = description.method("electableValidators").unwrap();
        assert_eq!(getter.outputs().len(), 2);
        assert_eq!(getter.outputs()[1].name, "max");
        assert_eq!(
            description.method("setElectableValidators").unwrap().signature(),
            "setElectableValidators(uint256,uint256)"
        );
    }

    #[test]
    fn test_standard_abi_skips_non_functions() {
        let description = parse_interface(
            r#"[
                {"type": "constructor", "inputs": [{"name": "test", "type": "bool"}]},
                {"type": "event", "name": "ProposalQueued", "inputs": [], "anonymous": false},
                {"constant": true, "inputs": [], "name": "initialized",
                 "outputs": [{"internalType": "bool", "name": "", "type": "bool"}],
                 "payable": false, "stateMutability": "view", "type": "function"}
            ]"#,
        )
        .unwrap();
        assert_eq!(description.len(), 1);
        assert!(description.contains("initialized"));
    }

    #[test]
    fn test_tuple_components() {
        let description = parse_interface(
            r#"[{"type": "function", "name": "f", "inputs": [
                {"name": "entries", "type": "tuple[]", "components": [
                    {"name": "who", "type": "address"},
                    {"name": "amounts", "type": "uint256[2]"}
                ]}
            ], "outputs": []}]"#,
        )
        .unwrap();
        assert_eq!(
            description.method("f").unwrap().signature(),
            "f((address,uint256[2])[])"
        );
    }

    #[test]
    fn test_overloads_rejected() {
        let err = parse_interface(
            r#"[
                {"type": "function", "name": "vote", "inputs": [{"name": "a", "type": "uint256"}]},
                {"type": "function", "name": "vote", "inputs": []}
            ]"#,
        )
        .unwrap_err();
        assert_eq!(err, CodecError::DuplicateMethod("vote".into()));
    }

    #[test]
    fn test_bad_documents() {
        assert!(matches!(parse_interface("42"), Err(CodecError::InvalidDescription(_))));
        assert!(matches!(parse_interface("{"), Err(CodecError::InvalidDescription(_))));
        assert!(matches!(
            parse_interface(r#"{"f": {"inputs": [["a", "uint7"]]}}"#),
            Err(CodecError::InvalidType(_))
        ));
    }
}
