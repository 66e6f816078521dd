//! # Interface Descriptions
//!
//! An [`InterfaceDescription`] is an arena of [`MethodDescriptor`]s plus a
//! name index. It is immutable once built; selectors are computed at build
//! time so lookups never hash.

use super::param_type::ParamType;
use super::token::Token;
use crate::errors::CodecError;
use shared_types::keccak256;
use std::collections::HashMap;
use std::fmt;

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Declared name; may be empty for outputs.
    pub name: String,
    /// Declared type.
    pub kind: ParamType,
}

impl Param {
    /// Build a parameter from a name and a type string.
    pub fn new(name: impl Into<String>, kind: &str) -> Result<Self, CodecError> {
        Ok(Self {
            name: name.into(),
            kind: kind.parse()?,
        })
    }
}

/// One method of an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    name: String,
    inputs: Vec<Param>,
    outputs: Vec<Param>,
    signature: String,
    selector: [u8; 4],
}

impl MethodDescriptor {
    /// Build a descriptor; the canonical signature and selector are derived.
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        let name = name.into();
        let types: Vec<String> = inputs.iter().map(|p| p.kind.canonical()).collect();
        let signature = format!("{name}({})", types.join(","));
        let selector = selector_of(&signature);
        Self {
            name,
            inputs,
            outputs,
            signature,
            selector,
        }
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared inputs in order.
    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    /// Declared outputs in order.
    pub fn outputs(&self) -> &[Param] {
        &self.outputs
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// First four bytes of `keccak256(signature)`.
    pub fn selector(&self) -> [u8; 4] {
        self.selector
    }

    /// Input types in order.
    pub fn input_types(&self) -> Vec<ParamType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// Output types in order.
    pub fn output_types(&self) -> Vec<ParamType> {
        self.outputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// Check arity and every argument against its declared type.
    pub fn check_args(&self, args: &[Token]) -> Result<(), CodecError> {
        if args.len() != self.inputs.len() {
            return Err(CodecError::ArityMismatch {
                method: self.name.clone(),
                expected: self.inputs.len(),
                actual: args.len(),
            });
        }
        for (i, (param, arg)) in self.inputs.iter().zip(args).enumerate() {
            let label = if param.name.is_empty() {
                format!("#{i}")
            } else {
                param.name.clone()
            };
            arg.type_check(&param.kind, &label)?;
        }
        Ok(())
    }
}

/// Selector for a canonical signature.
#[must_use]
pub fn selector_of(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Ordered, immutable collection of uniquely named methods.
#[derive(Debug, Clone, Default)]
pub struct InterfaceDescription {
    methods: Vec<MethodDescriptor>,
    by_name: HashMap<String, usize>,
}

impl InterfaceDescription {
    /// Build from descriptors, rejecting duplicate names.
    pub fn new(methods: impl IntoIterator<Item = MethodDescriptor>) -> Result<Self, CodecError> {
        let mut description = Self::default();
        for method in methods {
            if description.by_name.contains_key(method.name()) {
                return Err(CodecError::DuplicateMethod(method.name().to_string()));
            }
            description
                .by_name
                .insert(method.name().to_string(), description.methods.len());
            description.methods.push(method);
        }
        Ok(description)
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Result<&MethodDescriptor, CodecError> {
        self.by_name
            .get(name)
            .map(|&i| &self.methods[i])
            .ok_or_else(|| CodecError::UnknownMethod(name.to_string()))
    }

    /// Whether `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter()
    }

    /// Number of methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// True if no methods are declared.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Call data: 4-byte selector followed by the encoded arguments.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedCall(Vec<u8>);

impl EncodedCall {
    pub(crate) fn new(selector: [u8; 4], args: Vec<u8>) -> Self {
        let mut bytes = Vec::with_capacity(4 + args.len());
        bytes.extend_from_slice(&selector);
        bytes.extend(args);
        Self(bytes)
    }

    /// Method selector.
    pub fn selector(&self) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }

    /// Encoded arguments without the selector.
    pub fn args(&self) -> &[u8] {
        &self.0[4..]
    }

    /// Full call data.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Full call data, consuming the call.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for EncodedCall {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EncodedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedCall(0x{})", hex::encode(&self.0))
    }
}

impl fmt::Display for EncodedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Decoded return values, shaped by the number of declared outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The method declares no outputs.
    None,
    /// Exactly one declared output.
    Single(Token),
    /// Two or more outputs, positionally matching the declaration.
    Tuple(Vec<Token>),
}

impl Decoded {
    pub(crate) fn from_tokens(mut tokens: Vec<Token>) -> Self {
        match tokens.len() {
            0 => Self::None,
            1 => tokens.pop().map_or(Self::None, Self::Single),
            _ => Self::Tuple(tokens),
        }
    }

    /// The single value, if there is exactly one.
    pub fn into_single(self) -> Option<Token> {
        match self {
            Self::Single(token) => Some(token),
            _ => None,
        }
    }

    /// All values as a list, regardless of shape.
    pub fn into_tokens(self) -> Vec<Token> {
        match self {
            Self::None => Vec::new(),
            Self::Single(token) => vec![token],
            Self::Tuple(tokens) => tokens,
        }
    }
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("()"),
            Self::Single(token) => write!(f, "{token}"),
            Self::Tuple(tokens) => write!(f, "{}", Token::Tuple(tokens.clone())),
        }
    }
}
