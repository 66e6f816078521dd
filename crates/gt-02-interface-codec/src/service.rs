//! # Interface Codec Service
//!
//! Encodes calls and decodes return data against an
//! [`InterfaceDescription`], addressing methods by name.

use crate::domain::abi::{decode_params, encode_params};
use crate::domain::interface::{Decoded, EncodedCall, InterfaceDescription};
use crate::domain::token::Token;
use crate::errors::CodecError;
use tracing::trace;

/// Stateless codec over interface descriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceCodec;

impl InterfaceCodec {
    /// Encode a call to `method` with `args`.
    ///
    /// # Errors
    ///
    /// - `UnknownMethod` if `method` is not declared
    /// - `ArityMismatch` if `args` has the wrong length
    /// - `TypeMismatch` if an argument does not fit its declared type
    pub fn encode(
        description: &InterfaceDescription,
        method: &str,
        args: &[Token],
    ) -> Result<EncodedCall, CodecError> {
        let descriptor = description.method(method)?;
        descriptor.check_args(args)?;
        let encoded = encode_params(&descriptor.input_types(), args)?;
        trace!(method = descriptor.signature(), bytes = encoded.len() + 4, "Encoded call");
        Ok(EncodedCall::new(descriptor.selector(), encoded))
    }

    /// Decode the return data of `method`.
    ///
    /// # Errors
    ///
    /// - `UnknownMethod` if `method` is not declared
    /// - `UnderflowingOutput` if `raw` is shorter than the declared outputs need
    /// - `InvalidOutput` if `raw` is not a valid encoding of the outputs
    pub fn decode(
        description: &InterfaceDescription,
        method: &str,
        raw: &[u8],
    ) -> Result<Decoded, CodecError> {
        let descriptor = description.method(method)?;
        let tokens = decode_params(&descriptor.output_types(), raw)?;
        Ok(Decoded::from_tokens(tokens))
    }

    /// Decode the arguments back out of call data for `method`.
    pub fn decode_args(
        description: &InterfaceDescription,
        method: &str,
        call_data: &[u8],
    ) -> Result<Vec<Token>, CodecError> {
        let descriptor = description.method(method)?;
        let Some(args) = call_data.strip_prefix(&descriptor.selector()[..]) else {
            return Err(CodecError::InvalidOutput(format!(
                "call data does not start with the selector of {}",
                descriptor.signature()
            )));
        };
        decode_params(&descriptor.input_types(), args)
    }
}
