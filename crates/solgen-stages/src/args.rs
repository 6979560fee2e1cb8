//! Constructor argument synthesis and calldata encoding
//!
//! The loop deploys autonomously, so constructor parameters are filled from a
//! fixed policy instead of asking a human: integer types get a sentinel,
//! booleans get `true`, addresses get the deploying account. Anything else
//! aborts the deployment naming the unsupported type, so the generator can
//! rework the constructor on the next attempt.

use solgen_core::{AbiEntry, Result, SolgenError};

/// Sentinel value supplied for every integer constructor parameter
pub const UINT_SENTINEL: u64 = 5;

/// A synthesized constructor argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Uint(u64),
    Bool(bool),
    Address(String),
}

/// Synthesize argument values for a constructor per the fixed policy
///
/// `sender` is the deploying account's address, used for `address`
/// parameters.
pub fn synthesize_constructor_args(
    constructor: &AbiEntry,
    sender: &str,
) -> Result<Vec<ArgValue>> {
    let mut args = Vec::with_capacity(constructor.inputs.len());

    for input in &constructor.inputs {
        let ty = input.param_type.as_str();
        let value = if (ty.starts_with("uint") || ty.starts_with("int")) && !ty.contains('[') {
            ArgValue::Uint(UINT_SENTINEL)
        } else if ty == "bool" {
            ArgValue::Bool(true)
        } else if ty == "address" {
            ArgValue::Address(sender.to_string())
        } else {
            return Err(SolgenError::Deploy(format!(
                "unsupported type {} for constructor parameter '{}'",
                ty, input.name
            )));
        };
        args.push(value);
    }

    Ok(args)
}

/// Encode synthesized arguments as ABI head words, returned as bare hex
///
/// Only static single-word types ever reach this point, so each argument is
/// one left-padded 32-byte word appended to the creation bytecode.
pub fn encode_words(args: &[ArgValue]) -> Result<String> {
    let mut encoded = String::with_capacity(args.len() * 64);

    for arg in args {
        match arg {
            ArgValue::Uint(value) => encoded.push_str(&format!("{:064x}", value)),
            ArgValue::Bool(value) => {
                encoded.push_str(&format!("{:064x}", u64::from(*value)));
            }
            ArgValue::Address(address) => {
                let bare = address.strip_prefix("0x").unwrap_or(address);
                let bytes = hex::decode(bare).map_err(|_| {
                    SolgenError::Deploy(format!("deploying account address is not hex: {}", address))
                })?;
                if bytes.len() != 20 {
                    return Err(SolgenError::Deploy(format!(
                        "deploying account address has wrong length: {}",
                        address
                    )));
                }
                encoded.push_str(&format!("{:0>64}", bare.to_lowercase()));
            }
        }
    }

    Ok(encoded)
}

/// Whether `s` is a well-formed 20-byte hex address
pub fn is_address(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(bare) => bare.len() == 40 && hex::decode(bare).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solgen_core::AbiParam;

    const SENDER: &str = "0x90f8bf6a479f320ead074411a4b0e7944ea8c9c1";

    fn constructor(params: &[(&str, &str)]) -> AbiEntry {
        AbiEntry {
            entry_type: "constructor".to_string(),
            name: None,
            inputs: params
                .iter()
                .map(|(name, ty)| AbiParam::new(*name, *ty))
                .collect(),
            outputs: Vec::new(),
            state_mutability: Some("nonpayable".to_string()),
        }
    }

    #[test]
    fn test_synthesis_policy() {
        let ctor = constructor(&[
            ("_cap", "uint256"),
            ("_open", "bool"),
            ("_admin", "address"),
            ("_delta", "int64"),
        ]);

        let args = synthesize_constructor_args(&ctor, SENDER).unwrap();
        assert_eq!(
            args,
            vec![
                ArgValue::Uint(UINT_SENTINEL),
                ArgValue::Bool(true),
                ArgValue::Address(SENDER.to_string()),
                ArgValue::Uint(UINT_SENTINEL),
            ]
        );
    }

    #[test]
    fn test_unsupported_type_names_the_type() {
        let ctor = constructor(&[("_owners", "address[]")]);
        let err = synthesize_constructor_args(&ctor, SENDER).unwrap_err();
        assert!(err.to_string().contains("unsupported type address[]"));
        assert!(err.to_string().contains("_owners"));
    }

    #[test]
    fn test_struct_parameter_is_unsupported() {
        let ctor = constructor(&[("_config", "tuple")]);
        let err = synthesize_constructor_args(&ctor, SENDER).unwrap_err();
        assert!(err.to_string().contains("unsupported type tuple"));
    }

    #[test]
    fn test_encode_uint_word() {
        let encoded = encode_words(&[ArgValue::Uint(5)]).unwrap();
        assert_eq!(encoded.len(), 64);
        assert!(encoded.ends_with('5'));
        assert!(encoded.starts_with("000"));
    }

    #[test]
    fn test_encode_bool_and_address() {
        let encoded =
            encode_words(&[ArgValue::Bool(true), ArgValue::Address(SENDER.to_string())]).unwrap();
        assert_eq!(encoded.len(), 128);
        assert_eq!(&encoded[..64], &format!("{:064x}", 1u64));
        assert!(encoded[64..].ends_with("ea8c9c1"));
        assert!(encoded[64..].starts_with("000000000000000000000000"));
    }

    #[test]
    fn test_encode_rejects_bad_address() {
        let result = encode_words(&[ArgValue::Address("0x1234".to_string())]);
        assert!(result.is_err());
    }

    #[test]
    fn test_is_address() {
        assert!(is_address(SENDER));
        assert!(!is_address("90f8bf6a479f320ead074411a4b0e7944ea8c9c1"));
        assert!(!is_address("0x1234"));
        assert!(!is_address("0xzz f8bf6a479f320ead074411a4b0e7944ea8c9"));
    }
}
