//! Minimal Solidity ABI codec for the location contract
//!
//! Only the types the contract interface uses are supported: `string` and
//! `address`. Calldata is `selector ++ head ++ tail` as in the Solidity ABI.

use std::fmt;
use thiserror::Error;

const WORD: usize = 32;

/// `bytes4(keccak256("getLocation(string)"))`
pub const GET_LOCATION_SELECTOR: [u8; 4] = [0x73, 0x5a, 0x47, 0x74];

/// `bytes4(keccak256("Error(string)"))`, prefix of a standard revert payload
pub const REVERT_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// ABI codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("argument {index} has type {actual}, expected {expected}")]
    ArgumentType {
        index: usize,
        expected: ParamType,
        actual: ParamType,
    },

    #[error("empty return data")]
    EmptyData,

    #[error("return data truncated at byte {0}")]
    Truncated(usize),

    #[error("offset or length out of range at byte {0}")]
    OutOfRange(usize),

    #[error("invalid address word at byte {0}")]
    InvalidAddress(usize),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid hex data: {0}")]
    InvalidHex(String),
}

/// ABI parameter types understood by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Address,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::String => f.write_str("string"),
            ParamType::Address => f.write_str("address"),
        }
    }
}

impl ParamType {
    fn is_dynamic(self) -> bool {
        matches!(self, ParamType::String)
    }
}

/// A decoded (or to-be-encoded) ABI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    String(String),
    Address([u8; 20]),
}

impl Token {
    pub fn param_type(&self) -> ParamType {
        match self {
            Token::String(_) => ParamType::String,
            Token::Address(_) => ParamType::Address,
        }
    }

    /// Render as a string: strings verbatim, addresses as `0x`-prefixed lowercase hex.
    pub fn into_string(self) -> String {
        match self {
            Token::String(s) => s,
            Token::Address(addr) => format!("0x{}", hex::encode(addr)),
        }
    }
}

/// A contract method: name, selector and signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub selector: [u8; 4],
    pub inputs: Vec<ParamType>,
    pub outputs: Vec<ParamType>,
}

impl Method {
    /// `getLocation(string) returns (string, string, string)`
    pub fn get_location() -> Self {
        Self {
            name: "getLocation".to_string(),
            selector: GET_LOCATION_SELECTOR,
            inputs: vec![ParamType::String],
            outputs: vec![ParamType::String, ParamType::String, ParamType::String],
        }
    }

    /// Encode calldata for a call with `args`.
    pub fn encode_call(&self, args: &[Token]) -> Result<Vec<u8>, AbiError> {
        if args.len() != self.inputs.len() {
            return Err(AbiError::ArgumentCount {
                expected: self.inputs.len(),
                actual: args.len(),
            });
        }
        for (index, (arg, expected)) in args.iter().zip(&self.inputs).enumerate() {
            if arg.param_type() != *expected {
                return Err(AbiError::ArgumentType {
                    index,
                    expected: *expected,
                    actual: arg.param_type(),
                });
            }
        }

        let mut data = self.selector.to_vec();
        data.extend(encode(args));
        Ok(data)
    }

    /// Decode return data against this method's outputs.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        if data.is_empty() && !self.outputs.is_empty() {
            return Err(AbiError::EmptyData);
        }
        decode(&self.outputs, data)
    }
}

/// Decode `0x`-prefixed hex as returned by JSON-RPC nodes.
pub fn decode_hex(data: &str) -> Result<Vec<u8>, AbiError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(digits).map_err(|e| AbiError::InvalidHex(e.to_string()))
}

/// Decode an `Error(string)` revert payload into its reason.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let body = data.strip_prefix(&REVERT_SELECTOR)?;
    match decode(&[ParamType::String], body).ok()?.pop()? {
        Token::String(reason) => Some(reason),
        Token::Address(_) => None,
    }
}

/// ABI-encode a sequence of tokens (no selector).
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Address(addr) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(addr);
                head.extend_from_slice(&word);
            }
            Token::String(s) => {
                head.extend_from_slice(&usize_word(head_len + tail.len()));
                tail.extend_from_slice(&usize_word(s.len()));
                tail.extend_from_slice(s.as_bytes());
                let padding = (WORD - s.len() % WORD) % WORD;
                tail.resize(tail.len() + padding, 0);
            }
        }
    }

    head.extend(tail);
    head
}

/// Decode a sequence of tokens of the given types.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    types
        .iter()
        .enumerate()
        .map(|(i, ty)| {
            let pos = i * WORD;
            let word = read_word(data, pos)?;
            if ty.is_dynamic() {
                let offset = word_to_usize(word, pos)?;
                decode_string(data, offset).map(Token::String)
            } else {
                if word[..12].iter().any(|b| *b != 0) {
                    return Err(AbiError::InvalidAddress(pos));
                }
                let mut addr = [0u8; 20];
                addr.copy_from_slice(&word[12..]);
                Ok(Token::Address(addr))
            }
        })
        .collect()
}

fn decode_string(data: &[u8], offset: usize) -> Result<String, AbiError> {
    let len = word_to_usize(read_word(data, offset)?, offset)?;
    let start = offset
        .checked_add(WORD)
        .ok_or(AbiError::OutOfRange(offset))?;
    let end = start.checked_add(len).ok_or(AbiError::OutOfRange(offset))?;
    let bytes = data.get(start..end).ok_or(AbiError::Truncated(start))?;
    String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
}

fn read_word(data: &[u8], pos: usize) -> Result<&[u8], AbiError> {
    let end = pos.checked_add(WORD).ok_or(AbiError::OutOfRange(pos))?;
    data.get(pos..end).ok_or(AbiError::Truncated(pos))
}

fn word_to_usize(word: &[u8], pos: usize) -> Result<usize, AbiError> {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::OutOfRange(pos));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(buf)).map_err(|_| AbiError::OutOfRange(pos))
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}
