//! Classroom join codes
//!
//! A code is five characters from `0-9A-Z`. Teachers share it verbally, so
//! student input is trimmed and upper-cased before comparison.

use rand_core::{OsRng, RngCore};

use crate::error::EngineError;

pub const CLASS_CODE_LEN: usize = 5;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a fresh class code from the OS random source.
pub fn generate_class_code() -> Result<String, EngineError> {
    let mut code = String::with_capacity(CLASS_CODE_LEN);
    while code.len() < CLASS_CODE_LEN {
        let mut byte = [0u8; 1];
        OsRng
            .try_fill_bytes(&mut byte)
            .map_err(|e| EngineError::Randomness(e.to_string()))?;
        // 252 = 7 * 36; reject the tail to keep the draw uniform
        if byte[0] < 252 {
            code.push(ALPHABET[(byte[0] % 36) as usize] as char);
        }
    }
    Ok(code)
}

/// Canonical form of a typed code, or an error if it cannot be one.
pub fn normalize_class_code(input: &str) -> Result<String, EngineError> {
    let code = input.trim().to_uppercase();
    let well_formed = code.len() == CLASS_CODE_LEN
        && code.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());
    if well_formed {
        Ok(code)
    } else {
        Err(EngineError::InvalidClassCode(input.to_string()))
    }
}
