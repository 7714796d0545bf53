//! Constant-value extraction from integer, character and string literal
//! text.
//!
//! The parser hands literals over verbatim (prefix, quotes and suffix
//! included); this module turns them into values and C types. Malformed
//! literals are fatal diagnostics; out-of-range escapes and values warn.

#[cfg(test)]
mod tests;

use crate::CgenError;
use crate::ctype::ElmType;
use crate::diag::Diagnostics;
use ccir_ast::Span;
use std::iter::Peekable;
use std::str::Chars;

/// Suffix-derived constraints on an integer literal's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IntSuffix {
    unsigned: bool,
    /// Number of `l`s: 0, 1 or 2.
    longs: u32,
}

fn split_suffix<'a>(diags: &mut Diagnostics, span: Span, text: &'a str)
-> Result<(&'a str, IntSuffix), CgenError> {
    let mut unsigned = false;
    let mut longs = 0u32;
    let mut end = text.len();
    let bytes = text.as_bytes();
    loop {
        let rest = &bytes[..end];
        match rest.last() {
            Some(b'u' | b'U') if !unsigned => {
                unsigned = true;
                end -= 1;
            }
            Some(b'l' | b'L') if longs == 0 => {
                // `ll`/`LL` must use a consistent case; `lL` is rejected
                // later as a malformed digit sequence.
                if end >= 2 && rest[end - 2] == rest[end - 1] {
                    longs = 2;
                    end -= 2;
                } else {
                    longs = 1;
                    end -= 1;
                }
            }
            _ => break,
        }
    }
    if end == 0 {
        diags.fatal(span, format!("invalid integer literal '{text}'"));
        return Err(CgenError::Invalid);
    }
    Ok((&text[..end], IntSuffix { unsigned, longs }))
}

fn fits(value: u64, elm: ElmType) -> bool {
    let bits = elm.bits();
    if elm.signed() {
        value <= (1u64 << (bits - 1)) - 1
    } else if bits == 64 {
        true
    } else {
        value < (1u64 << bits)
    }
}

/// Parses an integer literal (decimal, octal or hexadecimal, with optional
/// `u`/`l`/`ll` suffixes) into its value and C type.
///
/// The type is the first of the C-mandated candidate list that can
/// represent the value; decimal literals without a `u` suffix never turn
/// unsigned.
pub fn parse_int(
    diags: &mut Diagnostics,
    span: Span,
    text: &str,
) -> Result<(i64, ElmType), CgenError> {
    let (digits, suffix) = split_suffix(diags, span, text)?;

    let (base, digits): (u32, &str) = if let Some(rest) =
        digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X"))
    {
        (16, rest)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if digits.is_empty() {
        diags.fatal(span, format!("invalid integer literal '{text}'"));
        return Err(CgenError::Invalid);
    }

    let mut value: u64 = 0;
    let mut clipped = false;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(base) else {
            diags.fatal(span, format!("invalid integer literal '{text}'"));
            return Err(CgenError::Invalid);
        };
        value = match value
            .checked_mul(u64::from(base))
            .and_then(|v| v.checked_add(u64::from(digit)))
        {
            Some(v) => v,
            None => {
                clipped = true;
                value.wrapping_mul(u64::from(base)).wrapping_add(u64::from(digit))
            }
        };
    }
    if clipped {
        diags.warn(span, format!("integer literal '{text}' is too large"));
    }

    // C99 6.4.4.1: candidate types by suffix and base, smallest first.
    // Octal and hexadecimal literals may fall over to unsigned types.
    let allow_unsigned = suffix.unsigned || base != 10;
    let mut candidates = Vec::new();
    for (signed_t, unsigned_t, rank) in [
        (ElmType::Int, ElmType::UInt, 0u32),
        (ElmType::Long, ElmType::ULong, 1),
        (ElmType::LongLong, ElmType::ULongLong, 2),
    ] {
        if rank < suffix.longs {
            continue;
        }
        if !suffix.unsigned {
            candidates.push(signed_t);
        }
        if allow_unsigned {
            candidates.push(unsigned_t);
        }
    }
    let elm = match candidates.into_iter().find(|elm| fits(value, *elm)) {
        Some(elm) => elm,
        None => {
            diags.warn(span, format!("integer literal '{text}' out of range"));
            ElmType::ULongLong
        }
    };
    Ok((value as i64, elm))
}

/// Decodes one character or escape sequence from inside a literal.
fn unescape(
    diags: &mut Diagnostics,
    span: Span,
    chars: &mut Peekable<Chars<'_>>,
    wide: bool,
) -> Result<i64, CgenError> {
    let ch = chars.next().ok_or(CgenError::Invalid)?;
    if ch != '\\' {
        return Ok(ch as i64);
    }
    let esc = match chars.next() {
        Some(esc) => esc,
        None => {
            diags.fatal(span, "invalid escape sequence");
            return Err(CgenError::Invalid);
        }
    };
    let limit: i64 = if wide { 0xffff } else { 0xff };
    match esc {
        'a' => Ok(7),
        'b' => Ok(8),
        'f' => Ok(12),
        'n' => Ok(10),
        'r' => Ok(13),
        't' => Ok(9),
        'v' => Ok(11),
        '\'' => Ok('\'' as i64),
        '"' => Ok('"' as i64),
        '?' => Ok('?' as i64),
        '\\' => Ok('\\' as i64),
        '0'..='7' => {
            let mut value = i64::from(esc as u8 - b'0');
            // Up to two more octal digits.
            for _ in 0..2 {
                match chars.peek() {
                    Some(d @ '0'..='7') => {
                        value = value * 8 + i64::from(*d as u8 - b'0');
                        chars.next();
                    }
                    _ => break,
                }
            }
            if value > limit {
                diags.warn(span, "octal escape sequence out of range");
            }
            Ok(value & limit)
        }
        'x' => {
            let mut value: i64 = 0;
            let mut any = false;
            let mut over = false;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(16)) {
                any = true;
                value = value.wrapping_mul(16).wrapping_add(i64::from(d));
                if value > limit {
                    over = true;
                }
                chars.next();
            }
            if !any {
                diags.fatal(span, "invalid escape sequence");
                return Err(CgenError::Invalid);
            }
            if over {
                diags.warn(span, "hexadecimal escape sequence out of range");
            }
            Ok(value & limit)
        }
        other => {
            diags.fatal(span, format!("invalid escape sequence '\\{other}'"));
            Err(CgenError::Invalid)
        }
    }
}

/// Parses `'c'` / `L'c'` into its value. Returns the value and whether the
/// literal was wide.
pub fn parse_char(
    diags: &mut Diagnostics,
    span: Span,
    text: &str,
) -> Result<(i64, bool), CgenError> {
    let (wide, body) = match text.strip_prefix('L') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let body = body
        .strip_prefix('\'')
        .and_then(|b| b.strip_suffix('\''))
        .ok_or_else(|| {
            diags.fatal(span, format!("invalid character literal {text}"));
            CgenError::Invalid
        })?;
    let mut chars = body.chars().peekable();
    if chars.peek().is_none() {
        diags.fatal(span, format!("invalid character literal {text}"));
        return Err(CgenError::Invalid);
    }
    let value = unescape(diags, span, &mut chars, wide)?;
    if chars.peek().is_some() {
        diags.fatal(span, format!("invalid character literal {text}"));
        return Err(CgenError::Invalid);
    }
    Ok((value, wide))
}

/// Parses `"..."` / `L"..."` into its character values, terminator not
/// included. Returns the values and whether the literal was wide.
pub fn parse_string(
    diags: &mut Diagnostics,
    span: Span,
    text: &str,
) -> Result<(Vec<i64>, bool), CgenError> {
    let (wide, body) = match text.strip_prefix('L') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let body = body
        .strip_prefix('"')
        .and_then(|b| b.strip_suffix('"'))
        .ok_or_else(|| {
            diags.fatal(span, "invalid string literal");
            CgenError::Invalid
        })?;
    let mut values = Vec::new();
    let mut chars = body.chars().peekable();
    while chars.peek().is_some() {
        values.push(unescape(diags, span, &mut chars, wide)?);
    }
    Ok((values, wide))
}
