//! Per-symbology input rules and module encoding.
//!
//! Input is checked here before it reaches `barcoders`, so rejections carry
//! a precise [`EncodeError`] instead of a generic library error. EAN/UPC/ITF
//! inputs may be given with or without their check digit; when present it
//! must be correct.
//!
//! `barcoders` has no MSI or Pharmacode support, so those two encode here.

use barcoders::sym::codabar::Codabar;
use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::tf::TF;

use super::EncodeError;
use crate::options::BarcodeFormat;

/// An encoded linear symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// One entry per module: 1 = bar, 0 = space.
    pub modules: Vec<u8>,
    /// Human-readable text printed under the bars.
    pub text: String,
}

/// Code 39 character set (uppercase only).
const CODE39_CHARS: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Codabar body characters; A-D are start/stop only.
const CODABAR_CHARS: &str = "0123456789-$:/.+";

/// Longest content any linear symbology accepts.
pub const MAX_CONTENT_LEN: usize = 512;

/// Code 128 charset switches understood by `barcoders`.
const CODE128_SET_A: char = '\u{00C0}';
const CODE128_SET_B: char = '\u{0181}';
const CODE128_SET_C: char = '\u{0106}';
/// `barcoders` spells DEL this way in set B.
const CODE128_DEL: char = '\u{00F7}';

const PHARMACODE_MIN: u64 = 3;
const PHARMACODE_MAX: u64 = 131_070;

/// Encode `data` as `format`.
pub fn encode(format: BarcodeFormat, data: &str) -> Result<Symbol, EncodeError> {
    if data.is_empty() {
        return Err(EncodeError::EmptyContent);
    }
    let len = data.chars().count();
    if len > MAX_CONTENT_LEN {
        return Err(EncodeError::ContentTooLong {
            len,
            max: MAX_CONTENT_LEN,
        });
    }

    match format {
        BarcodeFormat::Code128 => code128(data),
        BarcodeFormat::Code39 => code39(data),
        BarcodeFormat::Ean13 => ean13(data),
        BarcodeFormat::Ean8 => ean8(data),
        BarcodeFormat::Upc => upc_a(data),
        BarcodeFormat::Itf14 => itf14(data),
        BarcodeFormat::Msi => msi(data),
        BarcodeFormat::Pharmacode => pharmacode(data),
        BarcodeFormat::Codabar => codabar(data),
    }
}

/// GS1 mod-10 check digit: weights 3,1,3,... starting from the rightmost digit.
pub fn gs1_check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

fn library_error(format: BarcodeFormat, e: barcoders::error::Error) -> EncodeError {
    EncodeError::Encoder(format!("{}: {}", format, e))
}

fn code128(data: &str) -> Result<Symbol, EncodeError> {
    let format = BarcodeFormat::Code128;
    if let Some(ch) = data.chars().find(|c| !c.is_ascii()) {
        return Err(EncodeError::InvalidCharacter { format, ch });
    }

    let barcode = Code128::new(code128_charsets(data)).map_err(|e| library_error(format, e))?;
    Ok(Symbol {
        modules: barcode.encode(),
        text: data.to_string(),
    })
}

/// Prefix ASCII `data` with the charset switches `barcoders` expects.
///
/// Digit runs of four or more (or an all-digit input of two or more) pack
/// pairwise into set C. Control characters need set A, lowercase and the
/// rest of `0x60..=0x7F` need set B; anything else stays in the current set.
fn code128_charsets(data: &str) -> String {
    let bytes = data.as_bytes();
    let mut out = String::with_capacity(data.len() * 2);
    let mut current = None;

    let mut i = 0;
    while i < bytes.len() {
        let run = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
        if run >= 4 || (run >= 2 && run == bytes.len()) {
            let even = run - run % 2;
            switch_charset(&mut out, &mut current, CODE128_SET_C);
            out.push_str(&data[i..i + even]);
            i += even;
            continue;
        }

        let b = bytes[i];
        let set = match (b, current) {
            (0x00..=0x1f, _) => CODE128_SET_A,
            (0x60..=0x7f, _) => CODE128_SET_B,
            (_, Some(CODE128_SET_A)) => CODE128_SET_A,
            _ => CODE128_SET_B,
        };
        switch_charset(&mut out, &mut current, set);
        out.push(if b == 0x7f { CODE128_DEL } else { char::from(b) });
        i += 1;
    }
    out
}

fn switch_charset(out: &mut String, current: &mut Option<char>, set: char) {
    if *current != Some(set) {
        out.push(set);
        *current = Some(set);
    }
}

/// Code 39 has no lowercase; letters are folded to uppercase first.
fn code39(data: &str) -> Result<Symbol, EncodeError> {
    let format = BarcodeFormat::Code39;
    let upper = data.to_ascii_uppercase();
    if let Some(ch) = upper.chars().find(|c| !CODE39_CHARS.contains(*c)) {
        return Err(EncodeError::InvalidCharacter { format, ch });
    }

    let barcode = Code39::new(&upper).map_err(|e| library_error(format, e))?;
    Ok(Symbol {
        modules: barcode.encode(),
        text: upper,
    })
}

/// Check that `data` is all digits with one of the accepted lengths.
fn digits(
    format: BarcodeFormat,
    data: &str,
    lengths: &[usize],
    expected: &'static str,
) -> Result<Vec<u8>, EncodeError> {
    if let Some(ch) = data.chars().find(|c| !c.is_ascii_digit()) {
        return Err(EncodeError::InvalidCharacter { format, ch });
    }
    if !lengths.contains(&data.len()) {
        return Err(EncodeError::InvalidLength {
            format,
            expected,
            actual: data.chars().count(),
        });
    }
    Ok(data.bytes().map(|b| b - b'0').collect())
}

/// Split off and verify the check digit when the full length was given.
fn without_check_digit(
    format: BarcodeFormat,
    mut digits: Vec<u8>,
    data_len: usize,
) -> Result<(Vec<u8>, u8), EncodeError> {
    let expected = gs1_check_digit(&digits[..data_len]);
    if digits.len() > data_len {
        let actual = digits[data_len];
        if actual != expected {
            return Err(EncodeError::CheckDigit {
                format,
                expected,
                actual,
            });
        }
        digits.truncate(data_len);
    }
    Ok((digits, expected))
}

fn digit_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

fn ean13(data: &str) -> Result<Symbol, EncodeError> {
    let format = BarcodeFormat::Ean13;
    let all = digits(format, data, &[12, 13], "12 or 13 digits")?;
    let (body, check) = without_check_digit(format, all, 12)?;

    let payload = digit_string(&body);
    let barcode = EAN13::new(&payload).map_err(|e| library_error(format, e))?;
    Ok(Symbol {
        modules: barcode.encode(),
        text: format!("{}{}", payload, check),
    })
}

fn ean8(data: &str) -> Result<Symbol, EncodeError> {
    let format = BarcodeFormat::Ean8;
    let all = digits(format, data, &[7, 8], "7 or 8 digits")?;
    let (body, check) = without_check_digit(format, all, 7)?;

    let payload = digit_string(&body);
    let barcode = EAN8::new(&payload).map_err(|e| library_error(format, e))?;
    Ok(Symbol {
        modules: barcode.encode(),
        text: format!("{}{}", payload, check),
    })
}

/// UPC-A is EAN-13 with a leading zero.
fn upc_a(data: &str) -> Result<Symbol, EncodeError> {
    let format = BarcodeFormat::Upc;
    let all = digits(format, data, &[11, 12], "11 or 12 digits")?;
    let (body, check) = without_check_digit(format, all, 11)?;

    let payload = digit_string(&body);
    let barcode = EAN13::new(format!("0{}", payload)).map_err(|e| library_error(format, e))?;
    Ok(Symbol {
        modules: barcode.encode(),
        text: format!("{}{}", payload, check),
    })
}

/// ITF-14: interleaved 2 of 5 over 13 data digits plus the GS1 check digit,
/// which `barcoders` appends itself.
fn itf14(data: &str) -> Result<Symbol, EncodeError> {
    let format = BarcodeFormat::Itf14;
    let all = digits(format, data, &[13, 14], "13 or 14 digits")?;
    let (body, check) = without_check_digit(format, all, 13)?;

    let payload = digit_string(&body);
    let barcode = TF::interleaved(&payload).map_err(|e| library_error(format, e))?;
    Ok(Symbol {
        modules: barcode.encode(),
        text: format!("{}{}", payload, check),
    })
}

fn codabar(data: &str) -> Result<Symbol, EncodeError> {
    let format = BarcodeFormat::Codabar;
    let upper = data.to_ascii_uppercase();
    let is_guard = |c: char| ('A'..='D').contains(&c);

    let (first, last) = match (upper.chars().next(), upper.chars().last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(EncodeError::EmptyContent),
    };

    // Start/stop characters default to A when the user gave none.
    let framed = if is_guard(first) && is_guard(last) && upper.len() >= 2 {
        upper.clone()
    } else {
        format!("A{}A", upper)
    };

    let body = &framed[1..framed.len() - 1];
    if let Some(ch) = body.chars().find(|c| !CODABAR_CHARS.contains(*c)) {
        return Err(EncodeError::InvalidCharacter { format, ch });
    }

    let barcode = Codabar::new(&framed).map_err(|e| library_error(format, e))?;
    Ok(Symbol {
        modules: barcode.encode(),
        text: data.to_string(),
    })
}

/// MSI (Modified Plessey), no check digit.
///
/// Each digit is four BCD bits, most significant first. Bit 1 is `110`,
/// bit 0 is `100`. Framed by start `110` and stop `1001`.
fn msi(data: &str) -> Result<Symbol, EncodeError> {
    let format = BarcodeFormat::Msi;
    if let Some(ch) = data.chars().find(|c| !c.is_ascii_digit()) {
        return Err(EncodeError::InvalidCharacter { format, ch });
    }

    let mut modules = vec![1, 1, 0];
    for digit in data.bytes().map(|b| b - b'0') {
        for bit in (0..4).rev() {
            if (digit >> bit) & 1 == 1 {
                modules.extend([1, 1, 0]);
            } else {
                modules.extend([1, 0, 0]);
            }
        }
    }
    modules.extend([1, 0, 0, 1]);

    Ok(Symbol {
        modules,
        text: data.to_string(),
    })
}

/// Pharmacode (one-track), values 3..=131070.
///
/// Built from the least significant end: even values add a wide bar
/// (`11100`), odd values a narrow bar (`100`). The trailing two spaces are
/// dropped.
fn pharmacode(data: &str) -> Result<Symbol, EncodeError> {
    let format = BarcodeFormat::Pharmacode;
    if let Some(ch) = data.chars().find(|c| !c.is_ascii_digit()) {
        return Err(EncodeError::InvalidCharacter { format, ch });
    }

    let value: u64 = data.parse().map_err(|_| EncodeError::OutOfRange {
        format,
        value: u64::MAX,
        min: PHARMACODE_MIN,
        max: PHARMACODE_MAX,
    })?;
    if !(PHARMACODE_MIN..=PHARMACODE_MAX).contains(&value) {
        return Err(EncodeError::OutOfRange {
            format,
            value,
            min: PHARMACODE_MIN,
            max: PHARMACODE_MAX,
        });
    }

    let mut parts: Vec<&[u8]> = Vec::new();
    let mut z = value;
    while z != 0 {
        if z % 2 == 0 {
            parts.push(&[1, 1, 1, 0, 0]);
            z = (z - 2) / 2;
        } else {
            parts.push(&[1, 0, 0]);
            z = (z - 1) / 2;
        }
    }

    let mut modules: Vec<u8> = parts.into_iter().rev().flatten().copied().collect();
    modules.truncate(modules.len().saturating_sub(2));

    Ok(Symbol {
        modules,
        text: data.to_string(),
    })
}
