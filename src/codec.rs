use crate::{
    error::{WriteError, WriteResult},
    value::LogicalValue,
};

/// Runtime encoding spec, lowered from the declarative [`Encoding`] at field
/// registration. By the time a value reaches the codec every configuration
/// invariant (word count, scale, base applicability) has been enforced, so
/// all functions here are pure word math.
///
/// [`Encoding`]: crate::Encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordEncoding {
    /// One word `month * scale + day`, or the raw component pair in two.
    Scaled { scale: u16, two_words: bool },
    /// Big-endian 16-bit split with sign-aware left-padding.
    SplitInt { signed: bool, words: u8 },
    /// Packed decimal digits, one byte per sub-value. `base` is present only
    /// for fields in the packed-with-base address family.
    HexPacked { base: Option<u16>, two_words: bool },
}

/// Register-word codec for logical control values.
///
/// Converts between logical values and 16-bit register words. Decode exists
/// for the scaled mode only; split and packed fields are write-only on the
/// display path.
pub struct RegisterCodec;

impl RegisterCodec {
    /// Encode a logical value into the word sequence the device expects.
    pub fn encode(value: &LogicalValue, spec: &WordEncoding) -> WriteResult<Vec<u16>> {
        match *spec {
            WordEncoding::Scaled { scale, two_words } => {
                let (month, day) = Self::expect_date(value, "scaled")?;
                if two_words {
                    return Ok(vec![month, day]);
                }
                let raw = u32::from(month) * u32::from(scale) + u32::from(day);
                if raw > u32::from(u16::MAX) {
                    return Err(WriteError::Encoding(format!(
                        "Scaled value {raw} exceeds 16-bit register range"
                    )));
                }
                Ok(vec![raw as u16])
            }
            WordEncoding::SplitInt { signed, words } => {
                let v = value.as_integer().ok_or_else(|| {
                    WriteError::Validation(format!(
                        "Split encoding expects an integer value, got {}",
                        value.kind()
                    ))
                })?;
                if v < 0 && !signed {
                    return Err(WriteError::Encoding(format!(
                        "Negative value {v} on an unsigned field"
                    )));
                }
                if v < 0 {
                    Self::split_signed(v, usize::from(words))
                } else {
                    Self::split_unsigned(v as u64, usize::from(words))
                }
            }
            WordEncoding::HexPacked { base, two_words } => {
                let (month, day) = Self::expect_date(value, "packed")?;
                let hi = Self::pack_digits(month)?;
                let lo = Self::pack_digits(day)?;
                if two_words {
                    let offset = base.unwrap_or(0);
                    let first = hi.checked_add(offset).ok_or_else(|| {
                        WriteError::Encoding(format!("Packed word {hi:#x} + base {offset:#x} overflows"))
                    })?;
                    let second = lo.checked_add(offset).ok_or_else(|| {
                        WriteError::Encoding(format!("Packed word {lo:#x} + base {offset:#x} overflows"))
                    })?;
                    Ok(vec![first, second])
                } else {
                    Ok(vec![(hi << 8) | lo])
                }
            }
        }
    }

    /// Decode a scaled word sequence back into its month/day components.
    ///
    /// The single-word form divides out the scale; the two-word form returns
    /// the component pair as read.
    pub fn decode_scaled(words: &[u16], scale: u16) -> WriteResult<(u16, u16)> {
        if scale == 0 {
            return Err(WriteError::InvalidConfiguration(
                "Scale must be non-zero".to_string(),
            ));
        }
        match words {
            [w] => Ok((w / scale, w % scale)),
            [a, b] => Ok((*a, *b)),
            _ => Err(WriteError::Encoding(format!(
                "Scaled decode expects one or two words, got {}",
                words.len()
            ))),
        }
    }

    /// Split a non-negative integer into `n` big-endian words, left-padded
    /// with `0x0000`.
    pub fn split_unsigned(value: u64, n: usize) -> WriteResult<Vec<u16>> {
        Self::check_word_count(n)?;
        let bits = 16 * n as u32;
        if u128::from(value) >> 1 >> (bits - 1) != 0 {
            return Err(WriteError::Encoding(format!(
                "Value {value} does not fit in {n} register(s)"
            )));
        }
        Ok(Self::split_raw(u128::from(value), n))
    }

    /// Split an integer into `n` big-endian words. Negative values use the
    /// two's-complement representation sign-extended to `16*n` bits and are
    /// left-padded with `0xFFFF`; non-negative values split unsigned.
    pub fn split_signed(value: i64, n: usize) -> WriteResult<Vec<u16>> {
        if value >= 0 {
            return Self::split_unsigned(value as u64, n);
        }
        Self::check_word_count(n)?;
        let bits = 16 * n as u32;
        let min = -(1i128 << (bits - 1));
        if i128::from(value) < min {
            return Err(WriteError::Encoding(format!(
                "Value {value} does not fit in {n} signed register(s)"
            )));
        }
        let modulus = 1u128 << bits;
        let encoded = (modulus as i128 + i128::from(value)) as u128;
        Ok(Self::split_raw(encoded, n))
    }

    /// Recompose big-endian words into an unsigned integer.
    pub fn unsplit_unsigned(words: &[u16]) -> u64 {
        words
            .iter()
            .fold(0u64, |acc, w| (acc << 16) | u64::from(*w))
    }

    /// Recompose big-endian words into a signed integer (two's complement of
    /// `16 * words.len()` bits).
    pub fn unsplit_signed(words: &[u16]) -> i64 {
        if words.is_empty() {
            return 0;
        }
        let bits = 16 * words.len() as u32;
        let raw = Self::unsplit_unsigned(words);
        if bits < 64 && raw >> (bits - 1) != 0 {
            raw as i64 - (1i64 << 1 << (bits - 1))
        } else {
            raw as i64
        }
    }

    /// Pack the two decimal digits of `v` (0..=99) into one hex byte:
    /// `(v / 10) << 4 | (v % 10)`.
    pub fn pack_digits(v: u16) -> WriteResult<u16> {
        if v > 99 {
            return Err(WriteError::Encoding(format!(
                "Sub-value {v} has more than two decimal digits"
            )));
        }
        Ok(((v / 10) << 4) | (v % 10))
    }

    #[inline]
    fn check_word_count(n: usize) -> WriteResult<()> {
        if !(1..=4).contains(&n) {
            return Err(WriteError::InvalidConfiguration(format!(
                "Split word count must be between 1 and 4, got {n}"
            )));
        }
        Ok(())
    }

    #[inline]
    fn split_raw(value: u128, n: usize) -> Vec<u16> {
        (0..n)
            .rev()
            .map(|i| ((value >> (16 * i)) & 0xFFFF) as u16)
            .collect()
    }

    #[inline]
    fn expect_date(value: &LogicalValue, mode: &str) -> WriteResult<(u16, u16)> {
        value.date_components().ok_or_else(|| {
            WriteError::Validation(format!(
                "{} encoding expects a date value, got {}",
                mode,
                value.kind()
            ))
        })
    }
}
