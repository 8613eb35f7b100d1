// crates/schematizer-core/src/convert/defaults.rs
// ============================================================================
// Module: Default Value Encoding
// Description: Re-encodes SQL column defaults as Avro JSON defaults.
// Purpose: Produce the target type's canonical default representation.
// Dependencies: crate::convert::mapping, crate::ddl, serde_json, time
// ============================================================================

//! ## Overview
//! MySQL writes defaults loosely (`DEFAULT '0'` on an integer column is
//! common), so encoding is driven by the mapping entry's [`DefaultEncoding`],
//! not by the literal's token kind. Non-constant defaults encode to `None`.
//! A literal that cannot be represented in the target type is a semantic
//! conflict naming the column.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Number;
use serde_json::Value;
use time::Date;
use time::PrimitiveDateTime;
use time::Time;
use time::macros::format_description;

use crate::convert::mapping::AvroType;
use crate::convert::mapping::DefaultEncoding;
use crate::convert::mapping::MappingEntry;
use crate::ddl::ConversionError;
use crate::ddl::table::Column;
use crate::ddl::table::DefaultValue;

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Encodes a column's non-null default for its mapped Avro type.
///
/// Returns `Ok(None)` for defaults without an Avro representation
/// (`CURRENT_TIMESTAMP`). `DEFAULT NULL` is handled by the caller.
pub(crate) fn encode_default(
    column: &Column,
    entry: &MappingEntry,
    default: &DefaultValue,
) -> Result<Option<Value>, ConversionError> {
    if *default == DefaultValue::CurrentTimestamp {
        return Ok(None);
    }
    let encoded = match entry.default_encoding {
        DefaultEncoding::Boolean => encode_boolean(default),
        DefaultEncoding::Integer => encode_integer(default, entry.avro_type),
        DefaultEncoding::Float => encode_float(default),
        DefaultEncoding::String => literal_text(default).map(Value::String),
        DefaultEncoding::Bytes => literal_text(default).and_then(|text| bytes_string(text.as_bytes())),
        DefaultEncoding::DecimalBytes => {
            let (_, scale) = column.sql_type.decimal_digits();
            literal_text(default).and_then(|text| encode_decimal(&text, scale))
        }
        DefaultEncoding::EnumSymbol => literal_text(default).and_then(|text| {
            column
                .sql_type
                .values
                .iter()
                .find(|value| value.eq_ignore_ascii_case(&text))
                .map(|value| Value::String(value.clone()))
        }),
        DefaultEncoding::Date => literal_text(default).and_then(|text| encode_date(&text)),
        DefaultEncoding::TimeMillis => literal_text(default).and_then(|text| encode_time(&text)),
        DefaultEncoding::TimestampMillis => {
            literal_text(default).and_then(|text| encode_timestamp(&text))
        }
    };
    encoded.map(Some).ok_or_else(|| {
        ConversionError::conflict(format!(
            "default {} of column `{}` cannot be encoded as avro {}",
            describe(default),
            column.name,
            entry.avro_type.name()
        ))
    })
}

/// Renders a default for error messages.
fn describe(default: &DefaultValue) -> String {
    match default {
        DefaultValue::Null => "NULL".to_string(),
        DefaultValue::Number(text) => text.clone(),
        DefaultValue::String(text) => format!("'{text}'"),
        DefaultValue::Boolean(value) => value.to_string().to_ascii_uppercase(),
        DefaultValue::Bits(bits) => format!("b'{bits}'"),
        DefaultValue::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
    }
}

/// Returns the literal text of numeric and string defaults.
fn literal_text(default: &DefaultValue) -> Option<String> {
    match default {
        DefaultValue::Number(text) | DefaultValue::String(text) => Some(text.clone()),
        _ => None,
    }
}

/// Parses an integer default, accepting booleans and bit literals.
fn integer_value(default: &DefaultValue) -> Option<i64> {
    match default {
        DefaultValue::Number(text) | DefaultValue::String(text) => text.trim().parse::<i64>().ok(),
        DefaultValue::Boolean(value) => Some(i64::from(*value)),
        DefaultValue::Bits(bits) => i64::from_str_radix(bits, 2).ok(),
        DefaultValue::Null | DefaultValue::CurrentTimestamp => None,
    }
}

/// Encodes a boolean default.
fn encode_boolean(default: &DefaultValue) -> Option<Value> {
    match default {
        DefaultValue::Boolean(value) => Some(Value::Bool(*value)),
        _ => match integer_value(default) {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
    }
}

/// Encodes an integer default within the Avro base type's range.
fn encode_integer(default: &DefaultValue, avro_type: AvroType) -> Option<Value> {
    let value = integer_value(default)?;
    if avro_type == AvroType::Int && i32::try_from(value).is_err() {
        return None;
    }
    Some(Value::Number(Number::from(value)))
}

/// Encodes a floating point default.
fn encode_float(default: &DefaultValue) -> Option<Value> {
    let text = literal_text(default)?;
    let value = text.trim().parse::<f64>().ok()?;
    Number::from_f64(value).map(Value::Number)
}

/// Encodes raw bytes as an Avro bytes default (one code point per byte).
fn bytes_string(bytes: &[u8]) -> Option<Value> {
    Some(Value::String(bytes.iter().copied().map(char::from).collect()))
}

/// Encodes a decimal literal as two's-complement unscaled bytes.
fn encode_decimal(text: &str, scale: u32) -> Option<Value> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let scale = usize::try_from(scale).ok()?;
    let kept = fraction.get(..scale.min(fraction.len())).unwrap_or_default();
    let dropped = fraction.get(kept.len()..).unwrap_or_default();
    if dropped.chars().any(|ch| ch != '0') {
        return None;
    }
    let mut unscaled_digits = String::with_capacity(whole.len() + scale);
    unscaled_digits.push_str(whole);
    unscaled_digits.push_str(kept);
    for _ in kept.len()..scale {
        unscaled_digits.push('0');
    }
    bytes_string(&twos_complement(negative, decimal_magnitude(&unscaled_digits)))
}

/// Converts ASCII decimal digits to big-endian unsigned bytes of any width.
fn decimal_magnitude(digits: &str) -> Vec<u8> {
    let mut bytes = vec![0_u8];
    for digit in digits.bytes() {
        let mut carry = u16::from(digit - b'0');
        for byte in bytes.iter_mut().rev() {
            let [high, low] = (u16::from(*byte) * 10 + carry).to_be_bytes();
            *byte = low;
            carry = u16::from(high);
        }
        let [_, spill] = carry.to_be_bytes();
        if spill != 0 {
            bytes.insert(0, spill);
        }
    }
    bytes
}

/// Returns the minimal big-endian two's-complement encoding of a signed magnitude.
fn twos_complement(negative: bool, magnitude: Vec<u8>) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(magnitude.len() + 1);
    bytes.push(0_u8);
    bytes.extend(magnitude);
    if negative {
        let mut carry = true;
        for byte in bytes.iter_mut().rev() {
            let (sum, overflow) = (!*byte).overflowing_add(u8::from(carry));
            *byte = sum;
            carry = overflow;
        }
    }
    let mut start = 0;
    while start + 1 < bytes.len() {
        let (current, next) = (bytes[start], bytes[start + 1]);
        let redundant = (current == 0x00 && next & 0x80 == 0) || (current == 0xFF && next & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes.split_off(start)
}

/// Encodes `YYYY-MM-DD` as days since the Unix epoch.
fn encode_date(text: &str) -> Option<Value> {
    let date = parse_date(text.trim())?;
    let days = (date - Date::from_julian_day(UNIX_EPOCH_JULIAN_DAY).ok()?).whole_days();
    i32::try_from(days).ok().map(|days| Value::Number(Number::from(days)))
}

/// Encodes `HH:MM:SS[.fraction]` as milliseconds after midnight.
fn encode_time(text: &str) -> Option<Value> {
    let time = parse_time(text.trim())?;
    let (hour, minute, second, milli) = time.as_hms_milli();
    let millis = ((u32::from(hour) * 60 + u32::from(minute)) * 60 + u32::from(second)) * 1000
        + u32::from(milli);
    Some(Value::Number(Number::from(millis)))
}

/// Encodes `YYYY-MM-DD[ HH:MM:SS[.fraction]]` as epoch milliseconds (UTC).
fn encode_timestamp(text: &str) -> Option<Value> {
    let text = text.trim();
    let datetime = match text.split_once([' ', 'T']) {
        Some((date, time)) => PrimitiveDateTime::new(parse_date(date)?, parse_time(time)?),
        None => PrimitiveDateTime::new(parse_date(text)?, Time::MIDNIGHT),
    };
    let millis = datetime.assume_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).ok().map(|millis| Value::Number(Number::from(millis)))
}

/// Julian day number of 1970-01-01.
const UNIX_EPOCH_JULIAN_DAY: i32 = 2_440_588;

/// Parses a calendar date; zero dates are rejected.
fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text, format_description!("[year]-[month]-[day]")).ok()
}

/// Parses a time of day with an optional fractional part (truncated to millis).
fn parse_time(text: &str) -> Option<Time> {
    let (clock, fraction) = text.split_once('.').unwrap_or((text, ""));
    let time = Time::parse(clock, format_description!("[hour]:[minute]:[second]")).ok()?;
    if !fraction.chars().all(|ch| ch.is_ascii_digit()) || fraction.len() > 6 {
        return None;
    }
    let mut millis_digits: String = fraction.chars().take(3).collect();
    while millis_digits.len() < 3 {
        millis_digits.push('0');
    }
    let millis = millis_digits.parse::<u16>().ok()?;
    time.replace_millisecond(millis).ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
