use hmac::{Hmac, Mac};
use hookwire_core::{AppError, AppResult};
use serde::Serialize;
use serde_json::{Number, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs `payload` with HMAC-SHA256 over its canonical JSON form.
///
/// Returns `sha256=<lowercase hex digest>`. Key order in `payload`, nested
/// objects included, does not affect the result.
pub fn generate_signature<T>(signing_key: &str, payload: &T) -> AppResult<String>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(payload).map_err(|error| {
        AppError::Internal(format!("hook payload is not serializable: {error}"))
    })?;

    let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes())
        .map_err(|error| AppError::Internal(format!("invalid hook signing key: {error}")))?;
    mac.update(canonical_json(&value).as_bytes());

    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Serializes `value` with object keys sorted by UTF-16 code units at every level.
///
/// Floating-point numbers are printed the way ECMAScript `Number#toString`
/// prints them (`1.0` as `1`, `1e21` as `1e+21`), matching RFC 8785.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut output = String::new();
    write_canonical(value, &mut output);
    output
}

fn write_canonical(value: &Value, output: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(left, _), (right, _)| left.encode_utf16().cmp(right.encode_utf16()));

            output.push('{');
            for (index, (key, nested)) in entries.into_iter().enumerate() {
                if index > 0 {
                    output.push(',');
                }
                output.push_str(Value::String(key.clone()).to_string().as_str());
                output.push(':');
                write_canonical(nested, output);
            }
            output.push('}');
        }
        Value::Array(items) => {
            output.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    output.push(',');
                }
                write_canonical(item, output);
            }
            output.push(']');
        }
        Value::Number(number) => output.push_str(format_number(number).as_str()),
        scalar => output.push_str(scalar.to_string().as_str()),
    }
}

fn format_number(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    number
        .as_f64()
        .map_or_else(|| number.to_string(), format_ecmascript_float)
}

fn format_ecmascript_float(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345e-7`.
    let scientific = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    let digits: String = mantissa.chars().filter(|character| *character != '.').collect();
    let digit_count = digits.len() as i32;
    let point = exponent + 1;

    let body = if digit_count <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - digit_count) as usize))
    } else if 0 < point && point <= 21 {
        let (integral, fraction) = digits.split_at(point as usize);
        format!("{integral}.{fraction}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{exponent_sign}{}", exponent.unsigned_abs())
        } else {
            format!("{lead}.{rest}e{exponent_sign}{}", exponent.unsigned_abs())
        }
    };

    if value.is_sign_negative() {
        format!("-{body}")
    } else {
        body
    }
}
