use super::instance::RecordInstance;
use crate::error::RecordError;
use crate::spooky_value::{SpookyNumber, SpookyValue};
use std::fmt::{self, Write};

// ─── Record repr ────────────────────────────────────────────────────────────

/// Render `TypeName(name0=repr0, name1=repr1, …)` over the visible slots.
/// If any value fails to render, no partial text is returned.
pub fn repr(instance: &RecordInstance) -> Result<String, RecordError> {
    let ty = instance.record_type();
    // roughly 5 characters per item: "x=1, "
    let mut out = String::with_capacity(ty.name().len() + 2 + instance.len() * 5);
    out.push_str(ty.name());
    out.push('(');
    for (slot, value) in instance.iter().enumerate() {
        if slot > 0 {
            out.push_str(", ");
        }
        out.push_str(&ty.label(slot));
        out.push('=');
        write_value(&mut out, value)?;
    }
    out.push(')');
    Ok(out)
}

impl fmt::Display for RecordInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = repr(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

// ─── Value repr ─────────────────────────────────────────────────────────────

pub fn value_repr(value: &SpookyValue) -> Result<String, RecordError> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(out)
}

fn write_value(out: &mut String, value: &SpookyValue) -> Result<(), RecordError> {
    match value {
        SpookyValue::Null => out.push_str("None"),
        SpookyValue::Bool(true) => out.push_str("True"),
        SpookyValue::Bool(false) => out.push_str("False"),
        SpookyValue::Number(n) => write_number(out, *n),
        SpookyValue::Str(s) => write_str_literal(out, s),
        SpookyValue::Array(arr) => {
            out.push('[');
            for (i, v) in arr.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, v)?;
            }
            out.push(']');
        }
        SpookyValue::Object(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_str_literal(out, k);
                out.push_str(": ");
                write_value(out, v)?;
            }
            out.push('}');
        }
        SpookyValue::Host(obj) => out.push_str(&obj.repr()?),
    }
    Ok(())
}

fn write_number(out: &mut String, n: SpookyNumber) {
    // Writing into a String cannot fail.
    let _ = match n {
        SpookyNumber::I64(i) => write!(out, "{i}"),
        SpookyNumber::U64(u) => write!(out, "{u}"),
        SpookyNumber::F64(f) if f.is_nan() => write!(out, "nan"),
        SpookyNumber::F64(f) if f.is_infinite() => {
            write!(out, "{}", if f > 0.0 { "inf" } else { "-inf" })
        }
        // `{:?}` keeps the trailing ".0" on integral floats
        SpookyNumber::F64(f) => {
            let text = format!("{f:?}");
            match text.split_once('e') {
                Some((mantissa, exp)) => write_exponent(out, mantissa, exp),
                None => write!(out, "{text}"),
            }
        }
    };
}

/// Host exponent form: explicit sign and at least two digits (`1e+20`, `1e-07`).
fn write_exponent(out: &mut String, mantissa: &str, exp: &str) -> fmt::Result {
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exp.trim_start_matches('+')),
    };
    write!(out, "{mantissa}e{sign}{digits:0>2}")
}

fn write_str_literal(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}
