//! Query-text helpers.
//!
//! Pure, stateless utilities: a [`Value`] type covering the literals a
//! backend dialect can quote, and placeholder substitution over a query
//! template. Neither touches topology state.

use crate::driver::Driver;

/// A literal value destined for a query template.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// The raw text used when this value fills an identifier placeholder.
    pub(crate) fn identifier_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Double(d) => d.to_string(),
            Value::Null => "NULL".to_string(),
            Value::Bytes(_) => String::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Substitute placeholders in a query template.
///
/// `?` consumes the next value as an escaped literal, `??` as a quoted
/// identifier. Placeholders left without a value stay verbatim; surplus
/// values are ignored.
pub fn format(driver: &dyn Driver, template: &str, values: &[Value]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut values = values.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '?' {
            out.push(c);
            continue;
        }
        let identifier = chars.peek() == Some(&'?');
        match values.next() {
            None => out.push('?'),
            Some(value) if identifier => {
                chars.next();
                out.push_str(&driver.escape_identifier(&value.identifier_text()));
            }
            Some(value) => out.push_str(&driver.escape(value)),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mysql::MysqlDriver;

    #[test]
    fn test_format_substitutes_in_order() {
        let driver = MysqlDriver;
        let sql = format(
            &driver,
            "SELECT * FROM ?? WHERE ?? = ?",
            &["users".into(), "id".into(), Value::Int(7)],
        );
        assert_eq!(sql, "SELECT * FROM `users` WHERE `id` = 7");
    }

    #[test]
    fn test_format_missing_values_left_verbatim() {
        let driver = MysqlDriver;
        let sql = format(&driver, "a = ? AND b = ?", &[Value::Int(1)]);
        assert_eq!(sql, "a = 1 AND b = ?");
    }

    #[test]
    fn test_format_surplus_values_ignored() {
        let driver = MysqlDriver;
        let sql = format(&driver, "a = ?", &[Value::Int(1), Value::Int(2)]);
        assert_eq!(sql, "a = 1");
    }

    #[test]
    fn test_format_is_pure() {
        let driver = MysqlDriver;
        let values = ["o'brien".into()];
        let first = format(&driver, "name = ?", &values);
        let second = format(&driver, "name = ?", &values);
        assert_eq!(first, second);
        assert_eq!(first, "name = 'o\\'brien'");
    }
}
