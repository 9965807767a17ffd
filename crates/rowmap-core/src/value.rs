//! The value model shared by records, the query builder and adapters.
//!
//! `Value` mirrors the storage classes a relational driver hands back.
//! `ToValue` / `FromValue` convert record fields to and from it with the
//! minimal coercions a row scanner needs: numeric widening, integer or text
//! to bool, SQL NULL to the field's zero value, and NULL to `None` for
//! `Option<T>` fields.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CoerceError;

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Variant name, used in conversion error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for NULL and for the zero value of every variant.
    /// A primary key holding a zero value counts as "not yet assigned".
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Integer(i) => *i == 0,
            Self::Real(f) => *f == 0.0,
            Self::Text(s) => s.is_empty(),
            Self::Blob(b) => b.is_empty(),
        }
    }

    /// JSON rendering used when unmapped columns are captured into a
    /// remainder field. Blobs become base64 strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Real(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Blob(b) => serde_json::Value::String(BASE64.encode(b)),
        }
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::Integer(i64::from(v))
            }
        })*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Real(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ─── Field conversions ──────────────────────────────────────────────────────

/// Converts a record field into a bindable `Value`.
pub trait ToValue {
    fn to_value(&self) -> Result<Value, CoerceError>;
}

/// Decodes a column `Value` into a record field.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, CoerceError>;
}

macro_rules! int_conversions {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Result<Value, CoerceError> {
                    i64::try_from(*self)
                        .map(Value::Integer)
                        .map_err(|_| CoerceError::OutOfRange {
                            expected: "i64",
                            value: self.to_string(),
                        })
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self, CoerceError> {
                    match value {
                        Value::Null => Ok(0),
                        Value::Integer(i) => <$t>::try_from(i).map_err(|_| {
                            CoerceError::OutOfRange {
                                expected: stringify!($t),
                                value: i.to_string(),
                            }
                        }),
                        other => Err(CoerceError::mismatch(stringify!($t), &other)),
                    }
                }
            }
        )*
    };
}

int_conversions!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ToValue for f64 {
    fn to_value(&self) -> Result<Value, CoerceError> {
        Ok(Value::Real(*self))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(0.0),
            Value::Real(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            other => Err(CoerceError::mismatch("f64", &other)),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Result<Value, CoerceError> {
        Ok(Value::Real(f64::from(*self)))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(0.0),
            Value::Real(f) => Ok(f as f32),
            Value::Integer(i) => Ok(i as f32),
            other => Err(CoerceError::mismatch("f32", &other)),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value, CoerceError> {
        Ok(Value::from(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(false),
            Value::Integer(i) => Ok(i != 0),
            Value::Text(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(CoerceError::UnknownVariant {
                    expected: "bool",
                    value: s,
                }),
            },
            other => Err(CoerceError::mismatch("bool", &other)),
        }
    }
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value, CoerceError> {
        Ok(Value::Text(self.clone()))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Text(s) => Ok(s),
            Value::Blob(b) => String::from_utf8(b).map_err(|_| CoerceError::Mismatch {
                expected: "String",
                found: "non-UTF-8 blob",
            }),
            other => Err(CoerceError::mismatch("String", &other)),
        }
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Result<Value, CoerceError> {
        Ok(Value::Blob(self.clone()))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Blob(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(CoerceError::mismatch("Vec<u8>", &other)),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Result<Value, CoerceError> {
        match self {
            Some(inner) => inner.to_value(),
            None => Ok(Value::Null),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value, CoerceError> {
        Ok(self.clone())
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        Ok(value)
    }
}

// ─── JSON columns ───────────────────────────────────────────────────────────

/// Stores the wrapped value as JSON text.
///
/// NULL decodes to `T::default()`; wrap in `Option` to observe absence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Json<T>(pub T);

impl<T: Serialize> ToValue for Json<T> {
    fn to_value(&self) -> Result<Value, CoerceError> {
        serde_json::to_string(&self.0)
            .map(Value::Text)
            .map_err(|e| CoerceError::Json(e.to_string()))
    }
}

impl<T: DeserializeOwned + Default> FromValue for Json<T> {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(Self(T::default())),
            Value::Text(s) => serde_json::from_str(&s)
                .map(Self)
                .map_err(|e| CoerceError::Json(e.to_string())),
            Value::Blob(b) => serde_json::from_slice(&b)
                .map(Self)
                .map_err(|e| CoerceError::Json(e.to_string())),
            other => Err(CoerceError::mismatch("JSON text", &other)),
        }
    }
}
