use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind tag of a [`RuntimeParameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Int,
    IntArray,
    Bool,
    Float,
    FloatArray,
    Str,
    StrArray,
}

impl ParameterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterKind::Int => "int",
            ParameterKind::IntArray => "int_array",
            ParameterKind::Bool => "bool",
            ParameterKind::Float => "float",
            ParameterKind::FloatArray => "float_array",
            ParameterKind::Str => "str",
            ParameterKind::StrArray => "str_array",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parameter was read as a kind it does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} parameter, found {found}")]
pub struct ParameterKindError {
    pub expected: ParameterKind,
    pub found: ParameterKind,
}

/// Scalar or list configuration value of an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RuntimeParameter {
    Int(i64),
    IntArray(Vec<i64>),
    Bool(bool),
    Float(f64),
    FloatArray(Vec<f64>),
    Str(String),
    StrArray(Vec<String>),
}

impl RuntimeParameter {
    pub fn kind(&self) -> ParameterKind {
        match self {
            RuntimeParameter::Int(_) => ParameterKind::Int,
            RuntimeParameter::IntArray(_) => ParameterKind::IntArray,
            RuntimeParameter::Bool(_) => ParameterKind::Bool,
            RuntimeParameter::Float(_) => ParameterKind::Float,
            RuntimeParameter::FloatArray(_) => ParameterKind::FloatArray,
            RuntimeParameter::Str(_) => ParameterKind::Str,
            RuntimeParameter::StrArray(_) => ParameterKind::StrArray,
        }
    }

    fn mismatch(&self, expected: ParameterKind) -> ParameterKindError {
        ParameterKindError {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_int(&self) -> Result<i64, ParameterKindError> {
        match self {
            RuntimeParameter::Int(value) => Ok(*value),
            other => Err(other.mismatch(ParameterKind::Int)),
        }
    }

    pub fn as_int_array(&self) -> Result<&[i64], ParameterKindError> {
        match self {
            RuntimeParameter::IntArray(values) => Ok(values),
            other => Err(other.mismatch(ParameterKind::IntArray)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ParameterKindError> {
        match self {
            RuntimeParameter::Bool(value) => Ok(*value),
            other => Err(other.mismatch(ParameterKind::Bool)),
        }
    }

    pub fn as_float(&self) -> Result<f64, ParameterKindError> {
        match self {
            RuntimeParameter::Float(value) => Ok(*value),
            other => Err(other.mismatch(ParameterKind::Float)),
        }
    }

    pub fn as_float_array(&self) -> Result<&[f64], ParameterKindError> {
        match self {
            RuntimeParameter::FloatArray(values) => Ok(values),
            other => Err(other.mismatch(ParameterKind::FloatArray)),
        }
    }

    pub fn as_str(&self) -> Result<&str, ParameterKindError> {
        match self {
            RuntimeParameter::Str(value) => Ok(value),
            other => Err(other.mismatch(ParameterKind::Str)),
        }
    }

    pub fn as_str_array(&self) -> Result<&[String], ParameterKindError> {
        match self {
            RuntimeParameter::StrArray(values) => Ok(values),
            other => Err(other.mismatch(ParameterKind::StrArray)),
        }
    }
}

impl From<i64> for RuntimeParameter {
    fn from(value: i64) -> Self {
        RuntimeParameter::Int(value)
    }
}

impl From<Vec<i64>> for RuntimeParameter {
    fn from(value: Vec<i64>) -> Self {
        RuntimeParameter::IntArray(value)
    }
}

impl From<bool> for RuntimeParameter {
    fn from(value: bool) -> Self {
        RuntimeParameter::Bool(value)
    }
}

impl From<f64> for RuntimeParameter {
    fn from(value: f64) -> Self {
        RuntimeParameter::Float(value)
    }
}

impl From<&str> for RuntimeParameter {
    fn from(value: &str) -> Self {
        RuntimeParameter::Str(value.to_string())
    }
}
