//! Operator descriptors.
//!
//! A `RuntimeOperator` is the untyped description of one layer as read from
//! a model file: named parameters plus named learned attributes.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::parameter::RuntimeParameter;

/// Learned tensor attached to an operator (weights, bias).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeAttribute {
    pub shape: Vec<i64>,
    pub values: Vec<f64>,
}

impl RuntimeAttribute {
    pub fn new(shape: Vec<i64>, values: Vec<f64>) -> Self {
        Self { shape, values }
    }

    /// Element count implied by `shape`; zero for an empty or negative shape.
    pub fn numel(&self) -> usize {
        if self.shape.is_empty() || self.shape.iter().any(|dim| *dim < 0) {
            return 0;
        }
        self.shape
            .iter()
            .map(|dim| *dim as usize)
            .fold(1usize, usize::saturating_mul)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeOperator {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub params: BTreeMap<String, RuntimeParameter>,
    #[serde(default)]
    pub attributes: BTreeMap<String, RuntimeAttribute>,
}

impl RuntimeOperator {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            params: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<RuntimeParameter>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_attribute(mut self, key: &str, shape: Vec<i64>, values: Vec<f64>) -> Self {
        self.attributes
            .insert(key.to_string(), RuntimeAttribute::new(shape, values));
        self
    }

    pub fn param(&self, key: &str) -> Option<&RuntimeParameter> {
        self.params.get(key)
    }

    pub fn attribute(&self, key: &str) -> Option<&RuntimeAttribute> {
        self.attributes.get(key)
    }
}
