//! JSON model files.
//!
//! A model file lists operator descriptors:
//!
//! ```json
//! { "operators": [ { "name": "conv1", "type_name": "nn.Conv2d",
//!                    "params": { "stride": { "kind": "int_array", "value": [1, 1] } },
//!                    "attributes": { "weight": { "shape": [1, 1, 1, 1], "values": [1.0] } } } ] }
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::graph::RuntimeOperator;
use crate::layer::{Layer, LayerRegistry};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ModelFile {
    operators: Vec<RuntimeOperator>,
}

#[derive(Debug, Clone)]
pub struct ModelLoader {
    path: Option<PathBuf>,
    operators: Vec<RuntimeOperator>,
}

impl ModelLoader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let txt = fs::read_to_string(&path)
            .with_context(|| format!("read model file {}", path.display()))?;
        let mut loader = Self::from_json(&txt)
            .with_context(|| format!("parse model file {}", path.display()))?;
        loader.path = Some(path);
        Ok(loader)
    }

    pub fn from_json(txt: &str) -> Result<Self> {
        let model: ModelFile = serde_json::from_str(txt).with_context(|| "decode model json")?;
        for (idx, op) in model.operators.iter().enumerate() {
            if model.operators[..idx].iter().any(|prev| prev.name == op.name) {
                return Err(anyhow!("duplicate operator name: {}", op.name));
            }
        }
        crate::trace!("model holds {} operators", model.operators.len());
        Ok(Self {
            path: None,
            operators: model.operators,
        })
    }

    /// Serialize the descriptors back into model JSON.
    pub fn to_json(&self) -> Result<String> {
        let model = ModelFile {
            operators: self.operators.clone(),
        };
        Ok(serde_json::to_string_pretty(&model)?)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn operators(&self) -> &[RuntimeOperator] {
        &self.operators
    }

    pub fn operator(&self, name: &str) -> Option<&RuntimeOperator> {
        self.operators.iter().find(|op| op.name == name)
    }

    pub fn build_layer(&self, registry: &LayerRegistry, name: &str) -> Result<Box<dyn Layer>> {
        let op = self
            .operator(name)
            .ok_or_else(|| anyhow!("unknown operator: {}", name))?;
        registry
            .create_layer(op)
            .map_err(|err| anyhow!("build {} ({}): {} [code {}]", op.name, op.type_name, err, err.code()))
    }

    /// Build every operator in file order. The first failing operator aborts
    /// the whole build.
    pub fn build_layers(&self, registry: &LayerRegistry) -> Result<Vec<(String, Box<dyn Layer>)>> {
        let mut layers = Vec::with_capacity(self.operators.len());
        for op in &self.operators {
            let layer = self.build_layer(registry, &op.name)?;
            layers.push((op.name.clone(), layer));
        }
        Ok(layers)
    }
}
