use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::graph::RuntimeOperator;
use crate::status::ParseError;

use super::convolution::{ConvolutionLayer, CONVOLUTION_TYPE};
use super::Layer;

/// Builds a layer from its descriptor.
pub type LayerCreator =
    Box<dyn Fn(&RuntimeOperator) -> Result<Box<dyn Layer>, ParseError> + Send + Sync>;

/// Maps operator type names to layer creators.
///
/// The registry is an ordinary value owned by the application. Populate it
/// before loading any model, usually with [`LayerRegistry::with_builtin_layers`].
#[derive(Default)]
pub struct LayerRegistry {
    creators: HashMap<String, LayerCreator>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every layer shipped with this crate.
    pub fn with_builtin_layers() -> Self {
        let mut registry = Self::new();
        register_builtin_layers(&mut registry);
        registry
    }

    pub fn register<F>(&mut self, type_name: &str, creator: F) -> Result<()>
    where
        F: Fn(&RuntimeOperator) -> Result<Box<dyn Layer>, ParseError> + Send + Sync + 'static,
    {
        if self.creators.contains_key(type_name) {
            return Err(anyhow!("layer type {} is already registered", type_name));
        }
        self.creators.insert(type_name.to_string(), Box::new(creator));
        Ok(())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.creators.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn layer_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.creators.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Dispatch `op` to the creator registered for its type name.
    pub fn create_layer(&self, op: &RuntimeOperator) -> Result<Box<dyn Layer>, ParseError> {
        match self.creators.get(&op.type_name) {
            Some(creator) => creator(op),
            None => {
                crate::error!("{}: no layer registered for type {}", op.name, op.type_name);
                Err(ParseError::UnknownLayerType(op.type_name.clone()))
            }
        }
    }
}

/// Register the layers shipped with this crate.
pub fn register_builtin_layers(registry: &mut LayerRegistry) {
    if !registry.contains(CONVOLUTION_TYPE) {
        registry.creators.insert(
            CONVOLUTION_TYPE.to_string(),
            Box::new(ConvolutionLayer::create),
        );
    }
}
