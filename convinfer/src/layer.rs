//! Layers built from operator descriptors.
mod convolution;
mod param;
mod registry;

pub use convolution::{ConvolutionLayer, CONVOLUTION_TYPE};
pub use param::ParamLayer;
pub use registry::{register_builtin_layers, LayerCreator, LayerRegistry};

use crate::status::InferError;
use crate::tensor::Tensor;

/// A configured operator that maps a batch of feature maps to a batch of
/// feature maps.
pub trait Layer: Send + Sync {
    fn layer_name(&self) -> &str;

    /// One output per input, in input order.
    fn forward(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>, InferError>;
}
