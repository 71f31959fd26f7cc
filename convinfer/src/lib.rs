//! CPU convolution layer for a layer-based inference runtime.
//!
//! Operator descriptors ([`RuntimeOperator`]) are turned into layers through
//! an explicit [`LayerRegistry`]; layers run batches of [`Tensor`] feature
//! maps.
//!
//! ```
//! use convinfer::{Layer, LayerRegistry, RuntimeOperator, Tensor, CONVOLUTION_TYPE};
//!
//! # fn main() -> anyhow::Result<()> {
//! let registry = LayerRegistry::with_builtin_layers();
//! let op = RuntimeOperator::new("conv1", CONVOLUTION_TYPE)
//!     .with_param("in_channels", 1i64)
//!     .with_param("out_channels", 1i64)
//!     .with_param("padding", vec![0i64, 0])
//!     .with_param("bias", false)
//!     .with_param("stride", vec![2i64, 2])
//!     .with_param("kernel_size", vec![2i64, 2])
//!     .with_attribute("weight", vec![1, 1, 2, 2], vec![1.0; 4])
//!     .with_attribute("bias", vec![1], vec![0.0]);
//! let layer = registry.create_layer(&op)?;
//! let outputs = layer.forward(&[Tensor::filled((1, 4, 4), 1.0)])?;
//! assert_eq!(outputs[0].shape(), (1, 2, 2));
//! assert!(outputs[0].data().iter().all(|v| *v == 4.0));
//! # Ok(()) }
//! ```
pub mod logging;

mod formatting;
mod graph;
mod layer;
mod model_loader;
mod random;
mod status;
mod tensor;

pub use formatting::{format_truncated, FormatValue};
pub use graph::{
    ParameterKind, ParameterKindError, RuntimeAttribute, RuntimeOperator, RuntimeParameter,
};
pub use layer::{
    register_builtin_layers, ConvolutionLayer, Layer, LayerCreator, LayerRegistry, ParamLayer,
    CONVOLUTION_TYPE,
};
pub use model_loader::ModelLoader;
pub use random::Random;
pub use status::{InferError, ParseError};
pub use tensor::{conv_output_dim, numel, Padding, Shape3, Tensor};
