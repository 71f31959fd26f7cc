mod shape;
mod tensor;

pub use shape::{conv_output_dim, numel, Shape3};
pub use tensor::{Padding, Tensor};
