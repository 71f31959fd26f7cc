mod operator;
mod parameter;

pub use operator::{RuntimeAttribute, RuntimeOperator};
pub use parameter::{ParameterKind, ParameterKindError, RuntimeParameter};
