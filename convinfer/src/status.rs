//! Result codes reported by layers.
//!
//! `InferError` covers failures of a forward call, `ParseError` covers
//! failures while turning an operator descriptor into a layer. Both carry a
//! stable numeric code so callers can log or compare them without matching
//! on the message text.
use thiserror::Error;

/// Forward-time failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[non_exhaustive]
pub enum InferError {
    #[error("input feature map list is empty")]
    InputEmpty,
    #[error("layer has no weight tensors")]
    WeightMissing,
    #[error("bias count does not match weight count")]
    BiasMismatch,
    #[error("output feature map size is not positive")]
    OutputSizeInvalid,
    #[error("weight channel count does not match input channel count")]
    ChannelMismatch,
}

impl InferError {
    pub fn code(self) -> i32 {
        match self {
            InferError::InputEmpty => -1,
            InferError::WeightMissing => -2,
            InferError::BiasMismatch => -3,
            InferError::OutputSizeInvalid => -4,
            InferError::ChannelMismatch => -5,
        }
    }
}

/// Load-time failures, one per descriptor field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("missing or malformed `in_channels` parameter")]
    MissingInChannel,
    #[error("missing or malformed `out_channels` parameter")]
    MissingOutChannel,
    #[error("missing or malformed `padding` parameter")]
    MissingPadding,
    #[error("missing or malformed `bias` parameter")]
    MissingUseBias,
    #[error("missing or malformed `stride` parameter")]
    MissingStride,
    #[error("missing or malformed `kernel_size` parameter")]
    MissingKernel,
    #[error("missing `weight` attribute")]
    MissingAttrWeight,
    #[error("missing `bias` attribute")]
    MissingAttrBias,
    #[error("`weight` attribute shape does not match the layer")]
    WeightShapeMismatch,
    #[error("`bias` attribute shape does not match the layer")]
    BiasShapeMismatch,
    #[error("no layer registered for type `{0}`")]
    UnknownLayerType(String),
}

impl ParseError {
    pub fn code(&self) -> i32 {
        match self {
            ParseError::MissingInChannel => -1,
            ParseError::MissingOutChannel => -2,
            ParseError::MissingPadding => -3,
            ParseError::MissingUseBias => -4,
            ParseError::MissingStride => -5,
            ParseError::MissingKernel => -6,
            ParseError::MissingAttrWeight => -7,
            ParseError::MissingAttrBias => -8,
            ParseError::WeightShapeMismatch => -9,
            ParseError::BiasShapeMismatch => -10,
            ParseError::UnknownLayerType(_) => -11,
        }
    }
}
