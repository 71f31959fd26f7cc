//! 2-D convolution layer.
//!
//! The window is applied as a cross-correlation: kernels are never flipped.
//! Each input of a batch is processed independently, accumulating in `f64`
//! with a fixed order (input channel, then window position, then the window
//! rows and columns), so repeated runs are bit-identical.
use std::borrow::Cow;

use crate::graph::{RuntimeAttribute, RuntimeOperator, RuntimeParameter};
use crate::status::{InferError, ParseError};
use crate::tensor::{conv_output_dim, Padding, Shape3, Tensor};

use super::param::ParamLayer;
use super::Layer;

/// Registry key of the convolution layer.
pub const CONVOLUTION_TYPE: &str = "nn.Conv2d";

const LAYER_NAME: &str = "Convolution";
const SPATIAL_DIMS: usize = 2;
/// Largest value accepted for any integer parameter.
const MAX_PARAM_VALUE: i64 = i32::MAX as i64;

#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionLayer {
    param: ParamLayer,
    padding: usize,
    stride: usize,
    use_bias: bool,
}

impl ConvolutionLayer {
    /// Build a layer with `out_channels` zero-filled kernels of shape
    /// `(in_channels, kernel_h, kernel_w)` and, when `use_bias` is set, one
    /// zero bias per kernel.
    pub fn new(
        out_channels: usize,
        in_channels: usize,
        kernel_h: usize,
        kernel_w: usize,
        padding: usize,
        stride: usize,
        use_bias: bool,
    ) -> Self {
        let weights = (0..out_channels)
            .map(|_| Tensor::new(in_channels, kernel_h, kernel_w))
            .collect();
        let bias = if use_bias {
            (0..out_channels).map(|_| Tensor::new(1, 1, 1)).collect()
        } else {
            Vec::new()
        };
        Self {
            param: ParamLayer::new(LAYER_NAME, weights, bias),
            padding,
            stride,
            use_bias,
        }
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn use_bias(&self) -> bool {
        self.use_bias
    }

    pub fn weights(&self) -> &[Tensor] {
        self.param.weights()
    }

    pub fn bias(&self) -> &[Tensor] {
        self.param.bias()
    }

    pub fn set_weights(&mut self, values: &[f64]) -> Result<(), ParseError> {
        self.param.set_weights(values)
    }

    pub fn set_bias(&mut self, values: &[f64]) -> Result<(), ParseError> {
        self.param.set_bias(values)
    }

    /// Output shape for an unpadded input of shape `input`, or `None` when no
    /// window fits.
    pub fn output_shape(&self, input: Shape3) -> Option<Shape3> {
        let kernel = self.param.weights().first()?;
        let (rows, cols) = Padding::uniform(self.padding).apply((input.1, input.2))?;
        let out_h = conv_output_dim(rows, kernel.rows(), self.stride)?;
        let out_w = conv_output_dim(cols, kernel.cols(), self.stride)?;
        Some((self.param.weights().len(), out_h, out_w))
    }

    /// Build a configured layer from an operator descriptor.
    ///
    /// Parameters are checked in a fixed order (`in_channels`,
    /// `out_channels`, `padding`, `bias`, `stride`, `kernel_size`), then the
    /// `bias` and `weight` attributes. Both attributes are required; bias
    /// values are only loaded when bias is enabled. Everything is validated
    /// before any kernel storage is allocated. The first problem found is
    /// returned and no layer is produced.
    pub fn get_instance(op: &RuntimeOperator) -> Result<ConvolutionLayer, ParseError> {
        let in_channels = positive_int(op, "in_channels", ParseError::MissingInChannel)?;
        let out_channels = positive_int(op, "out_channels", ParseError::MissingOutChannel)?;
        let paddings = int_pair(op, "padding", 0, ParseError::MissingPadding)?;
        let use_bias = match op.param("bias").map(RuntimeParameter::as_bool) {
            Some(Ok(value)) => value,
            Some(Err(err)) => {
                crate::error!("{}: bias parameter: {}", op.name, err);
                return Err(ParseError::MissingUseBias);
            }
            None => {
                crate::error!("{}: can not find the bias parameter", op.name);
                return Err(ParseError::MissingUseBias);
            }
        };
        let strides = int_pair(op, "stride", 1, ParseError::MissingStride)?;
        let kernels = int_pair(op, "kernel_size", 1, ParseError::MissingKernel)?;
        if paddings[0] != paddings[1] || strides[0] != strides[1] {
            crate::warning!(
                "{}: only the first padding/stride component is used (padding {:?}, stride {:?})",
                op.name,
                paddings,
                strides
            );
        }

        let bias = bias_attribute(op, out_channels)?;
        let weight = weight_attribute(op)?;
        let expected = [in_channels, kernels[0], kernels[1]]
            .iter()
            .try_fold(out_channels, |acc, dim| acc.checked_mul(*dim));
        if expected.is_none()
            || expected != Some(weight.numel())
            || expected != Some(weight.values.len())
        {
            crate::error!(
                "{}: weight shape {:?} with {} values does not match ({}, {}, {}, {})",
                op.name,
                weight.shape,
                weight.values.len(),
                out_channels,
                in_channels,
                kernels[0],
                kernels[1]
            );
            return Err(ParseError::WeightShapeMismatch);
        }
        if use_bias && bias.values.len() != out_channels {
            crate::error!(
                "{}: bias has {} values, expected {}",
                op.name,
                bias.values.len(),
                out_channels
            );
            return Err(ParseError::BiasShapeMismatch);
        }

        let mut layer = ConvolutionLayer::new(
            out_channels,
            in_channels,
            kernels[0],
            kernels[1],
            paddings[0],
            strides[0],
            use_bias,
        );
        layer.set_weights(weight.values())?;
        if use_bias {
            layer.set_bias(bias.values())?;
        }

        crate::trace!(
            "{}: loaded {} with {} kernels ({}x{}x{}), padding {}, stride {}, bias {}",
            op.name,
            CONVOLUTION_TYPE,
            out_channels,
            in_channels,
            kernels[0],
            kernels[1],
            layer.padding,
            layer.stride,
            layer.use_bias
        );
        Ok(layer)
    }

    /// Factory registered under [`CONVOLUTION_TYPE`].
    pub fn create(op: &RuntimeOperator) -> Result<Box<dyn Layer>, ParseError> {
        Ok(Box::new(Self::get_instance(op)?))
    }

    fn forward_one(&self, index: usize, input: &Tensor) -> Result<Tensor, InferError> {
        let input: Cow<'_, Tensor> = if self.padding > 0 {
            let padded = input
                .padded(Padding::uniform(self.padding), 0.0)
                .map_err(|err| {
                    crate::error!("input {}: {}", index, err);
                    InferError::OutputSizeInvalid
                })?;
            Cow::Owned(padded)
        } else {
            Cow::Borrowed(input)
        };
        let (in_c, in_h, in_w) = input.shape();
        let weights = self.param.weights();
        let kernel_count = weights.len();
        let mut output: Option<Tensor> = None;

        for (k, kernel) in weights.iter().enumerate() {
            let dims = (
                conv_output_dim(in_h, kernel.rows(), self.stride),
                conv_output_dim(in_w, kernel.cols(), self.stride),
            );
            let (out_h, out_w) = match dims {
                (Some(out_h), Some(out_w)) => (out_h, out_w),
                _ => {
                    crate::error!(
                        "input {}: output feature map of kernel {} is empty (input {}x{}, kernel {}x{}, stride {})",
                        index,
                        k,
                        in_h,
                        in_w,
                        kernel.rows(),
                        kernel.cols(),
                        self.stride
                    );
                    return Err(InferError::OutputSizeInvalid);
                }
            };
            if kernel.channels() != in_c {
                crate::error!(
                    "input {}: kernel {} has {} channels, input has {}",
                    index,
                    k,
                    kernel.channels(),
                    in_c
                );
                return Err(InferError::ChannelMismatch);
            }

            let out = match &mut output {
                Some(out) => out,
                slot => {
                    let fresh =
                        Tensor::try_filled((kernel_count, out_h, out_w), 0.0).map_err(|err| {
                            crate::error!("input {}: {}", index, err);
                            InferError::OutputSizeInvalid
                        })?;
                    slot.insert(fresh)
                }
            };
            if out.rows() != out_h || out.cols() != out_w {
                crate::error!(
                    "input {}: kernel {} produces {}x{}, expected {}x{}",
                    index,
                    k,
                    out_h,
                    out_w,
                    out.rows(),
                    out.cols()
                );
                return Err(InferError::OutputSizeInvalid);
            }

            let out_channel = out.channel_mut(k);
            for ic in 0..in_c {
                correlate_channel(
                    input.channel(ic),
                    in_w,
                    kernel.channel(ic),
                    (kernel.rows(), kernel.cols()),
                    self.stride,
                    out_channel,
                    (out_h, out_w),
                );
            }

            if self.use_bias {
                if let Some(bias) = self.param.bias().get(k) {
                    let value = bias.data()[0];
                    out_channel.iter_mut().for_each(|x| *x += value);
                }
            }
        }

        let output = output.ok_or_else(|| {
            crate::critical!("input {}: no kernel produced an output", index);
            InferError::WeightMissing
        })?;
        debug_assert!(!output.is_empty(), "convolution produced an empty output");
        Ok(output)
    }
}

impl Layer for ConvolutionLayer {
    fn layer_name(&self) -> &str {
        self.param.name()
    }

    /// Run the convolution over every input, in order.
    ///
    /// Inputs are never modified; padding is applied to a copy. The call is
    /// all-or-nothing: if any input fails validation the error is returned
    /// and no outputs are produced, including for earlier inputs.
    fn forward(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>, InferError> {
        if inputs.is_empty() {
            crate::error!("the input feature map of convolution layer is empty");
            return Err(InferError::InputEmpty);
        }
        let weights = self.param.weights();
        if weights.is_empty() {
            crate::error!("weight parameters are empty");
            return Err(InferError::WeightMissing);
        }
        if self.use_bias && self.param.bias().len() != weights.len() {
            crate::error!(
                "bias count {} does not match weight count {}",
                self.param.bias().len(),
                weights.len()
            );
            return Err(InferError::BiasMismatch);
        }

        let mut outputs = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            outputs.push(self.forward_one(index, input)?);
        }
        Ok(outputs)
    }
}

/// Slide a `kernel_hw` window over one input channel with `stride`, adding
/// each window's dot product into `out`.
fn correlate_channel(
    input: &[f64],
    in_cols: usize,
    kernel: &[f64],
    kernel_hw: (usize, usize),
    stride: usize,
    out: &mut [f64],
    out_hw: (usize, usize),
) {
    let (kh, kw) = kernel_hw;
    let (out_h, out_w) = out_hw;
    for oh in 0..out_h {
        let row0 = oh * stride;
        for ow in 0..out_w {
            let col0 = ow * stride;
            let mut acc = 0.0f64;
            for kr in 0..kh {
                let start = (row0 + kr) * in_cols + col0;
                let window = &input[start..start + kw];
                let weights = &kernel[kr * kw..(kr + 1) * kw];
                for (x, w) in window.iter().zip(weights) {
                    acc += x * w;
                }
            }
            out[oh * out_w + ow] += acc;
        }
    }
}

fn positive_int(op: &RuntimeOperator, key: &str, err: ParseError) -> Result<usize, ParseError> {
    let param = op.param(key).ok_or_else(|| {
        crate::error!("{}: can not find the {} parameter", op.name, key);
        err.clone()
    })?;
    match param.as_int() {
        Ok(value) if value > 0 && value <= MAX_PARAM_VALUE => Ok(value as usize),
        Ok(value) => {
            crate::error!(
                "{}: {} must be in 1..={}, got {}",
                op.name,
                key,
                MAX_PARAM_VALUE,
                value
            );
            Err(err)
        }
        Err(kind) => {
            crate::error!("{}: {} parameter: {}", op.name, key, kind);
            Err(err)
        }
    }
}

/// Read a two-component spatial parameter whose components all lie in
/// `min..=MAX_PARAM_VALUE`.
fn int_pair(
    op: &RuntimeOperator,
    key: &str,
    min: i64,
    err: ParseError,
) -> Result<[usize; SPATIAL_DIMS], ParseError> {
    let param = op.param(key).ok_or_else(|| {
        crate::error!("{}: can not find the {} parameter", op.name, key);
        err.clone()
    })?;
    let values = param.as_int_array().map_err(|kind| {
        crate::error!("{}: {} parameter: {}", op.name, key, kind);
        err.clone()
    })?;
    if values.len() != SPATIAL_DIMS {
        crate::error!(
            "{}: {} expects {} components, got {:?}",
            op.name,
            key,
            SPATIAL_DIMS,
            values
        );
        return Err(err);
    }
    if values.iter().any(|v| *v < min || *v > MAX_PARAM_VALUE) {
        crate::error!(
            "{}: {} components must be in {}..={}, got {:?}",
            op.name,
            key,
            min,
            MAX_PARAM_VALUE,
            values
        );
        return Err(err);
    }
    Ok([values[0] as usize, values[1] as usize])
}

fn bias_attribute(
    op: &RuntimeOperator,
    out_channels: usize,
) -> Result<&RuntimeAttribute, ParseError> {
    let bias = op.attribute("bias").ok_or_else(|| {
        crate::error!("{}: can not find the bias attribute", op.name);
        ParseError::MissingAttrBias
    })?;
    if bias.shape.first().copied() != Some(out_channels as i64) {
        crate::error!(
            "{}: bias shape {:?} does not lead with {} output channels",
            op.name,
            bias.shape,
            out_channels
        );
        return Err(ParseError::BiasShapeMismatch);
    }
    Ok(bias)
}

fn weight_attribute(op: &RuntimeOperator) -> Result<&RuntimeAttribute, ParseError> {
    match op.attribute("weight") {
        Some(weight) if !weight.shape.is_empty() => Ok(weight),
        Some(_) => {
            crate::error!("{}: weight shape is empty", op.name);
            Err(ParseError::MissingAttrWeight)
        }
        None => {
            crate::error!("{}: can not find the weight attribute", op.name);
            Err(ParseError::MissingAttrWeight)
        }
    }
}
