use crate::status::ParseError;
use crate::tensor::Tensor;

/// Weight and bias storage shared by layers with learned parameters.
///
/// Weights are one tensor per output channel; each bias is a `(1, 1, 1)`
/// tensor so it can be loaded through the same fill path.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamLayer {
    name: String,
    weights: Vec<Tensor>,
    bias: Vec<Tensor>,
}

impl ParamLayer {
    pub fn new(name: impl Into<String>, weights: Vec<Tensor>, bias: Vec<Tensor>) -> Self {
        Self {
            name: name.into(),
            weights,
            bias,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weights(&self) -> &[Tensor] {
        &self.weights
    }

    pub fn bias(&self) -> &[Tensor] {
        &self.bias
    }

    /// Overwrite every weight tensor from one flat `(kernel, channel, row, col)`
    /// sequence.
    pub fn set_weights(&mut self, values: &[f64]) -> Result<(), ParseError> {
        let blob = self.weights.first().map(Tensor::size).unwrap_or(0);
        let expected = blob * self.weights.len();
        if blob == 0 || values.len() != expected {
            crate::error!(
                "{}: weight count {} does not match layer weight size {}",
                self.name,
                values.len(),
                expected
            );
            return Err(ParseError::WeightShapeMismatch);
        }
        for (weight, chunk) in self.weights.iter_mut().zip(values.chunks_exact(blob)) {
            weight
                .fill(chunk)
                .map_err(|_| ParseError::WeightShapeMismatch)?;
        }
        Ok(())
    }

    /// Overwrite every bias scalar, one value per output channel.
    pub fn set_bias(&mut self, values: &[f64]) -> Result<(), ParseError> {
        if values.len() != self.bias.len() {
            crate::error!(
                "{}: bias count {} does not match layer bias size {}",
                self.name,
                values.len(),
                self.bias.len()
            );
            return Err(ParseError::BiasShapeMismatch);
        }
        for (bias, value) in self.bias.iter_mut().zip(values) {
            bias.fill_value(*value);
        }
        Ok(())
    }
}
