//! Three-dimensional feature map container.
//!
//! `Tensor` owns flat `f64` storage laid out channel-major, row-major inside
//! each channel: element `(c, r, w)` lives at `(c * rows + r) * cols + w`.
use std::fmt;

use anyhow::{anyhow, Result};

use super::shape::{checked_numel, numel, offset_for, Shape3};
use crate::formatting::format_truncated;

/// Border widths added around the spatial extent of every channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Padding {
    /// Same border on all four sides.
    pub const fn uniform(pad: usize) -> Self {
        Self {
            top: pad,
            bottom: pad,
            left: pad,
            right: pad,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top == 0 && self.bottom == 0 && self.left == 0 && self.right == 0
    }

    /// `(rows, cols)` after padding, or `None` on overflow.
    pub fn apply(&self, (rows, cols): (usize, usize)) -> Option<(usize, usize)> {
        let rows = rows.checked_add(self.top)?.checked_add(self.bottom)?;
        let cols = cols.checked_add(self.left)?.checked_add(self.right)?;
        Some((rows, cols))
    }
}

/// Owned `(channels, rows, cols)` tensor of `f64` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape3,
    data: Vec<f64>,
}

impl Tensor {
    /// Zero-filled tensor.
    ///
    /// # Example
    /// ```
    /// # use convinfer::Tensor;
    /// let t = Tensor::new(3, 2, 2);
    /// assert_eq!(t.size(), 12);
    /// ```
    pub fn new(channels: usize, rows: usize, cols: usize) -> Self {
        Self::filled((channels, rows, cols), 0.0)
    }

    /// Tensor with every element set to `value`.
    pub fn filled(shape: Shape3, value: f64) -> Self {
        Self {
            shape,
            data: vec![value; numel(shape)],
        }
    }

    /// Fallible [`Tensor::filled`]: reports shapes whose storage can not be
    /// allocated instead of aborting.
    pub fn try_filled(shape: Shape3, value: f64) -> Result<Self> {
        let count = checked_numel(shape)
            .ok_or_else(|| anyhow!("tensor shape {:?} is too large", shape))?;
        let mut data = Vec::new();
        data.try_reserve_exact(count)
            .map_err(|err| anyhow!("can not allocate tensor of shape {:?}: {}", shape, err))?;
        data.resize(count, value);
        Ok(Self { shape, data })
    }

    /// Build a tensor from flat channel-major data.
    ///
    /// # Example
    /// ```
    /// # use convinfer::Tensor;
    /// # fn main() -> anyhow::Result<()> {
    /// let t = Tensor::from_vec((1, 2, 2), vec![1.0, 2.0, 3.0, 4.0])?;
    /// assert_eq!(t.at(0, 1, 0), 3.0);
    /// # Ok(()) }
    /// ```
    pub fn from_vec(shape: Shape3, data: Vec<f64>) -> Result<Self> {
        let expected = numel(shape);
        if expected != data.len() {
            return Err(anyhow!(
                "tensor shape {:?} expects {} values, got {}",
                shape,
                expected,
                data.len()
            ));
        }
        Ok(Self { shape, data })
    }

    pub fn channels(&self) -> usize {
        self.shape.0
    }

    pub fn rows(&self) -> usize {
        self.shape.1
    }

    pub fn cols(&self) -> usize {
        self.shape.2
    }

    pub fn shape(&self) -> Shape3 {
        self.shape
    }

    /// Total element count.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read one element. Panics when the index is out of bounds.
    pub fn at(&self, channel: usize, row: usize, col: usize) -> f64 {
        let offset = offset_for(self.shape, channel, row, col)
            .unwrap_or_else(|err| panic!("tensor index error: {}", err));
        self.data[offset]
    }

    /// Mutable access to one element. Panics when the index is out of bounds.
    pub fn at_mut(&mut self, channel: usize, row: usize, col: usize) -> &mut f64 {
        let offset = offset_for(self.shape, channel, row, col)
            .unwrap_or_else(|err| panic!("tensor index error: {}", err));
        &mut self.data[offset]
    }

    /// Row-major values of one channel.
    pub fn channel(&self, channel: usize) -> &[f64] {
        let plane = self.shape.1 * self.shape.2;
        &self.data[channel * plane..(channel + 1) * plane]
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f64] {
        let plane = self.shape.1 * self.shape.2;
        &mut self.data[channel * plane..(channel + 1) * plane]
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Overwrite every element from a flat `(channel, row, col)` sequence.
    pub fn fill(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.data.len() {
            return Err(anyhow!(
                "fill expects {} values for shape {:?}, got {}",
                self.data.len(),
                self.shape,
                values.len()
            ));
        }
        self.data.copy_from_slice(values);
        Ok(())
    }

    pub fn fill_value(&mut self, value: f64) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Copy of this tensor with `pads` added around every channel, new cells
    /// set to `value`. Fails when the padded extent does not fit in `usize`.
    pub fn padded(&self, pads: Padding, value: f64) -> Result<Tensor> {
        let (channels, rows, cols) = self.shape;
        let (out_rows, out_cols) = pads.apply((rows, cols)).ok_or_else(|| {
            anyhow!(
                "padding {:?} overflows spatial extent {}x{}",
                pads,
                rows,
                cols
            )
        })?;
        let mut out = Tensor::try_filled((channels, out_rows, out_cols), value)?;
        for c in 0..channels {
            let src = self.channel(c);
            let dst = out.channel_mut(c);
            for r in 0..rows {
                let dst_start = (r + pads.top) * out_cols + pads.left;
                dst[dst_start..dst_start + cols].copy_from_slice(&src[r * cols..(r + 1) * cols]);
            }
        }
        Ok(out)
    }

    /// In-place variant of [`Tensor::padded`]; grows the spatial extent of
    /// this tensor. Left untouched on error.
    pub fn pad(&mut self, pads: Padding, value: f64) -> Result<()> {
        if pads.is_zero() {
            return Ok(());
        }
        *self = self.padded(pads, value)?;
        Ok(())
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tensor({}x{}x{}) {}",
            self.shape.0,
            self.shape.1,
            self.shape.2,
            format_truncated(&self.data)
        )
    }
}
