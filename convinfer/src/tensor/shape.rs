use anyhow::{anyhow, Result};

/// `(channels, rows, cols)` extent of a feature map.
pub type Shape3 = (usize, usize, usize);

pub fn numel(shape: Shape3) -> usize {
    shape.0.saturating_mul(shape.1).saturating_mul(shape.2)
}

/// Element count of `shape`, or `None` when its `f64` storage could not be
/// allocated.
pub(crate) fn checked_numel(shape: Shape3) -> Option<usize> {
    let count = shape.0.checked_mul(shape.1)?.checked_mul(shape.2)?;
    let bytes = count.checked_mul(std::mem::size_of::<f64>())?;
    (bytes <= isize::MAX as usize).then_some(count)
}

/// Number of window positions along one axis: `floor((dim - kernel) / stride) + 1`.
///
/// Returns `None` when no window fits (kernel larger than the input, or a
/// zero-sized kernel or stride).
pub fn conv_output_dim(dim: usize, kernel: usize, stride: usize) -> Option<usize> {
    if kernel == 0 || stride == 0 || dim < kernel {
        return None;
    }
    Some((dim - kernel) / stride + 1)
}

pub(crate) fn offset_for(shape: Shape3, channel: usize, row: usize, col: usize) -> Result<usize> {
    let (channels, rows, cols) = shape;
    if channel >= channels || row >= rows || col >= cols {
        return Err(anyhow!(
            "index ({}, {}, {}) out of bounds for shape ({}, {}, {})",
            channel,
            row,
            col,
            channels,
            rows,
            cols
        ));
    }
    Ok((channel * rows + row) * cols + col)
}
