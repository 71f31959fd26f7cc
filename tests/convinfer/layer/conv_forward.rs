use anyhow::Result;
use convinfer::{ConvolutionLayer, InferError, Layer, Tensor};

use crate::common;

#[test]
fn stride_two_sums_disjoint_windows() -> Result<()> {
    let mut layer = ConvolutionLayer::new(1, 1, 2, 2, 0, 2, false);
    layer.set_weights(&[1.0; 4])?;
    let outputs = layer.forward(&[Tensor::filled((1, 4, 4), 1.0)])?;
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].shape(), (1, 2, 2));
    assert!(outputs[0].data().iter().all(|v| *v == 4.0));
    Ok(())
}

#[test]
fn padded_box_filter_dims_the_border() -> Result<()> {
    let mut layer = ConvolutionLayer::new(1, 1, 3, 3, 1, 1, false);
    layer.set_weights(&[1.0 / 9.0; 9])?;
    let outputs = layer.forward(&[Tensor::filled((1, 4, 4), 1.0)])?;
    let out = &outputs[0];
    assert_eq!(out.shape(), (1, 4, 4));

    let interior = [(1, 1), (1, 2), (2, 1), (2, 2)];
    for (r, c) in interior {
        assert!((out.at(0, r, c) - 1.0).abs() < 1e-12);
    }
    for (r, c) in [(0, 0), (0, 3), (3, 0), (3, 3)] {
        let corner = out.at(0, r, c);
        assert!((corner - 4.0 / 9.0).abs() < 1e-12);
        for (ir, ic) in interior {
            assert!(corner < out.at(0, ir, ic));
        }
    }
    assert!((out.at(0, 0, 1) - 6.0 / 9.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn ramp_input_matches_hand_computed_values() -> Result<()> {
    // 1x3x3 input 0..9, kernel [[1, 2], [3, 4]]; no flip.
    let input = Tensor::from_vec((1, 3, 3), (0..9).map(|v| v as f64).collect())?;
    let mut layer = ConvolutionLayer::new(1, 1, 2, 2, 0, 1, false);
    layer.set_weights(&[1.0, 2.0, 3.0, 4.0])?;
    let outputs = layer.forward(&[input])?;
    assert_eq!(outputs[0].data(), &[27.0, 37.0, 57.0, 67.0]);
    Ok(())
}

#[test]
fn bias_is_added_per_output_channel() -> Result<()> {
    let mut layer = ConvolutionLayer::new(2, 1, 1, 1, 0, 1, true);
    layer.set_weights(&[1.0, 2.0])?;
    layer.set_bias(&[0.5, -1.0])?;
    let input = Tensor::from_vec((1, 1, 2), vec![1.0, 3.0])?;
    let outputs = layer.forward(&[input])?;
    assert_eq!(outputs[0].shape(), (2, 1, 2));
    assert_eq!(outputs[0].channel(0), &[1.5, 3.5]);
    assert_eq!(outputs[0].channel(1), &[1.0, 5.0]);
    Ok(())
}

#[test]
fn matches_reference_on_random_batch() -> Result<()> {
    let mut rng = convinfer::Random::with_seed(42);
    let (out_c, in_c, k, stride, padding) = (4, 3, 3, 2, 1);
    let weights = rng.next_values((-1.0, 1.0), out_c * in_c * k * k)?;
    let bias = rng.next_values((-0.5, 0.5), out_c)?;

    let mut layer = ConvolutionLayer::new(out_c, in_c, k, k, padding, stride, true);
    layer.set_weights(&weights)?;
    layer.set_bias(&bias)?;

    let inputs = vec![rng.next((-2.0, 2.0), (in_c, 7, 9))?, rng.next((-2.0, 2.0), (in_c, 6, 6))?];
    let outputs = layer.forward(&inputs)?;
    assert_eq!(outputs.len(), inputs.len());
    for (input, output) in inputs.iter().zip(&outputs) {
        let expected = common::reference_conv(input, layer.weights(), Some(&bias), stride, padding);
        common::assert_tensor_close(output, &expected, common::FloatTol::default())?;
    }
    assert_eq!(outputs[0].shape(), (4, 4, 5));
    assert_eq!(outputs[1].shape(), (4, 3, 3));
    Ok(())
}

#[test]
fn forward_is_deterministic() -> Result<()> {
    let mut rng = convinfer::Random::with_seed(3);
    let mut layer = ConvolutionLayer::new(2, 2, 3, 3, 1, 1, false);
    layer.set_weights(&rng.next_values((-1.0, 1.0), 36)?)?;
    let input = rng.next((-1.0, 1.0), (2, 5, 5))?;
    let first = layer.forward(std::slice::from_ref(&input))?;
    let second = layer.forward(std::slice::from_ref(&input))?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn inputs_are_not_modified() -> Result<()> {
    let mut layer = ConvolutionLayer::new(1, 1, 3, 3, 2, 1, false);
    layer.set_weights(&[1.0; 9])?;
    let inputs = vec![Tensor::filled((1, 3, 3), 2.0)];
    let before = inputs.clone();
    layer.forward(&inputs)?;
    layer.forward(&inputs)?;
    assert_eq!(inputs, before);
    Ok(())
}

#[test]
fn empty_input_list_is_rejected() {
    let layer = ConvolutionLayer::new(1, 1, 1, 1, 0, 1, false);
    assert_eq!(layer.forward(&[]), Err(InferError::InputEmpty));
}

#[test]
fn layer_without_kernels_is_rejected() {
    let layer = ConvolutionLayer::new(0, 1, 1, 1, 0, 1, false);
    assert_eq!(
        layer.forward(&[Tensor::new(1, 2, 2)]),
        Err(InferError::WeightMissing)
    );
}

#[test]
fn empty_input_is_reported_before_missing_weights() {
    let layer = ConvolutionLayer::new(0, 1, 1, 1, 0, 1, true);
    assert_eq!(layer.forward(&[]), Err(InferError::InputEmpty));
}

#[test]
fn oversized_kernel_is_rejected() {
    let layer = ConvolutionLayer::new(1, 1, 5, 5, 0, 1, false);
    assert_eq!(
        layer.forward(&[Tensor::new(1, 4, 4)]),
        Err(InferError::OutputSizeInvalid)
    );
    let padded = ConvolutionLayer::new(1, 1, 5, 5, 1, 1, false);
    assert!(padded.forward(&[Tensor::new(1, 4, 4)]).is_ok());
}

#[test]
fn zero_stride_is_rejected() {
    let layer = ConvolutionLayer::new(1, 1, 1, 1, 0, 0, false);
    assert_eq!(
        layer.forward(&[Tensor::new(1, 2, 2)]),
        Err(InferError::OutputSizeInvalid)
    );
}

#[test]
fn channel_mismatch_is_rejected() {
    let layer = ConvolutionLayer::new(2, 3, 1, 1, 0, 1, false);
    assert_eq!(
        layer.forward(&[Tensor::new(2, 4, 4)]),
        Err(InferError::ChannelMismatch)
    );
}

#[test]
fn output_size_is_checked_before_channels() {
    let layer = ConvolutionLayer::new(1, 3, 5, 5, 0, 1, false);
    assert_eq!(
        layer.forward(&[Tensor::new(2, 4, 4)]),
        Err(InferError::OutputSizeInvalid)
    );
}

#[test]
fn failing_input_discards_the_whole_batch() {
    let layer = ConvolutionLayer::new(1, 1, 2, 2, 0, 1, false);
    let inputs = vec![Tensor::new(1, 3, 3), Tensor::new(1, 1, 1), Tensor::new(1, 3, 3)];
    assert_eq!(layer.forward(&inputs), Err(InferError::OutputSizeInvalid));
}
