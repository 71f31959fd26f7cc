use anyhow::Result;
use convinfer::{
    ConvolutionLayer, Layer, LayerRegistry, ParseError, RuntimeParameter, Tensor, CONVOLUTION_TYPE,
};

use crate::common;

fn valid_descriptor() -> convinfer::RuntimeOperator {
    common::conv_descriptor(
        2,
        2,
        2,
        1,
        0,
        (1..=16).map(|v| v as f64).collect(),
        Some(vec![10.0, 20.0]),
    )
}

#[test]
fn registry_builds_a_working_layer() -> Result<()> {
    let registry = LayerRegistry::with_builtin_layers();
    let layer = registry.create_layer(&valid_descriptor())?;
    assert_eq!(layer.layer_name(), "Convolution");

    let input = Tensor::filled((2, 2, 2), 1.0);
    let outputs = layer.forward(&[input])?;
    // kernel 0 sums 1..=8, kernel 1 sums 9..=16
    assert_eq!(outputs[0].shape(), (2, 1, 1));
    assert_eq!(outputs[0].data(), &[36.0 + 10.0, 100.0 + 20.0]);
    Ok(())
}

#[test]
fn weights_are_loaded_kernel_channel_row_col() -> Result<()> {
    let layer = ConvolutionLayer::get_instance(&valid_descriptor())?;
    let k1 = &layer.weights()[1];
    assert_eq!(k1.at(0, 0, 0), 9.0);
    assert_eq!(k1.at(0, 1, 0), 11.0);
    assert_eq!(k1.at(1, 0, 1), 14.0);
    Ok(())
}

#[test]
fn missing_stride_produces_no_layer() {
    let mut op = valid_descriptor();
    op.params.remove("stride");
    let registry = LayerRegistry::with_builtin_layers();
    assert_eq!(registry.create_layer(&op).err(), Some(ParseError::MissingStride));
}

#[test]
fn missing_weight_produces_no_layer() {
    let mut op = valid_descriptor();
    op.attributes.remove("weight");
    assert_eq!(
        ConvolutionLayer::get_instance(&op),
        Err(ParseError::MissingAttrWeight)
    );
}

#[test]
fn bias_attribute_is_required_even_when_disabled() {
    let registry = LayerRegistry::with_builtin_layers();
    let mut op = valid_descriptor().with_param("bias", false);
    op.attributes.remove("bias");
    assert_eq!(registry.create_layer(&op).err(), Some(ParseError::MissingAttrBias));

    op.attributes.remove("weight");
    assert_eq!(registry.create_layer(&op).err(), Some(ParseError::MissingAttrBias));
}

#[test]
fn bias_shape_must_lead_with_out_channels() {
    let op = valid_descriptor().with_attribute("bias", vec![3], vec![0.0; 3]);
    assert_eq!(
        ConvolutionLayer::get_instance(&op),
        Err(ParseError::BiasShapeMismatch)
    );
}

#[test]
fn only_first_spatial_component_is_used() -> Result<()> {
    let op = valid_descriptor()
        .with_param("stride", vec![2i64, 3])
        .with_param("padding", vec![1i64, 4]);
    let layer = ConvolutionLayer::get_instance(&op)?;
    assert_eq!(layer.stride(), 2);
    assert_eq!(layer.padding(), 1);
    Ok(())
}

#[test]
fn rectangular_kernels_are_supported() -> Result<()> {
    let op = valid_descriptor()
        .with_param("kernel_size", vec![1i64, 3])
        .with_attribute("weight", vec![2, 2, 1, 3], vec![1.0; 12]);
    let layer = ConvolutionLayer::get_instance(&op)?;
    assert_eq!(layer.weights()[0].shape(), (2, 1, 3));
    assert_eq!(layer.output_shape((2, 4, 4)), Some((2, 4, 2)));
    Ok(())
}

#[test]
fn wrong_parameter_kind_maps_to_field_code() {
    let op = valid_descriptor().with_param("padding", RuntimeParameter::Int(1));
    assert_eq!(
        ConvolutionLayer::get_instance(&op),
        Err(ParseError::MissingPadding)
    );
    let op = valid_descriptor().with_param("out_channels", RuntimeParameter::Float(2.0));
    assert_eq!(
        ConvolutionLayer::get_instance(&op),
        Err(ParseError::MissingOutChannel)
    );
}

#[test]
fn type_name_must_be_registered() {
    let mut op = valid_descriptor();
    op.type_name = "nn.Conv3d".to_string();
    let registry = LayerRegistry::with_builtin_layers();
    assert!(registry.contains(CONVOLUTION_TYPE));
    assert_eq!(
        registry.create_layer(&op).err().map(|err| err.code()),
        Some(ParseError::UnknownLayerType(String::new()).code())
    );
}
