//! ONNX inference using tract
//!
//! The classifier and regressor are opaque ONNX graphs produced by the
//! training pipeline. Every graph input is bound by name to a column of the
//! feature row and fed as a `[1, 1]` tensor of the element type the graph
//! declares. Inputs the row cannot satisfy are schema mismatches.

use super::frame::{FeatureFrame, FeatureValue};
use super::{Classifier, Regressor};
use crate::error::ModelError;
use anyhow::{Context, Result};
use std::time::Instant;
use tract_hir::infer::GenericFactoid;
use tract_onnx::prelude::*;
use tracing::debug;

/// Classifier output holding the predicted class
pub const LABEL_OUTPUT: usize = 0;

/// Classifier output holding per-class probabilities
pub const PROBABILITY_OUTPUT: usize = 1;

/// Index of the positive class within the probability output
pub const POSITIVE_CLASS: usize = 1;

/// Regressor output holding the point estimate
pub const VALUE_OUTPUT: usize = 0;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A graph input as declared by the artifact
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub name: String,
    pub datum_type: DatumType,
}

/// Runnable ONNX graph with its input schema
pub struct OnnxModel {
    name: String,
    plan: TractModel,
    inputs: Vec<ModelInput>,
}

impl OnnxModel {
    /// Parse, type and optimize an ONNX graph from bytes
    ///
    /// Inputs without a declared element type are assumed to be `f32`.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        let corrupt = |e: anyhow::Error| ModelError::ArtifactCorrupt {
            artifact: name.to_string(),
            reason: format!("{:#}", e),
        };

        let mut model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(bytes))
            .map_err(corrupt)?;

        let mut inputs = Vec::with_capacity(model.inputs.len());
        for ix in 0..model.inputs.len() {
            let outlet = model.inputs[ix];
            let input_name = model.node(outlet.node).name.clone();
            let datum_type = match model.input_fact(ix).map_err(corrupt)?.datum_type {
                GenericFactoid::Only(dt) => dt,
                GenericFactoid::Any => DatumType::F32,
            };
            model
                .set_input_fact(ix, InferenceFact::dt_shape(datum_type, tvec!(1, 1)))
                .map_err(corrupt)?;
            inputs.push(ModelInput {
                name: input_name,
                datum_type,
            });
        }

        let plan = model
            .into_optimized()
            .map_err(corrupt)?
            .into_runnable()
            .map_err(corrupt)?;

        debug!(model = %name, inputs = inputs.len(), "ONNX model loaded");
        Ok(Self {
            name: name.to_string(),
            plan,
            inputs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inputs the graph declares, in graph order
    pub fn inputs(&self) -> &[ModelInput] {
        &self.inputs
    }

    /// Declared inputs with no matching column in `frame`
    pub fn missing_columns(&self, frame: &FeatureFrame) -> Vec<String> {
        self.inputs
            .iter()
            .filter(|input| frame.get(&input.name).is_none())
            .map(|input| input.name.clone())
            .collect()
    }

    /// Run the graph once on `frame`
    pub fn run(&self, frame: &FeatureFrame) -> Result<TVec<TValue>> {
        let start = Instant::now();
        let inputs = self.bind(frame)?;
        let outputs = self
            .plan
            .run(inputs)
            .with_context(|| format!("Inference failed for {}", self.name))?;
        debug!(
            model = %self.name,
            elapsed_us = start.elapsed().as_micros(),
            "Inference completed"
        );
        Ok(outputs)
    }

    fn bind(&self, frame: &FeatureFrame) -> Result<TVec<TValue>> {
        self.inputs
            .iter()
            .map(|input| -> Result<TValue> {
                let value = frame
                    .get(&input.name)
                    .ok_or_else(|| ModelError::SchemaMismatch {
                        column: input.name.clone(),
                        reason: "column not present in feature record".to_string(),
                    })?;
                let tensor = encode_cell(&input.name, value, input.datum_type)?;
                Ok(tensor.into())
            })
            .collect()
    }

    fn output_values<T: Datum + Copy>(&self, outputs: &TVec<TValue>, ix: usize) -> Result<Vec<T>> {
        let output = outputs.get(ix).ok_or_else(|| ModelError::MissingOutput {
            artifact: self.name.clone(),
            index: ix,
        })?;
        let cast = output
            .cast_to::<T>()
            .with_context(|| format!("Unexpected element type at output {} of {}", ix, self.name))?;
        Ok(cast.as_slice::<T>()?.to_vec())
    }
}

/// Encode one cell as a `[1, 1]` tensor of the declared element type
fn encode_cell(column: &str, value: &FeatureValue, datum_type: DatumType) -> Result<Tensor, ModelError> {
    let tensor: Tensor = match (value, datum_type) {
        (FeatureValue::Text(text), DatumType::String) => tract_ndarray::arr2(&[[text.clone()]]).into(),
        (FeatureValue::Int(v), DatumType::I64) => tract_ndarray::arr2(&[[*v]]).into(),
        (FeatureValue::Int(v), DatumType::I32) => {
            let narrowed = i32::try_from(*v).map_err(|_| ModelError::SchemaMismatch {
                column: column.to_string(),
                reason: format!("value {} does not fit in i32", v),
            })?;
            tract_ndarray::arr2(&[[narrowed]]).into()
        }
        (FeatureValue::Int(v), DatumType::F32) => tract_ndarray::arr2(&[[*v as f32]]).into(),
        (FeatureValue::Int(v), DatumType::F64) => tract_ndarray::arr2(&[[*v as f64]]).into(),
        (FeatureValue::Float(v), DatumType::F32) => tract_ndarray::arr2(&[[*v as f32]]).into(),
        (FeatureValue::Float(v), DatumType::F64) => tract_ndarray::arr2(&[[*v]]).into(),
        (value, other) => {
            return Err(ModelError::SchemaMismatch {
                column: column.to_string(),
                reason: format!("cannot encode {} value as {:?}", value.kind(), other),
            })
        }
    };
    Ok(tensor)
}

/// Investment classifier backed by an ONNX graph
///
/// Output 0 carries the class, output 1 the class probabilities.
pub struct OnnxClassifier {
    model: OnnxModel,
}

impl OnnxClassifier {
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            model: OnnxModel::from_bytes(name, bytes)?,
        })
    }

    pub fn model(&self) -> &OnnxModel {
        &self.model
    }
}

impl Classifier for OnnxClassifier {
    fn predict_label(&self, frame: &FeatureFrame) -> Result<i64> {
        let outputs = self.model.run(frame)?;
        let labels = self.model.output_values::<i64>(&outputs, LABEL_OUTPUT)?;
        labels.first().copied().ok_or_else(|| {
            ModelError::MissingOutput {
                artifact: self.model.name.clone(),
                index: LABEL_OUTPUT,
            }
            .into()
        })
    }

    fn predict_proba(&self, frame: &FeatureFrame) -> Result<f64> {
        let outputs = self.model.run(frame)?;
        let probabilities = self.model.output_values::<f64>(&outputs, PROBABILITY_OUTPUT)?;
        probabilities.get(POSITIVE_CLASS).copied().ok_or_else(|| {
            ModelError::MissingOutput {
                artifact: self.model.name.clone(),
                index: PROBABILITY_OUTPUT,
            }
            .into()
        })
    }
}

/// Future price regressor backed by an ONNX graph
pub struct OnnxRegressor {
    model: OnnxModel,
}

impl OnnxRegressor {
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            model: OnnxModel::from_bytes(name, bytes)?,
        })
    }

    pub fn model(&self) -> &OnnxModel {
        &self.model
    }
}

impl Regressor for OnnxRegressor {
    fn predict_value(&self, frame: &FeatureFrame) -> Result<f64> {
        let outputs = self.model.run(frame)?;
        let values = self.model.output_values::<f64>(&outputs, VALUE_OUTPUT)?;
        values.first().copied().ok_or_else(|| {
            ModelError::MissingOutput {
                artifact: self.model.name.clone(),
                index: VALUE_OUTPUT,
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyRecord;
    use crate::predictor::derive_features;
    use prost::Message;
    use tract_onnx::pb;
    use tract_onnx::pb::attribute_proto::AttributeType;
    use tract_onnx::pb::tensor_proto::DataType;

    fn frame_with_schools(nearby_schools: u32) -> FeatureFrame {
        let record = PropertyRecord {
            nearby_schools,
            ..PropertyRecord::default()
        };
        FeatureFrame::from(&derive_features(&record, 2025))
    }

    fn input(name: &str, elem_type: DataType) -> pb::ValueInfoProto {
        let dim = |v| pb::tensor_shape_proto::Dimension {
            value: Some(pb::tensor_shape_proto::dimension::Value::DimValue(v)),
            ..Default::default()
        };
        pb::ValueInfoProto {
            name: name.to_string(),
            r#type: Some(pb::TypeProto {
                value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                    elem_type: elem_type as i32,
                    shape: Some(pb::TensorShapeProto {
                        dim: vec![dim(1), dim(1)],
                    }),
                })),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn output(name: &str) -> pb::ValueInfoProto {
        pb::ValueInfoProto {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn constant(name: &str, value: f32) -> pb::TensorProto {
        pb::TensorProto {
            name: name.to_string(),
            data_type: DataType::Float as i32,
            float_data: vec![value],
            ..Default::default()
        }
    }

    fn node(op_type: &str, inputs: &[&str], out: &str, attribute: Vec<pb::AttributeProto>) -> pb::NodeProto {
        pb::NodeProto {
            op_type: op_type.to_string(),
            name: out.to_string(),
            input: inputs.iter().map(|s| s.to_string()).collect(),
            output: vec![out.to_string()],
            attribute,
            ..Default::default()
        }
    }

    fn int_attr(name: &str, value: i64) -> pb::AttributeProto {
        pb::AttributeProto {
            name: name.to_string(),
            r#type: AttributeType::Int as i32,
            i: value,
            ..Default::default()
        }
    }

    fn encode(graph: pb::GraphProto) -> Vec<u8> {
        pb::ModelProto {
            ir_version: 7,
            opset_import: vec![pb::OperatorSetIdProto {
                domain: String::new(),
                version: 13,
            }],
            graph: Some(graph),
            ..Default::default()
        }
        .encode_to_vec()
    }

    /// Classifier on School_Density_Score: label is `score > 0.5`,
    /// probabilities are `[1 - score, score]`
    fn threshold_classifier(with_probabilities: bool) -> Vec<u8> {
        let mut outputs = vec![output("label")];
        if with_probabilities {
            outputs.push(output("probabilities"));
        }
        encode(pb::GraphProto {
            name: "classifier".to_string(),
            input: vec![input("School_Density_Score", DataType::Float)],
            initializer: vec![constant("one", 1.0), constant("half", 0.5)],
            node: vec![
                node("Greater", &["School_Density_Score", "half"], "is_good", vec![]),
                node("Cast", &["is_good"], "label", vec![int_attr("to", DataType::Int64 as i64)]),
                node("Sub", &["one", "School_Density_Score"], "negative", vec![]),
                node(
                    "Concat",
                    &["negative", "School_Density_Score"],
                    "probabilities",
                    vec![int_attr("axis", 1)],
                ),
            ],
            output: outputs,
            ..Default::default()
        })
    }

    /// Regressor doubling Age_of_Property, optionally adding an extra input
    fn doubling_regressor(extra_input: Option<&str>) -> Vec<u8> {
        let mut inputs = vec![input("Age_of_Property", DataType::Float)];
        let mut nodes = vec![node("Mul", &["Age_of_Property", "two"], "doubled", vec![])];
        let result = match extra_input {
            Some(extra) => {
                inputs.push(input(extra, DataType::Float));
                nodes.push(node("Add", &["doubled", extra], "value", vec![]));
                "value"
            }
            None => "doubled",
        };
        encode(pb::GraphProto {
            name: "regressor".to_string(),
            input: inputs,
            initializer: vec![constant("two", 2.0)],
            node: nodes,
            output: vec![output(result)],
            ..Default::default()
        })
    }

    #[test]
    fn test_garbage_bytes_are_corrupt_artifact() {
        let err = OnnxModel::from_bytes("junk.onnx", b"definitely not protobuf")
            .err()
            .expect("garbage must not load");
        match err.downcast_ref::<ModelError>() {
            Some(ModelError::ArtifactCorrupt { artifact, .. }) => assert_eq!(artifact, "junk.onnx"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_adapters_reject_invalid_artifact() {
        assert!(OnnxClassifier::from_bytes("junk.onnx", &[0xff; 16]).is_err());
        assert!(OnnxRegressor::from_bytes("junk.onnx", &[0xff; 16]).is_err());
    }

    #[test]
    fn test_encode_matching_types() {
        let t = encode_cell("City", &FeatureValue::Text("Delhi".into()), DatumType::String).unwrap();
        assert_eq!(t.shape(), &[1, 1]);
        assert_eq!(t.datum_type(), DatumType::String);

        let t = encode_cell("BHK", &FeatureValue::Int(3), DatumType::F32).unwrap();
        assert_eq!(t.as_slice::<f32>().unwrap(), &[3.0]);

        let t = encode_cell("Price_per_SqFt", &FeatureValue::Float(6250.0), DatumType::F64).unwrap();
        assert_eq!(t.as_slice::<f64>().unwrap(), &[6250.0]);

        let t = encode_cell("BHK", &FeatureValue::Int(3), DatumType::I64).unwrap();
        assert_eq!(t.as_slice::<i64>().unwrap(), &[3]);
    }

    #[test]
    fn test_encode_mismatch_is_schema_error() {
        let err = encode_cell("City", &FeatureValue::Text("Delhi".into()), DatumType::F32).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch { ref column, .. } if column == "City"));

        let err = encode_cell("Price_per_SqFt", &FeatureValue::Float(1.5), DatumType::I64).unwrap_err();
        assert!(err.to_string().contains("Price_per_SqFt"));
    }

    #[test]
    fn test_classifier_reads_label_and_positive_probability() {
        let classifier = OnnxClassifier::from_bytes("clf.onnx", &threshold_classifier(true)).unwrap();
        assert_eq!(classifier.model().inputs().len(), 1);
        assert_eq!(classifier.model().inputs()[0].name, "School_Density_Score");
        assert_eq!(classifier.model().inputs()[0].datum_type, DatumType::F32);

        let good = frame_with_schools(7);
        assert_eq!(classifier.predict_label(&good).unwrap(), 1);
        assert!((classifier.predict_proba(&good).unwrap() - 0.7).abs() < 1e-6);

        let poor = frame_with_schools(2);
        assert_eq!(classifier.predict_label(&poor).unwrap(), 0);
        assert!((classifier.predict_proba(&poor).unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_classifier_without_probability_output() {
        let classifier = OnnxClassifier::from_bytes("clf.onnx", &threshold_classifier(false)).unwrap();
        let frame = frame_with_schools(7);

        assert_eq!(classifier.predict_label(&frame).unwrap(), 1);
        let err = classifier.predict_proba(&frame).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::MissingOutput { index, .. }) if *index == PROBABILITY_OUTPUT
        ));
    }

    #[test]
    fn test_regressor_binds_integer_column_as_float() {
        let regressor = OnnxRegressor::from_bytes("reg.onnx", &doubling_regressor(None)).unwrap();
        let frame = frame_with_schools(3);

        // Year_Built 2005 in 2025
        assert_eq!(regressor.predict_value(&frame).unwrap(), 40.0);
        assert!(regressor.model().missing_columns(&frame).is_empty());
    }

    #[test]
    fn test_undeclared_column_is_schema_mismatch() {
        let regressor =
            OnnxRegressor::from_bytes("reg.onnx", &doubling_regressor(Some("Crime_Rate"))).unwrap();
        let frame = frame_with_schools(3);
        assert_eq!(regressor.model().missing_columns(&frame), vec!["Crime_Rate".to_string()]);

        let err = regressor.predict_value(&frame).unwrap_err();
        match err.downcast_ref::<ModelError>() {
            Some(ModelError::SchemaMismatch { column, .. }) => assert_eq!(column, "Crime_Rate"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
