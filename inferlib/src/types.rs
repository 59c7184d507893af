use serde_json::{Map, Value};
use uuid::Uuid;

pub type Program = String;
pub type Args = Vec<String>;
pub type JobId = Uuid;
pub type OutputBlob = bytes::Bytes;

/// A single asset's prediction record. Passed through to the caller as-is.
pub type Prediction = Value;

/// The parsed artifact: asset filename -> prediction record.
pub type PredictionResult = Map<String, Value>;
