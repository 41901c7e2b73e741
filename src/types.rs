use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point identifier. Assigned by the uploader as `batch_offset + index`.
pub type PointId = u64;

/// Name of the dense vector field in hybrid collections.
pub const DENSE_VECTOR_NAME: &str = "dense";

/// Name of the sparse companion field in hybrid collections.
pub const SPARSE_VECTOR_NAME: &str = "sparse";

/// Distance metric for vector comparison, spelled the way the service expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    /// Cosine similarity.
    #[default]
    #[serde(alias = "cosine")]
    Cosine,
    /// Euclidean (L2) distance.
    #[serde(alias = "euclid", alias = "euclidean")]
    Euclid,
    /// Dot product similarity.
    #[serde(alias = "dot", alias = "dot_product")]
    Dot,
    /// Manhattan (L1) distance.
    #[serde(alias = "manhattan")]
    Manhattan,
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distance::Cosine => write!(f, "Cosine"),
            Distance::Euclid => write!(f, "Euclid"),
            Distance::Dot => write!(f, "Dot"),
            Distance::Manhattan => write!(f, "Manhattan"),
        }
    }
}

/// Vector layout of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Single unnamed dense vector.
    Standard,
    /// Named dense vector plus a named sparse companion.
    Hybrid,
    /// Single unnamed dense vector with a quantization scheme.
    Quantized,
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionKind::Standard => write!(f, "standard"),
            CollectionKind::Hybrid => write!(f, "hybrid"),
            CollectionKind::Quantized => write!(f, "quantized"),
        }
    }
}

// ── Quantization ───────────────────────────────────────────────────────────

/// Remote-side quantization scheme, externally tagged as the service expects:
/// `{"scalar": {...}}` or `{"binary": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizationConfig {
    Scalar(ScalarQuantization),
    Binary(BinaryQuantization),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarQuantization {
    #[serde(rename = "type")]
    pub kind: ScalarType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantile: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_ram: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Int8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryQuantization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_ram: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<BinaryEncoding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryEncoding {
    OneBit,
    TwoBits,
    OneAndHalfBits,
}

/// Quantization methods the benchmark knows how to build and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizationMethod {
    Scalar,
    Binary,
    #[serde(rename = "binary_2bit")]
    Binary2Bit,
}

impl QuantizationMethod {
    pub const ALL: [QuantizationMethod; 3] = [
        QuantizationMethod::Scalar,
        QuantizationMethod::Binary,
        QuantizationMethod::Binary2Bit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuantizationMethod::Scalar => "scalar",
            QuantizationMethod::Binary => "binary",
            QuantizationMethod::Binary2Bit => "binary_2bit",
        }
    }

    /// Collection that holds the corpus compressed with this method.
    pub fn collection_name(&self) -> String {
        format!("quantized_{}", self.as_str())
    }

    /// Advertised speedup over an uncompressed search.
    pub fn expected_speedup(&self) -> &'static str {
        match self {
            QuantizationMethod::Scalar => "2x",
            QuantizationMethod::Binary => "40x",
            QuantizationMethod::Binary2Bit => "20x",
        }
    }

    /// Advertised memory compression.
    pub fn expected_compression(&self) -> &'static str {
        match self {
            QuantizationMethod::Scalar => "4x",
            QuantizationMethod::Binary => "32x",
            QuantizationMethod::Binary2Bit => "16x",
        }
    }
}

impl std::fmt::Display for QuantizationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuantizationMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "scalar" => Ok(QuantizationMethod::Scalar),
            "binary" => Ok(QuantizationMethod::Binary),
            "binary_2bit" => Ok(QuantizationMethod::Binary2Bit),
            other => Err(format!(
                "unknown quantization method '{other}' (expected scalar, binary, binary_2bit)"
            )),
        }
    }
}

// ── Collection creation ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorParams {
    pub size: usize,
    pub distance: Distance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_disk: Option<bool>,
}

/// Either a single unnamed vector config or a map of named vector configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VectorsConfig {
    Single(VectorParams),
    Named(BTreeMap<String, VectorParams>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVectorParams {
    pub index: SparseIndexParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseIndexParams {
    pub on_disk: bool,
}

/// Body of a create-collection call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCollection {
    pub vectors: VectorsConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_vectors: Option<BTreeMap<String, SparseVectorParams>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_config: Option<QuantizationConfig>,
}

impl CreateCollection {
    /// Whether points in this collection address their dense vector by name.
    pub fn uses_named_vectors(&self) -> bool {
        matches!(self.vectors, VectorsConfig::Named(_))
    }
}

/// Summary of a collection as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub points_count: Option<u64>,
    #[serde(default)]
    pub indexed_vectors_count: Option<u64>,
}

// ── Points ─────────────────────────────────────────────────────────────────

/// Vector data of a point: a bare array, or arrays keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointVector {
    Dense(Vec<f32>),
    Named(BTreeMap<String, Vec<f32>>),
}

impl PointVector {
    /// Wrap `values` as named under `field`, or bare when `field` is `None`.
    pub fn new(values: Vec<f32>, field: Option<&str>) -> Self {
        match field {
            Some(name) => PointVector::Named(BTreeMap::from([(name.to_string(), values)])),
            None => PointVector::Dense(values),
        }
    }
}

/// The unit stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub vector: PointVector,
    pub payload: serde_json::Value,
}

// ── Queries ────────────────────────────────────────────────────────────────

/// Quantization-specific search tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantizationSearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescore: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oversampling: Option<f64>,
}

/// Backend search parameters, passed through to the service opaquely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization: Option<QuantizationSearchParams>,
}

impl SearchParams {
    /// Rescore quantized candidates against the original vectors.
    pub fn rescored(oversampling: f64) -> Self {
        Self {
            quantization: Some(QuantizationSearchParams {
                ignore: None,
                rescore: Some(true),
                oversampling: Some(oversampling),
            }),
        }
    }
}

/// A similarity query against one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: Vec<f32>,
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<SearchParams>,
}

/// One hit returned by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: PointId,
    pub score: f32,
}
