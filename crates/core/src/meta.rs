//! Method signature metadata
//!
//! The engine describes each method's inputs and outputs with a
//! [`MethodMeta`]: one [`Tag`] per position plus, for tensor positions, a
//! [`TensorInfo`] with the expected dtype and layout. The invoker uses it to
//! pick the target tag for each argument.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dtype::ScalarType;
use crate::error::{Error, Result};
use crate::host::HostValue;
use crate::value::Tag;

/// Expected layout of one tensor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorInfo {
    /// Dimension sizes
    pub sizes: Vec<usize>,
    /// Physical-to-logical dimension order
    pub dim_order: Vec<usize>,
    /// Element kind
    pub scalar_type: ScalarType,
    /// Whether the engine plans this tensor's memory
    pub is_memory_planned: bool,
    /// Size of the tensor data in bytes
    pub nbytes: usize,
}

impl TensorInfo {
    /// Contiguous tensor info with identity dim-order.
    ///
    /// `nbytes` saturates at `usize::MAX` for sizes whose byte count does
    /// not fit.
    pub fn new(scalar_type: ScalarType, sizes: Vec<usize>) -> Self {
        let nbytes = sizes
            .iter()
            .try_fold(scalar_type.element_size(), |acc, &dim| acc.checked_mul(dim))
            .unwrap_or(usize::MAX);
        let dim_order = (0..sizes.len()).collect();
        Self {
            sizes,
            dim_order,
            scalar_type,
            is_memory_planned: false,
            nbytes,
        }
    }

    /// Mark the tensor as memory planned.
    pub fn memory_planned(mut self, planned: bool) -> Self {
        self.is_memory_planned = planned;
        self
    }

    /// Export to a host object.
    pub fn to_host_value(&self) -> HostValue {
        let mut obj = HashMap::new();
        obj.insert("sizes".to_string(), usize_array(&self.sizes));
        obj.insert("dimOrder".to_string(), usize_array(&self.dim_order));
        obj.insert(
            "scalarType".to_string(),
            HostValue::Int(i64::from(self.scalar_type.code())),
        );
        obj.insert(
            "isMemoryPlanned".to_string(),
            HostValue::Bool(self.is_memory_planned),
        );
        obj.insert("nbytes".to_string(), HostValue::Int(i64::try_from(self.nbytes).unwrap_or(i64::MAX)));
        HostValue::Object(obj)
    }
}

/// Signature of one method: tags and tensor info per position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMeta {
    name: String,
    input_tags: Vec<Tag>,
    input_tensor_meta: Vec<Option<TensorInfo>>,
    output_tags: Vec<Tag>,
    output_tensor_meta: Vec<Option<TensorInfo>>,
    memory_planned_buffer_sizes: Vec<usize>,
}

impl MethodMeta {
    /// Empty signature for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_tags: Vec::new(),
            input_tensor_meta: Vec::new(),
            output_tags: Vec::new(),
            output_tensor_meta: Vec::new(),
            memory_planned_buffer_sizes: Vec::new(),
        }
    }

    /// Append a non-tensor input.
    pub fn with_input(mut self, tag: Tag) -> Self {
        self.input_tags.push(tag);
        self.input_tensor_meta.push(None);
        self
    }

    /// Append a tensor input.
    pub fn with_tensor_input(mut self, info: TensorInfo) -> Self {
        self.input_tags.push(Tag::Tensor);
        self.input_tensor_meta.push(Some(info));
        self
    }

    /// Append a non-tensor output.
    pub fn with_output(mut self, tag: Tag) -> Self {
        self.output_tags.push(tag);
        self.output_tensor_meta.push(None);
        self
    }

    /// Append a tensor output.
    pub fn with_tensor_output(mut self, info: TensorInfo) -> Self {
        self.output_tags.push(Tag::Tensor);
        self.output_tensor_meta.push(Some(info));
        self
    }

    /// Append a memory-planned buffer of `size` bytes.
    pub fn with_memory_planned_buffer(mut self, size: usize) -> Self {
        self.memory_planned_buffer_sizes.push(size);
        self
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of inputs
    pub fn num_inputs(&self) -> usize {
        self.input_tags.len()
    }

    /// Number of outputs
    pub fn num_outputs(&self) -> usize {
        self.output_tags.len()
    }

    /// All input tags in order
    pub fn input_tags(&self) -> &[Tag] {
        &self.input_tags
    }

    /// All output tags in order
    pub fn output_tags(&self) -> &[Tag] {
        &self.output_tags
    }

    /// Tag of input `index`
    pub fn input_tag(&self, index: usize) -> Result<Tag> {
        position(&self.input_tags, index, "input").copied()
    }

    /// Tag of output `index`
    pub fn output_tag(&self, index: usize) -> Result<Tag> {
        position(&self.output_tags, index, "output").copied()
    }

    /// Tensor info of input `index` (`None` for non-tensor positions)
    pub fn input_tensor_meta(&self, index: usize) -> Result<Option<&TensorInfo>> {
        position(&self.input_tensor_meta, index, "input").map(Option::as_ref)
    }

    /// Tensor info of output `index` (`None` for non-tensor positions)
    pub fn output_tensor_meta(&self, index: usize) -> Result<Option<&TensorInfo>> {
        position(&self.output_tensor_meta, index, "output").map(Option::as_ref)
    }

    /// Number of memory-planned buffers
    pub fn num_memory_planned_buffers(&self) -> usize {
        self.memory_planned_buffer_sizes.len()
    }

    /// Size in bytes of memory-planned buffer `index`
    pub fn memory_planned_buffer_size(&self, index: usize) -> Result<usize> {
        position(&self.memory_planned_buffer_sizes, index, "memory-planned buffer").copied()
    }

    /// Export to a host object.
    pub fn to_host_value(&self) -> HostValue {
        let tags = |tags: &[Tag]| {
            HostValue::Array(
                tags.iter()
                    .map(|t| HostValue::Int(i64::from(t.code())))
                    .collect(),
            )
        };
        let infos = |infos: &[Option<TensorInfo>]| {
            HostValue::Array(
                infos
                    .iter()
                    .map(|i| i.as_ref().map_or(HostValue::Null, TensorInfo::to_host_value))
                    .collect(),
            )
        };

        let mut obj = HashMap::new();
        obj.insert("name".to_string(), HostValue::String(self.name.clone()));
        obj.insert("inputTags".to_string(), tags(&self.input_tags));
        obj.insert("outputTags".to_string(), tags(&self.output_tags));
        obj.insert("inputTensorMeta".to_string(), infos(&self.input_tensor_meta));
        obj.insert("outputTensorMeta".to_string(), infos(&self.output_tensor_meta));
        obj.insert(
            "numMemoryPlannedBuffers".to_string(),
            HostValue::Int(self.memory_planned_buffer_sizes.len() as i64),
        );
        obj.insert(
            "memoryPlannedBufferSizes".to_string(),
            usize_array(&self.memory_planned_buffer_sizes),
        );
        HostValue::Object(obj)
    }
}

fn position<'a, T>(items: &'a [T], index: usize, what: &str) -> Result<&'a T> {
    items.get(index).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "{} index {} out of range ({} available)",
            what,
            index,
            items.len()
        ))
    })
}

fn usize_array(values: &[usize]) -> HostValue {
    HostValue::Array(values.iter().map(|v| HostValue::Int(*v as i64)).collect())
}
