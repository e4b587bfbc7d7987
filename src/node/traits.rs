//! The `HostNode` trait and the typed values that cross the host boundary.

use std::collections::HashMap;

use serde::Serialize;

use super::NodeError;
use crate::sora::ImageTensor;

/// Declared type of a node input, as shown by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    /// Free text field.
    String { multiline: bool, default: String },
    /// Drop-down with a fixed set of values.
    Choice { options: Vec<String> },
    /// Host image tensor.
    Image,
}

/// A named input slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: InputType,
}

impl InputSpec {
    pub fn string(name: &'static str, multiline: bool, default: &str) -> Self {
        Self {
            name,
            kind: InputType::String {
                multiline,
                default: default.to_string(),
            },
        }
    }

    pub fn choice<I, S>(name: &'static str, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name,
            kind: InputType::Choice {
                options: options.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn image(name: &'static str) -> Self {
        Self {
            name,
            kind: InputType::Image,
        }
    }
}

/// Everything the host needs to register and render a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDefinition {
    pub class_key: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    /// Entry point name reported to the host.
    pub function: &'static str,
    pub required: Vec<InputSpec>,
    pub optional: Vec<InputSpec>,
    pub return_types: Vec<&'static str>,
    pub return_names: Vec<&'static str>,
}

/// A value supplied by the host for one input slot.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    String(String),
    Image(ImageTensor),
}

/// A value handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputValue {
    String(String),
}

/// Input values for one invocation, keyed by input name.
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
    values: HashMap<String, InputValue>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a string input.
    pub fn with_string(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values
            .insert(name.to_string(), InputValue::String(value.into()));
        self
    }

    /// Builder-style insert of an image input.
    pub fn with_image(mut self, name: &str, image: ImageTensor) -> Self {
        self.values.insert(name.to_string(), InputValue::Image(image));
        self
    }

    /// A required string input.
    pub fn string(&self, name: &str) -> Result<&str, NodeError> {
        match self.values.get(name) {
            Some(InputValue::String(s)) => Ok(s.as_str()),
            Some(_) => Err(NodeError::InputType {
                name: name.to_string(),
                expected: "a string",
            }),
            None => Err(NodeError::MissingInput(name.to_string())),
        }
    }

    /// An optional image input.
    pub fn image(&self, name: &str) -> Result<Option<&ImageTensor>, NodeError> {
        match self.values.get(name) {
            Some(InputValue::Image(img)) => Ok(Some(img)),
            Some(_) => Err(NodeError::InputType {
                name: name.to_string(),
                expected: "an image",
            }),
            None => Ok(None),
        }
    }
}

/// The contract every node exported to the host must fulfil.
///
/// `execute` is called synchronously from the host's execution thread and may
/// block for as long as the node needs.
pub trait HostNode: Send + Sync {
    fn definition(&self) -> NodeDefinition;

    fn execute(&self, inputs: &NodeInputs) -> Result<Vec<OutputValue>, NodeError>;
}
