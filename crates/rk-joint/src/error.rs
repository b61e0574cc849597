//! Error types

use std::fmt;

use crate::kind::JointKind;

/// Which end of a motion range is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitBound {
    Lower,
    Upper,
}

impl fmt::Display for LimitBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitBound::Lower => f.write_str("lower"),
            LimitBound::Upper => f.write_str("upper"),
        }
    }
}

/// Joint resolution errors
///
/// Each names exactly one joint; nothing is recorded for that joint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JointError {
    #[error("{joint} is not set its {bound} limit. Please set it and try again.")]
    MissingLimit { joint: String, bound: LimitBound },
    #[error("{joint} doesn't have joint origin. Please set it and run again.")]
    MissingOrigin { joint: String },
}

impl JointError {
    /// Name of the joint that failed
    pub fn joint(&self) -> &str {
        match self {
            JointError::MissingLimit { joint, .. } | JointError::MissingOrigin { joint } => joint,
        }
    }
}

/// Errors decoding raw kernel data into a joint record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("Unknown kernel joint type index: {0}")]
    UnknownJointType(usize),
    #[error("Kernel reported a {0} joint without its axis")]
    MissingAxis(JointKind),
}

/// Export options loading errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid option: {0}")]
    Invalid(String),
}
