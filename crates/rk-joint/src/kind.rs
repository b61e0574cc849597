//! Joint kinds reported by the CAD kernel

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Joint motion kind, in kernel type-table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    #[default]
    Fixed,
    Revolute,
    Prismatic,
    Cylindrical,
    PinSlot,
    Planar,
    Ball,
}

impl JointKind {
    /// Kernel type table (index -> kind)
    pub const TABLE: [JointKind; 7] = [
        JointKind::Fixed,
        JointKind::Revolute,
        JointKind::Prismatic,
        JointKind::Cylindrical,
        JointKind::PinSlot,
        JointKind::Planar,
        JointKind::Ball,
    ];

    /// Look up a kind by its kernel type index
    pub fn from_kernel_index(index: usize) -> Result<Self, RecordError> {
        Self::TABLE
            .get(index)
            .copied()
            .ok_or(RecordError::UnknownJointType(index))
    }

    /// Position in the kernel type table
    pub fn kernel_index(&self) -> usize {
        match self {
            JointKind::Fixed => 0,
            JointKind::Revolute => 1,
            JointKind::Prismatic => 2,
            JointKind::Cylindrical => 3,
            JointKind::PinSlot => 4,
            JointKind::Planar => 5,
            JointKind::Ball => 6,
        }
    }

    /// Type string written into the `type` attribute of the joint element
    pub fn urdf_type(&self) -> &'static str {
        match self {
            JointKind::Fixed => "fixed",
            JointKind::Revolute => "revolute",
            JointKind::Prismatic => "prismatic",
            JointKind::Cylindrical => "cylindrical",
            JointKind::PinSlot => "pin_slot",
            JointKind::Planar => "planar",
            JointKind::Ball => "ball",
        }
    }

    /// Check if this joint kind emits an `axis` element
    pub fn has_axis(&self) -> bool {
        matches!(self, JointKind::Revolute | JointKind::Prismatic)
    }

    /// Check if this joint kind emits a `limit` element
    pub fn has_limits(&self) -> bool {
        matches!(self, JointKind::Revolute | JointKind::Prismatic)
    }
}

impl TryFrom<usize> for JointKind {
    type Error = RecordError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_kernel_index(index)
    }
}

impl fmt::Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.urdf_type())
    }
}
