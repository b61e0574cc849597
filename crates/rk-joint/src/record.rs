//! Joint records reported by the CAD host
//!
//! A `JointRecord` is everything the resolver needs to know about one
//! assembly joint. Occurrence one is the child body, occurrence two the
//! parent. Lengths are in kernel units (centimeters).

use glam::{DAffine3, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::kind::JointKind;

/// Row-major 4x4 identity, as the kernel reports transforms
pub const IDENTITY_TRANSFORM: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// One joint of the assembly, as seen by the CAD kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointRecord {
    pub name: String,
    pub motion: JointMotion,
    /// Child body
    pub occurrence_one: OccurrenceRef,
    /// Parent body
    pub occurrence_two: OccurrenceRef,
    #[serde(default)]
    pub origin: OriginInputs,
}

impl JointRecord {
    /// Create a builder for constructing records with fluent API
    pub fn builder(
        name: impl Into<String>,
        child: OccurrenceRef,
        parent: OccurrenceRef,
    ) -> JointRecordBuilder {
        JointRecordBuilder::new(name, child, parent)
    }

    /// Kernel joint kind
    pub fn kind(&self) -> JointKind {
        self.motion.kind()
    }
}

/// Occurrence (placed component instance) referenced by a joint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceRef {
    /// Full path through the assembly, e.g. `arm:1+wrist:1`
    pub full_path_name: String,
    /// Name of the component this occurrence instantiates
    pub component_name: String,
}

impl OccurrenceRef {
    pub fn new(full_path_name: impl Into<String>, component_name: impl Into<String>) -> Self {
        Self {
            full_path_name: full_path_name.into(),
            component_name: component_name.into(),
        }
    }
}

/// Enabled flags and values of a kernel motion range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KernelLimits {
    pub max_enabled: bool,
    pub min_enabled: bool,
    pub max_value: f64,
    pub min_value: f64,
}

impl KernelLimits {
    /// Both bounds enabled
    pub fn bounded(min_value: f64, max_value: f64) -> Self {
        Self {
            max_enabled: true,
            min_enabled: true,
            max_value,
            min_value,
        }
    }

    /// No bound enabled
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Joint motion as the kernel reports it: a type-table index plus the axis
/// and range of the motion object that index selects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelMotion {
    /// Index into the kernel joint type table
    pub joint_type: usize,
    /// Rotation axis (revolute) or slide direction (prismatic)
    #[serde(default)]
    pub axis: Option<DVec3>,
    #[serde(default)]
    pub limits: KernelLimits,
}

/// Kernel joint motion, shaped by the joint kind
///
/// Serialized in the kernel's shape (`KernelMotion`); decoding fails with a
/// `RecordError` for an unknown type index or a missing axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "KernelMotion", into = "KernelMotion")]
pub enum JointMotion {
    #[default]
    Fixed,
    Revolute {
        /// Unit rotation axis
        rotation_axis: DVec3,
        limits: KernelLimits,
    },
    Prismatic {
        /// Unit slide direction
        slide_direction: DVec3,
        /// Range in kernel length units
        limits: KernelLimits,
    },
    Cylindrical,
    PinSlot,
    Planar,
    Ball,
}

impl JointMotion {
    /// Decode the kernel's type index and motion data
    pub fn from_kernel(
        joint_type: usize,
        axis: Option<DVec3>,
        limits: KernelLimits,
    ) -> Result<Self, RecordError> {
        let kind = JointKind::try_from(joint_type)?;
        if let Some(motion) = Self::without_axis(kind) {
            return Ok(motion);
        }
        let axis = axis.ok_or(RecordError::MissingAxis(kind))?;
        Ok(match kind {
            JointKind::Prismatic => JointMotion::Prismatic {
                slide_direction: axis,
                limits,
            },
            _ => JointMotion::Revolute {
                rotation_axis: axis,
                limits,
            },
        })
    }

    pub fn kind(&self) -> JointKind {
        match self {
            JointMotion::Fixed => JointKind::Fixed,
            JointMotion::Revolute { .. } => JointKind::Revolute,
            JointMotion::Prismatic { .. } => JointKind::Prismatic,
            JointMotion::Cylindrical => JointKind::Cylindrical,
            JointMotion::PinSlot => JointKind::PinSlot,
            JointMotion::Planar => JointKind::Planar,
            JointMotion::Ball => JointKind::Ball,
        }
    }

    /// Motion for a kind that carries no axis or range data
    ///
    /// Returns `None` for revolute and prismatic, which need their axis.
    pub fn without_axis(kind: JointKind) -> Option<Self> {
        match kind {
            JointKind::Fixed => Some(JointMotion::Fixed),
            JointKind::Cylindrical => Some(JointMotion::Cylindrical),
            JointKind::PinSlot => Some(JointMotion::PinSlot),
            JointKind::Planar => Some(JointMotion::Planar),
            JointKind::Ball => Some(JointMotion::Ball),
            JointKind::Revolute | JointKind::Prismatic => None,
        }
    }
}

impl TryFrom<KernelMotion> for JointMotion {
    type Error = RecordError;

    fn try_from(raw: KernelMotion) -> Result<Self, Self::Error> {
        Self::from_kernel(raw.joint_type, raw.axis, raw.limits)
    }
}

impl From<JointMotion> for KernelMotion {
    fn from(motion: JointMotion) -> Self {
        let (axis, limits) = match motion {
            JointMotion::Revolute {
                rotation_axis,
                limits,
            } => (Some(rotation_axis), limits),
            JointMotion::Prismatic {
                slide_direction,
                limits,
            } => (Some(slide_direction), limits),
            _ => (None, KernelLimits::default()),
        };
        Self {
            joint_type: motion.kind().kernel_index(),
            axis,
            limits,
        }
    }
}

/// Geometry a joint is attached to on one of its occurrences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginGeometry {
    /// Point picked directly on the occurrence geometry
    Point(DVec3),
    /// Point wrapped inside a named joint origin
    JointOrigin(DVec3),
}

impl OriginGeometry {
    /// The point, unwrapping a joint origin if needed
    pub fn point(&self) -> DVec3 {
        match self {
            OriginGeometry::Point(p) | OriginGeometry::JointOrigin(p) => *p,
        }
    }

    /// The point only if it was reported directly
    pub fn direct_point(&self) -> Option<DVec3> {
        match self {
            OriginGeometry::Point(p) => Some(*p),
            OriginGeometry::JointOrigin(_) => None,
        }
    }
}

/// Raw origin geometry of one joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginInputs {
    /// Joint origin relative to the child occurrence
    pub geometry_one: Option<OriginGeometry>,
    /// Joint origin relative to the parent occurrence
    pub geometry_two: Option<OriginGeometry>,
    /// Child occurrence origin in world space
    pub occurrence_one_translation: DVec3,
    /// Parent occurrence world transform, row-major with translation at 3, 7, 11
    pub occurrence_two_transform: [f64; 16],
}

impl Default for OriginInputs {
    fn default() -> Self {
        Self {
            geometry_one: None,
            geometry_two: None,
            occurrence_one_translation: DVec3::ZERO,
            occurrence_two_transform: IDENTITY_TRANSFORM,
        }
    }
}

impl OriginInputs {
    /// Parent world transform as an affine map
    ///
    /// Columns are ex = [M0, M4, M8], ey = [M1, M5, M9], ez = [M2, M6, M10],
    /// translation = [M3, M7, M11]. The projective row is ignored.
    pub fn parent_affine(&self) -> DAffine3 {
        let m = &self.occurrence_two_transform;
        DAffine3::from_cols(
            DVec3::new(m[0], m[4], m[8]),
            DVec3::new(m[1], m[5], m[9]),
            DVec3::new(m[2], m[6], m[10]),
            DVec3::new(m[3], m[7], m[11]),
        )
    }
}

/// Builder for creating joint records with fluent API
#[derive(Debug, Clone)]
pub struct JointRecordBuilder {
    name: String,
    motion: JointMotion,
    child: OccurrenceRef,
    parent: OccurrenceRef,
    origin: OriginInputs,
}

impl JointRecordBuilder {
    /// Create a new record builder (fixed joint, no origin geometry)
    pub fn new(name: impl Into<String>, child: OccurrenceRef, parent: OccurrenceRef) -> Self {
        Self {
            name: name.into(),
            motion: JointMotion::Fixed,
            child,
            parent,
            origin: OriginInputs::default(),
        }
    }

    /// Set the kernel motion
    pub fn motion(mut self, motion: JointMotion) -> Self {
        self.motion = motion;
        self
    }

    /// Set as a revolute joint
    pub fn revolute(mut self, rotation_axis: DVec3, limits: KernelLimits) -> Self {
        self.motion = JointMotion::Revolute {
            rotation_axis,
            limits,
        };
        self
    }

    /// Set as a prismatic joint (limits in kernel length units)
    pub fn prismatic(mut self, slide_direction: DVec3, limits: KernelLimits) -> Self {
        self.motion = JointMotion::Prismatic {
            slide_direction,
            limits,
        };
        self
    }

    /// Set the origin relative to the child occurrence
    pub fn geometry_one(mut self, geometry: OriginGeometry) -> Self {
        self.origin.geometry_one = Some(geometry);
        self
    }

    /// Set the origin relative to the parent occurrence
    pub fn geometry_two(mut self, geometry: OriginGeometry) -> Self {
        self.origin.geometry_two = Some(geometry);
        self
    }

    /// Set the child occurrence world translation
    pub fn child_translation(mut self, translation: DVec3) -> Self {
        self.origin.occurrence_one_translation = translation;
        self
    }

    /// Set the parent occurrence world transform (row-major)
    pub fn parent_transform(mut self, transform: [f64; 16]) -> Self {
        self.origin.occurrence_two_transform = transform;
        self
    }

    /// Build the record
    pub fn build(self) -> JointRecord {
        JointRecord {
            name: self.name,
            motion: self.motion,
            occurrence_one: self.child,
            occurrence_two: self.parent,
            origin: self.origin,
        }
    }
}
