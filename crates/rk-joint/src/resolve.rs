//! Joint resolution: motion axis, limits, link names and origin
//!
//! The CAD kernel reports the joint origin twice, once relative to each
//! occurrence, and the two values are not reliably in the same frame. The
//! resolver decides which reading is consistent and expresses the origin in
//! the parent frame, in meters:
//!
//! 1. If the parent-relative point matches the child-relative point, or
//!    matches the child's world translation, it is used as-is.
//! 2. Otherwise the parent world transform is applied to it.
//! 3. If the two direct readings are not both available, the parent-relative
//!    point alone is used (unwrapping a joint origin if needed).
//! 4. With no parent-relative point at all the joint has no origin.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{JointError, LimitBound};
use crate::export::sanitize_name;
use crate::kind::JointKind;
use crate::options::ExportOptions;
use crate::record::{JointMotion, JointRecord, KernelLimits, OriginInputs};

/// Resolved motion of a joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointMotionSpec {
    pub kind: JointKind,
    /// Unit axis, zero for kinds without one
    pub axis: [f64; 3],
    /// Radians for revolute, meters for prismatic
    pub upper_limit: f64,
    pub lower_limit: f64,
}

impl JointMotionSpec {
    /// Motion with zero axis and zero limits
    pub fn passthrough(kind: JointKind) -> Self {
        Self {
            kind,
            axis: [0.0; 3],
            upper_limit: 0.0,
            lower_limit: 0.0,
        }
    }
}

/// A joint ready for serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedJoint {
    #[serde(rename = "type")]
    pub kind: JointKind,
    pub axis: [f64; 3],
    pub upper_limit: f64,
    pub lower_limit: f64,
    /// Parent link name
    pub parent: String,
    /// Child link name
    pub child: String,
    /// Joint origin in the parent frame, meters
    pub xyz: [f64; 3],
}

impl ResolvedJoint {
    /// Assemble a joint from its resolved parts
    pub fn new(motion: JointMotionSpec, parent: String, child: String, xyz: [f64; 3]) -> Self {
        Self {
            kind: motion.kind,
            axis: motion.axis,
            upper_limit: motion.upper_limit,
            lower_limit: motion.lower_limit,
            parent,
            child,
            xyz,
        }
    }
}

/// How the joint origin was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginBranch {
    /// Parent-relative point already agrees with the child reading
    Identity,
    /// Parent world transform applied to the parent-relative point
    Transformed,
    /// Only the parent-relative point was available
    ParentOnly,
}

/// Resolves kernel joint records into URDF-ready joints
#[derive(Debug, Clone, Default)]
pub struct JointResolver {
    options: ExportOptions,
}

impl JointResolver {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Resolve one joint record
    ///
    /// Either every part resolves or the first unmet precondition is
    /// returned; no partial joint is produced.
    pub fn resolve(&self, record: &JointRecord) -> Result<ResolvedJoint, JointError> {
        let motion = self.resolve_motion(&record.name, &record.motion)?;
        let (parent, child) = self.resolve_links(record);
        let xyz = self.resolve_origin(&record.name, &record.origin)?;
        Ok(ResolvedJoint::new(motion, parent, child, xyz))
    }

    /// Resolve axis and limits for a kernel motion
    pub fn resolve_motion(
        &self,
        joint: &str,
        motion: &JointMotion,
    ) -> Result<JointMotionSpec, JointError> {
        match *motion {
            JointMotion::Revolute {
                rotation_axis,
                limits,
            } => {
                let (upper_limit, lower_limit) = self.resolve_limits(joint, &limits, 1.0)?;
                if !limits.max_enabled && !limits.min_enabled {
                    // Kept as revolute with a zero range rather than continuous
                    tracing::warn!(
                        "Joint '{}' has no rotation limits, exporting as revolute with zero range",
                        joint
                    );
                }
                Ok(JointMotionSpec {
                    kind: JointKind::Revolute,
                    axis: self.round_axis(rotation_axis),
                    upper_limit,
                    lower_limit,
                })
            }
            JointMotion::Prismatic {
                slide_direction,
                limits,
            } => {
                let (upper_limit, lower_limit) =
                    self.resolve_limits(joint, &limits, self.options.kernel_units_per_meter)?;
                Ok(JointMotionSpec {
                    kind: JointKind::Prismatic,
                    axis: self.round_axis(slide_direction),
                    upper_limit,
                    lower_limit,
                })
            }
            JointMotion::Fixed
            | JointMotion::Cylindrical
            | JointMotion::PinSlot
            | JointMotion::Planar
            | JointMotion::Ball => Ok(JointMotionSpec::passthrough(motion.kind())),
        }
    }

    /// Returns `(upper, lower)`, each divided by `divisor` and rounded
    fn resolve_limits(
        &self,
        joint: &str,
        limits: &KernelLimits,
        divisor: f64,
    ) -> Result<(f64, f64), JointError> {
        match (limits.max_enabled, limits.min_enabled) {
            (true, true) => Ok((
                self.options.round(limits.max_value / divisor),
                self.options.round(limits.min_value / divisor),
            )),
            (true, false) => Err(JointError::MissingLimit {
                joint: joint.to_string(),
                bound: LimitBound::Lower,
            }),
            (false, true) => Err(JointError::MissingLimit {
                joint: joint.to_string(),
                bound: LimitBound::Upper,
            }),
            (false, false) => Ok((0.0, 0.0)),
        }
    }

    fn round_axis(&self, axis: DVec3) -> [f64; 3] {
        axis.to_array().map(|c| self.options.round(c))
    }

    /// Returns `(parent, child)` link names
    pub fn resolve_links(&self, record: &JointRecord) -> (String, String) {
        let parent = if self.options.is_base_link(&record.occurrence_two.component_name) {
            self.options.base_link.clone()
        } else {
            sanitize_name(&record.occurrence_two.full_path_name)
        };
        let child = sanitize_name(&record.occurrence_one.full_path_name);
        (parent, child)
    }

    /// Joint origin in the parent frame, meters, rounded
    pub fn resolve_origin(&self, joint: &str, origin: &OriginInputs) -> Result<[f64; 3], JointError> {
        let (point, branch) = self.origin_point(joint, origin)?;
        tracing::debug!("Joint '{}' origin resolved via {:?}", joint, branch);
        Ok(point.to_array().map(|c| self.options.to_meters(c)))
    }

    /// Joint origin in the parent frame, kernel units
    pub fn origin_point(
        &self,
        joint: &str,
        origin: &OriginInputs,
    ) -> Result<(DVec3, OriginBranch), JointError> {
        let one = origin.geometry_one.and_then(|g| g.direct_point());
        let two = origin.geometry_two.and_then(|g| g.direct_point());

        if let (Some(one), Some(two)) = (one, two) {
            let tol = self.options.origin_tolerance;
            let same_as_child = all_close(two, one, tol);
            let at_child_origin = all_close(two, origin.occurrence_one_translation, tol);
            if same_as_child || at_child_origin {
                return Ok((two, OriginBranch::Identity));
            }
            let transformed = origin.parent_affine().transform_point3(two);
            return Ok((transformed, OriginBranch::Transformed));
        }

        match origin.geometry_two {
            Some(geometry) => Ok((geometry.point(), OriginBranch::ParentOnly)),
            None => Err(JointError::MissingOrigin {
                joint: joint.to_string(),
            }),
        }
    }
}

/// Resolve one record with default options
pub fn resolve_joint(record: &JointRecord) -> Result<ResolvedJoint, JointError> {
    JointResolver::default().resolve(record)
}

/// Element-wise `|a - b| < tol`
fn all_close(a: DVec3, b: DVec3, tol: f64) -> bool {
    (a - b).abs().max_element() < tol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{OccurrenceRef, OriginGeometry};

    fn child() -> OccurrenceRef {
        OccurrenceRef::new("arm:1+forearm:1", "forearm")
    }

    fn parent() -> OccurrenceRef {
        OccurrenceRef::new("arm:1", "arm")
    }

    fn translation(x: f64, y: f64, z: f64) -> [f64; 16] {
        [
            1.0, 0.0, 0.0, x, //
            0.0, 1.0, 0.0, y, //
            0.0, 0.0, 1.0, z, //
            0.0, 0.0, 0.0, 1.0,
        ]
    }

    /// Rotation of 90 degrees about Z followed by a translation
    fn rotate_z_then_translate(x: f64, y: f64, z: f64) -> [f64; 16] {
        [
            0.0, -1.0, 0.0, x, //
            1.0, 0.0, 0.0, y, //
            0.0, 0.0, 1.0, z, //
            0.0, 0.0, 0.0, 1.0,
        ]
    }

    fn garbage_transform() -> [f64; 16] {
        [
            3.0, 7.0, -2.0, 500.0, //
            1.5, 0.0, 9.0, -40.0, //
            -8.0, 4.0, 2.0, 13.0, //
            1.0, 1.0, 1.0, 0.0,
        ]
    }

    #[test]
    fn test_prismatic_limits_scaled() {
        let record = JointRecord::builder("slider", child(), parent())
            .prismatic(DVec3::X, KernelLimits::bounded(-12.5, 37.25))
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.kind, JointKind::Prismatic);
        assert_eq!(joint.upper_limit, 0.3725);
        assert_eq!(joint.lower_limit, -0.125);
        assert_eq!(joint.axis, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_prismatic_limit_rounding() {
        let record = JointRecord::builder("slider", child(), parent())
            .prismatic(DVec3::Z, KernelLimits::bounded(-0.00012345, 1.23456789))
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.upper_limit, 0.012346);
        assert_eq!(joint.lower_limit, -0.000001);
    }

    #[test]
    fn test_revolute_limits_in_radians() {
        let record = JointRecord::builder("elbow", child(), parent())
            .revolute(DVec3::Z, KernelLimits::bounded(-std::f64::consts::FRAC_PI_2, 1.0))
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.kind, JointKind::Revolute);
        assert_eq!(joint.upper_limit, 1.0);
        assert_eq!(joint.lower_limit, -1.570796);
        assert_eq!(joint.axis, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_revolute_axis_rounded() {
        let axis = DVec3::new(1.0, 1.0, 0.0).normalize();
        let record = JointRecord::builder("elbow", child(), parent())
            .revolute(axis, KernelLimits::unbounded())
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.axis, [0.707107, 0.707107, 0.0]);
    }

    #[test]
    fn test_limit_order_not_enforced() {
        let record = JointRecord::builder("elbow", child(), parent())
            .revolute(DVec3::Z, KernelLimits::bounded(2.0, -2.0))
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.upper_limit, -2.0);
        assert_eq!(joint.lower_limit, 2.0);
    }

    #[test]
    fn test_missing_lower_limit() {
        let limits = KernelLimits {
            max_enabled: true,
            min_enabled: false,
            max_value: 1.0,
            min_value: 0.0,
        };
        let record = JointRecord::builder("elbow", child(), parent())
            .revolute(DVec3::Z, limits)
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .build();
        let err = resolve_joint(&record).unwrap_err();
        assert_eq!(
            err,
            JointError::MissingLimit {
                joint: "elbow".to_string(),
                bound: LimitBound::Lower,
            }
        );
        assert_eq!(
            err.to_string(),
            "elbow is not set its lower limit. Please set it and try again."
        );
    }

    #[test]
    fn test_missing_upper_limit_prismatic() {
        let limits = KernelLimits {
            max_enabled: false,
            min_enabled: true,
            max_value: 0.0,
            min_value: -3.0,
        };
        let record = JointRecord::builder("slider", child(), parent())
            .prismatic(DVec3::Y, limits)
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .build();
        assert!(matches!(
            resolve_joint(&record),
            Err(JointError::MissingLimit {
                bound: LimitBound::Upper,
                ..
            })
        ));
    }

    #[test]
    fn test_unbounded_revolute_stays_revolute() {
        let record = JointRecord::builder("wheel", child(), parent())
            .revolute(DVec3::Y, KernelLimits::unbounded())
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.kind, JointKind::Revolute);
        assert_eq!(joint.upper_limit, 0.0);
        assert_eq!(joint.lower_limit, 0.0);
    }

    #[test]
    fn test_passthrough_kinds() {
        for motion in [
            JointMotion::Fixed,
            JointMotion::Cylindrical,
            JointMotion::PinSlot,
            JointMotion::Planar,
            JointMotion::Ball,
        ] {
            let record = JointRecord::builder("j", child(), parent())
                .motion(motion)
                .geometry_two(OriginGeometry::Point(DVec3::ZERO))
                .build();
            let joint = resolve_joint(&record).unwrap();
            assert_eq!(joint.kind, motion.kind());
            assert_eq!(joint.axis, [0.0; 3]);
            assert_eq!((joint.upper_limit, joint.lower_limit), (0.0, 0.0));
        }
    }

    #[test]
    fn test_identity_when_origins_agree() {
        let p = DVec3::new(12.0, -3.5, 7.25);
        let record = JointRecord::builder("j", child(), parent())
            .geometry_one(OriginGeometry::Point(p + DVec3::splat(5e-7)))
            .geometry_two(OriginGeometry::Point(p))
            .child_translation(DVec3::new(100.0, 100.0, 100.0))
            .parent_transform(garbage_transform())
            .build();
        let resolver = JointResolver::default();
        let (_, branch) = resolver.origin_point("j", &record.origin).unwrap();
        assert_eq!(branch, OriginBranch::Identity);
        let joint = resolver.resolve(&record).unwrap();
        assert_eq!(joint.xyz, [0.12, -0.035, 0.0725]);
    }

    #[test]
    fn test_identity_when_at_child_origin() {
        let p = DVec3::new(4.0, 5.0, 6.0);
        let record = JointRecord::builder("j", child(), parent())
            .geometry_one(OriginGeometry::Point(DVec3::new(-1.0, 0.0, 0.0)))
            .geometry_two(OriginGeometry::Point(p))
            .child_translation(p)
            .parent_transform(garbage_transform())
            .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.xyz, [0.04, 0.05, 0.06]);
    }

    #[test]
    fn test_origins_outside_tolerance() {
        let record = JointRecord::builder("j", child(), parent())
            .geometry_one(OriginGeometry::Point(DVec3::new(0.0, 0.0, 2e-6)))
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .child_translation(DVec3::new(1.0, 1.0, 1.0))
            .parent_transform(translation(10.0, 0.0, 0.0))
            .build();
        let (_, branch) = JointResolver::default()
            .origin_point("j", &record.origin)
            .unwrap();
        assert_eq!(branch, OriginBranch::Transformed);
    }

    #[test]
    fn test_transform_pure_translation() {
        let record = JointRecord::builder("j", child(), parent())
            .geometry_one(OriginGeometry::Point(DVec3::new(3.0, 3.0, 3.0)))
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .child_translation(DVec3::new(50.0, 0.0, 0.0))
            .parent_transform(translation(10.0, 0.0, 0.0))
            .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.xyz, [0.1, 0.0, 0.0]);
    }

    #[test]
    fn test_transform_rotation_and_translation() {
        // ex = (0, 1, 0), ey = (-1, 0, 0): (2, 0, 1) -> (0, 2, 1) + (10, 20, 30)
        let record = JointRecord::builder("j", child(), parent())
            .geometry_one(OriginGeometry::Point(DVec3::new(9.0, 9.0, 9.0)))
            .geometry_two(OriginGeometry::Point(DVec3::new(2.0, 0.0, 1.0)))
            .child_translation(DVec3::ZERO)
            .parent_transform(rotate_z_then_translate(10.0, 20.0, 30.0))
            .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.xyz, [0.1, 0.22, 0.31]);
    }

    #[test]
    fn test_fallback_without_child_geometry() {
        let record = JointRecord::builder("j", child(), parent())
            .geometry_two(OriginGeometry::Point(DVec3::new(25.0, 0.0, -5.0)))
            .parent_transform(translation(1000.0, 0.0, 0.0))
            .build();
        let resolver = JointResolver::default();
        let (_, branch) = resolver.origin_point("j", &record.origin).unwrap();
        assert_eq!(branch, OriginBranch::ParentOnly);
        assert_eq!(resolver.resolve(&record).unwrap().xyz, [0.25, 0.0, -0.05]);
    }

    #[test]
    fn test_fallback_when_child_origin_wrapped() {
        let p = DVec3::new(12.0, -30.0, 4.5);
        let record = JointRecord::builder("j", child(), parent())
            .geometry_one(OriginGeometry::JointOrigin(DVec3::new(7.0, 7.0, 7.0)))
            .geometry_two(OriginGeometry::Point(p))
            .child_translation(DVec3::new(50.0, 0.0, 0.0))
            .parent_transform(rotate_z_then_translate(10.0, 20.0, 30.0))
            .build();
        let resolver = JointResolver::default();
        let (point, branch) = resolver.origin_point("j", &record.origin).unwrap();
        assert_eq!(branch, OriginBranch::ParentOnly);
        assert_eq!(point, p);
        assert_eq!(resolver.resolve(&record).unwrap().xyz, [0.12, -0.3, 0.045]);
    }

    #[test]
    fn test_fallback_unwraps_joint_origin() {
        let record = JointRecord::builder("j", child(), parent())
            .geometry_one(OriginGeometry::Point(DVec3::new(1.0, 2.0, 3.0)))
            .geometry_two(OriginGeometry::JointOrigin(DVec3::new(0.0, 100.0, 0.0)))
            .parent_transform(translation(1000.0, 0.0, 0.0))
            .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.xyz, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_origin() {
        let record = JointRecord::builder("j", child(), parent())
            .geometry_one(OriginGeometry::Point(DVec3::ONE))
            .build();
        let err = resolve_joint(&record).unwrap_err();
        assert_eq!(
            err,
            JointError::MissingOrigin {
                joint: "j".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "j doesn't have joint origin. Please set it and run again."
        );
    }

    #[test]
    fn test_limit_error_precedes_origin_error() {
        let limits = KernelLimits {
            max_enabled: true,
            min_enabled: false,
            max_value: 1.0,
            min_value: 0.0,
        };
        let record = JointRecord::builder("j", child(), parent())
            .revolute(DVec3::Z, limits)
            .build();
        assert!(matches!(
            resolve_joint(&record),
            Err(JointError::MissingLimit { .. })
        ));
    }

    #[test]
    fn test_link_names() {
        let record = JointRecord::builder(
            "j",
            OccurrenceRef::new("arm 1:1+fore arm:2", "fore arm"),
            OccurrenceRef::new("arm 1:1", "arm 1"),
        )
        .geometry_two(OriginGeometry::Point(DVec3::ZERO))
        .build();
        let joint = resolve_joint(&record).unwrap();
        assert_eq!(joint.parent, "arm_11");
        assert_eq!(joint.child, "arm_11fore_arm2");
    }

    #[test]
    fn test_base_link_anchoring() {
        for component in ["base_link", "base_link1"] {
            let record = JointRecord::builder(
                "j",
                child(),
                OccurrenceRef::new("robot:1+base_link:3", component),
            )
            .geometry_two(OriginGeometry::Point(DVec3::ZERO))
            .build();
            assert_eq!(resolve_joint(&record).unwrap().parent, "base_link1");
        }

        let record = JointRecord::builder(
            "j",
            child(),
            OccurrenceRef::new("base_link2:1", "base_link2"),
        )
        .geometry_two(OriginGeometry::Point(DVec3::ZERO))
        .build();
        assert_eq!(resolve_joint(&record).unwrap().parent, "base_link21");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let record = JointRecord::builder("j", child(), parent())
            .revolute(DVec3::new(0.0, 0.6, 0.8), KernelLimits::bounded(-0.3, 0.7))
            .geometry_one(OriginGeometry::Point(DVec3::new(1.0, 2.0, 3.0)))
            .geometry_two(OriginGeometry::Point(DVec3::new(0.3, -0.1, 7.7)))
            .child_translation(DVec3::new(5.0, 5.0, 5.0))
            .parent_transform(rotate_z_then_translate(1.1, 2.2, 3.3))
            .build();
        let resolver = JointResolver::default();
        let a = resolver.resolve(&record).unwrap();
        let b = resolver.resolve(&record).unwrap();
        assert_eq!(a, b);
        for (x, y) in a.xyz.iter().zip(b.xyz.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }
}
