//! Assembly walking: folding every joint of an occurrence tree
//!
//! Joints are keyed the way the exporter names them: root joints by their
//! sanitized name, joints inside an occurrence by the sanitized occurrence
//! path, an underscore and the joint name.

use serde::{Deserialize, Serialize};

use crate::error::JointError;
use crate::export::{joint_xml, sanitize_name, transmission_xml, write_joint, write_transmission};
use crate::options::ExportOptions;
use crate::record::JointRecord;
use crate::resolve::{JointResolver, ResolvedJoint};

/// Occurrence tree of a CAD assembly, reduced to its joints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyTree {
    /// Joints defined on the root component
    pub root_joints: Vec<JointRecord>,
    /// Top-level occurrences
    pub occurrences: Vec<Occurrence>,
}

/// An occurrence with its joints and child occurrences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Occurrence {
    pub full_path_name: String,
    /// Joints of the occurrence's component, in assembly context
    pub joints: Vec<JointRecord>,
    pub children: Vec<Occurrence>,
}

impl AssemblyTree {
    /// All joints with their export keys, root joints first, then occurrences
    /// depth-first (an occurrence's joints before its children)
    pub fn keyed_joints(&self) -> Vec<(String, &JointRecord)> {
        let mut keyed: Vec<(String, &JointRecord)> = self
            .root_joints
            .iter()
            .map(|j| (sanitize_name(&j.name), j))
            .collect();

        let mut stack: Vec<&Occurrence> = self.occurrences.iter().rev().collect();
        while let Some(occurrence) = stack.pop() {
            let prefix = sanitize_name(&occurrence.full_path_name);
            keyed.extend(
                occurrence
                    .joints
                    .iter()
                    .map(|j| (format!("{}_{}", prefix, j.name), j)),
            );
            stack.extend(occurrence.children.iter().rev());
        }
        keyed
    }
}

/// Resolved joints of one export run, in insertion order, plus failures
#[derive(Debug, Clone, Default)]
pub struct JointCollection {
    joints: Vec<(String, ResolvedJoint)>,
    errors: Vec<JointError>,
}

/// The two XML fragments generated for one joint
#[derive(Debug, Clone, PartialEq)]
pub struct JointFragments {
    pub name: String,
    pub joint_xml: String,
    pub transmission_xml: String,
}

impl JointCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a joint; an existing key keeps its position and takes the new value
    pub fn insert(&mut self, name: String, joint: ResolvedJoint) {
        match self.joints.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = joint,
            None => self.joints.push((name, joint)),
        }
    }

    /// Fold one resolution result into the collection
    pub fn record(&mut self, name: String, result: Result<ResolvedJoint, JointError>) {
        match result {
            Ok(joint) => self.insert(name, joint),
            Err(err) => {
                tracing::warn!("Skipping joint '{}': {}", name, err);
                self.errors.push(err);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedJoint> {
        self.joints.iter().find(|(k, _)| k == name).map(|(_, j)| j)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedJoint)> {
        self.joints.iter().map(|(k, j)| (k.as_str(), j))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.joints.iter().map(|(k, _)| k.as_str())
    }

    /// Joints that failed to resolve
    pub fn errors(&self) -> &[JointError] {
        &self.errors
    }

    /// All joints, or the first failure if any joint failed
    pub fn into_result(self) -> Result<Vec<(String, ResolvedJoint)>, JointError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.joints),
        }
    }

    /// Joint and transmission fragments for every joint, in order
    pub fn fragments(&self, options: &ExportOptions) -> Vec<JointFragments> {
        self.iter()
            .map(|(name, joint)| JointFragments {
                name: name.to_string(),
                joint_xml: joint_xml(name, joint, options),
                transmission_xml: transmission_xml(name, options),
            })
            .collect()
    }

    /// Append every joint element
    pub fn write_joints(&self, urdf: &mut String, options: &ExportOptions, indent: usize) {
        for (name, joint) in self.iter() {
            write_joint(urdf, name, joint, options, indent);
            urdf.push('\n');
        }
    }

    /// Append every transmission element
    pub fn write_transmissions(&self, urdf: &mut String, options: &ExportOptions, indent: usize) {
        for name in self.names() {
            write_transmission(urdf, name, options, indent);
            urdf.push('\n');
        }
    }
}

/// Resolve every joint in the tree
///
/// Failed joints are logged and listed in `errors()`; they never disturb
/// joints already collected.
pub fn collect_joints(tree: &AssemblyTree, resolver: &JointResolver) -> JointCollection {
    let collection = tree
        .keyed_joints()
        .into_iter()
        .fold(JointCollection::new(), |mut acc, (name, record)| {
            acc.record(name, resolver.resolve(record));
            acc
        });

    tracing::info!(
        "Resolved {} joints ({} failed)",
        collection.len(),
        collection.errors().len()
    );
    collection
}
