//! XML generation for URDF joint and transmission elements
//!
//! Fragments are standalone elements without an XML declaration; wrapping
//! them in a `<robot>` document is left to the caller.

use crate::options::ExportOptions;
use crate::resolve::ResolvedJoint;

/// Generate the `joint` element for a resolved joint
pub fn joint_xml(name: &str, joint: &ResolvedJoint, options: &ExportOptions) -> String {
    let mut urdf = String::new();
    write_joint(&mut urdf, name, joint, options, 0);
    urdf
}

/// Generate the `transmission` element driving the named joint
pub fn transmission_xml(name: &str, options: &ExportOptions) -> String {
    let mut urdf = String::new();
    write_transmission(&mut urdf, name, options, 0);
    urdf
}

pub fn write_joint(
    urdf: &mut String,
    name: &str,
    joint: &ResolvedJoint,
    options: &ExportOptions,
    indent: usize,
) {
    let pad = " ".repeat(indent);

    urdf.push_str(&format!(
        "{}<joint name=\"{}\" type=\"{}\">\n",
        pad,
        xml_escape(name),
        joint.kind.urdf_type()
    ));
    urdf.push_str(&format!(
        "{}  <origin xyz=\"{}\" rpy=\"0 0 0\"/>\n",
        pad,
        format_triple(&joint.xyz)
    ));
    urdf.push_str(&format!(
        "{}  <parent link=\"{}\"/>\n",
        pad,
        xml_escape(&joint.parent)
    ));
    urdf.push_str(&format!(
        "{}  <child link=\"{}\"/>\n",
        pad,
        xml_escape(&joint.child)
    ));

    if joint.kind.has_axis() {
        urdf.push_str(&format!(
            "{}  <axis xyz=\"{}\"/>\n",
            pad,
            format_triple(&joint.axis)
        ));
    }

    if joint.kind.has_limits() {
        urdf.push_str(&format!(
            "{}  <limit upper=\"{}\" lower=\"{}\" effort=\"{}\" velocity=\"{}\"/>\n",
            pad, joint.upper_limit, joint.lower_limit, options.effort, options.velocity
        ));
    }

    urdf.push_str(&format!("{}</joint>\n", pad));
}

pub fn write_transmission(urdf: &mut String, name: &str, options: &ExportOptions, indent: usize) {
    let pad = " ".repeat(indent);
    let name = xml_escape(name);
    let interface = xml_escape(&options.hardware_interface);

    urdf.push_str(&format!("{}<transmission name=\"{}_tran\">\n", pad, name));
    urdf.push_str(&format!(
        "{}  <type>{}</type>\n",
        pad,
        xml_escape(&options.transmission_type)
    ));
    urdf.push_str(&format!("{}  <joint name=\"{}\">\n", pad, name));
    urdf.push_str(&format!(
        "{}    <hardwareInterface>{}</hardwareInterface>\n",
        pad, interface
    ));
    urdf.push_str(&format!("{}  </joint>\n", pad));
    urdf.push_str(&format!("{}  <actuator name=\"{}_actr\">\n", pad, name));
    urdf.push_str(&format!(
        "{}    <hardwareInterface>{}</hardwareInterface>\n",
        pad, interface
    ));
    urdf.push_str(&format!(
        "{}    <mechanicalReduction>{}</mechanicalReduction>\n",
        pad, options.mechanical_reduction
    ));
    urdf.push_str(&format!("{}  </actuator>\n", pad));
    urdf.push_str(&format!("{}</transmission>\n", pad));
}

fn format_triple(v: &[f64; 3]) -> String {
    format!("{} {} {}", v[0], v[1], v[2])
}

pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Make a CAD name safe for use as a link or joint name
///
/// Surrounding whitespace is trimmed, spaces become underscores, and anything
/// other than alphanumerics, `_`, `-` and `.` is dropped.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|&c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        .collect()
}
