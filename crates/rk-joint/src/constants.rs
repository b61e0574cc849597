//! Global constants for rk-joint

/// Element-wise tolerance when comparing the two reported joint origins
pub const ORIGIN_TOLERANCE: f64 = 1e-6;

/// Kernel length units (centimeters) per meter
pub const KERNEL_UNITS_PER_METER: f64 = 100.0;

/// Decimal places kept for axes, limits and origins
pub const ROUND_DECIMALS: u32 = 6;

/// Largest accepted rounding precision
pub const MAX_DECIMALS: u32 = 17;

/// Effort written into every `limit` element
pub const DEFAULT_EFFORT: f64 = 100.0;

/// Velocity written into every `limit` element
pub const DEFAULT_VELOCITY: f64 = 100.0;

/// Hardware interface used by the generated transmissions
pub const DEFAULT_HARDWARE_INTERFACE: &str = "PositionJointInterface";

/// Transmission type used by the generated transmissions
pub const DEFAULT_TRANSMISSION_TYPE: &str = "transmission_interface/SimpleTransmission";

/// Link name the assembly root is always exported as
pub const BASE_LINK: &str = "base_link1";

/// Component names recognised as the assembly root
pub const BASE_LINK_ALIASES: [&str; 2] = ["base_link", "base_link1"];
