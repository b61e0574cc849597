//! Joint export core for CAD-to-URDF conversion
//!
//! This crate turns the joints of a CAD assembly into URDF fragments:
//! - JointRecord: what the CAD host reports for one joint
//! - JointResolver: motion axis, limits and origin in the parent frame
//! - export: `joint` and `transmission` XML fragments
//! - walk: folding an occurrence tree into a joint collection

pub mod constants;
pub mod error;
pub mod export;
pub mod kind;
pub mod options;
pub mod record;
pub mod resolve;
pub mod walk;

pub use constants::*;
pub use error::*;
pub use export::*;
pub use kind::*;
pub use options::*;
pub use record::*;
pub use resolve::*;
pub use walk::*;
