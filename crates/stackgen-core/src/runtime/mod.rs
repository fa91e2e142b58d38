//! Runtime detection
//!
//! This module provides:
//! - Detection of the programs a plan will run (Node.js, package managers,
//!   Python, uv)
//! - Version parsing and minimum-version checks

pub mod check;
pub mod version;

pub use check::{
    check_node, check_plan, check_program, minimum_node, required_programs, MissingTool,
    RuntimeInfo, RuntimeReport,
};
pub use version::{check_minimum, parse_version};
