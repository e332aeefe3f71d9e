#![doc = include_str!("../README.md")]

pub mod checker;
pub mod driver;
pub mod interp;
pub mod persistent;

pub use checker::check_system;
pub use driver::{check_xml_buffer, check_xml_file, check_xta_buffer, check_xta_file, Frontend};
pub use interp::{EvalResult, Interpreter, NotComputable};
pub use persistent::persistent_variables;
