//! Pipeline module - the stages driven by the command line

pub mod count;
pub mod extract;
pub mod mask;
pub mod pulldown;
