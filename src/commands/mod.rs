pub mod logging;
pub mod sample_command;
pub mod select_command;
pub mod validate_command;

pub use self::{logging::*, sample_command::*, select_command::*, validate_command::*};
