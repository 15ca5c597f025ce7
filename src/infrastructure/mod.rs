pub mod escalation;
pub mod logging;

pub use escalation::relaunch_elevated;
pub use logging::init_logging;
