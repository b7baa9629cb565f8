pub mod guide;
pub mod logging;
