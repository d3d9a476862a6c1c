pub mod demo_command;

pub use self::demo_command::*;
