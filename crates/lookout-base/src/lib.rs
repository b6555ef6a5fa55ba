pub mod logging;
pub mod rect;
pub mod vec2;

pub use logging::{
    FileLogger, StdoutLogger, default_level, init_file_logger, init_file_logger_with_level,
    init_stdout_logger, init_stdout_logger_with_level,
};
pub use rect::Rect;
pub use vec2::Vec2;

// Re-export log crate so downstream crates can use lookout_base::log::*
pub use log;
