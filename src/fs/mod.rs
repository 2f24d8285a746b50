//! FileSystem abstraction for testable file operations

mod mock;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::{
    relative_string, FileSystem, FileType, WalkEntry, WalkFailure, WalkOptions, WalkOutput,
};
pub use real::RealFileSystem;
