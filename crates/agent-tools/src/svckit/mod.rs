//! Tool implementations

pub mod bash;
pub mod code_search;
pub mod edit_file;
pub mod list_files;
pub mod read_file;

pub use bash::BashTool;
pub use code_search::CodeSearchTool;
pub use edit_file::EditFileTool;
pub use list_files::ListFilesTool;
pub use read_file::ReadFileTool;
