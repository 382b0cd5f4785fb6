pub mod api;
pub mod config;
pub mod embedded;
pub mod error;
pub mod keywords;
pub mod lexer;
pub mod mode;
pub mod reindent;
pub mod report;
pub mod retriever;
pub mod segment;
pub mod token;
pub mod writer;

// Re-export the main public API
pub use api::{format, format_document, get_matching_paths, run};
pub use config::load_config;
pub use error::{FormatError, LexError, ParseError, RenderError, SqlreindentError};
pub use mode::{FormatOptions, Mode};
