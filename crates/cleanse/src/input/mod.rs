//! Extraction adapters: turn files into raw tables.

mod parser;
mod source;

pub use parser::{Parser, ParserConfig, SourceFormat};
pub use source::{FileSource, SourceMetadata, TableSource};
