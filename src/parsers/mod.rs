//! Archive parsers.
//!
//! - [`IChatParser`] - parses Messages `.ichat` archives converted to XML
//!
//! # Example
//!
//! ```rust
//! use ichatpack::parser::Parser;
//! use ichatpack::parsers::IChatParser;
//!
//! let parser = IChatParser::new();
//! assert_eq!(parser.name(), "iChat");
//! ```

mod ichat;

pub use ichat::{IChatParser, ParsedArchive};
