//! XML event source for the feed parser.

mod reader;

pub use reader::{EventReader, XmlEvent};
