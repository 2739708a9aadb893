//! Solo HTML Parser
//!
//! Turns theme markup into a [`solo_dom::Document`] using html5ever.

mod parser;

pub use parser::HtmlParser;
pub use solo_dom::Document;

/// Parse an HTML string into a document
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse(html)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("markup has no <body> element")]
    MissingBody,
}
