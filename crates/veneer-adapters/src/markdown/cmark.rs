//! pulldown-cmark implementation of the Markdown port.

use std::io::Write;

use pulldown_cmark::{Options, Parser, html};

use veneer_core::{
    application::{ApplicationError, ports::MarkdownRenderer},
    error::VeneerResult,
};

/// Markdown → HTML renderer backed by pulldown-cmark.
#[derive(Debug, Clone, Copy)]
pub struct CmarkRenderer {
    options: Options,
}

impl CmarkRenderer {
    /// Create a renderer with tables, footnotes, and strikethrough enabled.
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH,
        }
    }

    /// Create a renderer with explicit parser options.
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }
}

impl Default for CmarkRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn convert(&self, markdown: &[u8], sink: &mut dyn Write) -> VeneerResult<()> {
        let text = std::str::from_utf8(markdown).map_err(|e| ApplicationError::MarkdownRender {
            reason: format!("input is not valid UTF-8: {e}"),
        })?;

        let parser = Parser::new_ext(text, self.options);
        html::write_html_io(&mut *sink, parser).map_err(|e| ApplicationError::SinkWrite {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
