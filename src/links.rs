//! Retargets links between documents from their source format to their output
//! format, e.g. `<a href="other.md">` becomes `<a href="other.html">`. Links
//! to remote sites and links to anything other than a markdown document are
//! left alone.

use lol_html::{element, rewrite_str, RewriteStrSettings};
use std::fmt;

pub const MARKDOWN_EXTENSION: &str = ".md";
pub const HTML_EXTENSION: &str = ".html";

/// Returns the output-format href for `href`, or `None` if `href` doesn't
/// point at a markdown document on this site.
pub fn convert_href(href: &str) -> Option<String> {
    if href.is_empty() || href.starts_with("http://") || href.starts_with("https://") {
        return None;
    }
    let stem = href.strip_suffix(MARKDOWN_EXTENSION)?;
    Some(format!("{}{}", stem, HTML_EXTENSION))
}

/// Rewrites the `href` of every anchor in `html` for which [`convert_href`]
/// returns a new target. Only those attributes change; every other byte of
/// the input is passed through as-is.
pub fn rewrite_links(html: &str) -> Result<String> {
    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a[href]", |el| {
                if let Some(href) = el.get_attribute("href") {
                    if let Some(converted) = convert_href(&href) {
                        el.set_attribute("href", &converted)?;
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;
    Ok(rewritten)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents an error rewriting the links in a document.
#[derive(Debug)]
pub struct Error(lol_html::errors::RewritingError);

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rewriting links: {}", self.0)
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<lol_html::errors::RewritingError> for Error {
    /// Converts a [`lol_html::errors::RewritingError`] into an [`Error`]. It
    /// allows us to use the `?` operator on the rewriter.
    fn from(err: lol_html::errors::RewritingError) -> Error {
        Error(err)
    }
}
