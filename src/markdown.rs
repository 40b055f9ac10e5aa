use crate::htmlrenderer::push_html;
use pulldown_cmark::{Options, Parser};
use std::fmt;
use std::io;

/// Converts markdown to HTML with tables, footnotes, strikethrough, task
/// lists, and smart punctuation enabled. Headings are given slug ids (see
/// [`crate::htmlrenderer`]).
pub fn to_html(markdown: &str) -> Result<String, Error> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    push_html(&mut html, Parser::new_ext(markdown, options))?;
    Ok(html)
}

/// Represents an error converting markdown to HTML.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O errors raised while writing the HTML.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "Rendering markdown: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts a [`io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for IO operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tables() -> Result<(), Error> {
        let html = to_html("| a | b |\n|---|--:|\n| 1 | 2 |")?;
        assert!(html.starts_with("<table><thead><tr><th>a</th>"));
        assert!(html.contains(r#"<th align="right">b</th>"#));
        assert!(html.contains(r#"<td align="right">2</td>"#));
        assert!(html.ends_with("</tbody></table>"));
        Ok(())
    }

    #[test]
    fn test_strikethrough() -> Result<(), Error> {
        assert_eq!(to_html("~~gone~~")?, "<p><del>gone</del></p>");
        Ok(())
    }

    #[test]
    fn test_footnotes() -> Result<(), Error> {
        let html = to_html("Text[^1].\n\n[^1]: Note.")?;
        assert!(html.contains(r##"<a href="#1">1</a>"##));
        assert!(html.contains(r#"<div class="footnote-definition" id="1">"#));
        Ok(())
    }
}
