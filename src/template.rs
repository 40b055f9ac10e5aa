//! Defines the [`Template`] every page is rendered into. A template is an
//! ordinary HTML document with four elements marked by id:
//!
//! * [`CONTENT_ID`]: the document body replaces this element's contents.
//! * [`SIDEBAR_ID`]: one `<li>` per sibling document is appended here.
//! * [`BREADCRUMB_ID`]: one `<li>` per breadcrumb entry is appended here.
//! * [`STYLESHEET_ID`]: a `<link>` whose `href` is pointed at the shared
//!   stylesheet.
//!
//! The ids are checked once when the template is loaded, so a template that
//! is missing one fails before any page is written.

use crate::navigation::{BreadcrumbEntry, SidebarEntry};
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use pulldown_cmark::escape::{escape_href, escape_html};
use std::cell::Cell;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONTENT_ID: &str = "ssg-inject-content";
pub const SIDEBAR_ID: &str = "ssg-inject-sidebar-links";
pub const BREADCRUMB_ID: &str = "ssg-inject-breadcrumb-links";
pub const STYLESHEET_ID: &str = "ssg-inject-stylesheet";

/// The four injection points, in the order they are reported when missing.
pub const INJECTION_POINTS: [&str; 4] = [CONTENT_ID, SIDEBAR_ID, BREADCRUMB_ID, STYLESHEET_ID];

/// The file name of the template within the template folder.
pub const TEMPLATE_FILE_NAME: &str = "template.html";

/// Everything that is injected into the template for one page.
pub struct PageParts<'a> {
    /// The page's rendered, sanitized body.
    pub content: &'a str,

    /// The documents next to this one.
    pub sidebar: &'a [SidebarEntry],

    /// The trail from the site root to this page.
    pub breadcrumbs: &'a [BreadcrumbEntry],

    /// The relative reference to the shared stylesheet, e.g. `../style.css`.
    pub stylesheet_href: &'a str,
}

/// A validated page template. The source is never modified; each call to
/// [`Template::render`] produces a fresh page.
#[derive(Debug)]
pub struct Template {
    source: String,
}

impl Template {
    /// Reads and validates the template at `path`.
    pub fn load(path: &Path) -> Result<Template> {
        let source = std::fs::read_to_string(path).map_err(|err| Error::Read {
            path: path.to_owned(),
            err,
        })?;
        Template::parse(source)
    }

    /// Validates `source`, failing if any of the [`INJECTION_POINTS`] is
    /// missing.
    pub fn parse(source: String) -> Result<Template> {
        let found: [Cell<bool>; 4] = Default::default();
        rewrite_str(
            &source,
            RewriteStrSettings {
                element_content_handlers: INJECTION_POINTS
                    .iter()
                    .zip(found.iter())
                    .map(|(id, found)| {
                        element!(id_selector(id), move |_el| {
                            found.set(true);
                            Ok(())
                        })
                    })
                    .collect(),
                ..RewriteStrSettings::new()
            },
        )?;

        match INJECTION_POINTS
            .iter()
            .zip(found.iter())
            .find(|(_, found)| !found.get())
        {
            Some((id, _)) => Err(Error::MissingInjectionPoint(*id)),
            None => Ok(Template { source }),
        }
    }

    /// Renders a page by injecting `parts` into the template.
    pub fn render(&self, parts: &PageParts) -> Result<String> {
        let sidebar = sidebar_items(parts.sidebar);
        let breadcrumbs = breadcrumb_items(parts.breadcrumbs);

        let page = rewrite_str(
            &self.source,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!(id_selector(CONTENT_ID), |el| {
                        el.set_inner_content(parts.content, ContentType::Html);
                        Ok(())
                    }),
                    element!(id_selector(SIDEBAR_ID), |el| {
                        el.append(&sidebar, ContentType::Html);
                        Ok(())
                    }),
                    element!(id_selector(BREADCRUMB_ID), |el| {
                        el.append(&breadcrumbs, ContentType::Html);
                        Ok(())
                    }),
                    element!(id_selector(STYLESHEET_ID), |el| {
                        el.set_attribute("href", parts.stylesheet_href)?;
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::new()
            },
        )?;
        Ok(page)
    }
}

fn id_selector(id: &str) -> String {
    format!("#{}", id)
}

fn sidebar_items(entries: &[SidebarEntry]) -> String {
    let mut items = String::new();
    for entry in entries {
        items.push_str("<li>");
        push_link(&mut items, &entry.href, &entry.display_text);
        items.push_str("</li>");
    }
    items
}

fn breadcrumb_items(entries: &[BreadcrumbEntry]) -> String {
    let mut items = String::new();
    for entry in entries {
        items.push_str("<li>");
        match &entry.href {
            Some(href) => push_link(&mut items, href, &entry.display_text),
            None => push_text(&mut items, &entry.display_text),
        }
        items.push_str("</li>");
    }
    items
}

fn push_link(out: &mut String, href: &str, text: &str) {
    out.push_str("<a href=\"");
    // Writing to a String can't fail.
    let _ = escape_href(&mut *out, href);
    out.push_str("\">");
    push_text(out, text);
    out.push_str("</a>");
}

fn push_text(out: &mut String, text: &str) {
    let _ = escape_html(&mut *out, text);
}

/// The result of a fallible template operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or rendering a [`Template`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the template file can't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when the template lacks one of the [`INJECTION_POINTS`]. This
    /// means the template is misconfigured, so the whole build stops.
    MissingInjectionPoint(&'static str),

    /// Returned when the HTML rewriter fails.
    Rewrite(lol_html::errors::RewritingError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading template file '{}': {}", path.display(), err)
            }
            Error::MissingInjectionPoint(id) => write!(
                f,
                "The template has no element with id \"{}\"; every template needs \
                 elements with the ids {:?}",
                id, INJECTION_POINTS,
            ),
            Error::Rewrite(err) => write!(f, "Rendering template: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::MissingInjectionPoint(_) => None,
            Error::Rewrite(err) => Some(err),
        }
    }
}

impl From<lol_html::errors::RewritingError> for Error {
    /// Converts a [`lol_html::errors::RewritingError`] into an [`Error`]. This
    /// allows us to use the `?` operator on the rewriter.
    fn from(err: lol_html::errors::RewritingError) -> Error {
        Error::Rewrite(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = concat!(
        "<html><head>",
        r#"<link id="ssg-inject-stylesheet" rel="stylesheet" href="style.css">"#,
        "</head><body>",
        r#"<ul id="ssg-inject-breadcrumb-links"></ul>"#,
        r#"<ul id="ssg-inject-sidebar-links"><li>Static</li></ul>"#,
        r#"<main id="ssg-inject-content"><p>placeholder</p></main>"#,
        "</body></html>",
    );

    fn fixture_missing(id: &'static str) {
        let source = TEMPLATE.replace(&format!("id=\"{}\"", id), "");
        match Template::parse(source) {
            Err(Error::MissingInjectionPoint(missing)) => assert_eq!(missing, id),
            other => panic!("wanted MissingInjectionPoint({}), got {:?}", id, other),
        }
    }

    #[test]
    fn test_bundled_template_is_valid() -> Result<()> {
        Template::parse(include_str!("../template/template.html").to_owned())?;
        Ok(())
    }

    #[test]
    fn test_missing_content() {
        fixture_missing(CONTENT_ID)
    }

    #[test]
    fn test_missing_sidebar() {
        fixture_missing(SIDEBAR_ID)
    }

    #[test]
    fn test_missing_breadcrumb() {
        fixture_missing(BREADCRUMB_ID)
    }

    #[test]
    fn test_missing_stylesheet() {
        fixture_missing(STYLESHEET_ID)
    }

    #[test]
    fn test_render() -> Result<()> {
        let template = Template::parse(TEMPLATE.to_owned())?;
        let sidebar = vec![SidebarEntry {
            display_text: "about".to_owned(),
            href: "./about.html".to_owned(),
        }];
        let breadcrumbs = vec![
            BreadcrumbEntry {
                display_text: "Home".to_owned(),
                href: Some("../index.html".to_owned()),
            },
            BreadcrumbEntry {
                display_text: "a < b".to_owned(),
                href: None,
            },
        ];
        let page = template.render(&PageParts {
            content: "<h1 id=\"x\">X</h1>",
            sidebar: &sidebar,
            breadcrumbs: &breadcrumbs,
            stylesheet_href: "../style.css",
        })?;

        assert_eq!(
            page,
            concat!(
                "<html><head>",
                r#"<link id="ssg-inject-stylesheet" rel="stylesheet" href="../style.css">"#,
                "</head><body>",
                r#"<ul id="ssg-inject-breadcrumb-links">"#,
                r#"<li><a href="../index.html">Home</a></li><li>a &lt; b</li></ul>"#,
                r#"<ul id="ssg-inject-sidebar-links"><li>Static</li>"#,
                r#"<li><a href="./about.html">about</a></li></ul>"#,
                r#"<main id="ssg-inject-content"><h1 id="x">X</h1></main>"#,
                "</body></html>",
            )
        );
        Ok(())
    }

    #[test]
    fn test_render_does_not_leak_between_pages() -> Result<()> {
        let template = Template::parse(TEMPLATE.to_owned())?;
        let sidebar = vec![SidebarEntry {
            display_text: "one".to_owned(),
            href: "./one.html".to_owned(),
        }];
        let parts = PageParts {
            content: "",
            sidebar: &sidebar,
            breadcrumbs: &[],
            stylesheet_href: "style.css",
        };
        let first = template.render(&parts)?;
        let second = template.render(&parts)?;
        assert_eq!(first, second);
        assert_eq!(second.matches("./one.html").count(), 1);
        Ok(())
    }
}
