use crate::template::{self, PageParts, Template};
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The file name of the shared stylesheet, both in the template folder and in
/// every output directory.
pub const STYLESHEET_FILE_NAME: &str = "style.css";

/// Responsible for templating pages and writing them, along with a copy of
/// the shared stylesheet, to disk.
pub struct Writer<'a> {
    /// The template for every page.
    pub template: &'a Template,

    /// The stylesheet that is copied next to every written page.
    pub stylesheet_source: &'a Path,

    /// The output directories whose stylesheet has already been reconciled
    /// during this build.
    seen_dirs: HashSet<PathBuf>,
}

impl<'a> Writer<'a> {
    pub fn new(template: &'a Template, stylesheet_source: &'a Path) -> Writer<'a> {
        Writer {
            template,
            stylesheet_source,
            seen_dirs: HashSet::new(),
        }
    }

    /// Templates `parts` and writes the result to `file_path`, creating the
    /// parent directory and its stylesheet first if necessary.
    pub fn write_page(&mut self, file_path: &Path, parts: &PageParts) -> Result<()> {
        let page = self.template.render(parts)?;

        let dir = file_path
            .parent()
            .ok_or_else(|| Error::NoParent(file_path.to_owned()))?;
        if self.seen_dirs.insert(dir.to_owned()) {
            std::fs::create_dir_all(dir).map_err(|err| Error::CreateDir {
                path: dir.to_owned(),
                err,
            })?;
            reconcile_stylesheet(self.stylesheet_source, &dir.join(STYLESHEET_FILE_NAME))?;
        }

        std::fs::write(file_path, page).map_err(|err| Error::WriteFile {
            path: file_path.to_owned(),
            err,
        })
    }

    /// The number of output directories that have been given a stylesheet.
    pub fn stylesheets(&self) -> usize {
        self.seen_dirs.len()
    }
}

/// Makes `destination` a byte-for-byte copy of `source`. The copy is skipped
/// when `destination` already matches, so repeated builds leave it alone.
/// Returns whether a copy was made.
pub fn reconcile_stylesheet(source: &Path, destination: &Path) -> Result<bool> {
    let wanted = std::fs::read(source).map_err(|err| Error::ReadStylesheet {
        path: source.to_owned(),
        err,
    })?;
    match std::fs::read(destination) {
        Ok(existing) if existing == wanted => {
            tracing::debug!("Stylesheet {} is up to date", destination.display());
            return Ok(false);
        }
        Ok(_) => tracing::debug!("Replacing stale stylesheet {}", destination.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("Copying stylesheet to {}", destination.display())
        }
        Err(err) => {
            return Err(Error::ReadStylesheet {
                path: destination.to_owned(),
                err,
            })
        }
    }
    std::fs::write(destination, wanted).map_err(|err| Error::WriteFile {
        path: destination.to_owned(),
        err,
    })?;
    Ok(true)
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(template::Error),

    /// Returned when an output file path has no parent directory.
    NoParent(PathBuf),

    /// Returned when an output directory can't be created.
    CreateDir { path: PathBuf, err: io::Error },

    /// Returned when the source stylesheet can't be read.
    ReadStylesheet { path: PathBuf, err: io::Error },

    /// Returned when an output file can't be written.
    WriteFile { path: PathBuf, err: io::Error },
}

impl From<template::Error> for Error {
    /// Converts a [`template::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible template operations.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => write!(f, "{}", err),
            Error::NoParent(path) => {
                write!(f, "Output file '{}' has no parent directory", path.display())
            }
            Error::CreateDir { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
            Error::ReadStylesheet { path, err } => {
                write!(f, "Reading stylesheet '{}': {}", path.display(), err)
            }
            Error::WriteFile { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::NoParent(_) => None,
            Error::CreateDir { path: _, err } => Some(err),
            Error::ReadStylesheet { path: _, err } => Some(err),
            Error::WriteFile { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    const TEMPLATE: &str = concat!(
        r#"<link id="ssg-inject-stylesheet" href="">"#,
        r#"<ul id="ssg-inject-breadcrumb-links"></ul>"#,
        r#"<ul id="ssg-inject-sidebar-links"></ul>"#,
        r#"<div id="ssg-inject-content"></div>"#,
    );

    fn parts<'a>(content: &'a str, stylesheet_href: &'a str) -> PageParts<'a> {
        PageParts {
            content,
            sidebar: &[],
            breadcrumbs: &[],
            stylesheet_href,
        }
    }

    #[test]
    fn test_reconcile_copies_missing() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("source.css");
        let destination = dir.path().join("style.css");
        fs::write(&source, "body { color: red; }")?;

        assert!(reconcile_stylesheet(&source, &destination)?);
        assert_eq!(fs::read_to_string(&destination)?, "body { color: red; }");
        Ok(())
    }

    #[test]
    fn test_reconcile_replaces_stale() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("source.css");
        let destination = dir.path().join("style.css");
        fs::write(&source, "body { color: red; }")?;
        fs::write(&destination, "body { color: blue; }")?;

        assert!(reconcile_stylesheet(&source, &destination)?);
        assert_eq!(fs::read_to_string(&destination)?, "body { color: red; }");
        Ok(())
    }

    #[test]
    fn test_reconcile_skips_identical() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("source.css");
        let destination = dir.path().join("style.css");
        fs::write(&source, "body {}")?;
        fs::write(&destination, "body {}")?;

        assert!(!reconcile_stylesheet(&source, &destination)?);
        Ok(())
    }

    #[test]
    fn test_write_page_creates_directories() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempfile::tempdir()?;
        let stylesheet = dir.path().join("source.css");
        fs::write(&stylesheet, "p {}")?;
        let template = Template::parse(TEMPLATE.to_owned())?;
        let out = dir.path().join("out");

        let mut writer = Writer::new(&template, &stylesheet);
        writer.write_page(&out.join("a/b/page.html"), &parts("<p>x</p>", "../../style.css"))?;
        writer.write_page(&out.join("a/b/other.html"), &parts("<p>y</p>", "../../style.css"))?;
        writer.write_page(&out.join("index.html"), &parts("<p>z</p>", "style.css"))?;

        assert_eq!(writer.stylesheets(), 2);
        assert_eq!(fs::read_to_string(out.join("a/b/style.css"))?, "p {}");
        assert_eq!(fs::read_to_string(out.join("style.css"))?, "p {}");
        assert!(!out.join("a/style.css").exists());
        let page = fs::read_to_string(out.join("a/b/page.html"))?;
        assert!(page.contains(r#"href="../../style.css""#));
        assert!(page.contains("<p>x</p>"));
        Ok(())
    }
}
