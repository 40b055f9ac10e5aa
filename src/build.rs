//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: enumerating the markdown
//! documents ([`sources`]), reading each one ([`Source::load`]), rendering
//! and sanitizing it ([`crate::markdown`], [`crate::sanitize`]), retargeting
//! its links ([`crate::links`]), deriving its navigation
//! ([`crate::navigation`]), and templating and writing it to disk
//! ([`crate::write`]).
//!
//! Documents are read and processed one at a time, in enumeration order. The
//! first error stops the build; pages written before it are left in place.

use crate::config::Config;
use crate::links::{self, MARKDOWN_EXTENSION};
use crate::markdown;
use crate::navigation::{breadcrumbs, sidebar};
use crate::paths::{relative_reference, RelativePath};
use crate::sanitize::Sanitizer;
use crate::template::{self, PageParts, Template, TEMPLATE_FILE_NAME};
use crate::write::{Error as WriteError, Writer, STYLESHEET_FILE_NAME};
use std::fmt;
use std::path::PathBuf;
use walkdir::WalkDir;

/// A markdown source file that was found under the input directory, and the
/// HTML file it becomes. Its content isn't read until [`Source::load`].
#[derive(Clone, Debug)]
pub struct Source {
    /// The location relative to the input (and output) root.
    pub relative: RelativePath,

    /// The absolute location of the markdown source.
    pub source_path: PathBuf,

    /// The absolute location of the HTML output.
    pub output_path: PathBuf,
}

impl Source {
    /// Reads the markdown source.
    pub fn load(self) -> Result<Document> {
        let content = std::fs::read_to_string(&self.source_path).map_err(|err| Error::Read {
            path: self.source_path.clone(),
            err,
        })?;
        Ok(Document {
            relative: self.relative,
            source_path: self.source_path,
            output_path: self.output_path,
            content,
        })
    }
}

/// A markdown document, read and ready to be built.
#[derive(Debug)]
pub struct Document {
    /// The location relative to the input (and output) root.
    pub relative: RelativePath,

    /// The absolute location of the markdown source.
    pub source_path: PathBuf,

    /// The absolute location of the HTML output.
    pub output_path: PathBuf,

    /// The markdown source text.
    pub content: String,
}

/// A summary of a completed build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildReport {
    /// The number of pages written.
    pub pages: usize,

    /// The number of output directories given a stylesheet.
    pub stylesheets: usize,
}

/// Builds the site described by `config`. The template is loaded (and its
/// injection points checked) before any document is read.
pub fn build_site(config: &Config) -> Result<BuildReport> {
    let template = Template::load(&config.template_directory.join(TEMPLATE_FILE_NAME))?;
    let stylesheet = config.template_directory.join(STYLESHEET_FILE_NAME);
    let sanitizer = Sanitizer::new();
    let mut writer = Writer::new(&template, &stylesheet);

    let mut pages = 0;
    for source in sources(config)? {
        tracing::info!("Building {}...", source.output_path.display());
        let document = source.load()?;
        build_document(config, &sanitizer, &mut writer, &document)?;
        pages += 1;
    }

    Ok(BuildReport {
        pages,
        stylesheets: writer.stylesheets(),
    })
}

/// Runs one document through the pipeline: render, sanitize, rewrite links,
/// build navigation, template, and write.
fn build_document(
    config: &Config,
    sanitizer: &Sanitizer,
    writer: &mut Writer,
    document: &Document,
) -> Result<()> {
    let html = markdown::to_html(&document.content)?;
    let content = links::rewrite_links(&sanitizer.sanitize(&html))?;

    let source_dir = document
        .source_path
        .parent()
        .unwrap_or(&config.input_directory);
    let sidebar = sidebar(source_dir).map_err(|err| Error::Read {
        path: source_dir.to_owned(),
        err,
    })?;
    let breadcrumbs = breadcrumbs(&document.relative, &config.default_document_name);
    let stylesheet_href =
        relative_reference(document.relative.depth() as isize, STYLESHEET_FILE_NAME);

    writer.write_page(
        &document.output_path,
        &PageParts {
            content: &content,
            sidebar: &sidebar,
            breadcrumbs: &breadcrumbs,
            stylesheet_href: &stylesheet_href,
        },
    )?;
    Ok(())
}

/// Finds every markdown document under the input directory, recursively.
/// Entries are sorted by file name within each directory so the build order
/// doesn't depend on the file system. Nothing is read yet.
pub fn sources(config: &Config) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for result in WalkDir::new(&config.input_directory).sort_by_file_name() {
        let entry = result?;
        if !entry.file_type().is_file()
            || !entry
                .file_name()
                .to_string_lossy()
                .ends_with(MARKDOWN_EXTENSION)
        {
            continue;
        }

        let source_path = entry.into_path();
        let relative = match source_path.strip_prefix(&config.input_directory) {
            Ok(relative) => RelativePath::from_path(relative),
            Err(_) => {
                tracing::warn!("Skipping {}: outside the input folder", source_path.display());
                continue;
            }
        };
        tracing::debug!("Found {}", relative);

        sources.push(Source {
            output_path: config.output_directory.join(relative.with_extension("html")),
            relative,
            source_path,
        });
    }
    Ok(sources)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug)]
pub enum Error {
    /// Returned when the input directory can't be walked.
    Enumerate(walkdir::Error),

    /// Returned when a source file or directory can't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned for errors rendering markdown.
    Markdown(markdown::Error),

    /// Returned for errors rewriting links.
    Links(links::Error),

    /// Returned for errors loading the template.
    Template(template::Error),

    /// Returned for errors writing pages to disk.
    Write(WriteError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Enumerate(err) => write!(f, "Listing documents: {}", err),
            Error::Read { path, err } => write!(f, "Reading '{}': {}", path.display(), err),
            Error::Markdown(err) => write!(f, "{}", err),
            Error::Links(err) => write!(f, "{}", err),
            Error::Template(err) => write!(f, "{}", err),
            Error::Write(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Enumerate(err) => Some(err),
            Error::Read { path: _, err } => Some(err),
            Error::Markdown(err) => Some(err),
            Error::Links(err) => Some(err),
            Error::Template(err) => Some(err),
            Error::Write(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::Enumerate(err)
    }
}

impl From<markdown::Error> for Error {
    /// Converts [`markdown::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: markdown::Error) -> Error {
        Error::Markdown(err)
    }
}

impl From<links::Error> for Error {
    /// Converts [`links::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: links::Error) -> Error {
        Error::Links(err)
    }
}

impl From<template::Error> for Error {
    /// Converts [`template::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
