//! Defines [`RelativePath`], a document's location relative to the site root,
//! and the helpers that turn a depth into a chain of `../` segments. Every
//! relative link the generator emits (breadcrumbs, the stylesheet reference)
//! is computed here so that pages at any nesting level agree with each other.

use std::path::{Component, Path, PathBuf};

/// The parent-directory token prepended once per level of ascent.
pub const PARENT: &str = "../";

/// A path relative to the site root, split into segments. The first segment
/// is always the empty string, which stands for the root itself, and the last
/// segment is the document's file name. So `sub/page.md` is represented as
/// `["", "sub", "page.md"]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    /// Builds a [`RelativePath`] from a `/`-separated string. Leading,
    /// trailing, and repeated separators are ignored.
    pub fn parse(path: &str) -> RelativePath {
        let mut segments = vec![String::new()];
        segments.extend(
            path.split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned),
        );
        RelativePath { segments }
    }

    /// Builds a [`RelativePath`] from a file-system path that is already
    /// relative to the site root. Only normal components are kept, so the
    /// result is the same on every platform.
    pub fn from_path(path: &Path) -> RelativePath {
        let mut segments = vec![String::new()];
        segments.extend(path.components().filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }));
        RelativePath { segments }
    }

    /// All segments, beginning with the empty root segment.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The total number of segments, including the root segment.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the path has no segment besides the root.
    pub fn is_empty(&self) -> bool {
        self.segments.len() < 2
    }

    /// The number of directories between the document and the site root. A
    /// document at the root has depth 0; `sub/page.md` has depth 1.
    pub fn depth(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| !segment.is_empty())
            .count()
            .saturating_sub(1)
    }

    /// The final segment, i.e. the document's file name.
    pub fn file_name(&self) -> Option<&str> {
        match self.is_empty() {
            true => None,
            false => self.segments.last().map(String::as_str),
        }
    }

    /// Converts the path to a [`PathBuf`] relative to the site root, with the
    /// file name's extension replaced by `extension`.
    pub fn with_extension(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.segments.iter().skip(1).collect();
        path.set_extension(extension);
        path
    }

    /// The number of `../` segments needed to climb from this document's
    /// directory to the directory of the ancestor at segment `index`. The root
    /// segment is index 0.
    pub fn levels_to(&self, index: usize) -> isize {
        self.segments.len() as isize - index as isize - 2
    }
}

impl std::fmt::Display for RelativePath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.segments[1..].join("/"))
    }
}

/// Returns `levels` repetitions of [`PARENT`]. Zero or negative levels yield
/// the empty string.
pub fn ascent(levels: isize) -> String {
    match levels > 0 {
        true => PARENT.repeat(levels as usize),
        false => String::new(),
    }
}

/// Joins [`ascent`] with `file_name`, e.g. `relative_reference(2, "style.css")`
/// is `../../style.css`.
pub fn relative_reference(levels: isize, file_name: &str) -> String {
    let mut reference = ascent(levels);
    reference.push_str(file_name);
    reference
}
