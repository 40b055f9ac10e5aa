//! Derives a page's navigation from the file system: the sidebar lists the
//! documents next to it, and the breadcrumb trail walks from the site root
//! down to the page itself.

use crate::links::{HTML_EXTENSION, MARKDOWN_EXTENSION};
use crate::paths::{relative_reference, RelativePath};
use std::io;
use std::path::Path;

/// The display text of the breadcrumb entry for the site root.
pub const HOME: &str = "Home";

/// A link to a document in the same folder as the current page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarEntry {
    pub display_text: String,
    pub href: String,
}

/// One step in a breadcrumb trail. The entry for the current page has no
/// `href` and is shown as plain text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreadcrumbEntry {
    pub display_text: String,
    pub href: Option<String>,
}

/// Lists the markdown documents directly inside `directory` (subdirectories
/// are not descended into), ordered by file name.
pub fn sidebar(directory: &Path) -> io::Result<Vec<SidebarEntry>> {
    let mut names: Vec<String> = Vec::new();
    for result in std::fs::read_dir(directory)? {
        let entry = result?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let os_file_name = entry.file_name();
        let file_name = os_file_name.to_string_lossy();
        if file_name.ends_with(MARKDOWN_EXTENSION) {
            names.push(file_name.into_owned());
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|file_name| {
            let stem = file_name
                .strip_suffix(MARKDOWN_EXTENSION)
                .unwrap_or(&file_name);
            SidebarEntry {
                href: format!("./{}{}", stem, HTML_EXTENSION),
                display_text: stem.to_owned(),
            }
        })
        .collect())
}

/// Builds the breadcrumb trail for the document at `path`: a `Home` entry for
/// the root, one entry per ancestor folder, and a link-less entry for the
/// document itself. Root and folder entries link to the folder's default
/// document (`{default_document}.html`) relative to the current page.
pub fn breadcrumbs(path: &RelativePath, default_document: &str) -> Vec<BreadcrumbEntry> {
    let target = format!("{}{}", default_document, HTML_EXTENSION);
    let last = path.len() - 1;

    path.segments()
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            if index == 0 && segment.is_empty() {
                BreadcrumbEntry {
                    display_text: HOME.to_owned(),
                    href: Some(relative_reference(path.levels_to(0), &target)),
                }
            } else if index == last {
                BreadcrumbEntry {
                    display_text: file_stem(segment).to_owned(),
                    href: None,
                }
            } else {
                BreadcrumbEntry {
                    display_text: segment.clone(),
                    href: Some(relative_reference(path.levels_to(index), &target)),
                }
            }
        })
        .collect()
}

fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(i) => &file_name[..i],
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn crumb(display_text: &str, href: Option<&str>) -> BreadcrumbEntry {
        BreadcrumbEntry {
            display_text: display_text.to_owned(),
            href: href.map(str::to_owned),
        }
    }

    #[test]
    fn test_breadcrumbs_root_document() {
        assert_eq!(
            breadcrumbs(&RelativePath::parse("index.md"), "index"),
            vec![crumb("Home", Some("index.html")), crumb("index", None)]
        );
    }

    #[test]
    fn test_breadcrumbs_depth_one() {
        assert_eq!(
            breadcrumbs(&RelativePath::parse("sub/page.md"), "index"),
            vec![
                crumb("Home", Some("../index.html")),
                crumb("sub", Some("index.html")),
                crumb("page", None),
            ]
        );
    }

    #[test]
    fn test_breadcrumbs_depth_three() {
        assert_eq!(
            breadcrumbs(&RelativePath::parse("a/b/c/page.md"), "home"),
            vec![
                crumb("Home", Some("../../../home.html")),
                crumb("a", Some("../../home.html")),
                crumb("b", Some("../home.html")),
                crumb("c", Some("home.html")),
                crumb("page", None),
            ]
        );
    }

    #[test]
    fn test_breadcrumbs_dotted_folder_keeps_link() {
        let trail = breadcrumbs(&RelativePath::parse("v1.2/page.md"), "index");
        assert_eq!(trail[1], crumb("v1.2", Some("index.html")));
        assert_eq!(trail.len(), 3);
        assert!(trail[..2].iter().all(|entry| entry.href.is_some()));
    }

    #[test]
    fn test_breadcrumb_count_matches_segments() {
        for path in &["x.md", "a/x.md", "a/b/x.md", "a/b/c/d/x.md"] {
            let path = RelativePath::parse(path);
            let trail = breadcrumbs(&path, "index");
            assert_eq!(trail.len(), path.len());
            assert_eq!(trail.last().and_then(|e| e.href.as_ref()), None);
        }
    }

    #[test]
    fn test_sidebar_lists_sibling_documents() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("index.md"), "# Index")?;
        fs::write(dir.path().join("about.md"), "# About")?;
        fs::write(dir.path().join("image.png"), [0u8; 4])?;
        fs::create_dir(dir.path().join("sub"))?;
        fs::write(dir.path().join("sub").join("page.md"), "# Page")?;
        fs::create_dir(dir.path().join("folder.md"))?;

        assert_eq!(
            sidebar(dir.path())?,
            vec![
                SidebarEntry {
                    display_text: "about".to_owned(),
                    href: "./about.html".to_owned(),
                },
                SidebarEntry {
                    display_text: "index".to_owned(),
                    href: "./index.html".to_owned(),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_sidebar_missing_directory() {
        assert!(sidebar(Path::new("/this/does/not/exist")).is_err());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("page.md"), "page");
        assert_eq!(file_stem("archive.tar.md"), "archive.tar");
        assert_eq!(file_stem("README"), "README");
    }
}
