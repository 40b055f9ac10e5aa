//! The library code for the `mdsite` static site generator. It turns a folder
//! tree of markdown documents into an HTML site with the same shape: every
//! `foo/bar.md` becomes `foo/bar.html`, rendered into a shared template.
//!
//! Each document goes through the same steps ([`crate::build`]):
//!
//! 1. Render the markdown to HTML ([`crate::markdown`])
//! 2. Sanitize the HTML ([`crate::sanitize`])
//! 3. Retarget links to other documents from `.md` to `.html`
//!    ([`crate::links`])
//! 4. Derive the sidebar and breadcrumb trail from the file system
//!    ([`crate::navigation`])
//! 5. Inject everything into the template and write the page, copying the
//!    shared stylesheet next to it ([`crate::template`], [`crate::write`])
//!
//! No page depends on another page's output, but every link a page carries is
//! relative, so the number of `../` segments must match the page's depth in
//! the tree ([`crate::paths`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
mod htmlrenderer;
pub mod links;
pub mod markdown;
pub mod navigation;
pub mod paths;
pub mod sanitize;
pub mod template;
pub mod write;
