//! Strips unsafe markup from rendered documents before they are placed into
//! the page template.

use ammonia::Builder;

/// Cleans rendered HTML down to a safe subset. On top of ammonia's default
/// allowlist, the `id` attribute is kept on every element so that links to
/// heading anchors (`#some-heading`) still land somewhere.
pub struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    pub fn new() -> Sanitizer {
        let mut builder = Builder::default();
        builder.add_generic_attributes(&["id"]);
        Sanitizer { builder }
    }

    pub fn sanitize(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Sanitizer::new()
    }
}
