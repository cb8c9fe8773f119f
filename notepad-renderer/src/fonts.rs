//! Shared font database for SVG text.

use std::sync::{Arc, OnceLock};

use usvg::fontdb;

static SYSTEM_FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

/// System fonts, loaded on first use and shared afterwards.
#[must_use]
pub fn system_fonts() -> Arc<fontdb::Database> {
    Arc::clone(SYSTEM_FONTS.get_or_init(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!("Loaded {} font faces", db.len());
        Arc::new(db)
    }))
}

/// Parse options that resolve text against the system fonts.
#[must_use]
pub fn svg_options() -> usvg::Options<'static> {
    let mut opt = usvg::Options::default();
    opt.fontdb = system_fonts();
    opt
}
