use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Serve the built single-page site from `static_dir`.
///
/// Unknown paths fall back to `index.html` so client-side routes resolve.
pub fn serve_frontend(static_dir: &str) -> ServeDir<ServeFile> {
    let index = Path::new(static_dir).join("index.html");
    ServeDir::new(static_dir).fallback(ServeFile::new(index))
}
