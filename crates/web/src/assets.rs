//! Static asset resolution under the table's assets prefix.
//!
//! A request path equal to the prefix or below `prefix/` is stripped of the prefix,
//! percent-decoded and joined onto the asset directory. The result is canonicalized and must
//! stay inside the (canonical) asset directory, which rules out `..` and symlink escapes.
//! Anything that does not resolve to a regular file is "not an asset" and routing continues.

use crate::body::ResponseBody;
use crate::error::RenderError;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{Response, StatusCode};
use mime::Mime;
use percent_encoding::percent_decode_str;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Serves files from `root` for request paths under `prefix`.
#[derive(Debug, Clone)]
pub struct AssetServer {
    prefix: String,
    root: PathBuf,
}

/// A file found under the asset directory.
#[derive(Debug, Clone)]
pub struct Asset {
    path: PathBuf,
    content_type: Mime,
    len: u64,
}

impl AssetServer {
    /// `prefix` is the normalized URL prefix (e.g. `/assets`), `root` the directory it maps to.
    ///
    /// Fails if `root` cannot be canonicalized.
    pub fn new<P: AsRef<Path>>(prefix: impl Into<String>, root: P) -> io::Result<Self> {
        let root = fs::canonicalize(root)?;
        Ok(Self { prefix: prefix.into(), root })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The part of `path` after the prefix, if `path` falls under it.
    fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }

    /// Resolves a raw request path to a file inside the asset directory.
    pub fn resolve(&self, request_path: &str) -> Option<Asset> {
        let rest = self.strip_prefix(request_path)?;

        let decoded = percent_decode_str(rest).decode_utf8().ok()?;
        if decoded.contains('\0') {
            return None;
        }

        let relative = decoded.trim_start_matches(['/', '\\']);
        if relative.is_empty() {
            return None;
        }

        let canonical = fs::canonicalize(self.root.join(relative)).ok()?;
        if !canonical.starts_with(&self.root) {
            warn!(path = request_path, "asset path escapes the asset directory, ignoring");
            return None;
        }

        let metadata = fs::metadata(&canonical).ok()?;
        if !metadata.is_file() {
            return None;
        }

        debug!(path = request_path, file = %canonical.display(), "resolved asset");
        let content_type = content_type_for(&canonical);
        Some(Asset { path: canonical, content_type, len: metadata.len() })
    }
}

impl Asset {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Opens the file and builds a `200 OK` response streaming it.
    pub fn into_response(self) -> Result<Response<ResponseBody>, RenderError> {
        let file = File::open(&self.path)?;

        let response = Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, self.content_type.as_ref())
            .header(CONTENT_LENGTH, self.len)
            .body(ResponseBody::file(file))?;

        Ok(response)
    }
}

/// Static extension table first, then `mime_guess`, then `application/octet-stream`.
pub fn content_type_for(path: &Path) -> Mime {
    let extension = path.extension().and_then(OsStr::to_str).map(str::to_ascii_lowercase);

    let known = match extension.as_deref() {
        Some("html" | "htm") => Some(mime::TEXT_HTML_UTF_8),
        Some("css") => Some(mime::TEXT_CSS_UTF_8),
        Some("js" | "mjs") => Some(mime::APPLICATION_JAVASCRIPT_UTF_8),
        Some("json" | "map") => Some(mime::APPLICATION_JSON),
        Some("txt") => Some(mime::TEXT_PLAIN_UTF_8),
        Some("csv") => Some(mime::TEXT_CSV_UTF_8),
        Some("xml") => Some(mime::TEXT_XML),
        Some("svg") => Some(mime::IMAGE_SVG),
        Some("png") => Some(mime::IMAGE_PNG),
        Some("jpg" | "jpeg") => Some(mime::IMAGE_JPEG),
        Some("gif") => Some(mime::IMAGE_GIF),
        Some("bmp") => Some(mime::IMAGE_BMP),
        Some("woff") => Some(mime::FONT_WOFF),
        Some("woff2") => Some(mime::FONT_WOFF2),
        Some("pdf") => Some(mime::APPLICATION_PDF),
        _ => None,
    };

    known.unwrap_or_else(|| mime_guess::from_path(path).first_or_octet_stream())
}
