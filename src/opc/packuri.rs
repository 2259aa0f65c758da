//! Pack URIs: absolute, `/`-rooted part names inside a package.

use crate::opc::error::{OpcError, Result};
use std::fmt;
use std::ops::Deref;

/// The package pseudo-partname, base URI for package-level relationships.
pub const PACKAGE_URI: &str = "/";

/// Partname of the content-type stream.
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// An absolute part name such as `/ppt/slides/slide1.xml`.
///
/// Dereferences to `str`, so it can be used anywhere a partname string is
/// expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI(String);

impl PackURI {
    /// Create a pack URI, rejecting names that are not `/`-rooted.
    pub fn new(uri: impl Into<String>) -> Result<Self> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(OpcError::InvalidPackUri(format!(
                "pack URI must begin with a slash, got {uri:?}"
            )));
        }
        Ok(Self(uri))
    }

    /// The `/` pseudo-URI naming the package itself.
    pub fn package() -> Self {
        Self(PACKAGE_URI.to_string())
    }

    /// The content-type stream partname.
    pub fn content_types() -> Self {
        Self(CONTENT_TYPES_URI.to_string())
    }

    /// Resolve a relationship target reference against a base URI.
    ///
    /// Relative references like `../media/image1.png` are resolved and
    /// normalized; references that climb above the package root are rejected.
    pub fn from_rel_ref(base_uri: &str, rel_ref: &str) -> Result<Self> {
        if rel_ref.starts_with('/') {
            return Self::new(rel_ref);
        }
        let joined = if base_uri == PACKAGE_URI {
            format!("/{rel_ref}")
        } else {
            format!("{base_uri}/{rel_ref}")
        };
        Ok(Self(normalize_path(&joined)?))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URI of the containing "directory", `/ppt/slides` for a slide part.
    pub fn base_uri(&self) -> String {
        match self.0.rfind('/') {
            Some(0) | None => PACKAGE_URI.to_string(),
            Some(idx) => self.0[..idx].to_string(),
        }
    }

    /// Last path segment, e.g. `slide1.xml`.
    pub fn filename(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Extension without the dot, lowercased by the caller where needed.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(idx) => &filename[idx + 1..],
            None => "",
        }
    }

    /// Trailing integer of the filename stem, e.g. `12` for `slide12.xml`.
    pub fn idx(&self) -> Option<usize> {
        let filename = self.filename();
        let stem = match filename.rfind('.') {
            Some(idx) => &filename[..idx],
            None => filename,
        };
        let bytes = stem.as_bytes();
        let mut start = bytes.len();
        while start > 0 && bytes[start - 1].is_ascii_digit() {
            start -= 1;
        }
        if start == bytes.len() {
            return None;
        }
        stem[start..].parse().ok()
    }

    /// ZIP member name: the partname without its leading slash.
    pub fn membername(&self) -> &str {
        self.0.trim_start_matches('/')
    }

    /// Relative reference from `base_uri` to this part, suitable for a
    /// relationship `Target` attribute.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == PACKAGE_URI {
            return self.0[1..].to_string();
        }
        let base: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let target: Vec<&str> = self.0.split('/').filter(|s| !s.is_empty()).collect();
        let target_dirs = target.len().saturating_sub(1);

        let mut common = 0;
        while common < base.len() && common < target_dirs && base[common] == target[common] {
            common += 1;
        }

        let mut segments: Vec<&str> = Vec::with_capacity(base.len() - common + target.len());
        for _ in common..base.len() {
            segments.push("..");
        }
        segments.extend_from_slice(&target[common..]);
        segments.join("/")
    }

    /// Partname of the `.rels` part describing this part's relationships.
    pub fn rels_uri(&self) -> PackURI {
        if self.0 == PACKAGE_URI {
            return PackURI("/_rels/.rels".to_string());
        }
        let base = self.base_uri();
        let filename = self.filename();
        if base == PACKAGE_URI {
            PackURI(format!("/_rels/{filename}.rels"))
        } else {
            PackURI(format!("{base}/_rels/{filename}.rels"))
        }
    }
}

/// Collapse `.` and `..` segments, erroring if the path escapes the root.
fn normalize_path(path: &str) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(OpcError::InvalidPackUri(format!(
                        "reference escapes the package root: {path}"
                    )));
                }
            }
            other => segments.push(other),
        }
    }
    Ok(format!("/{}", segments.join("/")))
}

impl Deref for PackURI {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackURI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for PackURI {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
