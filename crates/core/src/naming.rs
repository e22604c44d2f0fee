//! Object naming convention
//!
//! Object names never start with `/` and always use `/` as separator.
//! A directory upload nests every file under `prefix/<dir base name>/`
//! (or `<dir base name>/` without a prefix); a single file lands at
//! `prefix/<file name>` (or `<file name>`).

use std::path::Path;

use url::Url;

use crate::error::{Error, Result};

/// Strip leading slashes so the name is relative to the bucket root
pub fn normalize_object_name(name: &str) -> &str {
    name.trim_start_matches('/')
}

/// Trim surrounding slashes from a user-supplied prefix
///
/// Returns `None` when nothing is left.
pub fn trim_prefix(prefix: Option<&str>) -> Option<&str> {
    prefix
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
}

/// Object name for a single uploaded file
pub fn file_object_name(prefix: Option<&str>, file: &Path) -> Result<String> {
    let file_name = file
        .file_name()
        .ok_or_else(|| Error::InvalidPath(format!("{} has no file name", file.display())))?
        .to_string_lossy();

    Ok(match trim_prefix(prefix) {
        Some(p) => format!("{p}/{file_name}"),
        None => file_name.into_owned(),
    })
}

/// Prefix that every object of a directory upload starts with, ending in `/`
pub fn directory_prefix(prefix: Option<&str>, dir_base_name: &str) -> String {
    match trim_prefix(prefix) {
        Some(p) => format!("{p}/{dir_base_name}/"),
        None => format!("{dir_base_name}/"),
    }
}

/// Object name for a file found `relative` to the walked directory
pub fn nested_object_name(directory_prefix: &str, relative: &str) -> String {
    let relative = relative.replace('\\', "/");
    let name = format!("{directory_prefix}{}", relative.trim_start_matches('/'));
    normalize_object_name(&name).to_string()
}

/// Public URL of an object: `{base}/{bucket}/{object}`
///
/// Each name segment is percent-encoded; `/` separators are kept.
pub fn public_url(base: &Url, bucket: &str, object_name: &str) -> Result<String> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::Config(format!("URL cannot be a base: {base}")))?;
        segments.pop_if_empty();
        segments.push(bucket);
        segments.extend(normalize_object_name(object_name).split('/'));
    }
    Ok(url.to_string())
}

/// Percent-encoded `bucket/object` path, as used for server-side copy sources
pub fn encoded_object_path(bucket: &str, object_name: &str) -> String {
    let mut encoded = String::with_capacity(bucket.len() + object_name.len() + 1);
    for (i, segment) in std::iter::once(bucket)
        .chain(object_name.split('/'))
        .enumerate()
    {
        if i > 0 {
            encoded.push('/');
        }
        encoded.extend(url::form_urlencoded::byte_serialize(segment.as_bytes()));
    }
    // form encoding turns spaces into '+', which a path must not contain
    encoded.replace('+', "%20")
}
