//! Canonical image filenames.
//!
//! Every stored product image is named `<position>_<slug>.jpg`, where the
//! position is the record's 1-based index in its list, zero-padded to three
//! digits, and the slug is derived from the record name by [`slugify`].
//! The same function is used by every caller, so a given `(position, name)`
//! always maps to byte-identical output.

use std::fmt;

use crate::error::CatalogError;

/// Extension of every canonical image file.
pub const EXTENSION: &str = "jpg";

/// File extensions recognised as stored images when scanning a directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Width of the zero-padded position prefix.
pub const POSITION_WIDTH: usize = 3;

/// Prefix of every per-list image folder.
pub const FOLDER_PREFIX: &str = "images_";

/// A canonical filename, derived from a record's position and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalFilename {
    position: u32,
    slug: String,
}

impl CanonicalFilename {
    /// Derive the canonical filename for the record at `position` (1-based).
    ///
    /// Fails with [`CatalogError::Format`] when the position is zero or the
    /// name has nothing left after sanitising.
    pub fn encode(position: u32, name: &str) -> Result<Self, CatalogError> {
        if position == 0 {
            return Err(CatalogError::format("position must be 1 or greater"));
        }
        if name.trim().is_empty() {
            return Err(CatalogError::format("record name is empty"));
        }
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(CatalogError::format(format!(
                "record name {name:?} has no usable characters for a filename"
            )));
        }
        Ok(Self { position, slug })
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// The zero-padded position prefix (`"019"` for position 19, `"1000"` for 1000).
    pub fn prefix(&self) -> String {
        format!("{:0width$}", self.position, width = POSITION_WIDTH)
    }

    /// The all-lowercase variant tried against case-sensitive hosts.
    pub fn lowercase(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl fmt::Display for CanonicalFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:0width$}_{}.{}",
            self.position,
            self.slug,
            EXTENSION,
            width = POSITION_WIDTH
        )
    }
}

/// A filename split back into its position and the slug that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFilename {
    pub position: u32,
    /// Everything after the separator underscore, without the extension.
    pub remainder: String,
}

/// Reduce a record name to its filename slug.
///
/// Keeps alphanumerics, spaces and hyphens, trims the ends, then turns each
/// remaining space into an underscore. Parentheses, commas, apostrophes and
/// every other punctuation mark are dropped.
pub fn slugify(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .collect();
    kept.trim_matches(' ').replace(' ', "_")
}

/// Split a stored filename into its position and slug remainder.
///
/// The name must start with at least three ASCII digits followed directly by
/// an underscore. A trailing image extension is removed from the remainder.
pub fn decode(filename: &str) -> Result<DecodedFilename, CatalogError> {
    let digits = filename.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits < POSITION_WIDTH {
        return Err(CatalogError::format(format!(
            "{filename:?} does not start with a {POSITION_WIDTH}-digit position"
        )));
    }
    let rest = &filename[digits..];
    let Some(rest) = rest.strip_prefix('_') else {
        return Err(CatalogError::format(format!(
            "{filename:?} has no underscore after its position"
        )));
    };

    let position: u32 = filename[..digits]
        .parse()
        .map_err(|_| CatalogError::format(format!("{filename:?} position is out of range")))?;
    if position == 0 {
        return Err(CatalogError::format(format!(
            "{filename:?} has position 0; positions start at 1"
        )));
    }

    let remainder = strip_image_extension(rest);
    if remainder.is_empty() {
        return Err(CatalogError::format(format!(
            "{filename:?} has nothing after its position"
        )));
    }

    Ok(DecodedFilename {
        position,
        remainder: remainder.to_string(),
    })
}

/// The leading position digits of a stored file, if it has at least three.
///
/// The whole digit run is returned, so `1000_New.jpg` is slot `"1000"`,
/// never slot `"100"`.
pub fn position_prefix(filename: &str) -> Option<&str> {
    let digits = filename.bytes().take_while(|b| b.is_ascii_digit()).count();
    (digits >= POSITION_WIDTH).then(|| &filename[..digits])
}

/// True when the name starts with a position prefix (see [`position_prefix`]).
pub fn is_position_prefixed(filename: &str) -> bool {
    position_prefix(filename).is_some()
}

/// Returns true for names ending in one of [`IMAGE_EXTENSIONS`] (any case).
pub fn is_image_file(filename: &str) -> bool {
    image_extension(filename).is_some()
}

/// Local folder / remote path segment for a catalog document.
///
/// `maaltijdList - Vegan` → `images_maaltijdList - Vegan`.
pub fn folder_name(document_base_name: &str) -> String {
    format!("{FOLDER_PREFIX}{document_base_name}")
}

/// Clean the name part of an already-stored file.
///
/// Keeps the position prefix and, after the first underscore, only
/// alphanumerics, spaces, hyphens, underscores and dots. Returns `None` for
/// files that don't carry a position prefix and separator.
pub fn sanitize_stored_name(filename: &str) -> Option<String> {
    let prefix = position_prefix(filename)?;
    let separator = filename[prefix.len()..].find('_')? + prefix.len();
    let name_part = &filename[separator + 1..];
    let cleaned: String = name_part
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'))
        .collect();
    Some(format!("{prefix}_{}", cleaned.trim()))
}

fn image_extension(filename: &str) -> Option<&str> {
    let (_, ext) = filename.rsplit_once('.')?;
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
        .then_some(ext)
}

fn strip_image_extension(name: &str) -> &str {
    match image_extension(name) {
        Some(ext) => &name[..name.len() - ext.len() - 1],
        None => name,
    }
}

#[cfg(test)]
#[path = "tests/filename_tests.rs"]
mod tests;
