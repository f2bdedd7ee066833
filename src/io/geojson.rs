//! GeoJSON output of the geometry collection.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::geometry_collection::GeometryCollection;
use crate::io::error::OutputError;

/// Writes `collection` as pretty-printed GeoJSON.
///
/// # Errors
///
/// Returns an [`OutputError`] if serialization or the underlying write fails.
pub fn write_geometry_collection<W: Write>(
    mut writer: W,
    collection: &GeometryCollection,
) -> Result<(), OutputError> {
    serde_json::to_writer_pretty(&mut writer, collection)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes `collection` to a GeoJSON file, replacing any existing file.
///
/// # Errors
///
/// Returns [`OutputError::Create`] if the file cannot be created, otherwise as
/// [`write_geometry_collection`].
pub fn write_geometry_collection_path(
    path: &Path,
    collection: &GeometryCollection,
) -> Result<(), OutputError> {
    let file = File::create(path).map_err(|source| OutputError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_geometry_collection(BufWriter::new(file), collection)
}
