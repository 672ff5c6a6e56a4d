// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Picsort Contributors

//! Packaging of sorted images into a downloadable zip archive

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::session::SortedImage;
use crate::{PicsortError, Result};

/// Filename offered for the download
pub const ARCHIVE_NAME: &str = "sorted_images.zip";

/// Build an in-memory zip archive from the sorted dictionary.
///
/// Each file lands at `{category_slug}/{filename}`. Filenames are reduced
/// to their final path component so an entry can never escape its
/// category directory.
pub fn build_archive(sorted: &BTreeMap<String, SortedImage>) -> Result<Vec<u8>> {
    if sorted.is_empty() {
        return Err(PicsortError::EmptyArchive(
            "no images have been sorted".to_string(),
        ));
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (filename, image) in sorted {
        let entry = format!("{}/{}", image.category.slug(), sanitize_filename(filename));
        writer
            .start_file(entry.as_str(), options)
            .map_err(|e| PicsortError::Archive(format!("Failed to add {}: {}", entry, e)))?;
        writer.write_all(&image.data)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| PicsortError::Archive(format!("Failed to finalize archive: {}", e)))?;

    Ok(cursor.into_inner())
}

/// Strip any directory components from an uploaded filename
fn sanitize_filename(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    Path::new(base)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn sorted_fixture() -> BTreeMap<String, SortedImage> {
        let mut sorted = BTreeMap::new();
        sorted.insert(
            "worksheet.png".to_string(),
            SortedImage {
                category: Category::Exercises,
                data: vec![1, 2, 3],
            },
        );
        sorted.insert(
            "chart.jpg".to_string(),
            SortedImage {
                category: Category::VisualHeavy,
                data: vec![4, 5],
            },
        );
        sorted
    }

    #[test]
    fn test_entries_land_in_category_directories() {
        let bytes = build_archive(&sorted_fixture()).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();

        assert_eq!(archive.len(), 2);
        assert!(names.contains(&"exercises/worksheet.png".to_string()));
        assert!(names.contains(&"visual_heavy/chart.jpg".to_string()));
    }

    #[test]
    fn test_entry_contents_survive() {
        let bytes = build_archive(&sorted_fixture()).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name("exercises/worksheet.png").unwrap();
        let mut contents = Vec::new();
        std::io::Read::read_to_end(&mut file, &mut contents).unwrap();
        assert_eq!(contents, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_dictionary_is_an_error() {
        let err = build_archive(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, PicsortError::EmptyArchive(_)));
    }

    #[test]
    fn test_path_components_stripped_from_filenames() {
        let mut sorted = BTreeMap::new();
        sorted.insert(
            "../../etc/passwd.png".to_string(),
            SortedImage {
                category: Category::TextHeavy,
                data: vec![0],
            },
        );

        let bytes = build_archive(&sorted).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "text_heavy/passwd.png");
    }
}
