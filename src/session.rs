// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Picsort Contributors

//! In-memory triage state for the current image batch

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::category::Category;
use crate::{PicsortError, Result};

/// An uploaded image awaiting triage
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub data: Vec<u8>,
}

/// An image with its assigned category
#[derive(Debug, Clone)]
pub struct SortedImage {
    pub category: Category,
    pub data: Vec<u8>,
}

/// Triage state for one batch of uploaded images.
///
/// Images are presented in upload order through a linear index. Sorted
/// images live in a dictionary keyed by filename, so a duplicate filename
/// within a batch collapses to its last assignment.
#[derive(Debug, Default)]
pub struct SortingSession {
    batch_id: Option<Uuid>,
    files: Vec<UploadedImage>,
    current_index: usize,
    sorted: BTreeMap<String, SortedImage>,
    sorting_complete: bool,
    preview_cache: HashMap<String, Vec<u8>>,
    last_activity: Option<DateTime<Utc>>,
    total_processed: u64,
}

impl SortingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any prior state with a fresh batch.
    ///
    /// An empty upload leaves the session empty. Returns the batch id
    /// assigned to a non-empty batch.
    pub fn start_batch(&mut self, files: Vec<UploadedImage>) -> Option<Uuid> {
        self.reset();

        if files.is_empty() {
            return None;
        }

        let id = Uuid::new_v4();
        self.batch_id = Some(id);
        self.files = files;
        self.touch();
        Some(id)
    }

    /// The image currently awaiting a category, if any
    pub fn current(&self) -> Option<&UploadedImage> {
        self.files.get(self.current_index)
    }

    /// Assign the current image to a category and advance the index
    pub fn assign(&mut self, category: Category) -> Result<()> {
        let image = self
            .files
            .get(self.current_index)
            .ok_or_else(|| PicsortError::NoImagePending(
                "no batch loaded or batch already complete".to_string(),
            ))?;

        self.sorted.insert(
            image.filename.clone(),
            SortedImage {
                category,
                data: image.data.clone(),
            },
        );
        self.total_processed += 1;
        self.current_index += 1;

        if self.current_index >= self.files.len() {
            self.sorting_complete = true;
        }

        self.touch();
        Ok(())
    }

    /// Per-category counts over the sorted dictionary, zeros included
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .iter()
            .map(|&cat| {
                let count = self.sorted.values().filter(|s| s.category == cat).count();
                (cat, count)
            })
            .collect()
    }

    /// 1-based position of the pending image and the batch length
    pub fn progress(&self) -> (usize, usize) {
        let total = self.files.len();
        let position = (self.current_index + 1).min(total.max(1));
        (position, total)
    }

    /// Fraction of the batch already sorted, for the progress bar
    pub fn progress_fraction(&self) -> f64 {
        if self.files.is_empty() {
            0.0
        } else {
            self.current_index as f64 / self.files.len() as f64
        }
    }

    pub fn has_batch(&self) -> bool {
        !self.files.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.sorting_complete
    }

    pub fn batch_id(&self) -> Option<Uuid> {
        self.batch_id
    }

    pub fn batch_len(&self) -> usize {
        self.files.len()
    }

    pub fn sorted_count(&self) -> usize {
        self.sorted.len()
    }

    pub fn total_processed(&self) -> u64 {
        self.total_processed
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    /// The sorted dictionary, filename-keyed
    pub fn sorted(&self) -> &BTreeMap<String, SortedImage> {
        &self.sorted
    }

    /// Cached preview bytes for a filename, if the resize already ran
    pub fn cached_preview(&self, filename: &str) -> Option<&[u8]> {
        self.preview_cache.get(filename).map(|v| v.as_slice())
    }

    /// Cache the rendered preview for a filename
    pub fn cache_preview(&mut self, filename: &str, preview: Vec<u8>) {
        self.preview_cache.insert(filename.to_string(), preview);
    }

    /// Return to the initial empty state
    pub fn reset(&mut self) {
        self.batch_id = None;
        self.files.clear();
        self.current_index = 0;
        self.sorted.clear();
        self.sorting_complete = false;
        self.preview_cache.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.last_activity = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> UploadedImage {
        UploadedImage {
            filename: name.to_string(),
            data: vec![0u8; 4],
        }
    }

    #[test]
    fn test_assign_advances_and_completes() {
        let mut session = SortingSession::new();
        session.start_batch(vec![image("a.png"), image("b.png")]);

        assert_eq!(session.current().unwrap().filename, "a.png");
        assert!(!session.is_complete());

        session.assign(Category::TextHeavy).unwrap();
        assert_eq!(session.current().unwrap().filename, "b.png");
        assert!(!session.is_complete());

        session.assign(Category::Exercises).unwrap();
        assert!(session.current().is_none());
        assert!(session.is_complete());
        assert_eq!(session.sorted_count(), 2);
    }

    #[test]
    fn test_single_image_batch_completes_immediately() {
        let mut session = SortingSession::new();
        session.start_batch(vec![image("only.jpg")]);
        session.assign(Category::VisualHeavy).unwrap();
        assert!(session.is_complete());
    }

    #[test]
    fn test_assign_without_batch_is_error() {
        let mut session = SortingSession::new();
        let err = session.assign(Category::TextHeavy).unwrap_err();
        assert!(matches!(err, PicsortError::NoImagePending(_)));
    }

    #[test]
    fn test_assign_after_completion_is_error() {
        let mut session = SortingSession::new();
        session.start_batch(vec![image("a.png")]);
        session.assign(Category::TextHeavy).unwrap();
        assert!(session.assign(Category::TextHeavy).is_err());
    }

    #[test]
    fn test_duplicate_filename_last_assignment_wins() {
        let mut session = SortingSession::new();
        session.start_batch(vec![image("dup.png"), image("dup.png")]);

        session.assign(Category::TextHeavy).unwrap();
        session.assign(Category::Exercises).unwrap();

        assert_eq!(session.sorted_count(), 1);
        assert_eq!(session.sorted()["dup.png"].category, Category::Exercises);
        // The counter still reflects both clicks
        assert_eq!(session.total_processed(), 2);
    }

    #[test]
    fn test_category_counts_include_zeros() {
        let mut session = SortingSession::new();
        session.start_batch(vec![image("a.png"), image("b.png")]);
        session.assign(Category::TextHeavy).unwrap();
        session.assign(Category::TextHeavy).unwrap();

        let counts = session.category_counts();
        assert_eq!(counts.len(), 5);
        assert_eq!(counts[0], (Category::TextHeavy, 2));
        assert_eq!(counts[4], (Category::Exercises, 0));
    }

    #[test]
    fn test_new_upload_replaces_batch() {
        let mut session = SortingSession::new();
        session.start_batch(vec![image("a.png")]);
        session.assign(Category::TextHeavy).unwrap();

        session.start_batch(vec![image("b.png")]);
        assert_eq!(session.sorted_count(), 0);
        assert!(!session.is_complete());
        assert_eq!(session.current().unwrap().filename, "b.png");
    }

    #[test]
    fn test_empty_upload_leaves_session_empty() {
        let mut session = SortingSession::new();
        assert!(session.start_batch(Vec::new()).is_none());
        assert!(!session.has_batch());
    }

    #[test]
    fn test_reset_clears_preview_cache() {
        let mut session = SortingSession::new();
        session.start_batch(vec![image("a.png")]);
        session.cache_preview("a.png", vec![1, 2, 3]);
        assert!(session.cached_preview("a.png").is_some());

        session.reset();
        assert!(session.cached_preview("a.png").is_none());
    }

    #[test]
    fn test_progress_reports_position() {
        let mut session = SortingSession::new();
        session.start_batch(vec![image("a.png"), image("b.png"), image("c.png")]);
        assert_eq!(session.progress(), (1, 3));

        session.assign(Category::Exercises).unwrap();
        assert_eq!(session.progress(), (2, 3));
        assert!((session.progress_fraction() - 1.0 / 3.0).abs() < 1e-9);
    }
}
