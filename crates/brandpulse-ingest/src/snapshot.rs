//! CSV snapshots of a run's buckets, written next to the database insert.
//!
//! Layout under the snapshot root:
//!
//! ```text
//! aspect_classification/English/english_aspects_<YYYYMMDD_HHMMSS_ffffff>.csv
//! aspect_classification/Sinhala/sinhala_aspects_<YYYYMMDD_HHMMSS_ffffff>.csv
//! garbage_classification/English/english_garbage_<YYYYMMDD_HHMMSS_ffffff>.csv
//! garbage_classification/Sinhala/sinhala_garbage_<YYYYMMDD_HHMMSS_ffffff>.csv
//! ```
//!
//! Existing files are never overwritten.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use brandpulse_core::{Aspect, Bucket, CommentRecord, Language, ScrapeId};

use crate::error::IngestError;

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Directory a bucket's snapshot lands in, relative to the snapshot root.
#[must_use]
pub fn bucket_dir(root: &Path, bucket: Bucket) -> PathBuf {
    let kind = if bucket.is_valid() {
        "aspect_classification"
    } else {
        "garbage_classification"
    };
    let language = match bucket.language() {
        Language::Si => "Sinhala",
        _ => "English",
    };
    root.join(kind).join(language)
}

/// Writes one CSV per non-empty bucket and returns the paths written.
///
/// # Errors
///
/// Returns [`IngestError::Snapshot`] if a directory cannot be created or a
/// file cannot be written.
pub fn write_snapshots(
    root: &Path,
    scrape_id: &ScrapeId,
    buckets: &BTreeMap<Bucket, Vec<CommentRecord>>,
) -> Result<Vec<PathBuf>, IngestError> {
    let suffix = scrape_id.file_suffix();
    let mut written = Vec::new();

    for (&bucket, records) in buckets {
        if records.is_empty() {
            continue;
        }

        let dir = bucket_dir(root, bucket);
        std::fs::create_dir_all(&dir).map_err(|e| IngestError::Snapshot {
            path: dir.clone(),
            reason: e.to_string(),
        })?;

        let path = dir.join(format!("{}_{suffix}.csv", bucket.table_name()));
        write_bucket(&path, bucket, records).map_err(|e| IngestError::Snapshot {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(path = %path.display(), rows = records.len(), "snapshot written");
        written.push(path);
    }

    Ok(written)
}

fn write_bucket(path: &Path, bucket: Bucket, records: &[CommentRecord]) -> Result<(), csv::Error> {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    let mut writer = csv::Writer::from_writer(file);

    if bucket.is_valid() {
        writer.write_record(["Comment", "Aspect", "Date"])?;
        for record in records {
            let date = record.published_at.format(DATE_FORMAT).to_string();
            let aspect = record.aspect.map_or("", Aspect::as_str);
            writer.write_record([record.comment.as_str(), aspect, date.as_str()])?;
        }
    } else {
        writer.write_record(["Comment", "Date"])?;
        for record in records {
            let date = record.published_at.format(DATE_FORMAT).to_string();
            writer.write_record([record.comment.as_str(), date.as_str()])?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn record(comment: &str, aspect: Option<Aspect>) -> CommentRecord {
        CommentRecord {
            scrape_id: ScrapeId::from("2024-02-01T09:30:15.123456".to_string()),
            brand: "Acme".to_string(),
            trigger_keywords: vec!["savings".to_string()],
            comment: comment.to_string(),
            aspect,
            published_at: Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap(),
            scores: None,
        }
    }

    #[test]
    fn writes_one_file_per_non_empty_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let scrape_id = ScrapeId::from("2024-02-01T09:30:15.123456".to_string());

        let mut buckets = BTreeMap::new();
        buckets.insert(
            Bucket::EnglishValid,
            vec![record("Great app, really", Some(Aspect::CustomerSupport))],
        );
        buckets.insert(Bucket::SinhalaGarbage, vec![record("සබ්ස්ක්‍රයිබ්", None)]);
        buckets.insert(Bucket::EnglishGarbage, Vec::new());

        let paths = write_snapshots(dir.path(), &scrape_id, &buckets).unwrap();

        assert_eq!(paths.len(), 2);
        let english = dir
            .path()
            .join("aspect_classification/English/english_aspects_20240201_093015_123456.csv");
        let sinhala = dir
            .path()
            .join("garbage_classification/Sinhala/sinhala_garbage_20240201_093015_123456.csv");
        assert!(paths.contains(&english));
        assert!(paths.contains(&sinhala));
        assert!(!dir.path().join("garbage_classification/English").exists());

        let english_csv = std::fs::read_to_string(english).unwrap();
        assert_eq!(
            english_csv,
            format!(
                "Comment,Aspect,Date\n\"Great app, really\",{},2024-01-10T08:00:00Z\n",
                Aspect::CustomerSupport.as_str()
            )
        );

        let sinhala_csv = std::fs::read_to_string(sinhala).unwrap();
        assert_eq!(
            sinhala_csv,
            "Comment,Date\nසබ්ස්ක්‍රයිබ්,2024-01-10T08:00:00Z\n"
        );
    }

    #[test]
    fn same_second_runs_do_not_clobber_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let first = ScrapeId::from("2024-02-01T09:30:15.000001".to_string());
        let second = ScrapeId::from("2024-02-01T09:30:15.000002".to_string());

        let mut buckets = BTreeMap::new();
        buckets.insert(Bucket::EnglishGarbage, vec![record("first run", None)]);
        let first_paths = write_snapshots(dir.path(), &first, &buckets).unwrap();

        buckets.insert(Bucket::EnglishGarbage, vec![record("second run", None)]);
        let second_paths = write_snapshots(dir.path(), &second, &buckets).unwrap();

        assert_ne!(first_paths, second_paths);
        let kept = std::fs::read_to_string(&first_paths[0]).unwrap();
        assert!(kept.contains("first run"));
    }

    #[test]
    fn existing_snapshot_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let scrape_id = ScrapeId::from("2024-02-01T09:30:15.123456".to_string());
        let mut buckets = BTreeMap::new();
        buckets.insert(Bucket::EnglishGarbage, vec![record("spam", None)]);

        let paths = write_snapshots(dir.path(), &scrape_id, &buckets).unwrap();
        let err = write_snapshots(dir.path(), &scrape_id, &buckets).unwrap_err();

        assert!(matches!(err, IngestError::Snapshot { ref path, .. } if *path == paths[0]));
        assert_eq!(
            std::fs::read_to_string(&paths[0]).unwrap(),
            "Comment,Date\nspam,2024-01-10T08:00:00Z\n"
        );
    }

    #[test]
    fn unwritable_root_is_a_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut buckets = BTreeMap::new();
        buckets.insert(Bucket::EnglishGarbage, vec![record("spam", None)]);

        let err = write_snapshots(&blocker, &ScrapeId::from("x".to_string()), &buckets)
            .unwrap_err();
        assert!(matches!(err, IngestError::Snapshot { .. }));
    }
}
