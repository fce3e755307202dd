//! Destination planning.

use super::types::{Destination, PlacementAction, PlacementDecision, ResolvedDate};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Computes where a file belongs and whether it still needs copying
pub struct PlacementPlanner;

impl PlacementPlanner {
    /// `<output_root>/<YYYY>/<YYYY-MM-DD>/<filename>`.
    ///
    /// The filename is kept verbatim, case and extension included.
    pub fn destination(date: &ResolvedDate, output_root: &Path, filename: &OsStr) -> Destination {
        let directory = output_root
            .join(date.year_folder())
            .join(date.day_folder());
        let path = directory.join(filename);
        Destination { directory, path }
    }

    /// Plan placement of `filename` dated `date`.
    ///
    /// Anything already at the destination path means `SkipExists`; its
    /// content is not compared. Nothing is created here.
    pub fn plan(date: &ResolvedDate, output_root: &Path, filename: &OsStr) -> PlacementDecision {
        Self::decide(Self::destination(date, output_root, filename))
    }

    /// Decide between `Copy` and `SkipExists` for a computed destination
    pub fn decide(destination: Destination) -> PlacementDecision {
        // symlink_metadata so a dangling link still counts as occupied
        let action = if fs::symlink_metadata(&destination.path).is_ok() {
            PlacementAction::SkipExists
        } else {
            PlacementAction::Copy
        };

        PlacementDecision {
            action,
            destination: Some(destination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::organize::types::DateSource;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> ResolvedDate {
        ResolvedDate::new(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            DateSource::Metadata,
        )
    }

    #[test]
    fn builds_year_and_day_buckets() {
        let dest = PlacementPlanner::destination(
            &date(2022, 1, 5),
            Path::new("/out"),
            OsStr::new("img1.jpg"),
        );

        assert_eq!(dest.directory, PathBuf::from("/out/2022/2022-01-05"));
        assert_eq!(dest.path, PathBuf::from("/out/2022/2022-01-05/img1.jpg"));
    }

    #[test]
    fn keeps_filename_verbatim() {
        let dest = PlacementPlanner::destination(
            &date(2021, 12, 31),
            Path::new("/out"),
            OsStr::new("IMG 0001 (copy).JPG"),
        );

        assert_eq!(
            dest.path,
            PathBuf::from("/out/2021/2021-12-31/IMG 0001 (copy).JPG")
        );
    }

    #[test]
    fn missing_destination_plans_copy_without_creating_anything() {
        let out = TempDir::new().unwrap();
        let decision =
            PlacementPlanner::plan(&date(2022, 1, 5), out.path(), OsStr::new("img1.jpg"));

        assert_eq!(decision.action, PlacementAction::Copy);
        assert!(!out.path().join("2022").exists());
    }

    #[test]
    fn existing_destination_plans_skip() {
        let out = TempDir::new().unwrap();
        let day = out.path().join("2022").join("2022-01-05");
        fs::create_dir_all(&day).unwrap();
        fs::write(day.join("img1.jpg"), b"already here").unwrap();

        let decision =
            PlacementPlanner::plan(&date(2022, 1, 5), out.path(), OsStr::new("img1.jpg"));

        assert_eq!(decision.action, PlacementAction::SkipExists);
        assert_eq!(decision.destination_path(), Some(&day.join("img1.jpg")));
    }

    #[test]
    fn planning_is_deterministic() {
        let out = TempDir::new().unwrap();
        let first = PlacementPlanner::plan(&date(2020, 2, 29), out.path(), OsStr::new("leap.png"));
        let second = PlacementPlanner::plan(&date(2020, 2, 29), out.path(), OsStr::new("leap.png"));

        assert_eq!(first, second);
    }
}
