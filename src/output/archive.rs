//! Archive packaging and cleanup of generated parts
//!
//! Archives are written to a temporary file in the destination directory and
//! renamed into place once complete, so a failed run never leaves a truncated
//! `.zip` behind.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::model::ArchiveMode;
use crate::engine::progress::Reporter;
use crate::error::{SplitXError, SplitXResult};

/// Packages generated files according to an `ArchiveMode`
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveStage;

impl ArchiveStage {
    pub fn new() -> Self {
        Self
    }

    /// Package `files` and return the archives written.
    ///
    /// `Bundle` writes `<base_name>_bundle.zip` in `output_dir`; `PerFile`
    /// writes one `.zip` next to each file. Files that no longer exist are
    /// skipped.
    pub fn archive(
        &self,
        files: &[PathBuf],
        mode: ArchiveMode,
        base_name: &str,
        output_dir: &Path,
        reporter: &Reporter,
    ) -> SplitXResult<Vec<PathBuf>> {
        let present: Vec<&PathBuf> = files.iter().filter(|f| f.is_file()).collect();
        if present.len() < files.len() {
            warn!(
                "Skipping {} missing file(s) while archiving",
                files.len() - present.len()
            );
        }

        match mode {
            ArchiveMode::None => Ok(Vec::new()),
            ArchiveMode::Bundle => {
                let target = output_dir.join(format!("{}_bundle.zip", base_name));
                reporter.log(format!("Bundling all parts into {}...", file_label(&target)));
                write_archive(&target, &present)?;
                Ok(vec![target])
            }
            ArchiveMode::PerFile => {
                reporter.log("Zipping parts individually...");
                let mut archives = Vec::with_capacity(present.len());
                for file in present {
                    let target = file.with_extension("zip");
                    write_archive(&target, &[file])?;
                    archives.push(target);
                }
                Ok(archives)
            }
        }
    }

    /// Remove raw files once they are archived.
    ///
    /// Does nothing unless cleanup was requested and `mode` produced
    /// archives. A file that cannot be removed is reported and skipped.
    /// Returns the files actually removed.
    pub fn cleanup(
        &self,
        files: &[PathBuf],
        mode: ArchiveMode,
        requested: bool,
        reporter: &Reporter,
    ) -> Vec<PathBuf> {
        if !requested || !mode.permits_cleanup() {
            return Vec::new();
        }

        reporter.log("Removing raw .mp4 parts...");
        let mut removed = Vec::with_capacity(files.len());
        for file in files {
            match std::fs::remove_file(file) {
                Ok(()) => removed.push(file.clone()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("Already gone: {}", file.display());
                }
                Err(e) => {
                    reporter.warn(format!("Could not delete {}: {}", file_label(file), e));
                }
            }
        }
        removed
    }
}

/// Write `members` into a zip at `target`, each stored under its base name
fn write_archive(target: &Path, members: &[&PathBuf]) -> SplitXResult<()> {
    let dir = target
        .parent()
        .ok_or_else(|| SplitXError::Archive {
            message: format!("Archive path has no parent: {}", target.display()),
        })?;

    let temp = NamedTempFile::new_in(dir)?;
    let mut writer = ZipWriter::new(BufWriter::new(temp.as_file().try_clone()?));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    for member in members {
        let name = member
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SplitXError::Archive {
                message: format!("Cannot archive path without a file name: {}", member.display()),
            })?;
        writer.start_file(name, options)?;
        let mut source = BufReader::new(File::open(member)?);
        io::copy(&mut source, &mut writer)?;
    }

    let mut inner = writer.finish()?;
    io::Write::flush(&mut inner)?;
    drop(inner);

    temp.persist(target).map_err(|e| SplitXError::Io(e.error))?;
    info!("Wrote archive {} ({} member(s))", target.display(), members.len());
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::progress::MemorySink;
    use std::io::Read;
    use tempfile::TempDir;

    fn parts(dir: &Path, count: usize) -> Vec<PathBuf> {
        (1..=count)
            .map(|i| {
                let path = dir.join(format!("clip_part{}.mp4", i));
                std::fs::write(&path, format!("payload {}", i)).unwrap();
                path
            })
            .collect()
    }

    fn member_names(archive: &Path) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn bundle_holds_every_part_by_base_name() {
        let dir = TempDir::new().unwrap();
        let files = parts(dir.path(), 3);
        let sink = MemorySink::new();

        let archives = ArchiveStage::new()
            .archive(&files, ArchiveMode::Bundle, "clip", dir.path(), &Reporter::from_sink(sink.clone()))
            .unwrap();

        assert_eq!(archives, vec![dir.path().join("clip_bundle.zip")]);
        assert_eq!(
            member_names(&archives[0]),
            vec!["clip_part1.mp4", "clip_part2.mp4", "clip_part3.mp4"]
        );
        let mut zip = zip::ZipArchive::new(File::open(&archives[0]).unwrap()).unwrap();
        let mut body = String::new();
        zip.by_name("clip_part2.mp4").unwrap().read_to_string(&mut body).unwrap();
        assert_eq!(body, "payload 2");
        assert_eq!(sink.logs(), vec!["Bundling all parts into clip_bundle.zip..."]);
    }

    #[test]
    fn per_file_archives_sit_next_to_each_part() {
        let dir = TempDir::new().unwrap();
        let files = parts(dir.path(), 2);

        let archives = ArchiveStage::new()
            .archive(&files, ArchiveMode::PerFile, "clip", dir.path(), &Reporter::silent())
            .unwrap();

        assert_eq!(
            archives,
            vec![dir.path().join("clip_part1.zip"), dir.path().join("clip_part2.zip")]
        );
        assert_eq!(member_names(&archives[1]), vec!["clip_part2.mp4"]);
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let mut files = parts(dir.path(), 1);
        files.push(dir.path().join("gone.mp4"));

        let archives = ArchiveStage::new()
            .archive(&files, ArchiveMode::Bundle, "clip", dir.path(), &Reporter::silent())
            .unwrap();
        assert_eq!(member_names(&archives[0]), vec!["clip_part1.mp4"]);
    }

    #[test]
    fn none_mode_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let files = parts(dir.path(), 2);
        let archives = ArchiveStage::new()
            .archive(&files, ArchiveMode::None, "clip", dir.path(), &Reporter::silent())
            .unwrap();
        assert!(archives.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn cleanup_requires_an_archive_mode() {
        let dir = TempDir::new().unwrap();
        let files = parts(dir.path(), 2);
        let stage = ArchiveStage::new();

        assert!(stage.cleanup(&files, ArchiveMode::None, true, &Reporter::silent()).is_empty());
        assert!(files.iter().all(|f| f.exists()));

        assert!(stage.cleanup(&files, ArchiveMode::Bundle, false, &Reporter::silent()).is_empty());
        assert!(files.iter().all(|f| f.exists()));

        let sink = MemorySink::new();
        let removed = stage.cleanup(&files, ArchiveMode::Bundle, true, &Reporter::from_sink(sink.clone()));
        assert_eq!(removed, files);
        assert!(files.iter().all(|f| !f.exists()));
        assert_eq!(sink.logs(), vec!["Removing raw .mp4 parts..."]);
    }

    #[test]
    fn failed_delete_is_logged_and_the_rest_removed() {
        let dir = TempDir::new().unwrap();
        let mut files = parts(dir.path(), 2);
        // A directory in place of a part cannot be removed with remove_file
        let stuck = dir.path().join("clip_part9.mp4");
        std::fs::create_dir(&stuck).unwrap();
        files.insert(1, stuck.clone());

        let sink = MemorySink::new();
        let removed = ArchiveStage::new().cleanup(
            &files,
            ArchiveMode::PerFile,
            true,
            &Reporter::from_sink(sink.clone()),
        );

        assert_eq!(removed, vec![files[0].clone(), files[2].clone()]);
        assert!(!files[0].exists() && !files[2].exists());
        assert!(stuck.is_dir());
        let logs = sink.logs();
        assert_eq!(logs.len(), 2);
        assert!(logs[1].starts_with("Could not delete clip_part9.mp4: "), "{:?}", logs);
    }
}
