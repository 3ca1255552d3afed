//! Level/date-partitioned file destination.
//!
//! Layout: `root/[type_extra/]app_name/app_group/YYYYMM/YYYYMMDD_[prefix_]name.log`
//! where `name` is the custom log type when set and the severity otherwise.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::LoggerConfig;
use crate::record::LogRecord;
use crate::sink::{LogSink, StorageError};

/// Stand-in for a metadata value that sanitizes to nothing.
const EMPTY_SEGMENT: &str = "_";

/// [`LogSink`] that appends each line to its partition file, creating
/// directories and the file on first use.
#[derive(Clone, Debug)]
pub struct FileRouter {
    root: PathBuf,
    type_extra: Option<String>,
    dir_mode: u32,
    file_mode: u32,
}

impl FileRouter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let defaults = LoggerConfig::default();
        Self {
            root: root.into(),
            type_extra: None,
            dir_mode: defaults.dir_mode,
            file_mode: defaults.file_mode,
        }
    }

    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            root: config.root.clone(),
            type_extra: config.type_extra.clone(),
            dir_mode: config.dir_mode,
            file_mode: config.file_mode,
        }
    }

    pub fn with_type_extra(mut self, type_extra: Option<String>) -> Self {
        self.type_extra = type_extra;
        self
    }

    pub fn with_modes(mut self, dir_mode: u32, file_mode: u32) -> Self {
        self.dir_mode = dir_mode;
        self.file_mode = file_mode;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a record belongs in. Never escapes `root`.
    pub fn directory_for(&self, record: &LogRecord) -> PathBuf {
        let mut dir = self.root.clone();
        if let Some(extra) = self.type_extra.as_deref().filter(|e| !e.is_empty()) {
            push_segments(&mut dir, extra);
        }
        push_segments(&mut dir, &record.appname);
        push_segments(&mut dir, &record.appgroup);
        dir.push(record.timestamp.format("%Y%m").to_string());
        dir
    }

    /// Full path of the file a record is appended to.
    pub fn path_for(&self, record: &LogRecord) -> PathBuf {
        let prefix = record
            .file_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}_", file_component(p)))
            .unwrap_or_default();
        let file = format!(
            "{}_{}{}.log",
            record.timestamp.format("%Y%m%d"),
            prefix,
            file_component(record.file_name())
        );
        self.directory_for(record).join(file)
    }

    /// Append `line` plus a newline to `path` with a single write.
    pub fn append(&self, path: &Path, line: &str) -> Result<(), StorageError> {
        if let Some(dir) = path.parent() {
            self.create_dirs(dir)?;
        }

        let existed = path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| StorageError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        if !existed {
            apply_mode(path, self.file_mode);
        }

        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        file.write_all(buf.as_bytes())
            .map_err(|source| StorageError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Create `dir` and any missing ancestors, each with `dir_mode`.
    fn create_dirs(&self, dir: &Path) -> Result<(), StorageError> {
        if dir.is_dir() {
            return Ok(());
        }

        let mut missing = Vec::new();
        let mut cursor = Some(dir);
        while let Some(path) = cursor {
            if path.as_os_str().is_empty() || path.exists() {
                break;
            }
            missing.push(path);
            cursor = path.parent();
        }

        for path in missing.into_iter().rev() {
            match fs::create_dir(path) {
                Ok(()) => {
                    debug!(path = %path.display(), "created log directory");
                    apply_mode(path, self.dir_mode);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(source) => {
                    return Err(StorageError::CreateDir {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            }
        }
        Ok(())
    }
}

impl LogSink for FileRouter {
    fn write(&self, record: &LogRecord, line: &str) -> Result<(), StorageError> {
        let path = self.path_for(record);
        self.append(&path, line)
    }
}

/// Push the `/`- or `\`-separated segments of `raw`, skipping empty, `.`
/// and `..` segments.
fn push_segments(path: &mut PathBuf, raw: &str) {
    let mut pushed = false;
    for segment in raw.split(['/', '\\']) {
        let segment = segment.trim();
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        path.push(segment);
        pushed = true;
    }
    if !pushed {
        path.push(EMPTY_SEGMENT);
    }
}

fn file_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        EMPTY_SEGMENT.to_string()
    } else {
        cleaned
    }
}

// Set explicitly so the process umask cannot narrow the mode. Failure is
// not fatal: the entry exists and may still be writable.
#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
        warn!(path = %path.display(), error = %e, "failed to set log path permissions");
    }
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;
    use crate::record::{LogOptions, RecordBuilder, RoutingMetadata};
    use crate::value::Value;
    use chrono::{Local, TimeZone};

    fn record(routing: &RoutingMetadata, options: &LogOptions, level: Severity) -> LogRecord {
        RecordBuilder::new(routing, "rid", options).build_at(
            Local.with_ymd_and_hms(2016, 7, 8, 12, 4, 50).unwrap(),
            level,
            "msg",
            Value::Null,
        )
    }

    fn routing(app_name: &str, app_group: &str) -> RoutingMetadata {
        RoutingMetadata {
            app_name: app_name.into(),
            app_group: app_group.into(),
            route: "Common.Order.Pay".into(),
        }
    }

    #[test]
    fn path_layout() {
        let router = FileRouter::new("/var/log/app");
        let r = record(&routing("shop", "orders/pay"), &LogOptions::default(), Severity::Warning);
        assert_eq!(
            router.path_for(&r),
            PathBuf::from("/var/log/app/shop/orders/pay/201607/20160708_warning.log")
        );
    }

    #[test]
    fn custom_type_prefix_and_extra() {
        let router = FileRouter::new("/logs").with_type_extra(Some("new".into()));
        let options = LogOptions {
            log_type: Some("apierror".into()),
            file_prefix: Some("Pay".into()),
        };
        let r = record(&routing("shop", "g"), &options, Severity::Info);
        assert_eq!(
            router.path_for(&r),
            PathBuf::from("/logs/new/shop/g/201607/20160708_Pay_apierror.log")
        );
    }

    #[test]
    fn metadata_cannot_escape_root() {
        let router = FileRouter::new("/logs");
        let options = LogOptions::custom("../../etc/passwd");
        let r = record(&routing("../..", "/abs/../x/./"), &options, Severity::Info);
        let path = router.path_for(&r);
        assert_eq!(
            path,
            PathBuf::from("/logs/_/abs/x/201607/20160708_.._.._etc_passwd.log")
        );
        assert!(path.starts_with("/logs"));
        assert!(!path.components().any(|c| c == std::path::Component::ParentDir));
    }

    #[test]
    fn appends_lines_and_creates_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let router = FileRouter::new(tmp.path());
        let r = record(&routing("shop", "a/b"), &LogOptions::default(), Severity::Error);

        router.write(&r, "first").unwrap();
        router.write(&r, "second").unwrap();

        let path = router.path_for(&r);
        assert!(path.starts_with(tmp.path().join("shop/a/b/201607")));
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[cfg(unix)]
    #[test]
    fn created_entries_ignore_umask() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let router = FileRouter::new(tmp.path()).with_modes(0o777, 0o666);
        let r = record(&routing("shop", "g"), &LogOptions::default(), Severity::Info);
        router.write(&r, "x").unwrap();

        let dir_mode = fs::metadata(tmp.path().join("shop")).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o777);
        let file_mode = fs::metadata(router.path_for(&r)).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o666);
    }

    #[test]
    fn unwritable_root_is_a_storage_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let router = FileRouter::new(&blocker);
        let r = record(&routing("shop", "g"), &LogOptions::default(), Severity::Info);
        let err = router.write(&r, "x").unwrap_err();
        assert!(matches!(err, StorageError::CreateDir { .. }));
    }
}
