use crate::error::launch::LaunchError;

use common::ErrorLocation;

use std::borrow::Cow;
use std::fs;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;
use std::path::{Component, Path, PathBuf};

use log::{debug, info, warn};
use tempfile::{Builder as TempDirBuilder, TempDir};

#[cfg(unix)]
const EXECUTABLE_MODE: u32 = 0o755;

/// What to run once a payload has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

/// Source of the files that make up the local mail service.
///
/// Implementations write their files into `dir` (a fresh, empty directory)
/// and say how to start the result. How the bytes were packaged (embedded
/// in the binary, shipped next to it, generated) is up to the implementation.
pub trait ResourceProvider: Send + Sync {
    /// Short name, used as the temp directory prefix and in logs.
    fn name(&self) -> &str;

    fn materialize(&self, dir: &Path) -> Result<LaunchTarget, IoError>;
}

// ============================================
// EMBEDDED EXECUTABLE
// ============================================

/// A single executable held in memory, typically from `include_bytes!`.
#[derive(Debug, Clone)]
pub struct EmbeddedExecutable {
    file_name: String,
    bytes: Cow<'static, [u8]>,
}

impl EmbeddedExecutable {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

impl ResourceProvider for EmbeddedExecutable {
    fn name(&self) -> &str {
        &self.file_name
    }

    fn materialize(&self, dir: &Path) -> Result<LaunchTarget, IoError> {
        if self.bytes.is_empty() {
            return Err(IoError::new(
                ErrorKind::InvalidData,
                format!("embedded executable {} is empty", self.file_name),
            ));
        }

        let relative = checked_relative_path(Path::new(&self.file_name))?;
        let program = dir.join(relative);

        fs::write(&program, &self.bytes)?;
        mark_executable(&program)?;

        Ok(LaunchTarget {
            program,
            args: Vec::new(),
            working_dir: dir.to_path_buf(),
        })
    }
}

// ============================================
// SCRIPT BUNDLE
// ============================================

/// An in-memory file tree run through an interpreter (e.g. `python3 app.py`).
#[derive(Debug, Clone)]
pub struct ScriptBundle {
    name: String,
    interpreter: String,
    entry: PathBuf,
    files: Vec<(PathBuf, Cow<'static, [u8]>)>,
}

impl ScriptBundle {
    pub fn new(
        name: impl Into<String>,
        interpreter: impl Into<String>,
        entry: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            interpreter: interpreter.into(),
            entry: entry.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(
        mut self,
        path: impl Into<PathBuf>,
        contents: impl Into<Cow<'static, [u8]>>,
    ) -> Self {
        self.files.push((path.into(), contents.into()));
        self
    }
}

impl ResourceProvider for ScriptBundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn materialize(&self, dir: &Path) -> Result<LaunchTarget, IoError> {
        for (path, contents) in &self.files {
            let target = dir.join(checked_relative_path(path)?);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, contents)?;
        }

        script_target(dir, &self.interpreter, &self.entry)
    }
}

// ============================================
// PATH PAYLOAD
// ============================================

/// A payload that already exists on local disk and is copied before launch.
#[derive(Debug, Clone)]
pub enum PathPayload {
    /// A standalone executable file.
    Executable { path: PathBuf },
    /// A directory tree started as `interpreter <entry>`.
    ScriptDir {
        dir: PathBuf,
        entry: PathBuf,
        interpreter: String,
    },
}

impl PathPayload {
    pub fn executable(path: impl Into<PathBuf>) -> Self {
        PathPayload::Executable { path: path.into() }
    }

    pub fn script_dir(
        dir: impl Into<PathBuf>,
        entry: impl Into<PathBuf>,
        interpreter: impl Into<String>,
    ) -> Self {
        PathPayload::ScriptDir {
            dir: dir.into(),
            entry: entry.into(),
            interpreter: interpreter.into(),
        }
    }

    fn source(&self) -> &Path {
        match self {
            PathPayload::Executable { path } => path,
            PathPayload::ScriptDir { dir, .. } => dir,
        }
    }
}

impl ResourceProvider for PathPayload {
    fn name(&self) -> &str {
        self.source()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("payload")
    }

    fn materialize(&self, dir: &Path) -> Result<LaunchTarget, IoError> {
        match self {
            PathPayload::Executable { path } => {
                let file_name = path.file_name().ok_or_else(|| {
                    IoError::new(
                        ErrorKind::InvalidInput,
                        format!("executable path has no file name: {}", path.display()),
                    )
                })?;
                let program = dir.join(file_name);

                fs::copy(path, &program)?;
                mark_executable(&program)?;

                Ok(LaunchTarget {
                    program,
                    args: Vec::new(),
                    working_dir: dir.to_path_buf(),
                })
            }
            PathPayload::ScriptDir {
                dir: source,
                entry,
                interpreter,
            } => {
                copy_tree(source, dir)?;
                script_target(dir, interpreter, entry)
            }
        }
    }
}

// ============================================
// HELPERS
// ============================================

/// Reject absolute paths and `..` so payload files stay inside the temp dir.
fn checked_relative_path(path: &Path) -> Result<&Path, IoError> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes || path.as_os_str().is_empty() {
        return Err(IoError::new(
            ErrorKind::InvalidInput,
            format!("payload path must be relative and stay inside the payload dir: {}", path.display()),
        ));
    }

    Ok(path)
}

fn script_target(dir: &Path, interpreter: &str, entry: &Path) -> Result<LaunchTarget, IoError> {
    let entry_path = dir.join(checked_relative_path(entry)?);

    if !entry_path.is_file() {
        return Err(IoError::new(
            ErrorKind::NotFound,
            format!("entry script not found in payload: {}", entry.display()),
        ));
    }

    Ok(LaunchTarget {
        program: PathBuf::from(interpreter),
        args: vec![entry_path.to_string_lossy().to_string()],
        working_dir: dir.to_path_buf(),
    })
}

fn copy_tree(source: &Path, destination: &Path) -> Result<(), IoError> {
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            fs::create_dir_all(&target)?;
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), IoError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(EXECUTABLE_MODE))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), IoError> {
    Ok(())
}

// ============================================
// MATERIALIZATION
// ============================================

/// A payload written to a temp directory that this value owns.
///
/// Dropping it removes the directory.
#[derive(Debug)]
pub struct MaterializedPayload {
    dir: TempDir,
    pub target: LaunchTarget,
}

impl MaterializedPayload {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<(), IoError> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!("Removed payload directory {}", path.display());
        Ok(())
    }
}

/// Write `provider`'s files into a freshly created temp directory.
///
/// The directory is created under `temp_root` when given, otherwise under the
/// system temp dir. On any failure the partially written directory is removed.
#[track_caller]
pub fn materialize_payload(
    provider: &dyn ResourceProvider,
    temp_root: Option<&Path>,
) -> Result<MaterializedPayload, LaunchError> {
    let prefix = format!("{}-", provider.name());
    let mut builder = TempDirBuilder::new();
    builder.prefix(&prefix);

    let created = match temp_root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    };

    let dir = created.map_err(|e| LaunchError::Extraction {
        message: format!(
            "Failed to create temp directory for {} under {}: {e}",
            provider.name(),
            temp_root
                .map(|r| r.display().to_string())
                .unwrap_or_else(|| "system temp dir".to_string())
        ),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })?;

    debug!("Materializing {} into {}", provider.name(), dir.path().display());

    let target = match provider.materialize(dir.path()) {
        Ok(target) => target,
        Err(e) => {
            let path = dir.path().to_path_buf();
            if let Err(cleanup) = dir.close() {
                warn!(
                    "Failed to remove partial payload at {}: {cleanup}",
                    path.display()
                );
            }
            return Err(LaunchError::Extraction {
                message: format!("Failed to write {} payload: {e}", provider.name()),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            });
        }
    };

    info!(
        "Materialized {} at {} (program: {})",
        provider.name(),
        dir.path().display(),
        target.program.display()
    );

    Ok(MaterializedPayload { dir, target })
}
