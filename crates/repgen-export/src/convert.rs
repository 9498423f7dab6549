//! External DOCX → PDF converters.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use repgen_core::naming::pdf_path_for;

use crate::error::ExportError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something that can turn a Word document into a PDF.
pub trait Converter {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    /// Convert `docx` into `out_dir` and return the PDF path. Blocks until
    /// the conversion finishes or `timeout` passes.
    fn convert(&self, docx: &Path, out_dir: &Path, timeout: Duration)
    -> Result<PathBuf, ExportError>;
}

/// Builds the argument list from the input document and output directory.
pub type ArgsFn = fn(&Path, &Path) -> Vec<OsString>;

/// A converter that runs an executable found on `PATH`.
pub struct CommandConverter {
    name: String,
    programs: Vec<String>,
    args: ArgsFn,
    supported: bool,
}

impl CommandConverter {
    /// `programs` are tried in order; the first one found is used. Absolute
    /// paths are used directly.
    pub fn new(name: &str, programs: &[&str], args: ArgsFn) -> Self {
        Self {
            name: name.to_string(),
            programs: programs.iter().map(|p| p.to_string()).collect(),
            args,
            supported: true,
        }
    }

    /// ONLYOFFICE desktop editors.
    pub fn onlyoffice() -> Self {
        Self::new(
            "onlyoffice",
            &["desktopeditors", "onlyoffice-desktopeditors"],
            |docx, out_dir| {
                vec![
                    "--convert".into(),
                    docx.as_os_str().to_owned(),
                    "--output".into(),
                    out_dir.as_os_str().to_owned(),
                ]
            },
        )
    }

    pub fn libreoffice() -> Self {
        Self::new("libreoffice", &["libreoffice", "soffice"], |docx, out_dir| {
            vec![
                "--headless".into(),
                "--convert-to".into(),
                "pdf".into(),
                "--outdir".into(),
                out_dir.as_os_str().to_owned(),
                docx.as_os_str().to_owned(),
            ]
        })
    }

    /// Microsoft Word through the `docx2pdf` tool. Windows and macOS only.
    pub fn docx2pdf() -> Self {
        let mut converter = Self::new("docx2pdf", &["docx2pdf"], |docx, out_dir| {
            vec![docx.as_os_str().to_owned(), out_dir.as_os_str().to_owned()]
        });
        converter.supported = cfg!(any(windows, target_os = "macos"));
        converter
    }

    fn program(&self) -> Option<PathBuf> {
        if !self.supported {
            return None;
        }
        self.programs.iter().find_map(|p| find_executable(p))
    }
}

impl Converter for CommandConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.program().is_some()
    }

    fn convert(
        &self,
        docx: &Path,
        out_dir: &Path,
        timeout: Duration,
    ) -> Result<PathBuf, ExportError> {
        let failed = |reason: String| ExportError::ConverterFailed {
            converter: self.name.clone(),
            reason,
        };

        let program = self
            .program()
            .ok_or_else(|| failed("executable not found".to_string()))?;
        let args = (self.args)(docx, out_dir);
        info!(
            converter = %self.name,
            program = %program.display(),
            document = %docx.display(),
            "converting to PDF"
        );

        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        run_with_timeout(command, timeout).map_err(failed)?;

        let pdf = pdf_path_for(docx, out_dir);
        if !pdf.is_file() {
            return Err(failed(format!("no PDF written to {}", pdf.display())));
        }
        Ok(pdf)
    }
}

/// ONLYOFFICE, then LibreOffice, then Word.
pub fn default_converters() -> Vec<Box<dyn Converter>> {
    vec![
        Box::new(CommandConverter::onlyoffice()),
        Box::new(CommandConverter::libreoffice()),
        Box::new(CommandConverter::docx2pdf()),
    ]
}

fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<(), String> {
    let mut child = command
        .spawn()
        .map_err(|e| format!("failed to start: {e}"))?;
    let started = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "converter exited");
                return Ok(());
            }
            Ok(Some(status)) => return Err(format!("exited with {status}")),
            Ok(None) if started.elapsed() >= timeout => {
                // The child may exit between the poll and the kill.
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!("timed out after {}s", timeout.as_secs()));
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(format!("failed to wait: {e}")),
        }
    }
}

/// Locate `program` the way a shell would: paths with a directory part are
/// used as given, bare names are searched in `PATH`.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 || direct.is_absolute() {
        return is_executable(direct).then(|| direct.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        executable_names(program)
            .into_iter()
            .map(|name| dir.join(name))
            .find(|candidate| is_executable(candidate))
    })
}

#[cfg(windows)]
fn executable_names(program: &str) -> Vec<String> {
    let mut names = vec![program.to_string()];
    let exts = std::env::var("PATHEXT").unwrap_or_else(|_| ".EXE;.CMD;.BAT".to_string());
    names.extend(exts.split(';').filter(|e| !e.is_empty()).map(|e| format!("{program}{e}")));
    names
}

#[cfg(not(windows))]
fn executable_names(program: &str) -> Vec<String> {
    vec![program.to_string()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
