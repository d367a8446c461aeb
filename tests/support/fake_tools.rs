//! Stub `curl`, `wget` and `convert` executables for end-to-end tests.
//!
//! Each stub writes a small file to the destination argument so the real
//! tools and network are never needed. Stubs are placed in a temp `bin`
//! directory that tests prepend to `PATH`.

use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Diagnostic the curl stub prints to stderr before failing.
pub const CURL_DIAGNOSTIC: &str = "curl: (22) The requested URL returned error: 404";

/// convert stub's stderr line when it fails.
pub const CONVERT_DIAGNOSTIC: &str = "convert: no decode delegate";

/// curl stub: writes "jpg" to the path after `-o`; prints [`CURL_DIAGNOSTIC`] and exits 22 when any argument contains `fail_marker`.
fn curl_script(fail_marker: Option<&str>) -> String {
    let fail = fail_marker
        .map(|m| format!("case \"$*\" in *{m}*) echo '{CURL_DIAGNOSTIC}' >&2; exit 22;; esac\n"))
        .unwrap_or_default();
    format!(
        "#!/bin/sh\n{fail}out=\"\"\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"-o\" ]; then out=\"$2\"; shift; fi\n  shift\ndone\nprintf jpg > \"$out\"\n"
    )
}

/// wget stub: same as curl but destination follows `-O`.
fn wget_script() -> String {
    "#!/bin/sh\nout=\"\"\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"-O\" ]; then out=\"$2\"; shift; fi\n  shift\ndone\nprintf jpg > \"$out\"\n".to_string()
}

/// convert stub: writes "pdf" to its last argument, or exits with `exit_code` if non-zero.
fn convert_script(exit_code: i32) -> String {
    if exit_code == 0 {
        "#!/bin/sh\nfor last; do :; done\nprintf pdf > \"$last\"\n".to_string()
    } else {
        format!("#!/bin/sh\necho '{CONVERT_DIAGNOSTIC}' >&2\nexit {exit_code}\n")
    }
}

fn write_executable(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, body).expect("write stub");
    let mut perms = fs::metadata(&path).expect("stat stub").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub");
}

/// Temp workspace with a stub `bin` directory, an empty config home and an output path.
pub struct FakeTools {
    temp: TempDir,
}

impl FakeTools {
    /// Creates stubs; `fail_marker` makes curl fail for matching URLs, `convert_exit` sets the merge exit code.
    pub fn new(fail_marker: Option<&str>, convert_exit: i32) -> Self {
        let temp = TempDir::new().expect("temp dir");
        let bin = temp.path().join("bin");
        fs::create_dir(&bin).expect("bin dir");
        fs::create_dir(temp.path().join("config")).expect("config dir");
        write_executable(&bin, "curl", &curl_script(fail_marker));
        write_executable(&bin, "wget", &wget_script());
        write_executable(&bin, "convert", &convert_script(convert_exit));
        Self { temp }
    }

    /// `PATH` with the stub directory first.
    pub fn path_env(&self) -> OsString {
        let current = std::env::var_os("PATH").unwrap_or_default();
        let dirs = std::iter::once(self.temp.path().join("bin")).chain(std::env::split_paths(&current));
        std::env::join_paths(dirs).expect("join PATH")
    }

    /// Empty `XDG_CONFIG_HOME` so a developer's config file never leaks in.
    pub fn config_home(&self) -> PathBuf {
        self.temp.path().join("config")
    }

    /// Output folder for the batch (not created up front).
    pub fn output_dir(&self) -> PathBuf {
        self.temp.path().join("slides")
    }

    /// Writes a config file into the isolated config home.
    pub fn write_config(&self, body: &str) {
        let dir = self.config_home().join("slidegrab");
        fs::create_dir_all(&dir).expect("config subdir");
        fs::write(dir.join("config.toml"), body).expect("write config");
    }
}
