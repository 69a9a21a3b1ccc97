//! Stand-in compressor binaries for exercising the subprocess path
//!
//! The scripts follow xz's file contract (`xz FILE` leaves `FILE.xz`,
//! `xz -d FILE.xz` leaves `FILE`) without compressing anything, so the
//! pipeline can be tested on machines that have no xz installed. Every
//! invocation is appended to `invocations.log` next to the script.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// File the fake compressor logs its argument lists to
pub const INVOCATION_LOG: &str = "invocations.log";

#[cfg(unix)]
const FAKE_XZ: &str = r#"#!/bin/sh
log="$(dirname "$0")/invocations.log"
echo "$*" >> "$log"
if [ "$1" = "-d" ]; then
    shift
    keep=""
    if [ "$1" = "--keep" ]; then keep=1; shift; fi
    in="$1"
    case "$in" in
        *.txz) out="${in%.txz}.tar" ;;
        *.xz) out="${in%.xz}" ;;
        *) echo "fake-xz: $in: unknown suffix" >&2; exit 1 ;;
    esac
    if [ -e "$out" ]; then echo "fake-xz: $out exists" >&2; exit 1; fi
    if [ -n "$keep" ]; then cp "$in" "$out"; else mv "$in" "$out"; fi
else
    case "$1" in -[0-9]) shift ;; esac
    if [ -e "$1.xz" ]; then echo "fake-xz: $1.xz exists" >&2; exit 1; fi
    mv "$1" "$1.xz"
fi
"#;

/// Writes a script that behaves like `xz` on the filesystem. Returns its path.
#[cfg(unix)]
pub fn write_fake_compressor(dir: &Path) -> Result<PathBuf> {
    write_script(dir, "fake-xz", FAKE_XZ)
}

/// Writes a script that always exits with `code`. Returns its path.
#[cfg(unix)]
pub fn write_failing_compressor(dir: &Path, code: i32) -> Result<PathBuf> {
    let body = format!("#!/bin/sh\necho \"$*\" >> \"$(dirname \"$0\")/{INVOCATION_LOG}\"\nexit {code}\n");
    write_script(dir, "failing-xz", &body)
}

/// Argument lists the fake compressors in `dir` were called with, in order
pub fn read_invocations(dir: &Path) -> Result<Vec<String>> {
    let log = dir.join(INVOCATION_LOG);
    if !log.exists() {
        return Ok(Vec::new());
    }
    Ok(std::fs::read_to_string(log)?
        .lines()
        .map(str::to_string)
        .collect())
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, body)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}
