#![allow(dead_code)]

use std::{fs, path::Path};

/// Writes a fake JVM installation under `home/bin/java` that answers the
/// `-version` probe with the given version and vendor, then exits cleanly
/// when launched as the server.
#[cfg(unix)]
pub fn write_fake_jvm(home: &Path, full_version: &str, vendor: &str) {
    use std::os::unix::fs::PermissionsExt;

    let bin_dir = home.join("bin");
    fs::create_dir_all(&bin_dir).unwrap();
    let script = format!(
        "#!/bin/sh\n\
         echo 'openjdk version \"{full_version}\" 2025-01-01' >&2\n\
         echo '{vendor} Runtime Environment (build {full_version}+7)' >&2\n\
         exit 0\n"
    );
    let java = bin_dir.join("java");
    fs::write(&java, script).unwrap();
    fs::set_permissions(&java, fs::Permissions::from_mode(0o755)).unwrap();
}
