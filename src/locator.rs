//! JVM runtime discovery and ranking.
//!
//! Discovery merges every source (cache directory, environment variables,
//! `PATH` lookup, configured extra paths) rather than short-circuiting, then
//! verifies each surviving executable with a bounded `-version` probe.
//! External probes that hang past their deadline count as "no result", never
//! as fatal errors.

use std::{
    collections::HashSet,
    env, fs,
    io::Read,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use regex::Regex;
use tracing::{debug, trace};

use crate::platform::{self, Platform};

/// Bounded wait applied to `-version` and `which`/`where` probes.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Poll interval while waiting on a probe process.
const PROBE_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Environment variable name fragments that mark a JVM installation.
const ENV_NAME_TOKENS: [&str; 4] = ["JAVA", "GRAAL", "JDK", "JRE"];

/// Placeholder for candidates whose `-version` output was unparsable.
const UNKNOWN: &str = "Unknown";

/// A discovered executable that may be a valid host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCandidate {
    /// Absolute path to the `java` binary; the candidate's identity.
    pub executable: PathBuf,
    /// Normalized major version, e.g. `17` or `21`; legacy `1.x` collapses
    /// to `x`.
    pub major_version: String,
    /// Raw version token as reported by the runtime.
    pub full_version: String,
    /// Free-form vendor description, used for preference matching.
    pub vendor: String,
}

impl RuntimeCandidate {
    fn unknown(executable: PathBuf) -> Self {
        Self {
            executable,
            major_version: UNKNOWN.into(),
            full_version: UNKNOWN.into(),
            vendor: UNKNOWN.into(),
        }
    }
}

/// Parsed result of a successful `-version` probe.
#[derive(Debug, Clone, PartialEq, Eq)]
struct VersionInfo {
    major: String,
    full: String,
    vendor: String,
}

/// Discovers and ranks JVM installations on the host.
pub struct RuntimeLocator {
    cache_dir: PathBuf,
    extra_paths: Vec<PathBuf>,
    required_major: Option<String>,
    prefer_vendor: Option<String>,
    platform: &'static dyn Platform,
}

impl RuntimeLocator {
    /// Creates a locator probing `cache_dir/*/bin` among its sources.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            extra_paths: Vec::new(),
            required_major: None,
            prefer_vendor: None,
            platform: platform::current(),
        }
    }

    /// Drops candidates whose parsed major version does not match.
    pub fn required_major(mut self, version: Option<String>) -> Self {
        self.required_major = version;
        self
    }

    /// Moves candidates whose vendor contains `vendor` to the front.
    pub fn prefer_vendor(mut self, vendor: Option<String>) -> Self {
        self.prefer_vendor = vendor;
        self
    }

    /// Adds configured JVM installation directories to the probe set.
    pub fn search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.extra_paths = paths;
        self
    }

    /// Runs every discovery source, probes the survivors, and returns the
    /// ranked candidate list. An empty result means no usable runtime.
    pub fn discover(&self) -> Vec<RuntimeCandidate> {
        let mut bin_dirs = Vec::new();
        self.collect_cached(&mut bin_dirs);
        self.collect_env(&mut bin_dirs);
        self.collect_path_lookup(&mut bin_dirs);
        for root in &self.extra_paths {
            self.push_runtime_root(root, &mut bin_dirs);
        }

        let mut candidates = Vec::new();
        for dir in bin_dirs {
            let executable = dir.join(self.platform.executable_name());
            if !executable.is_file() {
                continue;
            }
            match self.probe(&executable) {
                Some(info) => {
                    if let Some(required) = &self.required_major
                        && info.major != *required
                    {
                        debug!(
                            "skipping {} (major {} != required {required})",
                            executable.display(),
                            info.major
                        );
                        continue;
                    }
                    candidates.push(RuntimeCandidate {
                        executable,
                        major_version: info.major,
                        full_version: info.full,
                        vendor: info.vendor,
                    });
                }
                // An unparsable runtime is still a runtime; only a version
                // requirement justifies dropping it.
                None if self.required_major.is_none() => {
                    debug!(
                        "version probe failed for {}; keeping with unknown metadata",
                        executable.display()
                    );
                    candidates.push(RuntimeCandidate::unknown(executable));
                }
                None => {
                    debug!(
                        "version probe failed for {}; dropping under version filter",
                        executable.display()
                    );
                }
            }
        }

        let mut candidates = dedup_candidates(candidates);
        rank_candidates(&mut candidates, self.prefer_vendor.as_deref());
        candidates
    }

    /// Source 1: `<cache_dir>/*/bin` for every immediate subdirectory.
    fn collect_cached(&self, out: &mut Vec<PathBuf>) {
        let Ok(entries) = fs::read_dir(&self.cache_dir) else {
            return;
        };
        for entry in entries.flatten() {
            let bin_dir = entry.path().join("bin");
            if self.is_runtime_bin_dir(&bin_dir) {
                out.push(bin_dir);
            }
        }
    }

    /// Source 2: environment variables whose names mention a JVM.
    fn collect_env(&self, out: &mut Vec<PathBuf>) {
        for (key, value) in env::vars_os() {
            let Some(key) = key.to_str() else { continue };
            if !env_name_matches(key) {
                continue;
            }
            self.push_runtime_root(&PathBuf::from(value), out);
        }
    }

    /// Source 3: `which java` / `where java` with a bounded wait.
    fn collect_path_lookup(&self, out: &mut Vec<PathBuf>) {
        let mut command = Command::new(self.platform.path_lookup_command());
        command.arg(self.platform.executable_name());
        let Some(output) = run_with_timeout(&mut command, PROBE_TIMEOUT) else {
            trace!("PATH lookup produced no result");
            return;
        };
        for line in output.lines() {
            let line = line.trim();
            if !line.contains(self.platform.executable_name()) {
                continue;
            }
            if let Some(parent) = Path::new(line).parent()
                && self.is_runtime_bin_dir(parent)
            {
                out.push(parent.to_path_buf());
            }
        }
    }

    /// Accepts a directory either holding the executable directly or through
    /// a `bin` subdirectory.
    fn push_runtime_root(&self, root: &Path, out: &mut Vec<PathBuf>) {
        if self.is_runtime_bin_dir(root) {
            out.push(root.to_path_buf());
        } else {
            let bin_dir = root.join("bin");
            if self.is_runtime_bin_dir(&bin_dir) {
                out.push(bin_dir);
            }
        }
    }

    fn is_runtime_bin_dir(&self, dir: &Path) -> bool {
        dir.join(self.platform.executable_name()).is_file()
    }

    /// Runs `<executable> -version` and parses the combined output.
    fn probe(&self, executable: &Path) -> Option<VersionInfo> {
        let mut command = Command::new(executable);
        command.arg("-version");
        let output = run_with_timeout(&mut command, PROBE_TIMEOUT)?;
        parse_probe_output(&output)
    }
}

/// True when an environment variable name refers to a JVM installation.
fn env_name_matches(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    ENV_NAME_TOKENS.iter().any(|token| upper.contains(token))
}

/// Parses combined `-version` output. Both a version token and a vendor line
/// must be present; anything less counts as a probe failure.
fn parse_probe_output(text: &str) -> Option<VersionInfo> {
    let mut full = None;
    let mut vendor = None;
    for line in text.lines() {
        if full.is_none() && line.contains("version") {
            full = extract_quoted_version(line);
        } else if vendor.is_none() && (line.contains("Server VM") || line.contains("Runtime")) {
            vendor = Some(vendor_description(line));
        }
    }
    let full = full?;
    let vendor = vendor?;
    Some(VersionInfo {
        major: major_component(&full),
        full,
        vendor,
    })
}

/// Pulls the quoted version token out of a line like
/// `openjdk version "17.0.2" 2022-01-18`.
fn extract_quoted_version(line: &str) -> Option<String> {
    let quoted = Regex::new(r#""([^"]+)""#).unwrap();
    quoted
        .captures(line)
        .map(|caps| caps[1].to_string())
}

/// Major component of a full version string. A leading `1` component is the
/// legacy scheme (`1.8.0_301` means Java 8); an `-internal` suffix is
/// stripped.
fn major_component(full: &str) -> String {
    let mut parts = full.split('.');
    let first = parts.next().unwrap_or(full);
    let major = if first == "1" {
        parts.next().unwrap_or(first)
    } else {
        first
    };
    major.replace("-internal", "")
}

/// Vendor description from a line like
/// `OpenJDK 64-Bit Server VM (build 17.0.2+8, mixed mode)`, truncated before
/// the build suffix.
fn vendor_description(line: &str) -> String {
    match line.rfind(" (build") {
        Some(index) => line[..index].to_string(),
        None => line.to_string(),
    }
}

/// Removes duplicate candidates by canonical executable path, keeping the
/// first occurrence.
fn dedup_candidates(candidates: Vec<RuntimeCandidate>) -> Vec<RuntimeCandidate> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for candidate in candidates {
        let canonical = fs::canonicalize(&candidate.executable)
            .unwrap_or_else(|_| candidate.executable.clone());
        if seen.insert(canonical) {
            out.push(candidate);
        }
    }
    out
}

/// Stable sort ascending by major version, unknowns last; then a stable
/// partition that moves preferred-vendor candidates to the front.
fn rank_candidates(candidates: &mut [RuntimeCandidate], prefer_vendor: Option<&str>) {
    candidates.sort_by_key(|candidate| major_sort_key(&candidate.major_version));
    if let Some(prefer) = prefer_vendor {
        candidates.sort_by_key(|candidate| !candidate.vendor.contains(prefer));
    }
}

fn major_sort_key(major: &str) -> u64 {
    major.parse().unwrap_or(u64::MAX)
}

/// Spawns a probe process and collects its combined stdout/stderr, killing
/// it once the deadline passes. `None` means "no result from this probe".
fn run_with_timeout(command: &mut Command, timeout: Duration) -> Option<String> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn().ok()?;
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(_)) => break,
            Ok(None) => {
                if Instant::now() >= deadline {
                    trace!("probe exceeded {timeout:?}; discarding");
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                thread::sleep(PROBE_POLL_INTERVAL);
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }
    let mut text = String::new();
    if let Some(mut stdout) = child.stdout.take() {
        let _ = stdout.read_to_string(&mut text);
    }
    if let Some(mut stderr) = child.stderr.take() {
        let _ = stderr.read_to_string(&mut text);
    }
    Some(text)
}
