//! Process supervision with restart and stdin bridging.
//!
//! The primary thread blocks on child completion; the stdin bridge runs on
//! its own worker driven by a stop channel, so no two poll iterations ever
//! overlap and the worker winds down as soon as the child is gone.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{ChildStdin, Command, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant, SystemTime},
};

use crossterm::event::{self, Event, KeyCode};
use strum_macros::AsRefStr;
use tracing::{debug, error, info, warn};

use crate::{command::LaunchSpec, error::LauncherError};

/// Interval between stdin-bridge polls.
const BRIDGE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Window during which an operator may suppress the next restart.
const RESTART_PROMPT_WINDOW: Duration = Duration::from_secs(10);

/// Granularity of the keyboard poll inside the restart countdown.
const PROMPT_POLL_SLICE: Duration = Duration::from_millis(250);

/// Lifecycle of a supervised launch.
#[derive(AsRefStr, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupervisorState {
    /// No launch attempted yet.
    Idle,
    /// Spawn in progress.
    Starting,
    /// Child process alive.
    Running,
    /// Child exited with code zero.
    ExitedClean,
    /// Child exited with a non-zero code or a spawn failure occurred.
    ExitedCrashed,
    /// Countdown elapsed; relaunching.
    Restarting,
    /// Supervision finished; no further launches.
    Terminal,
}

/// Spawns the process described by a [`LaunchSpec`], bridges a file-based
/// input channel into it, and relaunches it according to the restart policy.
pub struct Supervisor {
    spec: LaunchSpec,
    bridge_file: Option<PathBuf>,
    restart: bool,
    state: SupervisorState,
    restart_count: u32,
    stop_requested: Arc<AtomicBool>,
}

impl Supervisor {
    /// Creates a supervisor for the given launch description.
    pub fn new(spec: LaunchSpec, bridge_file: Option<PathBuf>, restart: bool) -> Self {
        Self {
            spec,
            bridge_file,
            restart,
            state: SupervisorState::Idle,
            restart_count: 0,
            stop_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag that suppresses further restarts once set. Wired to the
    /// Ctrl-C handler by the binary.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_requested)
    }

    /// Number of relaunches performed so far.
    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Spawns the child once, bridges stdin if configured, and blocks until
    /// it terminates. Returns the child's exit code; a spawn failure is an
    /// error and is never retried here.
    pub fn launch_once(&mut self) -> Result<i32, LauncherError> {
        self.transition(SupervisorState::Starting);
        let (executable, args) = match self.spec.tokens().split_first() {
            Some((executable, args)) => (executable.clone(), args.to_vec()),
            None => {
                return Err(LauncherError::SpawnError {
                    executable: String::new(),
                    source: io::Error::new(io::ErrorKind::InvalidInput, "empty launch command"),
                });
            }
        };

        let bridge_path = self.usable_bridge_file();
        let mut command = Command::new(&executable);
        command.args(&args);
        // In bridge mode the child's stdin comes from the bridge, not the
        // controlling terminal; stdout/stderr stay inherited either way.
        if bridge_path.is_some() {
            command.stdin(Stdio::piped());
        }

        let mut child = command.spawn().map_err(|source| {
            self.transition(SupervisorState::ExitedCrashed);
            LauncherError::SpawnError {
                executable: executable.clone(),
                source,
            }
        })?;
        info!(pid = child.id(), "server process started");
        self.transition(SupervisorState::Running);

        let child_alive = Arc::new(AtomicBool::new(true));
        let bridge = match (bridge_path, child.stdin.take()) {
            (Some(path), Some(stdin)) => {
                Some(StdinBridge::start(path, stdin, Arc::clone(&child_alive)))
            }
            _ => None,
        };

        let wait_result = child.wait();
        child_alive.store(false, Ordering::SeqCst);
        if let Some(bridge) = bridge {
            bridge.stop();
        }

        let status = wait_result.map_err(LauncherError::WaitError)?;
        let code = status.code().unwrap_or_else(|| {
            warn!("child terminated without an exit code; reporting 1");
            1
        });
        self.transition(if code == 0 {
            SupervisorState::ExitedClean
        } else {
            SupervisorState::ExitedCrashed
        });
        Ok(code)
    }

    /// Runs the restart loop and returns the final exit code.
    ///
    /// With restart disabled this is a single [`Self::launch_once`]. With it
    /// enabled, every exit opens an interruptible countdown; the loop has no
    /// backoff and no attempt bound, so only the operator (or an external
    /// signal) ends it.
    pub fn supervise(&mut self) -> i32 {
        let mut code = self.attempt();
        if !self.restart {
            self.transition(SupervisorState::Terminal);
            return code;
        }
        loop {
            if self.stop_requested.load(Ordering::SeqCst) {
                info!("stop requested; not restarting");
                self.transition(SupervisorState::Terminal);
                return code;
            }
            if operator_aborted_restart(RESTART_PROMPT_WINDOW, &self.stop_requested) {
                info!("restart suppressed by operator");
                self.transition(SupervisorState::Terminal);
                return code;
            }
            self.restart_count += 1;
            self.transition(SupervisorState::Restarting);
            info!(attempt = self.restart_count, "relaunching server");
            code = self.attempt();
        }
    }

    fn attempt(&mut self) -> i32 {
        match self.launch_once() {
            Ok(code) => {
                info!(code, "server exited");
                code
            }
            Err(err) => {
                error!("launch failed: {err}");
                err.exit_code()
            }
        }
    }

    /// The bridge only engages for an existing regular file that is both
    /// readable and writable.
    fn usable_bridge_file(&self) -> Option<PathBuf> {
        let path = self.bridge_file.as_ref()?;
        if !path.is_file() {
            debug!("bridge file {} is not a regular file; skipping", path.display());
            return None;
        }
        match fs::OpenOptions::new().read(true).write(true).open(path) {
            Ok(_) => Some(path.clone()),
            Err(err) => {
                debug!("bridge file {} not usable: {err}", path.display());
                None
            }
        }
    }

    fn transition(&mut self, next: SupervisorState) {
        if self.state != next {
            debug!(from = self.state.as_ref(), to = next.as_ref(), "state change");
            self.state = next;
        }
    }
}

/// Worker that polls the bridge file and forwards new content to the child's
/// stdin. Owns the pipe for the lifetime of bridging.
struct StdinBridge {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl StdinBridge {
    fn start(path: PathBuf, sink: ChildStdin, child_alive: Arc<AtomicBool>) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::spawn(move || bridge_loop(&path, sink, &child_alive, &stop_rx));
        Self { stop_tx, handle }
    }

    fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.join();
    }
}

/// Fixed-rate poll driven by `recv_timeout`, so an iteration always finishes
/// before the next fires.
fn bridge_loop(
    path: &Path,
    mut sink: ChildStdin,
    child_alive: &AtomicBool,
    stop_rx: &Receiver<()>,
) {
    let mut last_seen: Option<SystemTime> = None;
    loop {
        match stop_rx.recv_timeout(BRIDGE_POLL_INTERVAL) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
        if !child_alive.load(Ordering::SeqCst) {
            break;
        }
        // A failed iteration must not kill the loop; the next tick retries.
        if let Err(err) = forward_pending(path, &mut sink, &mut last_seen) {
            debug!("stdin bridge poll failed: {err}");
        }
    }
    debug!("stdin bridge stopped");
}

/// Forwards the bridge file to `sink` when its mtime moved past the last
/// forwarded state. The file is truncated only after a successful
/// write-and-flush, so a crash in between causes at most one duplicate
/// forward on the next run, never lost input.
fn forward_pending(
    path: &Path,
    sink: &mut impl Write,
    last_seen: &mut Option<SystemTime>,
) -> io::Result<()> {
    let modified = fs::metadata(path)?.modified()?;
    if let Some(seen) = *last_seen
        && modified <= seen
    {
        return Ok(());
    }
    let content = fs::read(path)?;
    if !content.is_empty() {
        sink.write_all(&content)?;
        sink.flush()?;
        debug!(bytes = content.len(), "forwarded bridge input");
    }
    fs::write(path, b"")?;
    *last_seen = Some(fs::metadata(path)?.modified()?);
    Ok(())
}

/// Counts down `window`, returning `true` if the operator pressed Enter (or
/// a stop was requested) before it elapsed. Without a terminal the countdown
/// degrades to a plain timed wait.
fn operator_aborted_restart(window: Duration, stop_requested: &AtomicBool) -> bool {
    println!(
        "Server stopped. Restarting in {}s; press Enter to keep it down.",
        window.as_secs()
    );
    let deadline = Instant::now() + window;
    loop {
        if stop_requested.load(Ordering::SeqCst) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        let slice = (deadline - now).min(PROMPT_POLL_SLICE);
        match event::poll(slice) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.code == KeyCode::Enter => return true,
                Ok(_) => {}
                Err(err) => {
                    debug!("countdown read failed: {err}");
                    thread::sleep(slice);
                }
            },
            Ok(false) => {}
            Err(err) => {
                debug!("no terminal for countdown ({err}); waiting out the window");
                thread::sleep(slice);
            }
        }
    }
}
