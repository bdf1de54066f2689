use std::{
    env, fs,
    path::{MAIN_SEPARATOR, Path, PathBuf},
    process::exit,
    sync::atomic::Ordering,
};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use javelin::{
    cli::{Cli, Commands, parse_args},
    command::CommandBuilder,
    config::{Config, load_config},
    error::LauncherError,
    locator::{RuntimeCandidate, RuntimeLocator},
    supervisor::Supervisor,
};

/// Subdirectory of the launcher's own directory probed for cached JVMs.
const RUNTIME_CACHE_SUBDIR: &str = "java";

/// `-XX` flags enabled for every launch.
const DEFAULT_XX_OPTIONS: [&str; 3] = ["UseZGC", "ZGenerational", "UseStringDeduplication"];

/// Modules opened for every launch.
const DEFAULT_ADD_OPENS: [&str; 3] = [
    "java.base/java.lang",
    "java.base/java.io",
    "java.base/java.net",
];

/// System properties set for every launch.
const DEFAULT_PROPERTIES: [(&str, &str); 3] = [
    ("file.encoding", "UTF-8"),
    ("jansi.passthrough", "true"),
    ("terminal.ansi", "true"),
];

fn main() {
    let args = parse_args();
    init_logging(&args);

    let result = match args.command {
        Commands::Start {
            config,
            generate_only,
            restart,
            stdin,
        } => run_start(config.as_deref(), generate_only, restart, stdin),
        Commands::Locate {
            config,
            version,
            prefer,
        } => run_locate(config.as_deref(), version, prefer),
    };

    match result {
        Ok(code) => exit(code),
        Err(err) => {
            error!("{err}");
            exit(err.exit_code());
        }
    }
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Directory holding the launcher binary; the runtime cache lives next to it.
fn program_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn build_locator(
    config: &Config,
    required: Option<String>,
    prefer: Option<String>,
) -> RuntimeLocator {
    let prefer = prefer.or_else(|| {
        let preferred = config.runtime.preferred.trim();
        (!preferred.is_empty()).then(|| preferred.to_string())
    });
    RuntimeLocator::new(program_dir().join(RUNTIME_CACHE_SUBDIR))
        .required_major(required)
        .prefer_vendor(prefer)
        .search_paths(config.runtime.paths.iter().map(PathBuf::from).collect())
}

fn run_start(
    config_path: Option<&str>,
    generate_only: bool,
    restart_flag: bool,
    stdin_override: Option<String>,
) -> Result<i32, LauncherError> {
    let config = load_config(config_path)?;

    let required = config.runtime.version.clone();
    let candidates = build_locator(&config, required.clone(), None).discover();
    let Some(runtime) = candidates.first() else {
        return Err(LauncherError::NoRuntime { required });
    };
    info!(
        vendor = %runtime.vendor,
        version = %runtime.full_version,
        "using JVM at {}",
        runtime.executable.display()
    );

    let app_jar = PathBuf::from(&config.launch.app_jar);
    if !app_jar.is_file() {
        return Err(LauncherError::MissingAppJar { path: app_jar });
    }

    let main_class = config
        .launch
        .main_class
        .clone()
        .ok_or(LauncherError::MissingMainClass)?;

    let mut builder = CommandBuilder::new();
    builder.executable(runtime.executable.to_string_lossy().into_owned());
    if let Some(memory) = &config.launch.min_memory {
        builder.x_option("ms", memory);
    }
    if let Some(memory) = &config.launch.max_memory {
        builder.x_option("mx", memory);
    }
    for flag in &config.launch.vm_options {
        builder.vm_flag(flag.clone());
    }
    for name in DEFAULT_XX_OPTIONS {
        builder.xx_flag(name, true);
    }
    for name in &config.launch.xx_options {
        builder.xx_flag(name, true);
    }
    for module in DEFAULT_ADD_OPENS {
        builder.add_open(module);
    }
    for module in &config.launch.add_opens {
        builder.add_open(module);
    }
    for (key, value) in DEFAULT_PROPERTIES {
        builder.property(key, value);
    }
    for entry in &config.launch.properties {
        match entry.split_once('=') {
            Some((key, value)) => {
                builder.property(key, value);
            }
            None => warn!("ignoring malformed property entry '{entry}'"),
        }
    }
    builder.property("javelin.version", env!("CARGO_PKG_VERSION"));

    builder.class_path(config.launch.app_jar.clone());
    if let Some(lib_dir) = &config.launch.lib_dir {
        let dir = PathBuf::from(lib_dir);
        if !has_jars(&dir) {
            return Err(LauncherError::MissingLibraries { path: dir });
        }
        builder.class_path(format!("{lib_dir}{MAIN_SEPARATOR}*"));
    }
    builder.main_class(main_class);
    for arg in &config.launch.args {
        builder.raw_arg(arg.clone());
    }

    let spec = builder.build();
    if generate_only {
        println!("{}", spec.command_line());
        return Ok(0);
    }

    let restart = restart_flag || config.supervise.auto_restart;
    let bridge = stdin_override
        .or_else(|| config.supervise.stdin_file.clone())
        .map(PathBuf::from);
    let mut supervisor = Supervisor::new(spec, bridge, restart);

    // Ctrl-C reaches the child through the shared foreground process group;
    // the launcher itself only records the stop so the restart loop winds
    // down instead of relaunching.
    let stop = supervisor.stop_flag();
    if let Err(err) = ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    }) {
        warn!("failed to install Ctrl-C handler: {err}");
    }

    Ok(supervisor.supervise())
}

fn run_locate(
    config_path: Option<&str>,
    version: Option<String>,
    prefer: Option<String>,
) -> Result<i32, LauncherError> {
    let config = load_config(config_path)?;
    // Unlike `start`, a bare `locate` lists everything; the config's
    // required version only applies when asked for explicitly.
    let candidates = build_locator(&config, version.clone(), prefer).discover();
    if candidates.is_empty() {
        return Err(LauncherError::NoRuntime { required: version });
    }

    print_candidates(&candidates);
    Ok(0)
}

fn print_candidates(candidates: &[RuntimeCandidate]) {
    println!("{:<8} {:<16} {:<48} PATH", "MAJOR", "VERSION", "VENDOR");
    for candidate in candidates {
        println!(
            "{:<8} {:<16} {:<48} {}",
            candidate.major_version,
            candidate.full_version,
            candidate.vendor,
            candidate.executable.display()
        );
    }
}

fn has_jars(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry
            .path()
            .extension()
            .is_some_and(|extension| extension == "jar")
    })
}
