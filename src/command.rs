//! Launch command assembly.
//!
//! [`CommandBuilder`] accumulates launch options through explicit appenders
//! and produces an immutable [`LaunchSpec`]. Building is a pure function of
//! accumulated state: no filesystem or process access, and identical inputs
//! always yield byte-identical output. Validation of paths and flags is the
//! caller's responsibility.

use crate::platform;

/// Accumulates JVM launch options in insertion order.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    executable: Option<String>,
    memory_options: Vec<String>,
    vm_flags: Vec<String>,
    xx_options: Vec<String>,
    add_opens: Vec<String>,
    properties: Vec<(String, String)>,
    class_path: Vec<String>,
    main_class: Option<String>,
    raw_args: Vec<String>,
    separator: char,
}

impl CommandBuilder {
    /// Creates a builder using the current platform's classpath separator.
    pub fn new() -> Self {
        Self::with_separator(platform::current().class_path_separator())
    }

    /// Creates a builder with an explicit classpath separator.
    pub fn with_separator(separator: char) -> Self {
        Self {
            executable: None,
            memory_options: Vec::new(),
            vm_flags: Vec::new(),
            xx_options: Vec::new(),
            add_opens: Vec::new(),
            properties: Vec::new(),
            class_path: Vec::new(),
            main_class: None,
            raw_args: Vec::new(),
            separator,
        }
    }

    /// Sets the JVM executable path.
    pub fn executable(&mut self, path: impl Into<String>) -> &mut Self {
        self.executable = Some(path.into());
        self
    }

    /// Appends an `-X` option, e.g. `x_option("mx", "4G")` yields `-Xmx4G`.
    pub fn x_option(&mut self, name: &str, value: &str) -> &mut Self {
        self.memory_options.push(format!("-X{name}{value}"));
        self
    }

    /// Appends a raw VM flag verbatim.
    pub fn vm_flag(&mut self, flag: impl Into<String>) -> &mut Self {
        self.vm_flags.push(flag.into());
        self
    }

    /// Appends a `-XX` boolean flag, e.g. `xx_flag("UseZGC", true)` yields
    /// `-XX:+UseZGC`.
    pub fn xx_flag(&mut self, name: &str, enabled: bool) -> &mut Self {
        let sign = if enabled { '+' } else { '-' };
        self.xx_options.push(format!("-XX:{sign}{name}"));
        self
    }

    /// Appends an `--add-opens` module spec. A bare `module/package` is
    /// expanded to `module/package=ALL-UNNAMED`.
    pub fn add_open(&mut self, module: &str) -> &mut Self {
        let spec = if module.contains('=') {
            module.to_string()
        } else {
            format!("{module}=ALL-UNNAMED")
        };
        self.add_opens.push(spec);
        self
    }

    /// Appends a system property, emitted as a single `-Dkey=value` token.
    pub fn property(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Appends a classpath entry. Order is significant: earlier entries take
    /// precedence, and a later entry may be a directory glob like `libs/*`.
    pub fn class_path(&mut self, entry: impl Into<String>) -> &mut Self {
        self.class_path.push(entry.into());
        self
    }

    /// Sets the fully qualified main class.
    pub fn main_class(&mut self, name: impl Into<String>) -> &mut Self {
        self.main_class = Some(name.into());
        self
    }

    /// Appends a trailing program argument.
    pub fn raw_arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.raw_args.push(arg.into());
        self
    }

    /// Assembles the ordered token vector.
    ///
    /// Token order is fixed: executable, memory options, VM flags, `-XX`
    /// options, add-opens pairs, properties, `-cp` plus the joined classpath,
    /// main class, trailing arguments.
    pub fn build(&self) -> LaunchSpec {
        let mut tokens = Vec::new();
        if let Some(executable) = &self.executable {
            tokens.push(executable.clone());
        }
        tokens.extend(self.memory_options.iter().cloned());
        tokens.extend(self.vm_flags.iter().cloned());
        tokens.extend(self.xx_options.iter().cloned());
        for spec in &self.add_opens {
            tokens.push("--add-opens".into());
            tokens.push(spec.clone());
        }
        for (key, value) in &self.properties {
            tokens.push(format!("-D{key}={value}"));
        }
        if !self.class_path.is_empty() {
            tokens.push("-cp".into());
            let mut joined = String::new();
            for (index, entry) in self.class_path.iter().enumerate() {
                if index > 0 {
                    joined.push(self.separator);
                }
                joined.push_str(entry);
            }
            tokens.push(joined);
        }
        if let Some(main_class) = &self.main_class {
            tokens.push(main_class.clone());
        }
        tokens.extend(self.raw_args.iter().cloned());
        LaunchSpec::from_tokens(tokens)
    }
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable, fully resolved description of a process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    tokens: Vec<String>,
}

impl LaunchSpec {
    /// Wraps a pre-assembled token vector.
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// The ordered argument vector, executable first.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Single-line rendering of the exact command, for dry-run display.
    pub fn command_line(&self) -> String {
        self.tokens.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_builder() -> CommandBuilder {
        let mut builder = CommandBuilder::with_separator(':');
        builder
            .executable("/opt/jdk/bin/java")
            .x_option("mx", "4G")
            .vm_flag("-Xshare:off")
            .xx_flag("UseZGC", true)
            .add_open("java.base/java.lang")
            .property("file.encoding", "UTF-8")
            .class_path("/a/app.jar")
            .class_path("/a/libs/*")
            .main_class("app.Main")
            .raw_arg("--nogui");
        builder
    }

    #[test]
    fn token_order_is_fixed() {
        let spec = sample_builder().build();
        assert_eq!(
            spec.tokens(),
            [
                "/opt/jdk/bin/java",
                "-Xmx4G",
                "-Xshare:off",
                "-XX:+UseZGC",
                "--add-opens",
                "java.base/java.lang=ALL-UNNAMED",
                "-Dfile.encoding=UTF-8",
                "-cp",
                "/a/app.jar:/a/libs/*",
                "app.Main",
                "--nogui",
            ]
        );
    }

    #[test]
    fn build_is_deterministic() {
        let builder = sample_builder();
        assert_eq!(builder.build(), builder.build());
        assert_eq!(builder.build().command_line(), builder.build().command_line());
    }

    #[test]
    fn classpath_precedes_main_class() {
        let mut builder = CommandBuilder::with_separator(':');
        builder
            .executable("java")
            .class_path("/a/app.jar")
            .class_path("/a/libs/*")
            .main_class("app.Main");
        let line = builder.build().command_line();
        assert!(line.ends_with("-cp /a/app.jar:/a/libs/* app.Main"));
    }

    #[test]
    fn windows_separator_joins_with_semicolon() {
        let mut builder = CommandBuilder::with_separator(';');
        builder.class_path("C:\\a\\app.jar").class_path("C:\\a\\libs\\*");
        let spec = builder.build();
        assert_eq!(spec.tokens()[1], "C:\\a\\app.jar;C:\\a\\libs\\*");
    }

    #[test]
    fn disabled_xx_flag_uses_minus_sign() {
        let mut builder = CommandBuilder::with_separator(':');
        builder.xx_flag("UseCompressedOops", false);
        assert_eq!(builder.build().tokens(), ["-XX:-UseCompressedOops"]);
    }

    #[test]
    fn qualified_add_open_kept_verbatim() {
        let mut builder = CommandBuilder::with_separator(':');
        builder.add_open("java.base/java.nio=ALL-UNNAMED");
        assert_eq!(
            builder.build().tokens(),
            ["--add-opens", "java.base/java.nio=ALL-UNNAMED"]
        );
    }

    #[test]
    fn properties_keep_insertion_order() {
        let mut builder = CommandBuilder::with_separator(':');
        builder
            .property("zeta", "1")
            .property("alpha", "2")
            .property("mid", "3");
        assert_eq!(
            builder.build().tokens(),
            ["-Dzeta=1", "-Dalpha=2", "-Dmid=3"]
        );
    }

    #[test]
    fn empty_builder_produces_no_classpath_flag() {
        let spec = CommandBuilder::with_separator(':').build();
        assert!(spec.tokens().is_empty());
        assert_eq!(spec.command_line(), "");
    }
}
