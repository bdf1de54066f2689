//! Platform-specific probing conventions.
//!
//! The locator and command builder never branch on `cfg` directly; they take
//! a [`Platform`] strategy chosen once at startup so that both families can
//! be exercised in tests.

/// Conventions that differ between the Windows and POSIX process families.
pub trait Platform: Send + Sync {
    /// File name of the JVM launcher binary inside a `bin` directory.
    fn executable_name(&self) -> &'static str;

    /// Shell utility that resolves a binary name against `PATH`.
    fn path_lookup_command(&self) -> &'static str;

    /// Separator between classpath entries.
    fn class_path_separator(&self) -> char;
}

/// Conventions for the Windows process family.
#[derive(Debug, Clone, Copy)]
pub struct Windows;

impl Platform for Windows {
    fn executable_name(&self) -> &'static str {
        "java.exe"
    }

    fn path_lookup_command(&self) -> &'static str {
        "where"
    }

    fn class_path_separator(&self) -> char {
        ';'
    }
}

/// Conventions for the POSIX process family.
#[derive(Debug, Clone, Copy)]
pub struct Posix;

impl Platform for Posix {
    fn executable_name(&self) -> &'static str {
        "java"
    }

    fn path_lookup_command(&self) -> &'static str {
        "which"
    }

    fn class_path_separator(&self) -> char {
        ':'
    }
}

/// Strategy for the platform family this binary was compiled for.
pub fn current() -> &'static dyn Platform {
    #[cfg(windows)]
    {
        &Windows
    }
    #[cfg(not(windows))]
    {
        &Posix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_disagree_on_every_convention() {
        assert_eq!(Windows.executable_name(), "java.exe");
        assert_eq!(Posix.executable_name(), "java");
        assert_eq!(Windows.path_lookup_command(), "where");
        assert_eq!(Posix.path_lookup_command(), "which");
        assert_eq!(Windows.class_path_separator(), ';');
        assert_eq!(Posix.class_path_separator(), ':');
    }
}
