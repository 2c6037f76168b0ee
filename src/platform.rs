//! # Platform-specific utilities
//!
//! Centralizza i nomi dei comandi che cambiano tra sistemi operativi
//! (interprete Python per lo script di inferenza) e il controllo di
//! disponibilità dei comandi esterni.

use std::path::Path;
use std::sync::OnceLock;

/// Platform-specific command names
pub struct PlatformCommands {
    python: &'static str,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        if cfg!(windows) {
            Self {
                python: "python.exe",
                which_command: "where",
            }
        } else {
            Self {
                python: "python3",
                which_command: "which",
            }
        }
    }

    /// Default interpreter for the inference script
    pub fn python(&self) -> &'static str {
        self.python
    }

    /// Get the command used to check if a program exists
    pub fn which_command(&self) -> &'static str {
        self.which_command
    }

    /// Check if a program is runnable: an existing path, or a name found on PATH
    pub fn is_command_available(&self, program: &str) -> bool {
        if Path::new(program).components().count() > 1 {
            return Path::new(program).is_file();
        }

        match std::process::Command::new(self.which_command)
            .arg(program)
            .output()
        {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }
}
