//! Harness configuration.

use std::env;
use std::io::IsTerminal;

use clap::ValueEnum;
use isotest_core::Tally;

use crate::cli::ExitCode;

/// Default number of bytes of child output kept per case.
pub const DEFAULT_CAPTURE_LIMIT: usize = 512;

/// When to color the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal and `NO_COLOR` is not set
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn use_colors(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
        }
    }
}

/// How the process exit code reflects the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Exit 1 when any case failed or errored.
    #[default]
    FailOnProblems,
    /// Always exit 0; the summary is informational.
    AlwaysZero,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub capture_limit: usize,
    pub color: ColorMode,
    pub exit_policy: ExitPolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            capture_limit: DEFAULT_CAPTURE_LIMIT,
            color: ColorMode::default(),
            exit_policy: ExitPolicy::default(),
        }
    }
}

impl HarnessConfig {
    /// Process exit code for a finished run.
    pub fn exit_code_for(&self, tally: &Tally) -> ExitCode {
        match self.exit_policy {
            ExitPolicy::FailOnProblems if !tally.is_clean() => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.capture_limit, 512);
        assert_eq!(config.color, ColorMode::Auto);
        assert_eq!(config.exit_policy, ExitPolicy::FailOnProblems);
    }

    #[test]
    fn test_exit_code_policy() {
        let clean = Tally {
            passed: 3,
            ..Tally::default()
        };
        let broken = Tally {
            passed: 1,
            errored: 1,
            ..Tally::default()
        };

        let strict = HarnessConfig::default();
        assert_eq!(strict.exit_code_for(&clean), ExitCode::SUCCESS);
        assert_eq!(strict.exit_code_for(&broken), ExitCode::FAILURE);

        let lenient = HarnessConfig {
            exit_policy: ExitPolicy::AlwaysZero,
            ..HarnessConfig::default()
        };
        assert_eq!(lenient.exit_code_for(&broken), ExitCode::SUCCESS);
    }

    #[test]
    fn test_explicit_color_modes() {
        assert!(ColorMode::Always.use_colors());
        assert!(!ColorMode::Never.use_colors());
    }
}
