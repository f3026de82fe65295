//! CLI failures and their exit codes

use std::io;
use std::path::PathBuf;

use django_codegen::error::{ArtifactError, ErrorClass, FieldError, GenerateError, MergeError, SpecificationError};
use thiserror::Error;

/// Exit code of an interactive cancellation (128 + SIGINT)
pub const CANCELLED: i32 = 130;

/// Failures raised by the CLI itself
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded
    #[error("failed to load configuration for {}: {message}", project.display())]
    Config {
        /// Project directory
        project: PathBuf,
        /// Loader message
        message: String,
    },

    /// The user aborted a prompt or declined the changes
    #[error("cancelled, nothing was written")]
    Cancelled,

    /// Input is needed but stdin is not a terminal
    #[error("{what} is required when not running in a terminal")]
    NotInteractive {
        /// What was missing
        what: &'static str,
    },
}

impl CliError {
    /// Process exit code
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => ErrorClass::Io.exit_code(),
            Self::Cancelled => CANCELLED,
            Self::NotInteractive { .. } => ErrorClass::Specification.exit_code(),
        }
    }
}

/// Exit code for a failed command
///
/// The first error in the chain with a known class decides; anything
/// unrecognized is an internal failure.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<CliError>() {
            return err.exit_code();
        }
        if cause.is::<SpecificationError>() || cause.is::<FieldError>() {
            return ErrorClass::Specification.exit_code();
        }
        if let Some(err) = cause.downcast_ref::<GenerateError>() {
            return err.class().exit_code();
        }
        if let Some(err) = cause.downcast_ref::<ArtifactError>() {
            return err.class().exit_code();
        }
        if let Some(err) = cause.downcast_ref::<MergeError>() {
            return err.class().exit_code();
        }
        if cause.is::<io::Error>() {
            return ErrorClass::Io.exit_code();
        }
    }
    ErrorClass::Internal.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use django_codegen::scaffold::Container;

    #[test]
    fn test_specification_errors_exit_with_2() {
        let err = anyhow::Error::new(SpecificationError::EmptyEntity {
            name: "Blog".to_string(),
        });
        assert_eq!(exit_code(&err), 2);

        let wrapped = anyhow::Error::new(GenerateError::from(SpecificationError::InvalidEntityName {
            name: "1blog".to_string(),
        }));
        assert_eq!(exit_code(&wrapped), 2);
    }

    #[test]
    fn test_merge_errors_exit_with_3() {
        let err = anyhow::Error::new(MergeError::ConflictingDeclaration {
            name: "title".to_string(),
            container: Container::ClassBody("Blog".to_string()),
        });
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_io_errors_are_found_behind_context() {
        let result: Result<(), io::Error> = Err(io::Error::other("terminal gone"));
        let err = result.context("failed to read answer").unwrap_err();
        assert_eq!(exit_code(&err), 4);
    }

    #[test]
    fn test_cli_errors() {
        assert_eq!(exit_code(&anyhow::Error::new(CliError::Cancelled)), 130);
        let config = CliError::Config {
            project: PathBuf::from("site"),
            message: "invalid type".to_string(),
        };
        assert_eq!(exit_code(&anyhow::Error::new(config)), 4);
        assert_eq!(
            exit_code(&anyhow::Error::new(CliError::NotInteractive { what: "a model name" })),
            2
        );
    }

    #[test]
    fn test_unknown_errors_are_internal() {
        assert_eq!(exit_code(&anyhow::anyhow!("something odd")), 1);
    }
}
