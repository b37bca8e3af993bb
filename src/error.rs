use std::{fmt, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline component that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Resolve,
    Render,
    Tokenize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Load => "load",
            Stage::Resolve => "resolve",
            Stage::Render => "render",
            Stage::Tokenize => "tokenize",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file '{}' not found", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("reading configuration '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing YAML '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("environment '{name}' not found (available: {})", available.join(", "))]
    EnvironmentNotFound { name: String, available: Vec<String> },

    #[error("environment '{name}' has no gost_command defined")]
    EmptyCommand { name: String },

    #[error("parsing template: {0}")]
    TemplateSyntax(String),

    #[error("executing template: {0}")]
    TemplateExecution(String),

    #[error("no arguments generated from template")]
    NoArgumentsGenerated,
}

impl Error {
    pub fn stage(&self) -> Stage {
        match self {
            Error::ConfigNotFound { .. } | Error::ConfigRead { .. } | Error::ConfigParse { .. } => {
                Stage::Load
            }
            Error::EnvironmentNotFound { .. } | Error::EmptyCommand { .. } => Stage::Resolve,
            Error::TemplateSyntax(_) | Error::TemplateExecution(_) => Stage::Render,
            Error::NoArgumentsGenerated => Stage::Tokenize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_available() {
        let err = Error::EnvironmentNotFound {
            name: "prod".into(),
            available: vec!["dev".into(), "staging".into()],
        };
        assert_eq!(
            err.to_string(),
            "environment 'prod' not found (available: dev, staging)"
        );
        assert_eq!(err.stage(), Stage::Resolve);
    }

    #[test]
    fn stages() {
        assert_eq!(Error::NoArgumentsGenerated.stage(), Stage::Tokenize);
        assert_eq!(Error::TemplateSyntax("x".into()).stage(), Stage::Render);
        let err = Error::ConfigNotFound {
            path: PathBuf::from("missing.yml"),
        };
        assert_eq!(err.stage(), Stage::Load);
        assert_eq!(err.to_string(), "configuration file 'missing.yml' not found");
    }
}
