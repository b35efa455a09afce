//! Command line of the `void_editor` binary.

use std::path::PathBuf;

use crate::error::{EditorError, EditorResult};

pub const USAGE: &str = "usage: void_editor <project-dir> [--import] [--watch]";

/// Parsed command line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub project: PathBuf,
    /// Import every dirty asset after the initial scan
    pub import: bool,
    /// Keep running and rescan on file-system changes
    pub watch: bool,
    pub help: bool,
}

impl CliArgs {
    /// Parse arguments, program name excluded
    pub fn parse<I, S>(args: I) -> EditorResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = CliArgs::default();
        let mut project = None;

        for arg in args.into_iter().map(Into::into) {
            match arg.as_str() {
                "--import" | "-i" => parsed.import = true,
                "--watch" | "-w" => parsed.watch = true,
                "--help" | "-h" => parsed.help = true,
                flag if flag.starts_with('-') => {
                    return Err(EditorError::Usage(format!("unknown option {}\n{}", flag, USAGE)));
                }
                _ if project.is_some() => {
                    return Err(EditorError::Usage(format!("unexpected argument {}\n{}", arg, USAGE)));
                }
                _ => project = Some(PathBuf::from(arg)),
            }
        }

        match project {
            Some(project) => parsed.project = project,
            None if parsed.help => {}
            None => return Err(EditorError::Usage(USAGE.to_string())),
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let args = CliArgs::parse(["MyGame", "--watch", "-i"]).unwrap();
        assert_eq!(args.project, PathBuf::from("MyGame"));
        assert!(args.import);
        assert!(args.watch);

        assert!(CliArgs::parse(["-h"]).unwrap().help);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(CliArgs::parse(Vec::<String>::new()), Err(EditorError::Usage(_))));
        assert!(matches!(CliArgs::parse(["a", "b"]), Err(EditorError::Usage(_))));
        assert!(matches!(CliArgs::parse(["a", "--fast"]), Err(EditorError::Usage(_))));
    }
}
