use clap::Parser;

/// Arguments for the build command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Build the orig tarball and the package:\n    gdeb build\n\n\
                   Pass options to the builder (debuild by default):\n    gdeb build -- -us -uc\n\n\
                   Replace an existing orig tarball first:\n    gdeb build --overwrite -- -b")]
pub struct BuildArgs {
    /// Replace an existing orig tarball instead of failing
    #[arg(long)]
    pub overwrite: bool,

    /// Arguments passed on to the builder
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::super::{Cli, Commands};
    use clap::Parser;

    fn parse(argv: &[&str]) -> super::BuildArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Build(args) => args,
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parsing_build_no_args() {
        let args = parse(&["gdeb", "build"]);
        assert!(!args.overwrite);
        assert!(args.args.is_empty());
    }

    #[test]
    fn test_cli_parsing_build_forwarded_args() {
        let args = parse(&["gdeb", "build", "--", "-us", "-uc"]);
        assert_eq!(args.args, vec!["-us", "-uc"]);
    }

    #[test]
    fn test_cli_parsing_build_overwrite_and_args() {
        let args = parse(&["gdeb", "build", "--overwrite", "--", "-b"]);
        assert!(args.overwrite);
        assert_eq!(args.args, vec!["-b"]);
    }

    #[test]
    fn test_cli_parsing_build_plain_args() {
        let args = parse(&["gdeb", "build", "binary", "-j4"]);
        assert_eq!(args.args, vec!["binary", "-j4"]);
    }
}
