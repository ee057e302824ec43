use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories the tools may read and modify
    #[clap(value_parser)]
    pub allowed_dirs: Vec<PathBuf>,

    #[clap(long, value_parser, default_value_t = false)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,

    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directories_and_flags() {
        let cli = Cli::parse_from(["fsmcp", "--verbose", "/srv/a", "/srv/b", "--log", "out.log"]);
        assert_eq!(cli.allowed_dirs, vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]);
        assert!(cli.verbose);
        assert_eq!(cli.log, Some(PathBuf::from("out.log")));
        assert!(cli.config.is_none());
    }
}
