use clap::Parser;

/// Arguments for the tarball command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Build ../<name>_<version>.orig.<ext>:\n    gdeb tarball\n\n\
                   Replace an orig tarball left by an earlier run:\n    gdeb tarball --overwrite")]
pub struct TarballArgs {
    /// Replace an existing orig tarball instead of failing
    #[arg(long)]
    pub overwrite: bool,
}
