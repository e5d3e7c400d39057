use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    gdeb completions bash > ~/.bash_completion.d/gdeb\n\n\
                  Generate zsh completions:\n    gdeb completions zsh > ~/.zfunc/_gdeb\n\n\
                  Generate fish completions:\n    gdeb completions fish > ~/.config/fish/completions/gdeb.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
