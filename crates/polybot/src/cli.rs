use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "polybot")]
#[command(author, version, about = "Telegram gateway for YOLOv5 object detection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Register the webhook and serve Telegram updates
    Run {
        /// Echo text only, never run detection on photos
        #[arg(long)]
        echo_only: bool,

        /// Keep the currently registered webhook untouched
        #[arg(long)]
        skip_webhook: bool,
    },

    /// Register the webhook and exit
    SetWebhook,

    /// Remove the webhook and exit
    DeleteWebhook,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["polybot"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from(["polybot", "run", "--echo-only"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Run {
                echo_only: true,
                skip_webhook: false
            })
        );
    }
}
