use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "yolo5")]
#[command(author, version, about = "YOLOv5 object-detection service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Serve `POST /predict`
    Run,

    /// Run one prediction against the bucket and print the summary
    Predict {
        /// Object key of the image in the bucket
        img_name: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
