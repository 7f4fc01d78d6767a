use clap::Parser;

#[derive(Parser, Clone)]
#[clap(author, version, long_about = None)]
#[clap(about = "Trains and runs the transition-based parser for classical Arabic")]
#[clap(propagate_version = true)]
pub struct Args {
    /// Output file; defaults to stdout if unspecified
    #[clap(short, long, value_parser)]
    pub output: Option<String>,

    /// Suppress logging entirely
    #[clap(short, long, action)]
    pub quiet: bool,

    /// Repeat for more verbose logging (-v, -vv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Clone)]
pub enum Commands {
    /// Train per-bucket models from a directory of gold treebank files and write them to a model file
    Train {
        /// Directory of morphology TSV files (one verse-segment row per line)
        #[clap(short, long, value_parser)]
        morphology: String,
        /// Directory of gold syntax graph files, in the format of format::write_graph
        #[clap(short, long, value_parser)]
        gold: String,
        /// TOML parser configuration; defaults are used for any key left unset
        #[clap(short, long, value_parser)]
        config: Option<String>,
        /// Where to write the trained models as JSON
        #[clap(short = 'o', long, value_parser, default_value_t = String::from("models.json"))]
        models: String,
    },

    /// Parse morphology-only graphs using previously trained models
    Parse {
        /// Directory of morphology TSV files to parse
        #[clap(short, long, value_parser)]
        morphology: String,
        /// Trained models, as written by the train subcommand
        #[clap(short = 'i', long, value_parser)]
        models: String,
    },

    /// Compare parsed output against gold graphs and report labeled/unlabeled attachment scores
    Evaluate {
        /// Directory of morphology TSV files
        #[clap(short, long, value_parser)]
        morphology: String,
        /// Directory of gold syntax graph files
        #[clap(short, long, value_parser)]
        gold: String,
        /// Trained models, as written by the train subcommand
        #[clap(short = 'i', long, value_parser)]
        models: String,
    },
}
