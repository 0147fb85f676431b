//! nursepal CLI — take practice and exam quizzes from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use nursepal_core::model::Mode;

mod commands;

#[derive(Parser)]
#[command(name = "nursepal", version, about = "Nursing exam practice quizzes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a test interactively
    Take {
        /// Course identifier
        #[arg(long)]
        course: String,

        /// Test identifier (0 shows the introduction)
        #[arg(long)]
        test: u32,

        /// Session mode: practice or exam (default from config)
        #[arg(long)]
        mode: Option<Mode>,

        /// Allow moving past unanswered questions in exam mode
        #[arg(long)]
        free_navigation: bool,

        /// Override the API base URL
        #[arg(long)]
        api_url: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show best scores for a course
    Scores {
        /// Course identifier
        #[arg(long)]
        course: String,

        /// Override the API base URL
        #[arg(long)]
        api_url: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List every recorded attempt
    History {
        /// Override the API base URL
        #[arg(long)]
        api_url: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show your leaderboard rank
    Rank {
        /// Override the API base URL
        #[arg(long)]
        api_url: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nursepal=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            course,
            test,
            mode,
            free_navigation,
            api_url,
            config,
        } => commands::take::execute(course, test, mode, free_navigation, api_url, config).await,
        Commands::Scores {
            course,
            api_url,
            config,
        } => commands::scores::execute(course, api_url, config).await,
        Commands::History { api_url, config } => commands::history::execute(api_url, config).await,
        Commands::Rank { api_url, config } => commands::rank::execute(api_url, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
