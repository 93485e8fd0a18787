use crate::commands::{run_leaderboard, run_score, LeaderboardArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mangrove_watch::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Mangrove Watch",
    about = "Run the community incident-report triage service or inspect it from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a report without storing it and print the assessment
    Score(ScoreArgs),
    /// Print the contributor leaderboard from the data directory
    Leaderboard(LeaderboardArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Leaderboard(args) => run_leaderboard(args),
    }
}
