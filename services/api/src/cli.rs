use crate::demo::{run_demo, run_score, DemoArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dealer_crm::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Dealer Lead Desk",
    about = "Capture showroom leads, balance guard duty, and score prospects",
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
    /// Score a prospect from pillar ratings and print the tier
    Score(ScoreArgs),
    /// Run an end-to-end capture, assignment and scoring walkthrough
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seconds between sweeps of leads captured with nobody on duty (0 disables)
    #[arg(long, default_value_t = 60)]
    pub(crate) retry_interval_secs: u64,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            retry_interval_secs: 60,
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Demo(args) => run_demo(args),
    }
}
