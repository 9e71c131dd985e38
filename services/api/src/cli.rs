use crate::report::{run_eligibility_report, EligibilityArgs};
use crate::server;
use bdas::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Blood Donation Assistance Service",
    about = "Run the blood donation matching service or inspect a donor roster from the command line",
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
    /// Print donation eligibility for every donor in a roster CSV
    Eligibility(EligibilityArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Donor roster CSV used to seed the in-memory donor store
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Eligibility(args) => run_eligibility_report(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["bdas-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_eligibility_arguments() {
        let cli = Cli::try_parse_from([
            "bdas-api",
            "eligibility",
            "--roster",
            "donors.csv",
            "--as-of",
            "2024-03-15",
            "--blood-type",
            "O Positive (O+)",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Eligibility(args)) => {
                assert_eq!(args.roster, PathBuf::from("donors.csv"));
                assert_eq!(
                    args.as_of,
                    chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
                );
                assert_eq!(args.blood_type, Some(bdas::workflows::donation::BloodType::OPositive));
            }
            other => panic!("expected eligibility command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_blood_type_argument() {
        let result = Cli::try_parse_from([
            "bdas-api",
            "eligibility",
            "--roster",
            "donors.csv",
            "--blood-type",
            "Z+",
        ]);
        assert!(result.is_err());
    }
}
