use clap::Parser;
use std::process::ExitCode;
use budget_sheet::args::{Args, Command, RangeSubcommand, RecurringSubcommand};
use budget_sheet::{commands, Config, Result};
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().budget_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.empty()).await?.print(),

        Command::Edit(edit_args) => {
            let config = Config::load(home).await?;
            commands::edit(config, edit_args.clone()).await?.print()
        }

        Command::Colors(colors_args) => {
            let config = Config::load(home).await?;
            commands::colors(config, colors_args.clone()).await?.print()
        }

        Command::Intersects(intersects_args) => commands::intersects(intersects_args.clone())
            .await?
            .print(),

        Command::Plan(plan_args) => {
            let config = Config::load(home).await?;
            commands::plan(config, plan_args.name()).await?.print()
        }

        Command::Recurring(recurring_args) => {
            let config = Config::load(home).await?;
            match recurring_args.command() {
                RecurringSubcommand::Setup => commands::recurring_setup(config).await?.print(),
                RecurringSubcommand::Populate(args) => {
                    commands::recurring_populate(config, args.clone())
                        .await?
                        .print()
                }
                RecurringSubcommand::Preview(args) => {
                    commands::recurring_preview(config, args.clone())
                        .await?
                        .print()
                }
                RecurringSubcommand::Summary(args) => {
                    commands::recurring_summary(config, args.clone())
                        .await?
                        .print()
                }
                RecurringSubcommand::UpdateDue(args) => {
                    commands::recurring_update_due(config, args.clone())
                        .await?
                        .print()
                }
            }
        }

        Command::Range(range_args) => {
            let config = Config::load(home).await?;
            match range_args.command() {
                RangeSubcommand::Show => commands::range_show(config).await?.print(),
                RangeSubcommand::Chart { kind, address } => {
                    commands::range_chart(config, *kind, address)
                        .await?
                        .print()
                }
                RangeSubcommand::Source { kind, address } => {
                    commands::range_source(config, *kind, address)
                        .await?
                        .print()
                }
                RangeSubcommand::Reset => commands::range_reset(config).await?.print(),
            }
        }

        Command::DebtToIncome => {
            let config = Config::load(home).await?;
            commands::debt_to_income(config).await?.print()
        }

        Command::Reset => {
            let config = Config::load(home).await?;
            commands::reset(config).await?.print()
        }

        Command::Debug(debug_args) => {
            let config = Config::load(home).await?;
            commands::debug_mode(config, debug_args.state())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
