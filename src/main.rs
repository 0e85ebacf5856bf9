use anyhow::Context;
use bqtransfer::config::{CONFIG_ID_VAR, PROJECT_ID_VAR, REGION_VAR, TransferConfig};
use bqtransfer::schedule::{WireTimestamp, iso_8601, run_time_on};
use bqtransfer::transfer::DataTransferClient;
use bqtransfer::{set_up_logger, trigger_manual_run_on};
use chrono::NaiveDate;
use clap::{Arg, ArgAction, Command};
use log::{debug, info};

#[derive(Debug)]
struct Args {
    verbose: bool,
    dry_run: bool,
    date: Option<NaiveDate>,
    config: TransferConfig,
}

fn parse_args() -> anyhow::Result<Args> {
    let matches = Command::new("bqtransfer")
        .version("0.1")
        .author("Jacob Luszcz")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Verbose mode. Outputs DEBUG and higher log messages."),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Log the run that would be requested without contacting the transfer service."),
        )
        .arg(
            Arg::new("date")
                .short('d')
                .long("date")
                .value_name("YYYY-MM-DD")
                .help("Request the run for noon UTC on this date rather than today."),
        )
        .arg(
            Arg::new("project-id")
                .long("project-id")
                .env(PROJECT_ID_VAR)
                .required(true)
                .help("Project that owns the transfer configuration."),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .env(REGION_VAR)
                .required(true)
                .help("Location of the transfer configuration, e.g. 'eu'."),
        )
        .arg(
            Arg::new("config-id")
                .long("config-id")
                .env(CONFIG_ID_VAR)
                .required(true)
                .help("Transfer configuration ID."),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");

    let dry_run = matches.get_flag("dry-run");

    let date = matches
        .get_one::<String>("date")
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
        .transpose()
        .context("--date must be YYYY-MM-DD")?;

    let string_arg = |id: &str| {
        matches
            .get_one::<String>(id)
            .cloned()
            .with_context(|| format!("--{id} is required"))
    };
    let config = TransferConfig::new(
        string_arg("project-id")?,
        string_arg("region")?,
        string_arg("config-id")?,
    );

    Ok(Args {
        verbose,
        dry_run,
        date,
        config,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    set_up_logger(module_path!(), args.verbose)?;
    debug!("{args:?}");

    let date = args
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    if args.dry_run {
        let run_time = run_time_on(date)?;
        info!(
            "Would request run of {} at {} ({:?})",
            args.config.resource_path(),
            iso_8601(&run_time),
            WireTimestamp::from(run_time)
        );
        return Ok(());
    }

    let client = DataTransferClient::from_env().await?;
    let response = trigger_manual_run_on(&client, &args.config, date).await?;
    debug!("{response:?}");

    Ok(())
}
