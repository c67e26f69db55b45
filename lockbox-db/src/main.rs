mod error;
mod args;
mod conn;
mod run;

fn commands() -> clap::Command {
    use clap::{Command, Arg, ArgAction, value_parser};

    Command::new("lockbox-db")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("setup")
                .about("creates the database tables from scratch")
                .arg(
                    Arg::new("rollback")
                        .long("rollback")
                        .action(ArgAction::SetTrue)
                        .help("rollback changes made to the database")
                )
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(std::path::PathBuf))
                        .help("directory of sql files to run. defaults to lockbox-db/setup/postgres in the cwd")
                )
                .arg(args::db::connect())
                .arg(args::db::user())
                .arg(args::db::password())
                .arg(args::db::req_password())
                .arg(args::db::host())
                .arg(args::db::port())
                .arg(args::db::dbname())
        )
}

fn main() {
    use tokio::runtime::Builder;
    use tracing_subscriber::{FmtSubscriber, EnvFilter};

    if let Err(err) = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init() {
        eprintln!("failed to initialize global tracing subscriber: {err}");

        std::process::exit(1);
    }

    let matches = commands().get_matches();

    let rt = match Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start tokio runtime: {err}");

            std::process::exit(1);
        }
    };

    tracing::event!(
        tracing::Level::INFO,
        "started tokio runtime",
    );

    if let Err(err) = rt.block_on(exec(&matches)) {
        eprintln!("{err}");

        std::process::exit(1);
    }
}

async fn exec(matches: &clap::ArgMatches) -> error::Result<()> {
    match matches.subcommand() {
        Some(("setup", setup_matches)) => run::setup::run(setup_matches).await,
        Some((name, _)) => Err(error::Error::UnknownCommand(name.to_owned())),
        None => Err(error::Error::UnknownCommand(String::new())),
    }
}
