use anyhow::{Context, Result};
use clap::{crate_version, App as Cli, AppSettings, Arg, ArgMatches, SubCommand};
use library_desk::app::{App, Command, Report};
use library_desk::config::Config;
use library_desk::logger::Logger;
use log::LevelFilter;

fn cli<'a, 'b>() -> Cli<'a, 'b> {
    let identifier = Arg::with_name("identifier")
        .long("identifier")
        .value_name("EMAIL_OR_PHONE")
        .takes_value(true)
        .required(true)
        .help("Email address or 10-digit phone number");
    let password = Arg::with_name("password")
        .long("password")
        .value_name("PASSWORD")
        .takes_value(true)
        .required(true);
    let accept_terms = Arg::with_name("accept-terms")
        .long("accept-terms")
        .help("Agree to the Terms & Conditions");

    Cli::new("library-desk")
        .version(crate_version!())
        .about("Sign in to the library management service and set up your library")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("DIR")
                .takes_value(true)
                .help("Directory holding config.yml"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Log more (repeat for more detail)"),
        )
        .subcommand(SubCommand::with_name("status").about("Show which flow the session is in"))
        .subcommand(
            SubCommand::with_name("sign-in")
                .about("Sign in with an existing account")
                .arg(identifier.clone())
                .arg(password.clone())
                .arg(accept_terms.clone()),
        )
        .subcommand(
            SubCommand::with_name("sign-up")
                .about("Create an owner account")
                .arg(
                    Arg::with_name("name")
                        .long("name")
                        .value_name("NAME")
                        .takes_value(true)
                        .required(true),
                )
                .arg(identifier)
                .arg(password)
                .arg(accept_terms),
        )
        .subcommand(
            SubCommand::with_name("setup-library")
                .about("Create the library for a signed-in owner")
                .arg(
                    Arg::with_name("name")
                        .long("name")
                        .value_name("NAME")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("seats")
                        .long("seats")
                        .value_name("COUNT")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("address")
                        .long("address")
                        .value_name("ADDRESS")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(SubCommand::with_name("logout").about("Sign out and forget the stored session"))
        .subcommand(SubCommand::with_name("config-init").about("Write a config file with default values"))
}

fn value(matches: &ArgMatches, name: &str) -> String {
    matches.value_of(name).unwrap_or_default().to_string()
}

fn command(matches: &ArgMatches) -> Option<Command> {
    match matches.subcommand() {
        ("status", _) => Some(Command::Status),
        ("sign-in", Some(m)) => Some(Command::SignIn {
            identifier: value(m, "identifier"),
            password: value(m, "password"),
            accepted_terms: m.is_present("accept-terms"),
        }),
        ("sign-up", Some(m)) => Some(Command::SignUp {
            name: value(m, "name"),
            identifier: value(m, "identifier"),
            password: value(m, "password"),
            accepted_terms: m.is_present("accept-terms"),
        }),
        ("setup-library", Some(m)) => Some(Command::SetupLibrary {
            name: value(m, "name"),
            seats: value(m, "seats"),
            address: value(m, "address"),
        }),
        ("logout", _) => Some(Command::Logout),
        _ => None,
    }
}

fn log_level(configured: LevelFilter, verbosity: u64) -> LevelFilter {
    let raised = match verbosity {
        0 => configured,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    raised.max(configured)
}

fn print(report: &Report) {
    for notice in &report.notices {
        println!("{}", notice);
    }
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    if let Some(error) = &report.error {
        eprintln!("error: {}", error);
    }
    println!("Flow: {}", report.flow.label());
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = Config::load(matches.value_of("config")).context("Failed to load configuration")?;

    Logger::init(log_level(config.log_level, matches.occurrences_of("verbose")))
        .context("Failed to start logger")?;

    if let ("config-init", _) = matches.subcommand() {
        config.save().context("Failed to write configuration")?;
        println!("Wrote {}", config.file_path().display());
        return Ok(());
    }

    let command = match command(&matches) {
        Some(command) => command,
        None => {
            cli().print_help()?;
            println!();
            return Ok(());
        }
    };

    let report = App::start(config, command).await?;
    print(&report);
    if report.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sign_in() {
        let matches = cli().get_matches_from(vec![
            "library-desk",
            "sign-in",
            "--identifier",
            "asha@example.com",
            "--password",
            "secret1",
            "--accept-terms",
        ]);
        assert_eq!(
            command(&matches),
            Some(Command::SignIn {
                identifier: "asha@example.com".to_string(),
                password: "secret1".to_string(),
                accepted_terms: true,
            })
        );
    }

    #[test]
    fn parses_setup_library_with_global_config() {
        let matches = cli().get_matches_from(vec![
            "library-desk",
            "--config",
            "/tmp/desk",
            "setup-library",
            "--name",
            "City Reading Room",
            "--seats",
            "40",
            "--address",
            "12 Station Road, Pune",
        ]);
        assert_eq!(matches.value_of("config"), Some("/tmp/desk"));
        assert_eq!(
            command(&matches),
            Some(Command::SetupLibrary {
                name: "City Reading Room".to_string(),
                seats: "40".to_string(),
                address: "12 Station Road, Pune".to_string(),
            })
        );
    }

    #[test]
    fn config_init_is_not_a_session_command() {
        let matches = cli().get_matches_from(vec!["library-desk", "config-init"]);
        assert_eq!(command(&matches), None);
    }

    #[test]
    fn verbosity_only_raises_level() {
        assert_eq!(log_level(LevelFilter::Warn, 0), LevelFilter::Warn);
        assert_eq!(log_level(LevelFilter::Warn, 2), LevelFilter::Debug);
        assert_eq!(log_level(LevelFilter::Trace, 1), LevelFilter::Trace);
    }
}
