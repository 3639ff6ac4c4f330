use anyhow::Context;
use chrono::NaiveDate;
use medicore_core::config::{
    currency_from_env_value, seed_file_from_env_value, today_from_env_value,
};
use medicore_core::constants::{APP_NAME, CURRENCY_ENV, SEED_FILE_ENV, TODAY_ENV};
use medicore_core::records::StaffRole;
use medicore_core::{CoreConfig, Dashboard, SeedData, Session, SignupForm};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
Commands:
  login <username> <password>            start a session
  signup <username> <password> <confirm> <role> <email> <name...>
  open <module>                          switch module (dashboard, patients, ...)
  search [term]                          filter the list; no term clears it
  staff-role [role]                      filter staff by role; no role clears it
  dates [from] [to]                      inclusive date range, '-' leaves a side open
  new                                    open the creation form
  allocate                               open the room allocation form
  book <doctorId>                        book the given doctor
  set <field> <value...>                 fill a form field
  submit                                 submit the open form
  cancel                                 close the form without saving
  export                                 print the listed reports as JSON
  show [json]                            redraw the current page
  logout                                 end the session
  quit                                   exit";

/// One line of runner input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Login { username: String, password: String },
    Signup(SignupForm),
    Open(String),
    Search(String),
    StaffRole(Option<String>),
    Dates(Option<NaiveDate>, Option<NaiveDate>),
    New,
    Allocate,
    Book(String),
    Set { field: String, value: String },
    Submit,
    Cancel,
    Export,
    Show { json: bool },
    Logout,
    Help,
    Quit,
}

fn parse_date_arg(arg: Option<&str>) -> anyhow::Result<Option<NaiveDate>> {
    match arg {
        None | Some("-") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .with_context(|| format!("'{raw}' is not a date (YYYY-MM-DD)")),
    }
}

fn parse_command(line: &str) -> anyhow::Result<Option<Command>> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match verb {
        "" => return Ok(None),
        "login" => match args.as_slice() {
            [username, password] => Command::Login {
                username: (*username).to_owned(),
                password: (*password).to_owned(),
            },
            _ => anyhow::bail!("usage: login <username> <password>"),
        },
        "signup" => match args.as_slice() {
            [username, password, confirm, role, email, name @ ..] => {
                Command::Signup(SignupForm {
                    username: (*username).to_owned(),
                    password: (*password).to_owned(),
                    confirm_password: (*confirm).to_owned(),
                    role: (*role).to_owned(),
                    email: (*email).to_owned(),
                    name: name.join(" "),
                })
            }
            _ => anyhow::bail!("usage: signup <username> <password> <confirm> <role> <email> <name...>"),
        },
        "open" => match args.as_slice() {
            [module] => Command::Open((*module).to_owned()),
            _ => anyhow::bail!("usage: open <module>"),
        },
        "search" => Command::Search(rest.to_owned()),
        "staff-role" => Command::StaffRole(args.first().map(|r| (*r).to_owned())),
        "dates" => Command::Dates(
            parse_date_arg(args.first().copied())?,
            parse_date_arg(args.get(1).copied())?,
        ),
        "new" => Command::New,
        "allocate" => Command::Allocate,
        "book" => match args.as_slice() {
            [doctor] => Command::Book((*doctor).to_owned()),
            _ => anyhow::bail!("usage: book <doctorId>"),
        },
        "set" => match rest.split_once(char::is_whitespace) {
            Some((field, value)) => Command::Set {
                field: field.to_owned(),
                value: value.trim().to_owned(),
            },
            None if !rest.is_empty() => Command::Set {
                field: rest.to_owned(),
                value: String::new(),
            },
            None => anyhow::bail!("usage: set <field> <value...>"),
        },
        "submit" => Command::Submit,
        "cancel" => Command::Cancel,
        "export" => Command::Export,
        "show" => Command::Show {
            json: args.first() == Some(&"json"),
        },
        "logout" => Command::Logout,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => anyhow::bail!("unknown command '{other}', try 'help'"),
    };
    Ok(Some(command))
}

fn config_from_env() -> anyhow::Result<CoreConfig> {
    let seed_file = seed_file_from_env_value(std::env::var(SEED_FILE_ENV).ok())?;
    let today = today_from_env_value(std::env::var(TODAY_ENV).ok())?;
    let currency = currency_from_env_value(std::env::var(CURRENCY_ENV).ok());
    Ok(CoreConfig::new(seed_file, today, currency)?)
}

/// Runs one command against the current session, returning false when the runner should exit.
fn run_command(
    command: Command,
    cfg: &CoreConfig,
    seed: &SeedData,
    session: &mut Option<Dashboard>,
) -> anyhow::Result<bool> {
    match command {
        Command::Quit => Ok(false),
        Command::Help => {
            println!("{HELP}");
            Ok(true)
        }
        Command::Login { .. } | Command::Signup(_) if session.is_some() => {
            anyhow::bail!("already signed in, log out first")
        }
        Command::Login { username, password } => {
            let (credentials, store) = seed.clone().into_parts()?;
            let user = Session::login(&credentials, &username, &password)?;
            let dashboard = session.insert(Dashboard::new(cfg.clone(), user, store));
            println!();
            print!("{}", dashboard.page());
            Ok(true)
        }
        Command::Signup(form) => {
            let (_, store) = seed.clone().into_parts()?;
            let user = Session::from_signup(&form)?;
            let dashboard = session.insert(Dashboard::new(cfg.clone(), user, store));
            println!();
            print!("{}", dashboard.page());
            Ok(true)
        }
        Command::Logout => {
            let dashboard = session.take().context("not signed in")?;
            dashboard.logout();
            println!("Signed out.");
            Ok(true)
        }
        command => {
            let Some(dashboard) = session.as_mut() else {
                anyhow::bail!("not signed in, use 'login <username> <password>'");
            };
            run_in_session(command, dashboard)
        }
    }
}

/// Applies a command to a signed-in dashboard and redraws the page when it changed.
fn run_in_session(command: Command, dashboard: &mut Dashboard) -> anyhow::Result<bool> {
    match command {
        Command::Open(module) => {
            dashboard.change_module(&module);
        }
        Command::Search(term) => dashboard.set_search(&term)?,
        Command::StaffRole(role) => {
            let role = role.map(|r| r.parse::<StaffRole>()).transpose()?;
            dashboard.set_staff_role_filter(role)?;
        }
        Command::Dates(from, to) => dashboard.set_date_range(from, to)?,
        Command::New => dashboard.open_form()?,
        Command::Allocate => dashboard.open_allocation_form()?,
        Command::Book(doctor) => dashboard.book_doctor(&doctor)?,
        Command::Set { field, value } => {
            dashboard.set_field(&field, &value)?;
            return Ok(true);
        }
        Command::Submit => {
            let id = dashboard.submit()?;
            println!("Saved record {id}.");
        }
        Command::Cancel => dashboard.cancel(),
        Command::Export => {
            println!("{}", dashboard.export()?);
            return Ok(true);
        }
        Command::Show { json: true } => {
            println!("{}", serde_json::to_string_pretty(&dashboard.page())?);
            return Ok(true);
        }
        Command::Show { json: false } => {}
        Command::Login { .. }
        | Command::Signup(_)
        | Command::Logout
        | Command::Help
        | Command::Quit => unreachable!("handled before a session is required"),
    }

    println!();
    print!("{}", dashboard.page());
    Ok(true)
}

/// Interactive terminal session for MEDICORE.
///
/// Reads one command per line from stdin. Each login starts from a fresh copy of the seed
/// snapshot; everything created during a session is discarded at logout.
///
/// # Environment Variables
/// - `MEDICORE_SEED_FILE`: YAML seed snapshot (default: bundled demo data)
/// - `MEDICORE_TODAY`: fixed "today" as YYYY-MM-DD (default: system date)
/// - `MEDICORE_CURRENCY`: currency label (default: "Rs.")
/// - `RUST_LOG`: tracing filter (default adds `medicore=info`)
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medicore=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cfg = config_from_env()?;
    let seed = cfg.load_seed().context("failed to load seed data")?;
    tracing::info!(today = %cfg.today(), currency = cfg.currency(), "{APP_NAME} ready");

    println!("{APP_NAME}. Type 'help' for commands.");
    let mut session: Option<Dashboard> = None;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };

        match parse_command(&line?) {
            Ok(None) => {}
            Ok(Some(command)) => match run_command(command, &cfg, &seed, &mut session) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => eprintln!("Error: {e}"),
            },
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    if let Some(dashboard) = session.take() {
        dashboard.logout();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_values_with_spaces() {
        assert_eq!(
            parse_command("set notes follow up in two weeks").unwrap(),
            Some(Command::Set {
                field: "notes".into(),
                value: "follow up in two weeks".into()
            })
        );
    }

    #[test]
    fn parses_signup_with_multi_word_name() {
        let Some(Command::Signup(form)) =
            parse_command("signup sara secret1 secret1 patient sara@example.com Sara Khan").unwrap()
        else {
            panic!("expected signup");
        };
        assert_eq!(form.name, "Sara Khan");
        assert_eq!(form.role, "patient");
    }

    #[test]
    fn parses_open_date_bounds() {
        assert_eq!(
            parse_command("dates - 2025-05-20").unwrap(),
            Some(Command::Dates(None, NaiveDate::from_ymd_opt(2025, 5, 20)))
        );
        assert!(parse_command("dates 20/05/2025").is_err());
    }

    #[test]
    fn blank_lines_and_unknown_verbs() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("fly away").is_err());
        assert_eq!(parse_command("search").unwrap(), Some(Command::Search(String::new())));
    }

    #[test]
    fn commands_require_a_session() {
        let cfg = CoreConfig::new(None, None, "Rs.").unwrap();
        let seed = SeedData::bundled().unwrap();
        let mut session = None;

        assert!(run_command(Command::New, &cfg, &seed, &mut session).is_err());
        assert!(run_command(
            Command::Login {
                username: "admin".into(),
                password: "password".into()
            },
            &cfg,
            &seed,
            &mut session
        )
        .unwrap());
        assert!(session.is_some());
        assert!(run_command(Command::Logout, &cfg, &seed, &mut session).unwrap());
        assert!(session.is_none());
        assert!(!run_command(Command::Quit, &cfg, &seed, &mut session).unwrap());
    }
}
