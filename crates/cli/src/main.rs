use clap::{Parser, Subcommand};
use medicore_core::config::{
    currency_from_env_value, seed_file_from_env_value, today_from_env_value,
};
use medicore_core::constants::{CURRENCY_ENV, SEED_FILE_ENV, TODAY_ENV};
use medicore_core::{
    menu_for, resolve_view_for, CoreConfig, Dashboard, Module, Role, SeedData, Session,
    SignupForm,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medicore")]
#[command(about = "MEDICORE hospital management CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a username and password against the seed accounts
    Login {
        username: String,
        password: String,
    },
    /// Print the navigation menu for a role
    Menu {
        /// admin, patient or staff
        role: String,
    },
    /// Print the resolved title, columns and actions for a role and module
    Access {
        /// Role id; unknown roles get the restricted view
        role: String,
        /// Module id, e.g. appointments
        module: String,
    },
    /// Log in and print one module's page
    View {
        username: String,
        password: String,
        /// Module id, e.g. billing
        module: String,
        /// Search term to filter the list
        #[arg(long)]
        search: Option<String>,
        /// Print the view-model as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a signup form
    Signup {
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// patient or staff
        #[arg(long, default_value = "")]
        role: String,
        #[arg(long)]
        password: String,
        /// Password confirmation
        #[arg(long)]
        confirm: String,
    },
    /// Work with seed snapshots
    Seed {
        /// Validate a YAML seed file and print collection sizes
        #[arg(long)]
        check: PathBuf,
    },
}

fn config_from_env() -> Result<CoreConfig, Box<dyn std::error::Error>> {
    let seed_file = seed_file_from_env_value(std::env::var(SEED_FILE_ENV).ok())?;
    let today = today_from_env_value(std::env::var(TODAY_ENV).ok())?;
    let currency = currency_from_env_value(std::env::var(CURRENCY_ENV).ok());
    Ok(CoreConfig::new(seed_file, today, currency)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Login { username, password }) => {
            let cfg = config_from_env()?;
            let (credentials, _) = cfg.load_seed()?.into_parts()?;
            match Session::login(&credentials, &username, &password) {
                Ok(session) => {
                    let header = session.header();
                    println!(
                        "Logged in as {} [{}]",
                        header.display_name, header.badge
                    );
                    session.logout();
                }
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        Some(Commands::Menu { role }) => match role.parse::<Role>() {
            Ok(role) => {
                for item in menu_for(role) {
                    println!("{:<14} {}", item.module.id(), item.label);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        Some(Commands::Access { role, module }) => match Module::from_id(&module) {
            Some(module) => {
                let view = resolve_view_for(&role, module);
                println!("{}", serde_json::to_string_pretty(&view)?);
            }
            None => eprintln!("Error: unknown module '{}'", module),
        },
        Some(Commands::View {
            username,
            password,
            module,
            search,
            json,
        }) => {
            let cfg = config_from_env()?;
            let (credentials, store) = cfg.load_seed()?.into_parts()?;
            let session = match Session::login(&credentials, &username, &password) {
                Ok(session) => session,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return Ok(());
                }
            };

            let mut dashboard = Dashboard::new(cfg, session, store);
            let landed = dashboard.change_module(&module);
            if landed.id() != module {
                eprintln!("Module '{}' is not available, showing the dashboard", module);
            }
            if let Some(term) = search {
                if let Err(e) = dashboard.set_search(&term) {
                    eprintln!("Error: {}", e);
                }
            }

            let page = dashboard.page();
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print!("{}", page);
            }
            dashboard.logout();
        }
        Some(Commands::Signup {
            username,
            name,
            email,
            role,
            password,
            confirm,
        }) => {
            let form = SignupForm {
                username,
                password,
                confirm_password: confirm,
                name,
                email,
                role,
            };
            match Session::from_signup(&form) {
                Ok(session) => {
                    let identity = session.identity();
                    println!(
                        "Signed up {} as {} with id {}",
                        identity.username, identity.role, identity.id
                    );
                }
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        Some(Commands::Seed { check }) => match SeedData::load(&check)
            .and_then(SeedData::into_parts)
        {
            Ok((credentials, store)) => {
                println!("Seed file OK: {}", check.display());
                println!("  accounts      {}", credentials.len());
                println!("  patients      {}", store.patients().len());
                println!("  doctors       {}", store.doctors().len());
                println!("  departments   {}", store.departments().len());
                println!("  appointments  {}", store.appointments().len());
                println!("  treatments    {}", store.treatments().len());
                println!("  bills         {}", store.bills().len());
                println!("  rooms         {}", store.rooms().len());
                println!("  staff         {}", store.staff().len());
                println!("  reports       {}", store.reports().len());
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
