use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use fintrack::{
    config::AppConfig,
    db,
    models::{EntryFilter, RegisterUserRequest},
    AppState,
};

#[derive(Parser)]
#[command(name = "fintrack-cli")]
#[command(about = "CLI tool for managing fintrack users and entries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Entry inspection commands
    Entry {
        #[command(subcommand)]
        command: EntryCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show a user by email
    Show {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum EntryCommands {
    /// List a user's entries
    List {
        /// Owner id
        #[arg(short, long)]
        user: i64,

        /// Case-insensitive description fragment
        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        month: Option<i64>,

        #[arg(short, long)]
        year: Option<i64>,
    },

    /// Confirmed income minus confirmed expenses
    Balance {
        /// Owner id
        #[arg(short, long)]
        user: i64,
    },
}

fn prompt_password() -> anyhow::Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        bail!("Passwords do not match");
    }
    Ok(password)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config)
        .await
        .context("could not open database")?;
    db::run_migrations(&pool).await?;

    let state = AppState::from_pool(pool);

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                email,
                name,
                password,
            } => {
                let password = match password {
                    Some(pw) => pw,
                    None => prompt_password()?,
                };

                let user = state
                    .user_service
                    .register(RegisterUserRequest {
                        name,
                        email,
                        password,
                    })
                    .await?;

                println!("✅ User created: {} (id {})", user.email, user.id);
            }
            UserCommands::Show { email } => {
                match state.user_service.find_by_email(&email).await? {
                    Some(user) => println!(
                        "{}\t{}\t{}\t{}",
                        user.id,
                        user.email,
                        user.name.unwrap_or_default(),
                        user.created_at.unwrap_or_default()
                    ),
                    None => bail!("No user with email {}", email),
                }
            }
        },
        Commands::Entry { command } => match command {
            EntryCommands::List {
                user,
                description,
                month,
                year,
            } => {
                let filter = EntryFilter {
                    description,
                    month,
                    year,
                    ..EntryFilter::for_user(user)
                };
                let entries = state.entry_service.search(&filter).await?;

                if entries.is_empty() {
                    println!("No entries found");
                }
                for entry in entries {
                    println!(
                        "{}\t{:02}/{}\t{}\t{}\t{}\t{}",
                        entry.id.unwrap_or_default(),
                        entry.month.unwrap_or_default(),
                        entry.year.unwrap_or_default(),
                        entry.entry_type.map(|t| t.as_str()).unwrap_or("-"),
                        entry.status.map(|s| s.as_str()).unwrap_or("-"),
                        entry.value.unwrap_or_default(),
                        entry.description.unwrap_or_default(),
                    );
                }
            }
            EntryCommands::Balance { user } => {
                let balance = state.entry_service.balance(user).await?;
                println!("{}", balance);
            }
        },
    }

    Ok(())
}
