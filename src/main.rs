use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
mod auth;
use pwcrypt::{Bcrypt, Config, Cost, Encoding, SaltOrCost};
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Args)]
struct SaltArgs {
    /// Cost factor for a freshly generated salt, 4 to 31 (default: 10)
    #[arg(long)]
    cost: Option<Cost>,

    /// Existing salt such as '$2a$10$N9qo8uLOickgx2ZMRZoMye'; wins over --cost
    #[arg(long)]
    salt: Option<String>,
}

impl SaltArgs {
    fn to_source(&self) -> Option<SaltOrCost> {
        match (&self.salt, self.cost) {
            (Some(salt), _) => Some(SaltOrCost::Salt(salt.clone())),
            (None, Some(cost)) => Some(SaltOrCost::Cost(cost)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pwcrypt")]
#[command(version, about = "bcrypt password hashing from the command line.")]
struct Cli {
    /// How the password text becomes bytes: 'utf8' or 'raw'
    #[arg(long, global = true, value_name = "ENCODING", env = "PWCRYPT_ENCODING")]
    encoding: Option<Encoding>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints a random salt
    Salt {
        /// Cost factor, 4 to 31 (default: 10)
        #[arg(long)]
        cost: Option<Cost>,
    },

    /// Hashes a password
    Hash {
        #[command(flatten)]
        salt: SaltArgs,

        /// Report key-schedule progress on stderr
        #[arg(long, default_value_t = false)]
        progress: bool,
    },

    /// Checks a password against a stored hash
    #[command(arg_required_else_help = true)]
    Verify {
        hash: String,

        /// Report key-schedule progress on stderr
        #[arg(long, default_value_t = false)]
        progress: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Single-threaded runtime: the scheduler's yields keep it responsive.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to start async runtime")
}

fn print_progress(fraction: f64) {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "\rprogress: {:>3.0}%", fraction * 100.0);
    if fraction >= 1.0 {
        let _ = writeln!(stderr);
    }
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Cli::parse();

    let mut config = Config::from_env().context("invalid PWCRYPT_* environment")?;
    if let Some(encoding) = args.encoding {
        config = config.with_encoding(encoding);
    }
    let bcrypt = Bcrypt::new(config);

    match args.command {
        Commands::Salt { cost } => {
            println!("{}", bcrypt.gen_salt(cost)?);
        }
        Commands::Hash { salt, progress } => {
            let password = auth::read_new_password_with_confirmation()?;
            let source = salt.to_source();
            let hash = if progress {
                runtime()?.block_on(bcrypt.hash(password.as_str(), source, print_progress))?
            } else {
                bcrypt.hash_sync(password.as_str(), source)?
            };
            println!("{hash}");
        }
        Commands::Verify { hash, progress } => {
            let password = auth::read_password()?;
            let matched = if progress {
                runtime()?.block_on(bcrypt.compare(password.as_str(), &hash, print_progress))?
            } else {
                bcrypt.compare_sync(password.as_str(), &hash)?
            };
            if !matched {
                println!("mismatch");
                return Ok(ExitCode::FAILURE);
            }
            println!("match");
        }
    }

    Ok(ExitCode::SUCCESS)
}
