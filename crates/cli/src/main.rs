//! Quorum CLI - browse, vote on and manage polls from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the code is read from stdin unless --code is given)
//! quorum login -e voter@example.com
//!
//! # Browse polls
//! quorum polls --filter active --sort popular --layout table
//!
//! # Vote for option 12 on poll 3
//! quorum vote 3 12
//!
//! # Owner: create, close and delete polls
//! quorum create -t "Lunch?" -o Pizza -o Sushi
//! quorum close 3
//! quorum delete 3 --yes
//! ```
//!
//! # Environment Variables
//!
//! See [`quorum_client::config`]. Logs go to stderr; set `RUST_LOG` to
//! change verbosity and `QUORUM_LOG_FORMAT=json` for structured output.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};
use quorum_client::layout::ListLayout;
use quorum_client::view_model::{PollFilter, PollQuery, SortBy};
use quorum_client::{ClientConfig, LogFormat};
use quorum_core::{OptionId, PollId, PollStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "quorum")]
#[command(author, version, about = "Quorum polls from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with a one-time code sent to your email
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name for a new account
        #[arg(short, long)]
        name: Option<String>,

        /// Verification code (prompted for if omitted)
        #[arg(short, long)]
        code: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List polls
    Polls {
        /// Match against title and description
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(short, long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,

        #[arg(long, value_enum, default_value_t = SortArg::New)]
        sort: SortArg,

        #[arg(short, long, value_enum, default_value_t = LayoutArg::Cards)]
        layout: LayoutArg,
    },
    /// Show one poll with results
    Show {
        poll: PollId,
    },
    /// Vote for an option
    Vote {
        poll: PollId,
        option: OptionId,
    },
    /// Create a poll (owner only)
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Answer option; repeat for each option
        #[arg(short = 'o', long = "option", required = true)]
        options: Vec<String>,
    },
    /// Close voting on a poll (owner only)
    Close {
        poll: PollId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Reopen voting on a poll (owner only)
    Reopen {
        poll: PollId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete a poll (owner only)
    Delete {
        poll: PollId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Overall statistics and the newest polls
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Active,
    Closed,
    MyVotes,
}

impl From<FilterArg> for PollFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Self::All,
            FilterArg::Active => Self::Active,
            FilterArg::Closed => Self::Closed,
            FilterArg::MyVotes => Self::MyVotes,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    New,
    Popular,
    Alphabetical,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::New => Self::New,
            SortArg::Popular => Self::Popular,
            SortArg::Alphabetical => Self::Alphabetical,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Compact,
    Cards,
    Table,
}

impl From<LayoutArg> for ListLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Compact => Self::Compact,
            LayoutArg::Cards => Self::Cards,
            LayoutArg::Table => Self::Table,
        }
    }
}

fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quorum=info,quorum_client=info".into());

    // stdout carries the rendered page, so logs go to stderr
    let is_json = format == LogFormat::Json;
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = commands::open(config).await;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Login { email, name, code } => {
            commands::auth::login(&mut page, &mut out, &email, name, code).await?;
        }
        Commands::Logout => commands::auth::logout(&mut page, &mut out)?,
        Commands::Whoami => commands::auth::whoami(&mut page, &mut out)?,
        Commands::Polls {
            search,
            filter,
            sort,
            layout,
        } => {
            let query = PollQuery {
                search,
                filter: filter.into(),
                sort: sort.into(),
            };
            commands::polls::list(&mut page, &mut out, query, layout.into())?;
        }
        Commands::Show { poll } => commands::polls::show(&mut page, &mut out, poll)?,
        Commands::Vote { poll, option } => {
            commands::polls::vote(&mut page, &mut out, poll, option).await?;
        }
        Commands::Create {
            title,
            description,
            options,
        } => {
            commands::manage::create(&mut page, &mut out, title, description, options).await?;
        }
        Commands::Close { poll, yes } => {
            commands::manage::set_status(&mut page, &mut out, poll, PollStatus::Closed, yes)
                .await?;
        }
        Commands::Reopen { poll, yes } => {
            commands::manage::set_status(&mut page, &mut out, poll, PollStatus::Active, yes)
                .await?;
        }
        Commands::Delete { poll, yes } => {
            commands::manage::delete(&mut page, &mut out, poll, yes).await?;
        }
        Commands::Stats => commands::polls::stats(&mut page, &mut out)?,
    }
    Ok(())
}
