use std::io;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::collection::RecordId;
use crate::commands::{
    Context, cmd_browse, cmd_companies, cmd_config_path, cmd_config_set, cmd_config_show,
    cmd_customers, cmd_login, cmd_logout, cmd_session,
};
use crate::error::Result;

#[derive(Parser)]
#[command(name = "atrium")]
#[command(about = "Search and manage ERP customers and companies")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct GlobalArgs {
    /// Work against built-in demo data instead of the API
    #[arg(long, global = true)]
    pub offline: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Log debug output to stderr (ATRIUM_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show whether a session is stored
    Session,

    /// Manage customers
    #[command(visible_alias = "cu")]
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },

    /// Manage companies
    #[command(visible_alias = "co")]
    Companies {
        #[command(subcommand)]
        action: CompanyAction,
    },

    /// Interactive list: type to search, `:n`/`:p` to page, `:d <id>` to delete, `:q` to quit
    Browse {
        /// Which records to browse
        entity: EntityKind,

        /// Start with this search keyword
        #[arg(short, long)]
        keyword: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Customers,
    Companies,
}

#[derive(Subcommand)]
pub enum CustomerAction {
    /// List one page of customers
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show a customer with its company
    Show {
        /// Customer ID
        id: RecordId,
    },

    /// Create a customer
    Create(CustomerFields),

    /// Update a customer; omitted fields keep their current value
    Update {
        /// Customer ID
        id: RecordId,

        #[command(flatten)]
        fields: CustomerFields,
    },

    /// Delete a customer after confirmation
    #[command(visible_alias = "rm")]
    Delete {
        /// Customer ID
        id: RecordId,
    },
}

#[derive(Subcommand)]
pub enum CompanyAction {
    /// List one page of companies
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show a company with its customers
    Show {
        /// Company ID
        id: RecordId,
    },

    /// Create a company
    Create(CompanyFields),

    /// Update a company; omitted fields keep their current value
    Update {
        /// Company ID
        id: RecordId,

        #[command(flatten)]
        fields: CompanyFields,
    },

    /// Delete a company after confirmation
    #[command(visible_alias = "rm")]
    Delete {
        /// Company ID
        id: RecordId,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Search keyword
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Page number, starting at 1
    #[arg(short, long, default_value = "1", value_parser = parse_page)]
    pub page: u32,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CustomerFields {
    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Defaults to first and last name
    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub shopify_id: Option<String>,

    /// ID of the company the customer belongs to
    #[arg(long = "company")]
    pub company_id: Option<RecordId>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CompanyFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address1: Option<String>,

    #[arg(long)]
    pub address2: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub province: Option<String>,

    #[arg(long)]
    pub zip: Option<String>,

    #[arg(long)]
    pub country: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, page_size, debounce_ms, clamp_policy, request_timeout_secs, connect_timeout_secs)
        key: String,
        /// Value to set
        value: String,
    },
    /// Print the configuration file path
    Path,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let global = self.global;
        match self.command {
            Commands::Login { email, password } => {
                cmd_login(&Context::new(global)?, &email, password).await
            }
            Commands::Logout => cmd_logout(&Context::new(global)?),
            Commands::Session => cmd_session(&Context::new(global)?),

            Commands::Customers { action } => cmd_customers(&Context::new(global)?, action).await,
            Commands::Companies { action } => cmd_companies(&Context::new(global)?, action).await,

            Commands::Browse { entity, keyword } => {
                cmd_browse(&Context::new(global)?, entity, keyword).await
            }

            Commands::Config { action } => match action {
                ConfigAction::Show => cmd_config_show(global.json),
                ConfigAction::Set { key, value } => cmd_config_set(&key, &value, global.json),
                ConfigAction::Path => cmd_config_path(global.json),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn parse_page(s: &str) -> std::result::Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(format!("Invalid page '{s}'. Must be a number starting at 1")),
        Ok(page) => Ok(page),
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "atrium", &mut io::stdout());
}
