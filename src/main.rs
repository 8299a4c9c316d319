use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use expense_tracker::{cli, config, controller::ExpenseForm, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the expense API server
    Serve(ServeOptions),

    /// Create an account and log in
    Signup(CredentialOptions),

    /// Log in to the expense API
    Login(CredentialOptions),

    /// Drop the stored session
    Logout,

    /// Handle expenses
    Expenses(ExpensesOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Require a bearer session on expense routes
    #[clap(long)]
    pub require_auth: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CredentialOptions {
    #[clap(long)]
    pub username: String,

    #[clap(long)]
    pub password: String,
}

#[derive(Parser, Debug, Clone)]
#[command(
    about = "Handle expenses",
    args_conflicts_with_subcommands = true // disallow mixing --summary with subcommands
)]
pub struct ExpensesOptions {
    /// Show the summary below the list
    #[clap(long)]
    pub summary: bool,

    /// Subcommands under `expenses` (e.g., `add`)
    #[command(subcommand)]
    pub command: Option<ExpensesSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExpensesSubcommand {
    /// List all expenses
    List,

    /// Add an expense
    Add(AddOpts),

    /// Edit an expense; only the given fields change
    Edit(EditOpts),

    /// Delete an expense
    Delete(DeleteOpts),

    /// Show totals per category
    Summary,
}

#[derive(Args, Debug, Clone)]
pub struct AddOpts {
    /// Amount, e.g. 12.50
    #[clap(long, allow_hyphen_values = true)]
    pub amount: String,

    /// Date (YYYY-MM-DD or RFC 3339)
    #[clap(long)]
    pub date: String,

    #[clap(long)]
    pub category: Option<String>,

    #[clap(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EditOpts {
    pub id: u64,

    #[clap(long, allow_hyphen_values = true)]
    pub amount: Option<String>,

    #[clap(long)]
    pub date: Option<String>,

    #[clap(long)]
    pub category: Option<String>,

    #[clap(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteOpts {
    pub id: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => cli::serve(opt.require_auth).await,
        Command::Signup(opt) => cli::signup(opt.username, opt.password).await,
        Command::Login(opt) => cli::login(opt.username, opt.password).await,
        Command::Logout => cli::logout().await,

        Command::Expenses(opt) => match opt.command {
            None | Some(ExpensesSubcommand::List) => cli::list_expenses(opt.summary).await,
            Some(ExpensesSubcommand::Add(a)) => {
                cli::add_expense(ExpenseForm {
                    amount: Some(a.amount),
                    date: Some(a.date),
                    category: a.category,
                    description: a.description,
                })
                .await
            }
            Some(ExpensesSubcommand::Edit(e)) => {
                cli::edit_expense(
                    e.id,
                    ExpenseForm {
                        amount: e.amount,
                        date: e.date,
                        category: e.category,
                        description: e.description,
                    },
                )
                .await
            }
            Some(ExpensesSubcommand::Delete(d)) => cli::delete_expense(d.id).await,
            Some(ExpensesSubcommand::Summary) => cli::summary().await,
        },

        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
