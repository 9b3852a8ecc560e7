//! CLI commands

use anyhow::{Context, Result, bail};
use clap::{Subcommand, ValueEnum};
use gigdesk_http::navigation::{Navigator, Route};
use gigdesk_http::session::FileStorage;
use gigdesk_http::types::{
    JobAction, JobFilter, JobType, NewJob, NewProposal, PaymentFilter, ProposalFilter,
    RegisterData, UserType,
};
use gigdesk_http::{Access, ApiClient, ApiClientBuilder, ClientConfig, Registration, authorize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session in the data directory
    Login {
        email: String,
        #[arg(long, env = "GIGDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a new account
    Register {
        email: String,
        #[arg(long, env = "GIGDESK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, value_enum)]
        role: Role,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Confirm an email address with the token from the verification mail
    VerifyEmail { token: String },

    /// Send the verification mail again
    ResendVerification { email: String },

    /// Request a password reset mail
    ResetPassword { email: String },

    /// Set a new password with the token from the reset mail
    ConfirmReset {
        token: String,
        #[arg(long, env = "GIGDESK_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Change the password of the signed-in account
    ChangePassword {
        #[arg(long, env = "GIGDESK_PASSWORD", hide_env_values = true)]
        old: String,
        #[arg(long, env = "GIGDESK_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },

    /// Browse and manage jobs
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Proposals sent or received
    Proposals {
        #[command(subcommand)]
        command: ProposalCommands,
    },

    /// Payment history and wallet operations
    Payments {
        #[command(subcommand)]
        command: PaymentCommands,
    },

    /// Chat rooms and messages
    Messages {
        #[command(subcommand)]
        command: MessageCommands,
    },

    /// Notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },

    /// Send an arbitrary authenticated request and print the JSON response
    Request {
        method: String,
        /// Path under the API root, e.g. `/api/jobs/`
        path: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },

    /// Write a configuration file with the current settings
    Init {
        /// Output file path (defaults to <data dir>/gigdesk.json)
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum JobCommands {
    /// Search open jobs
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long, value_enum)]
        job_type: Option<Kind>,
        /// Follow `next` links until every page is printed
        #[arg(long)]
        all: bool,
    },

    /// Show one job
    Show { id: i64 },

    /// List job categories
    Categories,

    /// Post a new job (client accounts)
    Create {
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: i64,
        #[arg(long)]
        budget: f64,
        #[arg(long, value_enum, default_value = "fixed")]
        job_type: Kind,
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
    },

    /// Move one of your jobs along its lifecycle (client accounts)
    Update {
        id: i64,
        #[arg(value_enum)]
        action: Transition,
    },
}

#[derive(Subcommand)]
pub enum ProposalCommands {
    /// Proposals you sent (freelancer accounts)
    Mine {
        #[arg(long)]
        status: Option<String>,
    },

    /// Proposals received for one of your jobs (client accounts)
    ForJob { job: i64 },

    /// Bid on a job (freelancer accounts)
    Submit {
        job: i64,
        #[arg(long)]
        bid: f64,
        /// Estimated time in days
        #[arg(long)]
        days: u32,
        #[arg(long)]
        cover_letter: String,
    },

    Accept { id: i64 },
    Reject { id: i64 },
    Withdraw { id: i64 },
}

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Payment history
    List {
        #[arg(long)]
        status: Option<String>,
    },

    Deposit { amount: f64 },

    Withdraw {
        amount: f64,
        #[arg(long)]
        bank_account: i64,
    },

    /// Registered bank accounts
    Accounts,
}

#[derive(Subcommand)]
pub enum MessageCommands {
    /// Chat rooms you take part in
    Rooms,

    /// Messages in a room
    Show { room: i64 },

    Send { room: i64, content: String },
}

#[derive(Subcommand)]
pub enum NotificationCommands {
    List,

    /// Number of unread notifications
    Unread,

    /// Mark every notification as read
    ReadAll,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Role {
    Client,
    Freelancer,
}

impl From<Role> for UserType {
    fn from(role: Role) -> Self {
        match role {
            Role::Client => Self::Client,
            Role::Freelancer => Self::Freelancer,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Kind {
    Fixed,
    Hourly,
}

impl From<Kind> for JobType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Fixed => Self::Fixed,
            Kind::Hourly => Self::Hourly,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Transition {
    InProgress,
    Completed,
    Cancel,
}

impl From<Transition> for JobAction {
    fn from(transition: Transition) -> Self {
        match transition {
            Transition::InProgress => Self::MarkInProgress,
            Transition::Completed => Self::MarkCompleted,
            Transition::Cancel => Self::Cancel,
        }
    }
}

/// Turns navigation requests into hints on the terminal
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        debug!(%route, "navigation requested");
        match route {
            Route::Login => eprintln!("Signed out. Run `gigdesk login` to sign in."),
            Route::VerifyEmail => {
                eprintln!("Check your inbox, then run `gigdesk verify-email <token>`.");
            }
            Route::Dashboard(role) => eprintln!("Signed in as a {role}."),
        }
    }
}

fn build_client(settings: &ClientConfig) -> Result<ApiClient> {
    let client = ApiClientBuilder::from_config(settings)
        .storage(Arc::new(FileStorage::in_dir(&settings.data_dir)))
        .navigator(Arc::new(TerminalNavigator))
        .build()
        .context("failed to create API client")?;
    Ok(client)
}

/// Restore the stored session and check the account role
async fn signed_in(client: &ApiClient, roles: &[UserType]) -> Result<()> {
    let session = client.session();
    let phase = session.hydrate().await;
    debug!(?phase, "session restored");

    match authorize(phase, session.current_user().as_ref(), roles) {
        Access::Granted => Ok(()),
        Access::Redirect(Route::Dashboard(role)) => {
            bail!("this command is not available to {role} accounts")
        }
        Access::Redirect(_) | Access::Pending => bail!("not signed in; run `gigdesk login` first"),
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl Commands {
    pub async fn execute(self, settings: ClientConfig) -> Result<()> {
        if let Self::Init { output } = &self {
            let path = output
                .clone()
                .unwrap_or_else(|| config::default_config_path(&settings.data_dir));
            config::save_config(&settings, &path)?;
            println!("Wrote configuration to {}", path.display());
            return Ok(());
        }

        let client = build_client(&settings)?;
        let session = client.session();

        match self {
            Self::Login { email, password } => {
                let user = session.login(&email, &password).await?;
                info!(user_id = user.id, "signed in");
                println!("Welcome back, {}.", user.display_name());
            }
            Self::Register {
                email,
                password,
                first_name,
                last_name,
                role,
            } => {
                let data = RegisterData {
                    email,
                    password,
                    first_name,
                    last_name,
                    user_type: role.into(),
                };
                match session.register(&data).await? {
                    Registration::SignedIn(user) => {
                        println!("Account created for {}.", user.email);
                    }
                    Registration::VerificationRequired => {
                        println!("Account created for {}. Verify your email to sign in.", data.email);
                    }
                }
            }
            Self::Logout => session.logout(),
            Self::Whoami => {
                signed_in(&client, &[]).await?;
                if let Some(user) = session.current_user() {
                    let verified = if user.is_email_verified { "" } else { " (unverified)" };
                    println!("{} <{}> {}{verified}", user.display_name(), user.email, user.user_type);
                }
            }
            Self::VerifyEmail { token } => {
                session.verify_email(&token).await?;
                println!("Email verified.");
            }
            Self::ResendVerification { email } => {
                session.resend_verification(&email).await?;
                println!("Verification mail sent to {email}.");
            }
            Self::ResetPassword { email } => {
                session.reset_password(&email).await?;
                println!("If {email} has an account, a reset link is on its way.");
            }
            Self::ConfirmReset { token, password } => {
                session.reset_password_confirm(&token, &password).await?;
                println!("Password updated.");
            }
            Self::ChangePassword { old, new } => {
                signed_in(&client, &[]).await?;
                session.change_password(&old, &new).await?;
                println!("Password changed.");
            }
            Self::Jobs { command } => command.execute(&client).await?,
            Self::Proposals { command } => command.execute(&client).await?,
            Self::Payments { command } => command.execute(&client).await?,
            Self::Messages { command } => command.execute(&client).await?,
            Self::Notifications { command } => command.execute(&client).await?,
            Self::Request { method, path, body } => {
                signed_in(&client, &[]).await?;
                let method = method
                    .to_uppercase()
                    .parse()
                    .with_context(|| format!("invalid HTTP method {method}"))?;
                let body = body
                    .map(|raw| serde_json::from_str::<Value>(&raw))
                    .transpose()
                    .context("request body is not valid JSON")?;
                let response = client.request(method, &path, body, None).await?;
                print_json(&response.json()?)?;
            }
            Self::Init { .. } => {}
        }
        Ok(())
    }
}

impl JobCommands {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::List {
                search,
                category,
                job_type,
                all,
            } => {
                signed_in(client, &[]).await?;
                let filter = JobFilter {
                    search,
                    category,
                    job_type: job_type.map(Into::into),
                    ..JobFilter::default()
                };
                let mut page = client.list_jobs(&filter).await?;
                println!("{} jobs", page.count);
                loop {
                    for job in &page.results {
                        println!(
                            "#{:<6} {:<40} {:>10} {:?} [{}]",
                            job.id, job.title, job.budget, job.job_type, job.status
                        );
                    }
                    if !all {
                        break;
                    }
                    match client.next_page(&page).await? {
                        Some(next) => page = next,
                        None => break,
                    }
                }
            }
            Self::Show { id } => {
                signed_in(client, &[]).await?;
                let job = client.get_job(id).await?;
                println!("{} (#{})", job.title, job.id);
                println!("Posted by {} in {}", job.client.display_name(), job.category_name);
                println!("Budget {} ({:?}), status {}", job.budget, job.job_type, job.status);
                if !job.skills_required.is_empty() {
                    println!("Skills: {}", job.skills_required.join(", "));
                }
                println!("{} proposals\n\n{}", job.total_proposals, job.description);
            }
            Self::Categories => {
                signed_in(client, &[]).await?;
                for category in client.job_categories().await? {
                    println!("{:>4}  {}", category.id, category.name);
                }
            }
            Self::Create {
                title,
                description,
                category,
                budget,
                job_type,
                skills,
            } => {
                signed_in(client, &[UserType::Client]).await?;
                let job = client
                    .create_job(&NewJob {
                        title,
                        description,
                        category,
                        skills_required: skills,
                        budget,
                        job_type: job_type.into(),
                    })
                    .await?;
                println!("Posted job #{}", job.id);
            }
            Self::Update { id, action } => {
                signed_in(client, &[UserType::Client]).await?;
                let action = JobAction::from(action);
                client.job_action(id, action).await?;
                println!("Job #{id}: {action}");
            }
        }
        Ok(())
    }
}

impl ProposalCommands {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        let proposals = match self {
            Self::Mine { status } => {
                signed_in(client, &[UserType::Freelancer]).await?;
                let filter = ProposalFilter {
                    status,
                    ..ProposalFilter::default()
                };
                client.my_proposals(&filter).await?
            }
            Self::ForJob { job } => {
                signed_in(client, &[UserType::Client]).await?;
                client.job_proposals(job).await?
            }
            Self::Submit {
                job,
                bid,
                days,
                cover_letter,
            } => {
                signed_in(client, &[UserType::Freelancer]).await?;
                let proposal = client
                    .submit_proposal(&NewProposal {
                        job,
                        cover_letter,
                        bid_amount: bid,
                        estimated_time: days,
                    })
                    .await?;
                println!("Sent proposal #{}", proposal.id);
                return Ok(());
            }
            Self::Accept { id } => {
                signed_in(client, &[UserType::Client]).await?;
                client.accept_proposal(id).await?;
                println!("Accepted proposal #{id}");
                return Ok(());
            }
            Self::Reject { id } => {
                signed_in(client, &[UserType::Client]).await?;
                client.reject_proposal(id).await?;
                println!("Rejected proposal #{id}");
                return Ok(());
            }
            Self::Withdraw { id } => {
                signed_in(client, &[UserType::Freelancer]).await?;
                client.withdraw_proposal(id).await?;
                println!("Withdrew proposal #{id}");
                return Ok(());
            }
        };

        for proposal in proposals {
            println!(
                "#{:<6} job #{:<6} {:>10} {:>3}d [{}]",
                proposal.id, proposal.job, proposal.bid_amount, proposal.estimated_time, proposal.status
            );
        }
        Ok(())
    }
}

impl PaymentCommands {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        signed_in(client, &[]).await?;
        match self {
            Self::List { status } => {
                let filter = PaymentFilter {
                    status,
                    ..PaymentFilter::default()
                };
                for payment in client.list_payments(&filter).await? {
                    println!(
                        "#{:<6} {:<12} {:>10} [{}] {}",
                        payment.id,
                        payment.payment_type,
                        payment.amount,
                        payment.status,
                        payment.created_at.format("%Y-%m-%d")
                    );
                }
            }
            Self::Deposit { amount } => print_json(&client.deposit(amount).await?)?,
            Self::Withdraw {
                amount,
                bank_account,
            } => print_json(&client.withdraw(amount, bank_account).await?)?,
            Self::Accounts => {
                for account in client.bank_accounts().await? {
                    let default = if account.is_default { " (default)" } else { "" };
                    println!(
                        "#{:<4} {} {} {}{default}",
                        account.id, account.bank_name, account.account_holder_name, account.account_number
                    );
                }
            }
        }
        Ok(())
    }
}

impl MessageCommands {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        signed_in(client, &[]).await?;
        match self {
            Self::Rooms => {
                for room in client.chat_rooms().await? {
                    let preview = room
                        .last_message
                        .as_ref()
                        .map_or("", |message| message.content.as_str());
                    println!("#{:<4} job #{:<6} {:>3} unread  {preview}", room.id, room.job, room.unread_count);
                }
            }
            Self::Show { room } => {
                for message in client.room_messages(room).await? {
                    let sender = message
                        .sender_details
                        .as_ref()
                        .map_or_else(|| format!("user #{}", message.sender), |u| u.display_name());
                    println!(
                        "[{}] {sender}: {}",
                        message.created_at.format("%Y-%m-%d %H:%M"),
                        message.content
                    );
                }
            }
            Self::Send { room, content } => {
                let message = client.send_message(room, &content).await?;
                println!("Sent message #{}", message.id);
            }
        }
        Ok(())
    }
}

impl NotificationCommands {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        signed_in(client, &[]).await?;
        match self {
            Self::List => {
                for notification in client.notifications().await? {
                    let marker = if notification.is_read { ' ' } else { '*' };
                    println!(
                        "{marker} {} {:<20} {}",
                        notification.created_at.format("%Y-%m-%d %H:%M"),
                        notification.notification_type,
                        notification.content
                    );
                }
            }
            Self::Unread => println!("{}", client.unread_notifications().await?),
            Self::ReadAll => {
                client.mark_all_notifications_read().await?;
                println!("All notifications marked as read.");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[derive(Parser)]
    struct Harness {
        #[command(subcommand)]
        command: Commands,
    }

    #[test]
    fn parses_job_update() {
        let parsed = Harness::try_parse_from(["gigdesk", "jobs", "update", "4", "in-progress"]).unwrap();
        let Commands::Jobs {
            command: JobCommands::Update { id, action },
        } = parsed.command
        else {
            panic!("expected jobs update");
        };
        assert_eq!(id, 4);
        assert_eq!(JobAction::from(action), JobAction::MarkInProgress);
    }

    #[test]
    fn parses_comma_separated_skills() {
        let parsed = Harness::try_parse_from([
            "gigdesk",
            "jobs",
            "create",
            "Logo",
            "--description",
            "A logo",
            "--category",
            "2",
            "--budget",
            "120",
            "--skills",
            "figma,branding",
        ])
        .unwrap();
        let Commands::Jobs {
            command: JobCommands::Create { skills, job_type, .. },
        } = parsed.command
        else {
            panic!("expected jobs create");
        };
        assert_eq!(skills, vec!["figma", "branding"]);
        assert_eq!(JobType::from(job_type), JobType::Fixed);
    }

    #[test]
    fn passwords_can_come_from_hidden_env_values() {
        let command = Harness::command();
        let change = command.find_subcommand("change-password").unwrap();
        for (id, var) in [("old", "GIGDESK_PASSWORD"), ("new", "GIGDESK_NEW_PASSWORD")] {
            let arg = change.get_arguments().find(|a| a.get_id() == id).unwrap();
            assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new(var)));
            assert!(arg.is_hide_env_values_set());
        }
    }
}
