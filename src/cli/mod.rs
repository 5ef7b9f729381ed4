//! Command-line interface for dispatchr.
//!
//! Without a subcommand the binary starts the server. Subcommands drive the
//! console components against a running server:
//! - `assignments list|available|assign|edit|archive|create`
//! - `people list|show|archive`
//! - `register operator|driver`
//! - `vans list|add`
//! - `config check`

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::Config;
use crate::console::{
    AssignDriversForm, DispatchApi, HttpDispatchClient, Notification, PeopleDirectory, Person,
    PersonKey, Role,
};
use crate::db::{CreateAssignmentRequest, CreateVanRequest};

#[derive(Parser, Debug)]
#[command(name = "dispatchr")]
#[command(author, version, about = "Transport dispatch records: operators, drivers, vans and assignments", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "dispatchr.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API URL to connect to (default: console.api_url from the config file)
    #[arg(long, env = "DISPATCHR_API_URL")]
    pub api_url: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Driver assignments
    #[command(subcommand)]
    Assignments(AssignmentsCommands),

    /// Operators and drivers
    #[command(subcommand)]
    People(PeopleCommands),

    /// Register an operator or a driver
    Register {
        /// operator or driver
        role: Role,
        #[command(flatten)]
        fields: RegisterArgs,
    },

    /// Vans
    #[command(subcommand)]
    Vans(VansCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum AssignmentsCommands {
    /// List active assignments that have a driver
    List,
    /// List drivers not referenced by any assignment
    Available,
    /// Assign a driver to an assignment
    Assign {
        #[arg(long)]
        assignment: i64,
        #[arg(long)]
        driver: i64,
    },
    /// Replace the driver of an existing assignment
    Edit {
        /// Assignment ID
        id: i64,
        #[arg(long)]
        driver: i64,
    },
    /// Archive an assignment
    Archive {
        /// Assignment ID
        id: i64,
    },
    /// Pair an operator with a van
    Create {
        #[arg(long)]
        operator: i64,
        #[arg(long)]
        van: i64,
        #[arg(long)]
        driver: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PeopleCommands {
    /// List operators and drivers, one page at a time
    List {
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Show one operator or driver
    Show { role: Role, id: i64 },
    /// Archive an operator or driver
    Archive {
        role: Role,
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum VansCommands {
    List,
    /// Register a van by plate number
    Add { plate_number: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Registration fields, named as on the wire
#[derive(Args, Debug, Default)]
pub struct RegisterArgs {
    #[arg(long)]
    pub firstname: Option<String>,
    #[arg(long)]
    pub middlename: Option<String>,
    #[arg(long)]
    pub lastname: Option<String>,
    #[arg(long)]
    pub contact: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub brgy: Option<String>,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long = "type")]
    pub kind: Option<String>,
    #[arg(long)]
    pub emergency_name: Option<String>,
    #[arg(long)]
    pub emergency_address: Option<String>,
    #[arg(long)]
    pub emergency_contact: Option<String>,
    #[arg(long)]
    pub license_no: Option<String>,
    #[arg(long)]
    pub dl_codes: Option<String>,
    #[arg(long)]
    pub conditions: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub expiration_date: Option<String>,
}

impl RegisterArgs {
    fn values(&self) -> Vec<(&'static str, Option<&String>)> {
        vec![
            ("firstname", self.firstname.as_ref()),
            ("middlename", self.middlename.as_ref()),
            ("lastname", self.lastname.as_ref()),
            ("contact", self.contact.as_ref()),
            ("region", self.region.as_ref()),
            ("city", self.city.as_ref()),
            ("brgy", self.brgy.as_ref()),
            ("street", self.street.as_ref()),
            ("type", self.kind.as_ref()),
            ("emergency_name", self.emergency_name.as_ref()),
            ("emergency_address", self.emergency_address.as_ref()),
            ("emergency_contact", self.emergency_contact.as_ref()),
            ("license_no", self.license_no.as_ref()),
            ("dl_codes", self.dl_codes.as_ref()),
            ("conditions", self.conditions.as_ref()),
            ("expiration_date", self.expiration_date.as_ref()),
        ]
    }
}

fn create_client(cli: &Cli, config: &Config) -> Result<HttpDispatchClient> {
    let url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config.console.api_url.clone());
    HttpDispatchClient::new(url).context("Failed to create HTTP client")
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: &Config) -> Result<()> {
    let Some(command) = &cli.command else {
        // No subcommand means start the server - handled in main.rs
        return Ok(());
    };

    if let Commands::Config(ConfigCommands::Check) = command {
        return cmd_config_check(cli);
    }

    let client = create_client(cli, config)?;
    match command {
        Commands::Assignments(cmd) => cmd_assignments(client, config, cmd).await,
        Commands::People(cmd) => cmd_people(client, config, cmd).await,
        Commands::Register { role, fields } => cmd_register(client, config, *role, fields).await,
        Commands::Vans(cmd) => cmd_vans(client, cmd).await,
        Commands::Config(_) => Ok(()),
    }
}

/// Print an info banner, or fail with the error banner's message
fn report(notification: &Notification) -> Result<()> {
    match notification {
        Notification::Error { message } => anyhow::bail!("{}", message),
        Notification::Info { message, .. } => {
            println!("[OK] {}", message);
            Ok(())
        }
        Notification::None => Ok(()),
    }
}

async fn cmd_assignments(
    client: HttpDispatchClient,
    config: &Config,
    cmd: &AssignmentsCommands,
) -> Result<()> {
    if let AssignmentsCommands::Create {
        operator,
        van,
        driver,
    } = cmd
    {
        let req = CreateAssignmentRequest {
            operator_id: *operator,
            van_id: *van,
            driver_id: *driver,
        };
        let assignment = client
            .create_assignment(&req)
            .await
            .context("Failed to create assignment")?;
        println!("[OK] Assignment {} created: {}", assignment.id, assignment.label());
        return Ok(());
    }

    let drivers = client
        .list_drivers()
        .await
        .context("Failed to fetch drivers. Is dispatchr running?")?;
    let mut form = AssignDriversForm::new(client, drivers, config.console.release_archived_drivers);
    form.fetch_assignments()
        .await
        .context("Failed to fetch assignments")?;

    match cmd {
        AssignmentsCommands::List => {
            let rows = form.assignments_with_drivers();
            if rows.is_empty() {
                println!("No assignments with a driver.");
                return Ok(());
            }

            println!();
            println!(
                "{:<6}  {:<24}  {:<12}  {:<24}",
                "ID", "OPERATOR", "VAN", "DRIVER"
            );
            println!("{}", "-".repeat(72));
            for a in rows {
                let driver = a
                    .driver
                    .as_ref()
                    .map(|d| d.display_name())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<6}  {:<24}  {:<12}  {:<24}",
                    a.id,
                    truncate(&a.operator.display_name(), 24),
                    a.van.plate_number,
                    truncate(&driver, 24)
                );
            }
            println!();
        }
        AssignmentsCommands::Available => {
            let drivers = form.available_drivers();
            if drivers.is_empty() {
                println!("No available drivers.");
                return Ok(());
            }

            println!();
            println!("{:<6}  {:<30}  {:<16}", "ID", "NAME", "LICENSE");
            println!("{}", "-".repeat(56));
            for d in drivers {
                println!(
                    "{:<6}  {:<30}  {:<16}",
                    d.id,
                    truncate(&d.details.full_name(), 30),
                    d.license.license_no
                );
            }
            println!();
        }
        AssignmentsCommands::Assign { assignment, driver } => {
            form.select_assignment(Some(*assignment));
            form.select_driver(Some(*driver));
            form.handle_assign_driver().await;
            report(form.notification())?;
        }
        AssignmentsCommands::Edit { id, driver } => {
            if !form.handle_edit_assignment(*id) {
                anyhow::bail!("Assignment not found: {}", id);
            }
            println!("{} #{}", form.submit_label(), id);
            form.select_driver(Some(*driver));
            form.handle_assign_driver().await;
            report(form.notification())?;
        }
        AssignmentsCommands::Archive { id } => {
            form.handle_archive_assignment(*id).await;
            report(form.notification())?;
        }
        AssignmentsCommands::Create { .. } => {}
    }

    Ok(())
}

async fn cmd_people(
    client: HttpDispatchClient,
    config: &Config,
    cmd: &PeopleCommands,
) -> Result<()> {
    let mut directory = PeopleDirectory::from_config(client, &config.console);
    directory
        .fetch_all()
        .await
        .context("Failed to fetch people. Is dispatchr running?")?;

    match cmd {
        PeopleCommands::List { page } => {
            if directory.is_empty() {
                println!("No operators or drivers found.");
                return Ok(());
            }

            directory.go_to_page(*page);

            println!();
            println!(
                "{:<9}  {:<6}  {:<30}  {:<14}  {:<16}",
                "ROLE", "ID", "NAME", "CONTACT", "CITY"
            );
            println!("{}", "-".repeat(83));
            for person in directory.current_page_rows() {
                let d = person.details();
                println!(
                    "{:<9}  {:<6}  {:<30}  {:<14}  {:<16}",
                    person.role(),
                    person.id(),
                    truncate(&d.full_name(), 30),
                    d.contact,
                    truncate(&d.city, 16)
                );
            }
            println!();
            println!(
                "Page {} of {}{}{}",
                directory.current_page(),
                directory.total_pages(),
                if directory.has_previous_page() { "  [prev]" } else { "" },
                if directory.has_next_page() { "  [next]" } else { "" },
            );
            println!();
        }
        PeopleCommands::Show { role, id } => {
            if !directory.handle_view(PersonKey::new(*role, *id)) {
                anyhow::bail!("{} not found: {}", role, id);
            }
            if let Some(person) = directory.selected() {
                print_person(&person);
            }
            directory.close_view();
        }
        PeopleCommands::Archive { role, id, yes } => {
            let key = PersonKey::new(*role, *id);
            if !directory.handle_archive(key) {
                anyhow::bail!("{} not found: {}", role, id);
            }

            if !*yes && !confirm(&format!("Archive {} #{}?", role.to_string().to_lowercase(), id))? {
                directory.cancel_archive();
                println!("Cancelled.");
                return Ok(());
            }

            directory.confirm_archive().await;
            report(directory.notification())?;
        }
    }

    Ok(())
}

fn print_person(person: &Person<'_>) {
    let d = person.details();

    println!();
    println!("=== {}: {} ===", person.role(), d.full_name());
    println!();
    println!("ID:         {}", person.id());
    println!("Contact:    {}", d.contact);
    println!(
        "Address:    {}, {}, {}, {}",
        d.street, d.brgy, d.city, d.region
    );
    if !d.kind.is_empty() {
        println!("Type:       {}", d.kind);
    }
    println!();
    println!("Emergency contact:");
    println!("  Name:     {}", d.emergency_name);
    println!("  Address:  {}", d.emergency_address);
    println!("  Contact:  {}", d.emergency_contact);

    if let Some(license) = person.license() {
        println!();
        println!("License:");
        println!("  Number:   {}", license.license_no);
        println!("  Codes:    {}", license.dl_codes);
        println!("  Conditions: {}", license.conditions);
        println!("  Expires:  {}", license.expiration_date);
    }
    println!();
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn cmd_register(
    client: HttpDispatchClient,
    config: &Config,
    role: Role,
    fields: &RegisterArgs,
) -> Result<()> {
    let mut directory = PeopleDirectory::from_config(client, &config.console);

    let form = directory.form_mut();
    form.set_driver_mode(role == Role::Driver);
    for (name, value) in fields.values() {
        if let Some(value) = value {
            form.set_field(name, value.as_str())?;
        }
    }

    directory.open_register();
    directory.handle_form_submit().await;
    report(directory.notification())
}

async fn cmd_vans(client: HttpDispatchClient, cmd: &VansCommands) -> Result<()> {
    match cmd {
        VansCommands::List => {
            let vans = client
                .list_vans()
                .await
                .context("Failed to fetch vans. Is dispatchr running?")?;
            if vans.is_empty() {
                println!("No vans found.");
                return Ok(());
            }

            println!();
            println!("{:<6}  {:<12}  {:<25}", "ID", "PLATE", "REGISTERED");
            println!("{}", "-".repeat(47));
            for van in vans {
                println!("{:<6}  {:<12}  {:<25}", van.id, van.plate_number, van.created_at);
            }
            println!();
        }
        VansCommands::Add { plate_number } => {
            let req = CreateVanRequest {
                plate_number: plate_number.clone(),
            };
            match client.create_van(&req).await {
                Ok(van) => println!("[OK] Van {} registered with ID {}", van.plate_number, van.id),
                Err(e) => anyhow::bail!(
                    "{}",
                    e.server_message().unwrap_or("Failed to register van")
                ),
            }
        }
    }

    Ok(())
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("A default configuration will be used when starting the server.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("Server:");
            println!("  Host:         {}", config.server.host);
            println!("  API Port:     {}", config.server.api_port);
            println!("  Data Dir:     {}", config.server.data_dir.display());
            println!(
                "  Static Dir:   {}",
                config
                    .server
                    .static_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            println!();
            println!("Console:");
            println!("  API URL:      {}", config.console.api_url);
            println!("  Page Size:    {}", config.console.page_size);
            println!("  Alert Timeout: {}s", config.console.alert_timeout_secs);
            println!(
                "  Archived assignments release drivers: {}",
                if config.console.release_archived_drivers {
                    "Yes"
                } else {
                    "No"
                }
            );
            println!();

            if let Some(dir) = &config.server.static_dir {
                if !dir.join("index.html").exists() {
                    println!("Warnings:");
                    println!(
                        "  [!] {} has no index.html - the dashboard will not be served",
                        dir.display()
                    );
                    println!();
                }
            }

            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            println!("Please check the configuration file syntax and try again.");
            anyhow::bail!("Invalid configuration file");
        }
    }
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
