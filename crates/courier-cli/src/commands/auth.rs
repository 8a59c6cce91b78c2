//! Credential and account commands.
//!
//! Provides `courier auth config|status|add|list|switch|remove|reset`. Every
//! command selects the secret backend once and works through the
//! `courier-secrets` grant registry.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::{style, Emoji};
use courier_core::{paths, SecretString};
use courier_secrets::{
    reset_all, select_backend, BackendConfig, Credentials, GrantInfo, GrantStore, Provider,
    SecretError,
};

static CHECK: Emoji = Emoji("✓", "+");
static WARN: Emoji = Emoji("⚠", "!");

/// Auth command arguments.
#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(clap::Subcommand)]
pub enum AuthCommand {
    /// Store the API key and optional OAuth application credentials
    Config {
        /// API key (if omitted, prompts for hidden input)
        #[arg(long)]
        api_key: Option<String>,

        /// OAuth client id
        #[arg(long)]
        client_id: Option<String>,

        /// OAuth client secret
        #[arg(long, requires = "client_id")]
        client_secret: Option<String>,
    },

    /// Show the credential backend, API key and default account
    Status,

    /// Register an account returned by the login flow
    Add {
        /// Grant id
        #[arg(long)]
        id: String,

        /// Account email address
        #[arg(long)]
        email: String,

        /// Email provider (google, microsoft, imap, icloud, yahoo, ews)
        #[arg(long)]
        provider: Provider,

        /// Make this the default account
        #[arg(long)]
        default: bool,
    },

    /// List connected accounts
    List,

    /// Set the default account by grant id or email
    Switch {
        /// Grant id or email address
        grant: String,
    },

    /// Remove a connected account
    Remove {
        /// Grant id
        id: String,
    },

    /// Delete all stored credentials and accounts
    Reset {
        /// Confirm the reset
        #[arg(long, short)]
        yes: bool,
    },
}

/// Run the auth command.
pub async fn run(args: AuthArgs, config_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let grants = open_registry(config_dir).await?;

    match args.command {
        AuthCommand::Config {
            api_key,
            client_id,
            client_secret,
        } => configure(&grants, api_key, client_id, client_secret).await,
        AuthCommand::Status => status(&grants).await,
        AuthCommand::Add {
            id,
            email,
            provider,
            default,
        } => add(&grants, GrantInfo::new(id, email, provider), default).await,
        AuthCommand::List => list(&grants).await,
        AuthCommand::Switch { grant } => switch(&grants, &grant).await,
        AuthCommand::Remove { id } => remove(&grants, &id).await,
        AuthCommand::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to reset without --yes");
            }
            reset_all(&grants).await;
            println!("{} All credentials and accounts removed.", style(CHECK).green());
            Ok(())
        }
    }
}

async fn open_registry(config_dir: Option<PathBuf>) -> anyhow::Result<GrantStore> {
    let dir = match config_dir {
        Some(dir) => dir,
        None => paths::secrets_dir().context("Failed to resolve config directory")?,
    };
    let store = select_backend(&BackendConfig::from_env(dir))
        .await
        .context("Failed to open credential store")?;
    Ok(GrantStore::new(store))
}

async fn configure(
    grants: &GrantStore,
    api_key: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
) -> anyhow::Result<()> {
    let api_key = match api_key {
        Some(key) => key,
        None => rpassword::prompt_password("API key: ")
            .map_err(|e| anyhow::anyhow!("Failed to read API key: {}", e))?,
    };
    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    let mut creds = Credentials::new(api_key);
    creds.client_id = client_id;
    creds.client_secret = client_secret.map(SecretString::new);
    creds.save(grants.backend().as_ref()).await?;

    println!(
        "{} Credentials saved to {}.",
        style(CHECK).green(),
        grants.backend().name()
    );
    Ok(())
}

async fn status(grants: &GrantStore) -> anyhow::Result<()> {
    let store = grants.backend();
    println!("Credential store: {}", store.name());

    match Credentials::load(store.as_ref()).await {
        Ok(creds) => println!("API key:          {}", creds.api_key.masked()),
        Err(e @ SecretError::NotConfigured) => {
            println!("API key:          {} {}", style(WARN).yellow(), e);
        }
        Err(e) => return Err(e.into()),
    }

    let list = grants.list_grants().await?;
    match grants.get_default_grant().await {
        Ok(id) => match list.iter().find(|g| g.id == id) {
            Some(g) => println!("Default account:  {} ({})", g.email, g.id),
            None => println!(
                "Default account:  {} {} (no longer connected; run 'courier auth switch')",
                style(WARN).yellow(),
                id
            ),
        },
        Err(SecretError::NoDefaultGrant) => println!("Default account:  none"),
        Err(e) => return Err(e.into()),
    }
    println!("Accounts:         {}", list.len());
    Ok(())
}

async fn add(grants: &GrantStore, info: GrantInfo, make_default: bool) -> anyhow::Result<()> {
    // Accounts are only useful once the API key exists.
    Credentials::load(grants.backend().as_ref()).await?;

    let id = info.id.clone();
    let email = info.email.clone();
    grants.save_grant(info).await?;

    let first = matches!(
        grants.get_default_grant().await,
        Err(SecretError::NoDefaultGrant)
    );
    if make_default || first {
        grants.set_default_grant(&id).await?;
    }

    println!("{} Added {} ({}).", style(CHECK).green(), email, id);
    Ok(())
}

async fn list(grants: &GrantStore) -> anyhow::Result<()> {
    let list = grants.list_grants().await?;
    if list.is_empty() {
        println!("No accounts connected.");
        return Ok(());
    }

    let default = grants.get_default_grant().await.ok();
    println!("  {:<38} {:<36} {}", "ID", "EMAIL", "PROVIDER");
    println!("{}", "-".repeat(88));
    for g in &list {
        let marker = if default.as_deref() == Some(g.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {:<38} {:<36} {}", marker, g.id, g.email, g.provider);
    }
    println!("\n{} account(s) total.", list.len());
    Ok(())
}

async fn switch(grants: &GrantStore, grant: &str) -> anyhow::Result<()> {
    let info = if grant.contains('@') {
        grants.get_grant_by_email(grant).await?
    } else {
        grants.get_grant(grant).await?
    };
    grants.set_default_grant(&info.id).await?;
    println!(
        "{} Default account is now {} ({}).",
        style(CHECK).green(),
        info.email,
        info.id
    );
    Ok(())
}

async fn remove(grants: &GrantStore, id: &str) -> anyhow::Result<()> {
    let info = grants.get_grant(id).await?;
    grants.delete_grant(id).await?;

    // The registry leaves the default pointer alone; clear it here.
    if grants.get_default_grant().await.ok().as_deref() == Some(id) {
        grants.clear_default_grant().await?;
        println!(
            "{} Removed the default account; run 'courier auth switch' to pick another.",
            style(WARN).yellow()
        );
    }

    println!("{} Removed {} ({}).", style(CHECK).green(), info.email, info.id);
    Ok(())
}
