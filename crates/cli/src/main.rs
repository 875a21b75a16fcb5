use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use lib::api::{ApiClient, ProfileOwner};
use lib::auth::{AuthState, FileTokenStore};
use lib::config::{self, Config};
use lib::model::{AgentState, Collection, ItemRef, Kind, Role};
use lib::pagination::{self, PageControls};

#[derive(Parser)]
#[command(name = "bihua")]
#[command(about = "Bihua admin CLI", long_about = None)]
struct Cli {
    /// Config file path (default: BIHUA_CONFIG_PATH or ~/.bihua/config.json)
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config.json.
    Init,

    /// Store an access token; later commands send it as a bearer token.
    Login {
        #[arg(long, value_name = "TOKEN")]
        token: String,
    },

    /// Remove the stored access token.
    Logout,

    /// List one page of residents, groups or models.
    List {
        /// residents, groups or models
        kind: Kind,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Print one record as JSON.
    Show { kind: Kind, id: String },

    /// Update a resident or a group. Omitted fields keep their current value.
    Edit {
        #[command(subcommand)]
        target: EditTarget,
    },

    /// Read or replace the profile text of a resident or group.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Register a new resident.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Start or stop all agents.
    Agents {
        #[command(subcommand)]
        action: AgentsAction,
    },
}

#[derive(Subcommand)]
enum EditTarget {
    Resident {
        id: String,
        #[arg(long)]
        display_name: Option<String>,
        /// Empty string clears the email
        #[arg(long)]
        email: Option<String>,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
        #[arg(long, value_enum)]
        agent: Option<AgentArg>,
    },
    Group {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        public: Option<bool>,
        /// Empty string clears the avatar
        #[arg(long)]
        avatar_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    Get { kind: Kind, id: String },
    /// Text is sent verbatim.
    Set { kind: Kind, id: String, text: String },
}

#[derive(Subcommand)]
enum AgentsAction {
    Run,
    Stop,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    User,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Role::Admin,
            RoleArg::User => Role::User,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AgentArg {
    Enabled,
    Disabled,
}

impl From<AgentArg> for AgentState {
    fn from(arg: AgentArg) -> Self {
        match arg {
            AgentArg::Enabled => AgentState::Enabled,
            AgentArg::Disabled => AgentState::Disabled,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Run with --help for usage");
        return;
    };
    if let Err(e) = run(cli.config, command).await {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config_path: Option<PathBuf>, command: Commands) -> anyhow::Result<()> {
    if let Commands::Version = command {
        println!("bihua {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if let Commands::Init = command {
        let path = config_path.unwrap_or_else(config::default_config_path);
        let dir = config::init_config_dir(&path)?;
        println!("initialized configuration at {}", dir.display());
        return Ok(());
    }

    let (config, path) = config::load_config(config_path)?;
    let store = Arc::new(FileTokenStore::in_dir(&config::config_dir(&path)));
    let token_path = store.path().to_path_buf();
    let mut auth = AuthState::new(store);

    match command {
        Commands::Login { token } => {
            if !auth.login(&token)? {
                anyhow::bail!("token is blank");
            }
            println!("signed in; token stored at {}", token_path.display());
        }
        Commands::Logout => {
            auth.logout()?;
            println!("signed out");
        }
        Commands::List { kind, page } => {
            let collection = client(&config, &auth).fetch_collection(kind).await?;
            print_page(&collection, page);
        }
        Commands::Show { kind, id } => {
            let collection = client(&config, &auth).fetch_collection(kind).await?;
            let item = collection
                .find(&id)
                .ok_or_else(|| anyhow::anyhow!("{} not found in {}", id, kind))?;
            println!("{}", item_json(item)?);
        }
        Commands::Edit { target } => run_edit(client(&config, &auth), target).await?,
        Commands::Profile { action } => {
            let api = client(&config, &auth);
            match action {
                ProfileAction::Get { kind, id } => {
                    let owner = profile_owner(kind)?;
                    println!("{}", api.fetch_profile(owner, &id).await?);
                }
                ProfileAction::Set { kind, id, text } => {
                    let owner = profile_owner(kind)?;
                    api.save_profile(owner, &id, &text).await?;
                    println!("profile saved");
                }
            }
        }
        Commands::Register { username, password } => {
            client(&config, &auth).register(&username, &password).await?;
            println!("registered {}", username);
        }
        Commands::Agents { action } => {
            let api = client(&config, &auth);
            match action {
                AgentsAction::Run => api.run_agents().await?,
                AgentsAction::Stop => api.stop_agents().await?,
            }
            println!("ok");
        }
        Commands::Version | Commands::Init => {}
    }
    Ok(())
}

fn client(config: &Config, auth: &AuthState) -> ApiClient {
    ApiClient::new(config::resolve_api_base_url(config)).with_bearer(auth.bearer_token())
}

fn profile_owner(kind: Kind) -> anyhow::Result<ProfileOwner> {
    ProfileOwner::for_kind(kind).ok_or_else(|| anyhow::anyhow!("{} have no profile", kind))
}

fn item_json(item: ItemRef<'_>) -> anyhow::Result<String> {
    Ok(match item {
        ItemRef::Resident(r) => serde_json::to_string_pretty(r)?,
        ItemRef::Group(g) => serde_json::to_string_pretty(g)?,
        ItemRef::Model(m) => serde_json::to_string_pretty(m)?,
    })
}

fn print_page(collection: &Collection, page: u32) {
    let total = pagination::total_pages(collection.len());
    for item in collection.page(page) {
        match item {
            ItemRef::Resident(r) => {
                let agent = if r.is_agent { "  [agent]" } else { "" };
                println!("{}  {}{}", r.resident_id, r.display_name, agent);
            }
            ItemRef::Group(g) => {
                let private = if g.public { "" } else { "  [private]" };
                println!("{}  {}  {} members{}", g.group_id, g.name, g.size, private);
            }
            ItemRef::Model(m) => {
                println!("{}  {} {}  {}B", m.model_id, m.provider, m.version, m.size);
            }
        }
    }
    if total > 1 {
        let controls = PageControls::new(page, total);
        let pages: Vec<String> = controls
            .pages
            .iter()
            .map(|&p| {
                if p == controls.current {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        println!("page {} of {}: {}", controls.current, total, pages.join(" "));
    }
}

async fn run_edit(api: ApiClient, target: EditTarget) -> anyhow::Result<()> {
    match target {
        EditTarget::Resident {
            id,
            display_name,
            email,
            role,
            agent,
        } => {
            let collection = api.fetch_collection(Kind::Residents).await?;
            let Some(ItemRef::Resident(current)) = collection.find(&id) else {
                anyhow::bail!("resident {} not found", id);
            };
            let mut resident = current.clone();
            if let Some(name) = display_name {
                resident.display_name = name;
            }
            if let Some(email) = email {
                resident.email = Some(email).filter(|e| !e.is_empty());
            }
            if let Some(role) = role {
                resident.role = Some(role.into());
            }
            if let Some(agent) = agent {
                resident.agent = Some(agent.into());
            }
            api.update_resident(&resident).await?;
            println!("updated {}", resident.resident_id);
        }
        EditTarget::Group {
            id,
            name,
            alias,
            public,
            avatar_url,
        } => {
            let collection = api.fetch_collection(Kind::Groups).await?;
            let Some(ItemRef::Group(current)) = collection.find(&id) else {
                anyhow::bail!("group {} not found", id);
            };
            let mut group = current.clone();
            if let Some(name) = name {
                group.name = name;
            }
            if let Some(alias) = alias {
                group.alias = alias;
            }
            if let Some(public) = public {
                group.public = public;
            }
            if let Some(url) = avatar_url {
                group.avatar_url = Some(url).filter(|u| !u.is_empty());
            }
            api.update_group(&group).await?;
            println!("updated {}", group.group_id);
        }
    }
    Ok(())
}
