use std::sync::Arc;

use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spocli::{cli, config, error, types::AuthRequest};
use tokio::sync::Mutex;

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
  name = "spo",
  bin_name = "spo",
  author = env!("CARGO_PKG_AUTHORS"),
  about = env!("CARGO_PKG_DESCRIPTION"),
  styles = styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in to a SharePoint Online site
    Login(LoginOptions),

    /// Sign out and discard the cached session
    Logout,

    /// Show the current connection
    Status,

    /// Manage apps in the tenant app catalog
    App(AppOptions),

    /// Manage site collections
    Site(SiteOptions),

    /// Manage site designs
    #[clap(name = "sitedesign")]
    SiteDesign(SiteDesignOptions),

    /// Manage site scripts
    #[clap(name = "sitescript")]
    SiteScript(SiteScriptOptions),

    /// Manage tenant properties (storage entities)
    #[clap(name = "storageentity")]
    StorageEntity(StorageEntityOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LoginOptions {
    /// URL of the SharePoint Online site to connect to,
    /// e.g. https://contoso.sharepoint.com
    url: String,
}

#[derive(Parser, Debug, Clone)]
pub struct AppOptions {
    #[command(subcommand)]
    pub command: AppSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AppSubcommand {
    /// Upload a .sppkg package to the tenant app catalog
    Add(AppAddOpts),

    /// Deploy an app in the tenant app catalog
    Deploy(AppDeployOpts),

    /// Show an app from the tenant app catalog
    Get(AppIdOpts),

    /// List apps in the tenant app catalog
    List,

    /// Remove an app from the tenant app catalog
    Remove(AppRemoveOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct AppAddOpts {
    /// Path to the .sppkg solution package
    file: String,

    /// Overwrite a package with the same name
    #[clap(long)]
    overwrite: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AppDeployOpts {
    /// Id of the app
    id: String,

    /// Make the app available tenant-wide without per-site installation
    #[clap(long)]
    skip_feature_deployment: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AppIdOpts {
    /// Id of the app
    id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct AppRemoveOpts {
    /// Id of the app
    id: String,

    /// Skip the confirmation prompt
    #[clap(long)]
    confirm: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SiteOptions {
    #[command(subcommand)]
    pub command: SiteSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SiteSubcommand {
    /// Create a modern team or communication site
    Add(SiteAddOpts),

    /// Show the properties of a site collection
    Get(SiteGetOpts),

    /// Manage classic site collections via the tenant admin API
    Classic(ClassicOptions),
}

#[derive(Parser, Debug, Clone)]
pub struct SiteAddOpts {
    /// URL of the new site collection
    #[clap(long)]
    url: String,

    /// Title of the new site collection
    #[clap(long)]
    title: String,

    /// Type of site to create
    #[clap(long = "type", default_value = "TeamSite")]
    site_type: String,

    /// Login name of the site owner
    #[clap(long)]
    owner: String,

    /// Description of the new site collection
    #[clap(long)]
    description: Option<String>,

    /// Data classification label
    #[clap(long)]
    classification: Option<String>,

    /// Locale id of the site
    #[clap(long, default_value_t = 1033)]
    lcid: u32,

    /// Allow sharing files by email
    #[clap(long)]
    share_by_email: bool,

    /// Built-in site design for communication sites (Topic, Showcase, Blank)
    #[clap(long)]
    site_design: Option<String>,

    /// Id of a custom site design to apply
    #[clap(long)]
    site_design_id: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SiteGetOpts {
    /// URL of the site collection; defaults to the connected site
    url: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ClassicOptions {
    #[command(subcommand)]
    pub command: ClassicSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ClassicSubcommand {
    /// Create a classic site collection
    Add(ClassicAddOpts),

    /// Update properties of a classic site collection
    Set(ClassicSetOpts),

    /// List classic site collections
    List(ClassicListOpts),

    /// Remove a classic site collection
    Remove(ClassicRemoveOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct ClassicAddOpts {
    /// URL of the new site collection
    #[clap(long)]
    url: String,

    /// Title of the new site collection
    #[clap(long)]
    title: String,

    /// Login name of the site collection administrator
    #[clap(long)]
    owner: String,

    /// Web template to provision, e.g. STS#0
    #[clap(long, default_value = "STS#0")]
    template: String,

    /// Time zone id of the site collection
    #[clap(long)]
    time_zone: i32,

    /// Locale id of the site
    #[clap(long, default_value_t = 1033)]
    lcid: u32,

    /// Storage quota in megabytes
    #[clap(long, default_value_t = 100)]
    storage_quota: i64,

    /// Storage quota warning level in megabytes
    #[clap(long, default_value_t = 100)]
    storage_quota_warning: i64,

    /// Resource quota in sandboxed solution points
    #[clap(long, default_value_t = 0.0)]
    resource_quota: f64,

    /// Resource quota warning level
    #[clap(long, default_value_t = 0.0)]
    resource_quota_warning: f64,

    /// Wait until the provisioning completes
    #[clap(long)]
    wait: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ClassicSetOpts {
    /// URL of the site collection to update
    url: String,

    /// New title
    #[clap(long)]
    title: Option<String>,

    /// External sharing capability (Disabled, ExternalUserSharingOnly,
    /// ExternalUserAndGuestSharing, ExistingExternalUserSharingOnly)
    #[clap(long)]
    sharing: Option<String>,

    /// Storage quota in megabytes
    #[clap(long)]
    storage_quota: Option<i64>,

    /// Storage quota warning level in megabytes
    #[clap(long)]
    storage_quota_warning: Option<i64>,

    /// Resource quota in sandboxed solution points
    #[clap(long)]
    resource_quota: Option<f64>,

    /// Resource quota warning level
    #[clap(long)]
    resource_quota_warning: Option<f64>,

    /// Allow upgrading the site collection to a newer version
    #[clap(long)]
    allow_self_service_upgrade: Option<bool>,

    /// Lock state of the site (Unlock, NoAccess)
    #[clap(long)]
    lock_state: Option<String>,

    /// Prevent users from customizing pages with script
    #[clap(long)]
    no_script: Option<bool>,

    /// Wait until the update completes
    #[clap(long)]
    wait: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ClassicListOpts {
    /// Substring the site URL has to contain
    #[clap(long)]
    filter: Option<String>,

    /// Web template the sites were provisioned from
    #[clap(long)]
    template: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ClassicRemoveOpts {
    /// URL of the site collection to remove
    url: String,

    /// Wait until the removal completes
    #[clap(long)]
    wait: bool,

    /// Skip the confirmation prompt
    #[clap(long)]
    confirm: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SiteDesignOptions {
    #[command(subcommand)]
    pub command: SiteDesignSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SiteDesignSubcommand {
    /// Register a new site design
    Add(SiteDesignAddOpts),

    /// Apply a site design to an existing site
    Apply(SiteDesignApplyOpts),

    /// Show a site design
    Get(SiteDesignIdOpts),

    /// List site designs registered in the tenant
    List,

    /// Remove a site design
    Remove(SiteDesignRemoveOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct SiteDesignAddOpts {
    /// Title of the site design
    #[clap(long)]
    title: String,

    /// Web template the design targets (TeamSite, CommunicationSite)
    #[clap(long)]
    web_template: String,

    /// Id of a site script to run; can be repeated
    #[clap(
        long = "site-script",
        action = ArgAction::Append,
        num_args = 1,
        required = true
    )]
    site_scripts: Vec<String>,

    /// Description of the site design
    #[clap(long)]
    description: Option<String>,

    /// URL of a preview image
    #[clap(long)]
    preview_image_url: Option<String>,

    /// Alt text for the preview image
    #[clap(long)]
    preview_image_alt_text: Option<String>,

    /// Offer this design as the default for its template
    #[clap(long)]
    is_default: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SiteDesignApplyOpts {
    /// Id of the site design
    id: String,

    /// URL of the site to apply the design to
    #[clap(long)]
    web_url: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SiteDesignIdOpts {
    /// Id of the site design
    id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SiteDesignRemoveOpts {
    /// Id of the site design
    id: String,

    /// Skip the confirmation prompt
    #[clap(long)]
    confirm: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SiteScriptOptions {
    #[command(subcommand)]
    pub command: SiteScriptSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SiteScriptSubcommand {
    /// Register a new site script from a JSON file
    Add(SiteScriptAddOpts),

    /// Show a site script including its content
    Get(SiteScriptIdOpts),

    /// List site scripts registered in the tenant
    List,

    /// Remove a site script
    Remove(SiteScriptRemoveOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct SiteScriptAddOpts {
    /// Path to the site script JSON file
    file: String,

    /// Title of the site script
    #[clap(long)]
    title: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SiteScriptIdOpts {
    /// Id of the site script
    id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SiteScriptRemoveOpts {
    /// Id of the site script
    id: String,

    /// Skip the confirmation prompt
    #[clap(long)]
    confirm: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct StorageEntityOptions {
    #[command(subcommand)]
    pub command: StorageEntitySubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum StorageEntitySubcommand {
    /// Show a tenant property
    Get(StorageEntityKeyOpts),

    /// List all tenant properties
    List,

    /// Set a tenant property
    Set(StorageEntitySetOpts),

    /// Remove a tenant property
    Remove(StorageEntityRemoveOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct StorageEntityKeyOpts {
    /// Key of the tenant property
    key: String,
}

#[derive(Parser, Debug, Clone)]
pub struct StorageEntitySetOpts {
    /// Key of the tenant property
    key: String,

    /// Value to store
    value: String,

    /// Description of the property
    #[clap(long)]
    description: Option<String>,

    /// Comment on the property
    #[clap(long)]
    comment: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct StorageEntityRemoveOpts {
    /// Key of the tenant property
    key: String,

    /// Skip the confirmation prompt
    #[clap(long)]
    confirm: bool,
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
        Command::Login(opt) => {
            let oauth_result: Arc<Mutex<Option<AuthRequest>>> = Arc::new(Mutex::new(None));
            cli::auth::login(opt.url, Arc::clone(&oauth_result)).await;
        }
        Command::Logout => cli::auth::logout().await,
        Command::Status => cli::auth::status().await,

        Command::App(opt) => match opt.command {
            AppSubcommand::Add(o) => cli::app::add(o.file, o.overwrite).await,
            AppSubcommand::Deploy(o) => cli::app::deploy(o.id, o.skip_feature_deployment).await,
            AppSubcommand::Get(o) => cli::app::get(o.id).await,
            AppSubcommand::List => cli::app::list().await,
            AppSubcommand::Remove(o) => cli::app::remove(o.id, o.confirm).await,
        },

        Command::Site(opt) => match opt.command {
            SiteSubcommand::Add(o) => {
                cli::site::add(cli::site::SiteAddArgs {
                    site_type: o.site_type,
                    url: o.url,
                    title: o.title,
                    owner: o.owner,
                    description: o.description,
                    classification: o.classification,
                    lcid: o.lcid,
                    share_by_email: o.share_by_email,
                    site_design: o.site_design,
                    site_design_id: o.site_design_id,
                })
                .await
            }
            SiteSubcommand::Get(o) => cli::site::get(o.url).await,
            SiteSubcommand::Classic(classic) => match classic.command {
                ClassicSubcommand::Add(o) => {
                    cli::site::classic_add(cli::site::ClassicAddArgs {
                        url: o.url,
                        title: o.title,
                        owner: o.owner,
                        template: o.template,
                        time_zone: o.time_zone,
                        lcid: o.lcid,
                        storage_quota: o.storage_quota,
                        storage_quota_warning: o.storage_quota_warning,
                        resource_quota: o.resource_quota,
                        resource_quota_warning: o.resource_quota_warning,
                        wait: o.wait,
                    })
                    .await
                }
                ClassicSubcommand::Set(o) => {
                    cli::site::classic_set(cli::site::ClassicSetArgs {
                        url: o.url,
                        title: o.title,
                        sharing: o.sharing,
                        storage_quota: o.storage_quota,
                        storage_quota_warning: o.storage_quota_warning,
                        resource_quota: o.resource_quota,
                        resource_quota_warning: o.resource_quota_warning,
                        allow_self_service_upgrade: o.allow_self_service_upgrade,
                        lock_state: o.lock_state,
                        no_script: o.no_script,
                        wait: o.wait,
                    })
                    .await
                }
                ClassicSubcommand::List(o) => cli::site::classic_list(o.filter, o.template).await,
                ClassicSubcommand::Remove(o) => {
                    cli::site::classic_remove(o.url, o.wait, o.confirm).await
                }
            },
        },

        Command::SiteDesign(opt) => match opt.command {
            SiteDesignSubcommand::Add(o) => {
                cli::sitedesign::add(cli::sitedesign::SiteDesignAddArgs {
                    title: o.title,
                    web_template: o.web_template,
                    site_scripts: o.site_scripts,
                    description: o.description,
                    preview_image_url: o.preview_image_url,
                    preview_image_alt_text: o.preview_image_alt_text,
                    is_default: o.is_default,
                })
                .await
            }
            SiteDesignSubcommand::Apply(o) => cli::sitedesign::apply(o.id, o.web_url).await,
            SiteDesignSubcommand::Get(o) => cli::sitedesign::get(o.id).await,
            SiteDesignSubcommand::List => cli::sitedesign::list().await,
            SiteDesignSubcommand::Remove(o) => cli::sitedesign::remove(o.id, o.confirm).await,
        },

        Command::SiteScript(opt) => match opt.command {
            SiteScriptSubcommand::Add(o) => cli::sitescript::add(o.title, o.file).await,
            SiteScriptSubcommand::Get(o) => cli::sitescript::get(o.id).await,
            SiteScriptSubcommand::List => cli::sitescript::list().await,
            SiteScriptSubcommand::Remove(o) => cli::sitescript::remove(o.id, o.confirm).await,
        },

        Command::StorageEntity(opt) => match opt.command {
            StorageEntitySubcommand::Get(o) => cli::storageentity::get(o.key).await,
            StorageEntitySubcommand::List => cli::storageentity::list().await,
            StorageEntitySubcommand::Set(o) => {
                cli::storageentity::set(o.key, o.value, o.description, o.comment).await
            }
            StorageEntitySubcommand::Remove(o) => {
                cli::storageentity::remove(o.key, o.confirm).await
            }
        },

        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
