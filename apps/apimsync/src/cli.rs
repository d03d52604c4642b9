//! Command-line surface: one subcommand group per platform.
//!
//! Connection flags are declared on the platform group and are global, so
//! `apimsync apigee apis export --project p` and
//! `apimsync apigee --project p apis export` mean the same thing. Flags win
//! over the matching environment variables.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use domain_apim::{ApigeeConfig, AwsConfig, AzureConfig, Platform};

#[derive(Parser)]
#[command(name = "apimsync", version)]
#[command(about = "Copy API metadata between API management platforms")]
pub struct Cli {
    /// Root of the local store (defaults to APIMSYNC_DATA_DIR, then data/src/main)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apigee X proxies
    Apigee {
        #[command(flatten)]
        google: GoogleArgs,

        #[command(subcommand)]
        command: ApigeeCommands,
    },

    /// Azure API Management
    Azure {
        #[command(flatten)]
        azure: AzureArgs,

        #[command(subcommand)]
        command: AzureCommands,
    },

    /// AWS API Gateway (HTTP and WebSocket APIs)
    Aws {
        #[command(flatten)]
        aws: AwsArgs,

        #[command(subcommand)]
        command: AwsCommands,
    },

    /// Apigee API Hub
    Apihub {
        #[command(flatten)]
        google: GoogleArgs,

        #[command(subcommand)]
        command: ApihubCommands,
    },

    /// Canonical records shared by every platform
    General {
        #[command(subcommand)]
        command: GeneralCommands,
    },

    /// Web service
    Ws {
        #[command(subcommand)]
        command: WsCommands,
    },

    /// Check connectivity of every platform
    Status,
}

#[derive(Subcommand)]
pub enum ApigeeCommands {
    #[command(subcommand)]
    Apis(ApigeeApisCommands),

    #[command(subcommand)]
    Test(ApigeeTestCommands),
}

#[derive(Subcommand)]
pub enum ApigeeApisCommands {
    /// Download and extract the latest revision of each proxy
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Skip proxies that already have a local copy
        #[arg(long)]
        only_new: bool,
    },

    /// Upload local proxy bundles
    Import {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Delete proxies from the organization
    Clean {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Subcommand)]
pub enum ApigeeTestCommands {
    /// Write developer, product and app fixtures for the environment
    Init,
}

#[derive(Subcommand)]
pub enum AzureCommands {
    #[command(subcommand)]
    Service(AzureServiceCommands),

    #[command(subcommand)]
    Apis(AzureApisCommands),
}

#[derive(Subcommand)]
pub enum AzureServiceCommands {
    /// Save the API Management service record
    Export,
}

#[derive(Subcommand)]
pub enum AzureApisCommands {
    /// Save API records and their schemas
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Skip APIs that already have a local copy
        #[arg(long)]
        only_new: bool,
    },

    /// Convert exported APIs to general records
    Offramp {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Subcommand)]
pub enum AwsCommands {
    #[command(subcommand)]
    Apis(AwsApisCommands),
}

#[derive(Subcommand)]
pub enum AwsApisCommands {
    /// Save API records and their OpenAPI exports
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Skip APIs that already have a local copy
        #[arg(long)]
        only_new: bool,
    },

    /// Convert exported APIs to general records
    Offramp {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Subcommand)]
pub enum ApihubCommands {
    #[command(subcommand)]
    Apis(ApihubApisCommands),
}

#[derive(Subcommand)]
pub enum ApihubApisCommands {
    /// Build hub payloads from general records
    Onramp {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Create APIs, deployments, versions and specs in the hub
    Import {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Delete APIs and deployments from the hub
    Clean {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Subcommand)]
pub enum GeneralCommands {
    #[command(subcommand)]
    Apis(GeneralApisCommands),
}

#[derive(Subcommand)]
pub enum GeneralApisCommands {
    /// Remove the local data of one platform
    Cleanlocal {
        /// apigee, azure, aws, apihub or general
        #[arg(long, default_value = "general")]
        platform: Platform,
    },
}

#[derive(Subcommand)]
pub enum WsCommands {
    /// Serve the /v1/apim endpoints
    Start {
        /// Listen port (defaults to PORT, then 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only handle the API with this name
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GoogleArgs {
    /// Google Cloud project
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Google Cloud region
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Bearer token, skipping application default credentials
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Apigee environment
    #[arg(long, global = true)]
    pub environment: Option<String>,
}

impl From<GoogleArgs> for ApigeeConfig {
    fn from(args: GoogleArgs) -> Self {
        Self {
            project: args.project,
            region: args.region,
            token: args.token,
            environment: args.environment,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct AzureArgs {
    #[arg(long, global = true)]
    pub subscription: Option<String>,

    #[arg(long, global = true)]
    pub resource_group: Option<String>,

    /// API Management service name
    #[arg(long, global = true)]
    pub service_name: Option<String>,

    /// Bearer token, skipping the client-credentials grant
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[arg(long, global = true)]
    pub tenant_id: Option<String>,

    #[arg(long, global = true)]
    pub client_id: Option<String>,

    #[arg(long, global = true)]
    pub client_secret: Option<String>,
}

impl From<AzureArgs> for AzureConfig {
    fn from(args: AzureArgs) -> Self {
        Self {
            subscription_id: args.subscription,
            resource_group: args.resource_group,
            service_name: args.service_name,
            token: args.token,
            tenant_id: args.tenant_id,
            client_id: args.client_id,
            client_secret: args.client_secret,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct AwsArgs {
    #[arg(long, global = true)]
    pub region: Option<String>,

    #[arg(long, global = true)]
    pub access_key_id: Option<String>,

    #[arg(long, global = true)]
    pub secret_access_key: Option<String>,
}

impl From<AwsArgs> for AwsConfig {
    fn from(args: AwsArgs) -> Self {
        Self {
            region: args.region,
            access_key_id: args.access_key_id,
            secret_access_key: args.secret_access_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "apimsync", "apigee", "apis", "export", "--project", "p1", "--only-new", "-n", "orders",
        ])
        .unwrap();

        let Commands::Apigee { google, command } = cli.command else {
            panic!("expected apigee");
        };
        assert_eq!(google.project.as_deref(), Some("p1"));
        let ApigeeCommands::Apis(ApigeeApisCommands::Export { filter, only_new }) = command else {
            panic!("expected apis export");
        };
        assert!(only_new);
        assert_eq!(filter.name.as_deref(), Some("orders"));
    }

    #[test]
    fn test_cleanlocal_parses_platform() {
        let cli = Cli::try_parse_from([
            "apimsync", "general", "apis", "cleanlocal", "--platform", "apihub",
        ])
        .unwrap();

        let Commands::General {
            command: GeneralCommands::Apis(GeneralApisCommands::Cleanlocal { platform }),
        } = cli.command
        else {
            panic!("expected general apis cleanlocal");
        };
        assert_eq!(platform, Platform::ApiHub);
    }

    #[test]
    fn test_azure_args_map_to_config() {
        let cli = Cli::try_parse_from([
            "apimsync",
            "azure",
            "--subscription",
            "sub",
            "--resource-group",
            "rg",
            "apis",
            "offramp",
            "--service-name",
            "apim",
        ])
        .unwrap();

        let Commands::Azure { azure, .. } = cli.command else {
            panic!("expected azure");
        };
        let config = AzureConfig::from(azure);
        assert_eq!(config.subscription_id.as_deref(), Some("sub"));
        assert_eq!(config.service().unwrap().service_name, "apim");
    }
}
