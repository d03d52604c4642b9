//! apimsync
//!
//! Copies API metadata between Apigee, Azure API Management, AWS API Gateway
//! and Apigee API Hub. Runs one operation per invocation, or serves the same
//! operations over HTTP with `ws start`.

use axum_helpers::server::{create_app, create_router, health_router};
use clap::Parser;
use core_config::server::ServerConfig;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{app_info, Environment, FromEnv};
use domain_apim::handlers::{self, ApiDoc};
use domain_apim::{ApigeeConfig, ApimService, AwsConfig, AzureConfig, Report, Store, StoreConfig};
use eyre::Result;
use std::path::PathBuf;
use tracing::info;

mod cli;

use cli::{
    ApigeeApisCommands, ApigeeCommands, ApigeeTestCommands, ApihubApisCommands, ApihubCommands,
    AwsApisCommands, AwsCommands, AzureApisCommands, AzureCommands, AzureServiceCommands, Cli,
    Commands, GeneralApisCommands, GeneralCommands, WsCommands,
};

/// Settings from the environment with the flags of one invocation on top.
#[derive(Default)]
struct Overrides {
    apigee: ApigeeConfig,
    azure: AzureConfig,
    aws: AwsConfig,
}

fn build_service(data_dir: Option<PathBuf>, overrides: Overrides) -> Result<ApimService> {
    let mut store_config = StoreConfig::from_env()?;
    if let Some(data_dir) = data_dir {
        store_config.data_dir = data_dir;
    }

    let service = ApimService::new(
        Store::from_config(&store_config),
        ApigeeConfig::from_env()?.merge(overrides.apigee),
        AzureConfig::from_env()?.merge(overrides.azure),
        AwsConfig::from_env()?.merge(overrides.aws),
    )?;
    Ok(service)
}

/// Print the report; any failed item makes the run fail.
fn finish(report: Report) -> Result<()> {
    let text = report.to_string();
    if !text.is_empty() {
        println!("{}", text);
    }

    match report.failures() {
        0 => Ok(()),
        n => Err(eyre::eyre!("{} operation(s) failed", n)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::Apigee { google, command } => {
            let service = build_service(
                data_dir,
                Overrides {
                    apigee: google.into(),
                    ..Default::default()
                },
            )?;

            let report = match command {
                ApigeeCommands::Apis(ApigeeApisCommands::Export { filter, only_new }) => {
                    service.apigee_export(filter.name.as_deref(), only_new).await?
                }
                ApigeeCommands::Apis(ApigeeApisCommands::Import { filter }) => {
                    service.apigee_import(filter.name.as_deref()).await?
                }
                ApigeeCommands::Apis(ApigeeApisCommands::Clean { filter }) => {
                    service.apigee_clean(filter.name.as_deref()).await?
                }
                ApigeeCommands::Test(ApigeeTestCommands::Init) => service.apigee_test_init()?,
            };
            finish(report)
        }

        Commands::Azure { azure, command } => {
            let service = build_service(
                data_dir,
                Overrides {
                    azure: azure.into(),
                    ..Default::default()
                },
            )?;

            let report = match command {
                AzureCommands::Service(AzureServiceCommands::Export) => {
                    service.azure_service_export().await?
                }
                AzureCommands::Apis(AzureApisCommands::Export { filter, only_new }) => {
                    service.azure_export(filter.name.as_deref(), only_new).await?
                }
                AzureCommands::Apis(AzureApisCommands::Offramp { filter }) => {
                    service.azure_offramp(filter.name.as_deref())?
                }
            };
            finish(report)
        }

        Commands::Aws { aws, command } => {
            let service = build_service(
                data_dir,
                Overrides {
                    aws: aws.into(),
                    ..Default::default()
                },
            )?;

            let report = match command {
                AwsCommands::Apis(AwsApisCommands::Export { filter, only_new }) => {
                    service.aws_export(filter.name.as_deref(), only_new).await?
                }
                AwsCommands::Apis(AwsApisCommands::Offramp { filter }) => {
                    service.aws_offramp(filter.name.as_deref())?
                }
            };
            finish(report)
        }

        Commands::Apihub { google, command } => {
            let service = build_service(
                data_dir,
                Overrides {
                    apigee: google.into(),
                    ..Default::default()
                },
            )?;

            let report = match command {
                ApihubCommands::Apis(ApihubApisCommands::Onramp { filter }) => {
                    service.apihub_onramp(filter.name.as_deref())?
                }
                ApihubCommands::Apis(ApihubApisCommands::Import { filter }) => {
                    service.apihub_import(filter.name.as_deref()).await?
                }
                ApihubCommands::Apis(ApihubApisCommands::Clean { filter }) => {
                    service.apihub_clean(filter.name.as_deref()).await?
                }
            };
            finish(report)
        }

        Commands::General {
            command: GeneralCommands::Apis(GeneralApisCommands::Cleanlocal { platform }),
        } => {
            let service = build_service(data_dir, Overrides::default())?;
            finish(service.clean_local(platform)?)
        }

        Commands::Ws {
            command: WsCommands::Start { port },
        } => {
            let service = build_service(data_dir, Overrides::default())?;
            let server_config = ServerConfig::from_env()?.with_port(port);

            let router = create_router::<ApiDoc>(handlers::router(service))?
                .merge(health_router(app_info!()));

            info!(address = %server_config.address(), "Starting apimsync web service");
            create_app(router, &server_config).await?;

            info!("apimsync web service stopped");
            Ok(())
        }

        Commands::Status => {
            let service = build_service(data_dir, Overrides::default())?;
            let status = service.status_all().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
    }
}
