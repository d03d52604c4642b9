//! AWS API Gateway v2, through the AWS SDK.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_apigatewayv2::config::{Credentials, Region};
use aws_sdk_apigatewayv2::error::DisplayErrorContext;
use aws_sdk_apigatewayv2::primitives::DateTimeFormat;
use aws_sdk_apigatewayv2::types::{Api, Cors};
use aws_sdk_apigatewayv2::Client;
use tracing::debug;

use crate::config::AwsConfig;
use crate::error::{ApimError, ApimResult};
use crate::models::{AwsApi, AwsCorsConfiguration};

/// The part of API Gateway the export needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Every API in the region, across all pages.
    async fn list_apis(&self) -> ApimResult<Vec<AwsApi>>;

    /// OpenAPI 3.0 JSON export of one API.
    async fn export_openapi(&self, api_id: &str) -> ApimResult<Vec<u8>>;
}

pub struct SdkApiGateway {
    client: Client,
}

impl SdkApiGateway {
    /// Static credentials from the config when both halves are set, otherwise
    /// the SDK's default provider chain.
    pub async fn connect(config: &AwsConfig, region: &str) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

        if let Some((key, secret)) = config.static_credentials() {
            loader = loader.credentials_provider(Credentials::new(
                key.to_string(),
                secret.to_string(),
                None,
                None,
                "apimsync",
            ));
        }

        let sdk_config = loader.load().await;
        Self {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl ApiGateway for SdkApiGateway {
    async fn list_apis(&self) -> ApimResult<Vec<AwsApi>> {
        let mut apis = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .get_apis()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| ApimError::Aws(DisplayErrorContext(&e).to_string()))?;

            apis.extend(output.items().iter().map(to_aws_api));

            match output.next_token().filter(|t| !t.is_empty()) {
                Some(token) => {
                    debug!("Fetching next page of AWS APIs");
                    next_token = Some(token.to_string());
                }
                None => break,
            }
        }

        Ok(apis)
    }

    async fn export_openapi(&self, api_id: &str) -> ApimResult<Vec<u8>> {
        let output = self
            .client
            .export_api()
            .api_id(api_id)
            .output_type("JSON")
            .specification("OAS30")
            .send()
            .await
            .map_err(|e| ApimError::Aws(DisplayErrorContext(&e).to_string()))?;

        output
            .body()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| ApimError::Aws(format!("Export of {} returned no body", api_id)))
    }
}

fn to_aws_api(api: &Api) -> AwsApi {
    AwsApi {
        api_id: text(api.api_id()),
        name: text(api.name()),
        description: text(api.description()),
        version: text(api.version()),
        protocol_type: api
            .protocol_type()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default(),
        route_selection_expression: text(api.route_selection_expression()),
        api_key_selection_expression: text(api.api_key_selection_expression()),
        disable_schema_validation: api.disable_schema_validation().unwrap_or_default(),
        warnings: api.warnings().to_vec(),
        import_info: api.import_info().to_vec(),
        api_endpoint: text(api.api_endpoint()),
        api_gateway_managed: api.api_gateway_managed().unwrap_or_default(),
        created_date: api
            .created_date()
            .and_then(|d| d.fmt(DateTimeFormat::DateTime).ok())
            .unwrap_or_default(),
        tags: api.tags().cloned().unwrap_or_default().into_iter().collect(),
        disable_execute_api_endpoint: api.disable_execute_api_endpoint().unwrap_or_default(),
        cors_configuration: api.cors_configuration().map(to_cors),
    }
}

fn to_cors(cors: &Cors) -> AwsCorsConfiguration {
    AwsCorsConfiguration {
        allow_credentials: cors.allow_credentials().unwrap_or_default(),
        allow_headers: cors.allow_headers().to_vec(),
        allow_methods: cors.allow_methods().to_vec(),
        allow_origins: cors.allow_origins().to_vec(),
        expose_headers: cors.expose_headers().to_vec(),
        max_age: cors.max_age().unwrap_or_default(),
    }
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_apigatewayv2::types::ProtocolType;

    #[test]
    fn test_converts_sdk_api() {
        let api = Api::builder()
            .api_id("a1b2")
            .name("Pets API")
            .protocol_type(ProtocolType::Http)
            .route_selection_expression("$request.method $request.path")
            .api_endpoint("https://a1b2.execute-api.eu-west-1.amazonaws.com")
            .version("2")
            .tags("team", "pets")
            .cors_configuration(
                Cors::builder()
                    .allow_origins("*")
                    .allow_methods("GET")
                    .max_age(300)
                    .build(),
            )
            .build();

        let converted = to_aws_api(&api);
        assert_eq!(converted.api_id, "a1b2");
        assert_eq!(converted.name, "Pets API");
        assert_eq!(converted.protocol_type, "HTTP");
        assert_eq!(converted.version, "2");
        assert_eq!(converted.description, "");
        assert_eq!(converted.tags.get("team").map(String::as_str), Some("pets"));

        let cors = converted.cors_configuration.unwrap();
        assert_eq!(cors.allow_origins, vec!["*"]);
        assert_eq!(cors.max_age, 300);
        assert!(!cors.allow_credentials);
    }
}
