use std::{fmt, marker::PhantomData, sync::Arc};

use http::Method;
use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as Json};
use tracing::debug;

const RESOURCE_SERVER: &str = include_str!("../../openapi/resource-server.json");
const AUTH_SERVER: &str = include_str!("../../openapi/auth-server.json");

/// A response payload that does not conform to the published interface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("response does not match the interface at `{instance_path}` ({keyword}): {message}")]
pub struct SchemaViolation {
    /// JSON pointer to the offending value in the payload.
    pub instance_path: String,
    /// The schema keyword that rejected it.
    pub keyword: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenApiError {
    #[error("unable to parse interface description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("interface description has no operation {method} {path}")]
    MissingOperation { path: String, method: Method },
    #[error("operation {method} {path} has no JSON response schema")]
    MissingResponseSchema { path: String, method: Method },
    #[error("unable to compile schema for {method} {path}: {message}")]
    Compile {
        path: String,
        method: Method,
        message: String,
    },
}

/// Validates a decoded response payload and converts it into `T`.
pub trait ResponseValidator<T>: Send + Sync {
    fn validate(&self, payload: Json) -> Result<T, SchemaViolation>;
}

impl<T, F> ResponseValidator<T> for F
where
    F: Fn(Json) -> Result<T, SchemaViolation> + Send + Sync,
{
    fn validate(&self, payload: Json) -> Result<T, SchemaViolation> {
        self(payload)
    }
}

/// An OpenAPI 3 interface description.
#[derive(Debug, Clone)]
pub struct OpenApi(Arc<Json>);

impl OpenApi {
    /// The Open Payments resource server API.
    pub fn resource_server() -> Result<Self, OpenApiError> {
        Ok(Self::from_value(serde_json::from_str(RESOURCE_SERVER)?))
    }

    /// The Open Payments authorization server API.
    pub fn auth_server() -> Result<Self, OpenApiError> {
        Ok(Self::from_value(serde_json::from_str(AUTH_SERVER)?))
    }

    pub fn from_value(document: Json) -> Self {
        Self(Arc::new(document))
    }

    /// Compile a validator for the successful JSON response of `method path`.
    ///
    /// Compilation is comparatively expensive: create validators once and reuse them.
    pub fn create_response_validator<T>(
        &self,
        path: &str,
        method: Method,
    ) -> Result<SchemaValidator<T>, OpenApiError> {
        let operation = self
            .0
            .get("paths")
            .and_then(|paths| paths.get(path))
            .and_then(|item| item.get(method.as_str().to_ascii_lowercase()))
            .ok_or_else(|| OpenApiError::MissingOperation {
                path: path.to_owned(),
                method: method.clone(),
            })?;

        let schema = operation
            .get("responses")
            .and_then(Json::as_object)
            .into_iter()
            .flatten()
            .filter(|(status, _)| status.starts_with('2'))
            .find_map(|(_, response)| response.pointer("/content/application~1json/schema"))
            .ok_or_else(|| OpenApiError::MissingResponseSchema {
                path: path.to_owned(),
                method: method.clone(),
            })?;

        // Local `$ref`s point into `#/components`, so the compiled root must carry them.
        let mut root = json!({ "allOf": [schema] });
        if let Some(components) = self.0.get("components") {
            root["components"] = components.clone();
        }

        let compiled = JSONSchema::compile(&root).map_err(|e| OpenApiError::Compile {
            path: path.to_owned(),
            method: method.clone(),
            message: e.to_string(),
        })?;

        Ok(SchemaValidator {
            schema: Arc::new(compiled),
            operation: format!("{method} {path}"),
            _type: PhantomData,
        })
    }
}

/// A [ResponseValidator] compiled from an [OpenApi] operation.
pub struct SchemaValidator<T> {
    schema: Arc<JSONSchema>,
    operation: String,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for SchemaValidator<T> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            operation: self.operation.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SchemaValidator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned> ResponseValidator<T> for SchemaValidator<T> {
    fn validate(&self, payload: Json) -> Result<T, SchemaViolation> {
        if let Err(mut errors) = self.schema.validate(&payload) {
            // Only the first error is reported; the rest are noise for the caller.
            if let Some(error) = errors.next() {
                let schema_path = error.schema_path.to_string();
                let violation = SchemaViolation {
                    instance_path: error.instance_path.to_string(),
                    keyword: schema_path
                        .rsplit('/')
                        .next()
                        .unwrap_or_default()
                        .to_owned(),
                    message: error.to_string(),
                };
                debug!(operation = %self.operation, %violation, "response failed schema validation");
                return Err(violation);
            }
        }

        serde_json::from_value(payload).map_err(|e| SchemaViolation {
            instance_path: String::new(),
            keyword: "type".to_owned(),
            message: e.to_string(),
        })
    }
}
