//! Configuration for the DynamoDB destination store.

/// Connection settings for DynamoDB.
///
/// Credentials are not part of this struct; they are resolved by the AWS SDK
/// default provider chain (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`,
/// profiles, instance roles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoDbConfig {
    /// AWS region the tables live in.
    pub region: String,
    /// Endpoint override, set when targeting DynamoDB Local.
    pub endpoint: Option<String>,
    /// Prefix prepended to every table name.
    pub table_prefix: String,
}

impl DynamoDbConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            table_prefix: String::new(),
        }
    }

    /// Point the client at a custom endpoint (e.g. `http://localhost:8000`).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }
}
