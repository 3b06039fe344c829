// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The real [`super::Backend`], talking to a live DynamoDB table.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use tracing::debug;

use crate::constants::{TABLE_HASH_KEY_ATTR, TABLE_LABELS_ATTR, TABLE_OWNER_ATTR};
use crate::endpoint::Labels;
use crate::errors::StoreError;
use crate::retry::is_retryable_dynamo_error_code;

use super::Backend;

/// DynamoDB-backed [`Backend`].
pub struct DynamoBackend {
    client: Client,
    table_name: String,
}

impl DynamoBackend {
    /// Construct a backend for `table_name`. Does not perform I/O; call
    /// [`Backend::validate_schema`] to check the table exists.
    ///
    /// # Errors
    /// Returns [`crate::errors::ConfigError::MissingTableName`] if
    /// `table_name` is empty.
    pub fn new(client: Client, table_name: impl Into<String>) -> Result<Self, crate::errors::ConfigError> {
        let table_name = table_name.into();
        if table_name.is_empty() {
            return Err(crate::errors::ConfigError::MissingTableName);
        }
        Ok(Self { client, table_name })
    }
}

#[async_trait]
impl Backend for DynamoBackend {
    async fn validate_schema(&self) -> Result<(), StoreError> {
        let output = self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| StoreError::TableSchema(format!("describe_table failed: {e}")))?;

        let table = output
            .table
            .ok_or_else(|| StoreError::TableSchema("describe_table returned no table".into()))?;
        let key_schema = table.key_schema.unwrap_or_default();

        let hash_key_is_string = table
            .attribute_definitions
            .unwrap_or_default()
            .iter()
            .any(|a| a.attribute_name == TABLE_HASH_KEY_ATTR && a.attribute_type.as_str() == "S");
        if !hash_key_is_string {
            return Err(StoreError::TableSchema(format!(
                "table {} has no string hash attribute {TABLE_HASH_KEY_ATTR}",
                self.table_name
            )));
        }
        if key_schema.len() != 1 {
            return Err(StoreError::TableSchema(format!(
                "table {} must have exactly one key (hash only, no range key)",
                self.table_name
            )));
        }

        Ok(())
    }

    async fn scan_owner_rows(&self, owner_id: &str) -> Result<HashMap<String, Labels>, StoreError> {
        let mut labels = HashMap::new();
        let mut exclusive_start_key = None;

        loop {
            let mut request = self
                .client
                .scan()
                .table_name(&self.table_name)
                .consistent_read(true)
                .filter_expression("#o = :owner")
                .expression_attribute_names("#o", TABLE_OWNER_ATTR)
                .expression_attribute_values(":owner", AttributeValue::S(owner_id.to_string()));
            if let Some(start_key) = exclusive_start_key.take() {
                request = request.set_exclusive_start_key(Some(start_key));
            }

            let output = request.send().await.map_err(|e| classify_error("scan", &e))?;

            for item in output.items.unwrap_or_default() {
                let Some(AttributeValue::S(key)) = item.get(TABLE_HASH_KEY_ATTR) else {
                    continue;
                };
                let bag = item
                    .get(TABLE_LABELS_ATTR)
                    .and_then(|v| v.as_m().ok())
                    .map(|m| {
                        m.iter()
                            .filter_map(|(k, v)| v.as_s().ok().map(|s| (k.clone(), s.clone())))
                            .collect::<Labels>()
                    })
                    .unwrap_or_default();
                labels.insert(key.clone(), bag);
            }

            match output.last_evaluated_key {
                Some(next) => exclusive_start_key = Some(next),
                None => break,
            }
        }

        Ok(labels)
    }

    async fn put_row(
        &self,
        key: &str,
        owner_id: &str,
        labels: &Labels,
        fail_if_exists: bool,
    ) -> Result<(), StoreError> {
        let mut item = HashMap::new();
        item.insert(TABLE_HASH_KEY_ATTR.to_string(), AttributeValue::S(key.to_string()));
        item.insert(TABLE_OWNER_ATTR.to_string(), AttributeValue::S(owner_id.to_string()));
        item.insert(
            TABLE_LABELS_ATTR.to_string(),
            AttributeValue::M(
                labels
                    .iter()
                    .map(|(k, v)| (k.clone(), AttributeValue::S(v.clone())))
                    .collect(),
            ),
        );

        let mut request = self.client.put_item().table_name(&self.table_name).set_item(Some(item));
        if fail_if_exists {
            request = request
                .condition_expression("attribute_not_exists(#k)")
                .expression_attribute_names("#k", TABLE_HASH_KEY_ATTR);
        }

        request.send().await.map_err(|e| {
            if fail_if_exists && is_conditional_check_failure(&e) {
                StoreError::DuplicateClaim(key.to_string())
            } else {
                classify_error("put_item", &e)
            }
        })?;
        Ok(())
    }

    async fn delete_row(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(TABLE_HASH_KEY_ATTR, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| classify_error("delete_item", &e))?;
        debug!(key, "deleted side-table row");
        Ok(())
    }

    async fn delete_rows(&self, keys: &[String]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }

        let requests: Vec<WriteRequest> = keys
            .iter()
            .map(|key| {
                let delete_request = DeleteRequest::builder()
                    .key(TABLE_HASH_KEY_ATTR, AttributeValue::S(key.clone()))
                    .build()
                    .expect("hash key is always set");
                WriteRequest::builder().delete_request(delete_request).build()
            })
            .collect();

        let output = self
            .client
            .batch_write_item()
            .set_request_items(Some(HashMap::from([(self.table_name.clone(), requests)])))
            .send()
            .await
            .map_err(|e| classify_error("batch_write_item", &e))?;

        if output.unprocessed_items.is_some_and(|items| !items.is_empty()) {
            debug!(table = %self.table_name, "batch_write_item left unprocessed items; next scan picks them up");
        }

        debug!(table = %self.table_name, count = keys.len(), "deleted side-table row batch");
        Ok(())
    }
}

fn is_conditional_check_failure<E>(err: &SdkError<PutItemError, E>) -> bool
where
    E: std::fmt::Debug,
{
    matches!(err.as_service_error(), Some(PutItemError::ConditionalCheckFailedException(_)))
}

fn classify_error<E, R>(operation: &str, err: &SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
{
    let code = err
        .raw_response()
        .and_then(|r| r.headers().get("x-amzn-errortype"))
        .map(str::to_string)
        .unwrap_or_default();
    if is_retryable_dynamo_error_code(&code) {
        StoreError::RemoteTransient(format!("{operation} failed ({code}): {err}"))
    } else {
        StoreError::RemoteFatal(format!("{operation} failed ({code}): {err}"))
    }
}
