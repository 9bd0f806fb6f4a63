// Copyright (c) 2025 CData Connect Cloud Node Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The CData Connect Cloud workflow node.
//!
//! The host iterates its input items and the node runs the selected operation
//! once per item, sequentially. Each run reads the item's parameters, builds
//! one request, awaits one authenticated round trip and normalizes the
//! response into records.

use crate::auth::CredentialProfile;
use crate::context::{ExecutionContext, ItemParameters};
use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::operation::{AdditionalFields, Operation, OperationRequest, Resource};
use crate::request::RequestBuilder;
use crate::types::Record;
use serde_json::Value;
use tracing::{debug, warn};

/// Credential profile the node authenticates with.
pub const NODE_CREDENTIAL: CredentialProfile = CredentialProfile::CDataConnectCloudApi;

/// What to do when one item fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole run with the first error.
    #[default]
    FailFast,
    /// Record the error in place of that item's records and continue.
    CollectErrors,
}

/// Outcome for one output position.
pub type ItemResult = std::result::Result<Record, Error>;

/// The CData Connect Cloud node.
#[derive(Debug, Clone, Default)]
pub struct ConnectCloudNode {
    policy: FailurePolicy,
}

impl ConnectCloudNode {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run the node over every input item.
    ///
    /// `resource` is read from item 0 and applies to all items, as does the
    /// operation of the query, batch and execute resources. Metadata items
    /// each pick their own operation, which must belong to the metadata
    /// resource. Under [`FailurePolicy::FailFast`] the first failing item aborts
    /// the run; under [`FailurePolicy::CollectErrors`] each failing item
    /// contributes one `Err` and processing moves on.
    pub async fn execute(&self, ctx: &dyn ExecutionContext) -> Result<Vec<ItemResult>> {
        let resource = resolve_resource(ctx)?;
        let operation = resolve_operation(&ItemParameters::new(ctx, 0), resource)?;
        debug!("Running {} / {} over {} items", resource, operation, ctx.item_count());

        let mut output = Vec::new();

        for item_index in 0..ctx.item_count() {
            match execute_resource(ctx, resource, item_index).await {
                Ok(records) => output.extend(records.into_iter().map(Ok)),
                Err(e) => match self.policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::CollectErrors => {
                        warn!("Item {} failed, continuing: {}", item_index, e);
                        output.push(Err(e));
                    }
                },
            }
        }

        debug!(
            "Node produced {} outputs for {} items",
            output.len(),
            ctx.item_count()
        );
        Ok(output)
    }
}

/// Flatten results into host output records; errors become `{error: <message>}`.
pub fn into_output_records(results: Vec<ItemResult>) -> Vec<Record> {
    results
        .into_iter()
        .map(|result| match result {
            Ok(record) => record,
            Err(e) => {
                let mut record = Record::new();
                record.insert("error".to_string(), Value::String(e.to_string()));
                record
            }
        })
        .collect()
}

fn resolve_resource(ctx: &dyn ExecutionContext) -> Result<Resource> {
    match ItemParameters::new(ctx, 0).string("resource")? {
        Some(name) => Resource::parse(&name),
        None => Ok(Resource::default()),
    }
}

fn resolve_operation(params: &ItemParameters<'_>, resource: Resource) -> Result<Operation> {
    let name = params.string("operation")?;
    Operation::for_resource(resource, name.as_deref())
}

async fn execute_resource(
    ctx: &dyn ExecutionContext,
    resource: Resource,
    item_index: usize,
) -> Result<Vec<Record>> {
    match resource {
        Resource::Query => execute_query(ctx, item_index).await,
        Resource::Metadata => execute_metadata(ctx, item_index).await,
        Resource::Batch => execute_batch(ctx, item_index).await,
        Resource::Execute => execute_procedure(ctx, item_index).await,
    }
}

/// Run `executeQuery` for one item.
pub async fn execute_query(ctx: &dyn ExecutionContext, item_index: usize) -> Result<Vec<Record>> {
    run_operation(ctx, Operation::ExecuteQuery, item_index).await
}

/// Run the metadata operation selected by one item's own `operation`
/// parameter.
pub async fn execute_metadata(
    ctx: &dyn ExecutionContext,
    item_index: usize,
) -> Result<Vec<Record>> {
    let params = ItemParameters::new(ctx, item_index);
    let operation = resolve_operation(&params, Resource::Metadata)?;
    run_operation(ctx, operation, item_index).await
}

/// Run `executeBatch` for one item.
pub async fn execute_batch(ctx: &dyn ExecutionContext, item_index: usize) -> Result<Vec<Record>> {
    run_operation(ctx, Operation::ExecuteBatch, item_index).await
}

/// Run `executeProcedure` for one item.
pub async fn execute_procedure(
    ctx: &dyn ExecutionContext,
    item_index: usize,
) -> Result<Vec<Record>> {
    run_operation(ctx, Operation::ExecuteProcedure, item_index).await
}

async fn run_operation(
    ctx: &dyn ExecutionContext,
    operation: Operation,
    item_index: usize,
) -> Result<Vec<Record>> {
    let params = ItemParameters::new(ctx, item_index);
    let request = OperationRequest::from_parameters(operation, &params)?;
    let additional = AdditionalFields::from_value(params.raw("additionalFields").as_ref())?;
    let spec = RequestBuilder::new()
        .with_additional_fields(additional)
        .build(&request)?;

    debug!(
        "Item {}: {} {} {}",
        item_index, operation, spec.method, spec.path
    );

    let response = ctx
        .perform_authenticated_request(NODE_CREDENTIAL, &spec)
        .await?;
    normalize(&response)
}
