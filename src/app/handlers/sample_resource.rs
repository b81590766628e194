//! CRUD operations over sample resources.

use std::sync::Arc;

use crate::app::backend::MockBackend;
use crate::app::types::{ByPublicId, CreateRequest, Empty, ResourceItem, ResourceList, SampleResource, UpdateRequest};
use crate::dispatch::{MiddlewareChain, RequestResponse, RouteError, RouteHandler};

pub struct SampleResourceHandler {
    rr: RequestResponse,
    backend: Arc<MockBackend>,
    middleware: MiddlewareChain,
}

impl RouteHandler for SampleResourceHandler {
    fn request_response(&self) -> &RequestResponse {
        &self.rr
    }

    fn middleware(&self) -> MiddlewareChain {
        self.middleware.clone()
    }
}

impl SampleResourceHandler {
    pub fn new(rr: RequestResponse, backend: Arc<MockBackend>, middleware: MiddlewareChain) -> Self {
        Self {
            rr,
            backend,
            middleware,
        }
    }

    pub async fn list(&self) -> Result<ResourceList, RouteError> {
        Ok(ResourceList {
            items: self.backend.list(),
        })
    }

    pub async fn create(&self, request: CreateRequest) -> Result<ResourceItem, RouteError> {
        let item = request.body.item;
        let created = self.backend.create(&item.name, item.age);
        tracing::info!(public_id = %created.public_id, "Sample resource created");
        Ok(ResourceItem { item: created })
    }

    pub async fn get(&self, request: ByPublicId) -> Result<ResourceItem, RouteError> {
        let item = self.find(&request.params.public_id)?;
        Ok(ResourceItem { item })
    }

    pub async fn delete(&self, request: ByPublicId) -> Result<Empty, RouteError> {
        let public_id = request.params.public_id;
        self.backend
            .remove(&public_id)
            .ok_or_else(|| not_found(&public_id))?;
        Ok(Empty {})
    }

    pub async fn update(&self, request: UpdateRequest) -> Result<ResourceItem, RouteError> {
        let public_id = request.params.public_id;
        let item = self
            .backend
            .update(&public_id, request.body.item)
            .ok_or_else(|| not_found(&public_id))?;
        Ok(ResourceItem { item })
    }

    fn find(&self, public_id: &str) -> Result<SampleResource, RouteError> {
        self.backend.get(public_id).ok_or_else(|| not_found(public_id))
    }
}

fn not_found(public_id: &str) -> RouteError {
    RouteError::not_found(format!("SampleResource \"{}\" not found", public_id))
}
