#![deny(missing_docs)]

//! # Validator Session
//!
//! Owns a compiled [`SchemaSet`], the [`SchemaEngine`] and the predicate cache.
//! Predicates are compiled on first use and cached by [`SchemaId`] for the
//! session's lifetime. Independent sessions share nothing.

use crate::bundle::{Field, OperationId, SchemaBundle, SchemaId, SchemaSet};
use crate::error::{AppError, AppResult};
use crate::runtime::engine::{EngineOptions, JsonSchemaEngine, Predicate, SchemaEngine};
use crate::runtime::failure::ValidationError;
use crate::runtime::validators::OperationValidators;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of schemas plus a lazily populated predicate cache.
pub struct ValidatorSession {
    schemas: SchemaSet,
    engine: Box<dyn SchemaEngine>,
    cache: Mutex<HashMap<SchemaId, Arc<dyn Predicate>>>,
}

impl std::fmt::Debug for ValidatorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorSession")
            .field("operations", &self.schemas.operations.len())
            .field("compiled", &self.compiled_count())
            .finish()
    }
}

impl ValidatorSession {
    /// Creates a session over `schemas` using `engine`.
    pub fn new(schemas: SchemaSet, engine: impl SchemaEngine + 'static) -> Self {
        Self {
            schemas,
            engine: Box::new(engine),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a session with a [`JsonSchemaEngine`] using default options.
    pub fn with_defaults(schemas: SchemaSet) -> Self {
        Self::new(schemas, JsonSchemaEngine::new(EngineOptions::default()))
    }

    /// The schemas this session validates against.
    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Looks up the bundle of one operation.
    pub fn bundle(&self, operation: &str) -> AppResult<&SchemaBundle> {
        self.schemas
            .get(operation)
            .ok_or_else(|| AppError::UnknownOperation(operation.to_string()))
    }

    /// Returns the validators of one operation.
    pub fn operation(self: &Arc<Self>, operation: &str) -> AppResult<OperationValidators> {
        self.bundle(operation)?;
        Ok(OperationValidators::new(
            Arc::clone(self),
            OperationId::new(operation),
        ))
    }

    /// Number of predicates compiled so far.
    pub fn compiled_count(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns the predicate for `id`, compiling it on first use.
    ///
    /// The lookup and the insert happen under one lock, so concurrent first
    /// calls compile a schema once.
    pub fn predicate(&self, id: &SchemaId) -> AppResult<Arc<dyn Predicate>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(predicate) = cache.get(id) {
            return Ok(Arc::clone(predicate));
        }

        let schema = self.root_schema(id)?;
        let predicate: Arc<dyn Predicate> = Arc::from(self.engine.compile(&schema).map_err(
            |source| AppError::Engine {
                schema: id.to_string(),
                source,
            },
        )?);

        tracing::debug!(schema = %id, "compiled validation predicate");
        cache.insert(id.clone(), Arc::clone(&predicate));
        Ok(predicate)
    }

    /// Validates `data` against the schema `id`, coercing it in place.
    pub fn validate(&self, id: &SchemaId, data: &mut Value) -> AppResult<()> {
        let predicate = self.predicate(id)?;
        predicate
            .check(data)
            .map_err(|issues| ValidationError::new(issues, id.field.subject()).into())
    }

    /// The schema for `id`, with the shared definitions attached at its root.
    fn root_schema(&self, id: &SchemaId) -> AppResult<Value> {
        let mut schema = self
            .bundle(id.operation.as_str())?
            .schema_for(&id.field)
            .ok_or_else(|| AppError::General(format!("No schema exists with ID \"{}\"", id)))?;

        if let Value::Object(root) = &mut schema {
            if !self.schemas.definitions.is_empty() && !root.contains_key("definitions") {
                let definitions = self
                    .schemas
                    .definitions
                    .iter()
                    .map(|(name, def)| (name.clone(), def.clone()))
                    .collect();
                root.insert("definitions".into(), Value::Object(definitions));
            }
        }
        Ok(schema)
    }
}

/// Convenience for building a [`SchemaId`] from parts.
pub fn schema_id(operation: &str, field: Field) -> SchemaId {
    SchemaId::new(OperationId::new(operation), field)
}
