//! # Petstore
//!
//! In-memory demo service for the bundled petstore contract. Every route runs
//! through its operation's [`RouteWrapper`].

use crate::error::ApiError;
use crate::handler::handle;
use crate::sink::HttpSink;
use actix_web::{web, HttpRequest, HttpResponse};
use oavk_core::{compile_contract, AppResult, CompileOptions, RouteWrapper, ValidatorSession};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// The petstore contract served by this module.
pub const CONTRACT: &str = include_str!("../openapi/petstore.yaml");

/// Shared application state.
pub struct Petstore {
    session: Arc<ValidatorSession>,
    find_pets: RouteWrapper,
    add_pet: RouteWrapper,
    find_pet_by_id: RouteWrapper,
    delete_pet: RouteWrapper,
    pets: Mutex<BTreeMap<i64, Value>>,
}

impl Petstore {
    /// Compiles the petstore contract and prepares the route wrappers.
    pub fn new() -> AppResult<Self> {
        let schemas = compile_contract(CONTRACT, &CompileOptions::default())?;
        let session = Arc::new(ValidatorSession::with_defaults(schemas));

        Ok(Self {
            find_pets: RouteWrapper::new(&session, "findPets")?,
            add_pet: RouteWrapper::new(&session, "addPet")?,
            find_pet_by_id: RouteWrapper::new(&session, "findPetById")?,
            delete_pet: RouteWrapper::new(&session, "deletePet")?,
            session,
            pets: Mutex::new(BTreeMap::new()),
        })
    }

    /// The validator session behind the routes.
    pub fn session(&self) -> &Arc<ValidatorSession> {
        &self.session
    }

    fn pets(&self) -> std::sync::MutexGuard<'_, BTreeMap<i64, Value>> {
        self.pets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registers the petstore routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/pets", web::get().to(find_pets))
        .route("/pets", web::post().to(add_pet))
        .route("/pets/{id}", web::get().to(find_pet_by_id))
        .route("/pets/{id}", web::delete().to(delete_pet));
}

fn not_found(id: &Value) -> Value {
    json!({"code": 404, "message": format!("Pet {} not found", id)})
}

async fn find_pets(
    state: web::Data<Petstore>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let store = state.clone();
    handle(&state.find_pets, &req, &body, |parts, res| async move {
        let tags: Vec<Value> = parts.query["tags"].as_array().cloned().unwrap_or_default();
        let limit = parts.query["limit"].as_u64().unwrap_or(20) as usize;

        let pets: Vec<Value> = store
            .pets()
            .values()
            .filter(|pet| tags.is_empty() || tags.contains(&pet["tag"]))
            .take(limit)
            .cloned()
            .collect();
        res.send(Value::Array(pets), HttpSink)
    })
    .await
}

async fn add_pet(
    state: web::Data<Petstore>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let store = state.clone();
    handle(&state.add_pet, &req, &body, |parts, res| async move {
        let mut pet = parts.body.unwrap_or_else(|| json!({}));
        let id = {
            let mut pets = store.pets();
            let id = pets.keys().next_back().map_or(1, |last| last + 1);
            pet["id"] = json!(id);
            pets.insert(id, pet.clone());
            id
        };
        tracing::info!(id, "added pet");
        res.send(pet, HttpSink)
    })
    .await
}

async fn find_pet_by_id(
    state: web::Data<Petstore>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let store = state.clone();
    handle(&state.find_pet_by_id, &req, &body, |parts, res| async move {
        let found = parts.params["id"]
            .as_i64()
            .and_then(|id| store.pets().get(&id).cloned());
        match found {
            Some(pet) => res.send(pet, HttpSink),
            None => res.status(404)?.send(not_found(&parts.params["id"]), HttpSink),
        }
    })
    .await
}

async fn delete_pet(
    state: web::Data<Petstore>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let store = state.clone();
    handle(&state.delete_pet, &req, &body, |parts, res| async move {
        let removed = parts.params["id"]
            .as_i64()
            .and_then(|id| store.pets().remove(&id));
        match removed {
            Some(_) => res.status(204)?.send(Value::Null, HttpSink),
            None => res.status(404)?.send(not_found(&parts.params["id"]), HttpSink),
        }
    })
    .await
}
