use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpRequest, HttpResponse};
use oavk_core::RouteWrapper;
use oavk_web::petstore::{configure, Petstore};
use oavk_web::{handle, ApiError, HttpSink};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

macro_rules! petstore_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Petstore::new().unwrap()))
                .configure(configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_add_then_find_pet() {
    let app = petstore_app!();

    let req = test::TestRequest::post()
        .uri("/pets")
        .set_json(json!({"name": "Rex", "tag": "dog"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created, json!({"name": "Rex", "tag": "dog", "id": 1}));

    let req = test::TestRequest::get().uri("/pets/1").to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found, created);
}

#[actix_web::test]
async fn test_path_parameter_must_be_integer() {
    let app = petstore_app!();

    let req = test::TestRequest::get().uri("/pets/foo").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        json!("Request path parameter 'id' must be integer")
    );
    assert_eq!(body["errors"][0]["path"], json!("id"));
}

#[actix_web::test]
async fn test_add_pet_requires_name() {
    let app = petstore_app!();

    let req = test::TestRequest::post()
        .uri("/pets")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        json!("Request body must have required property 'name'")
    );
}

#[actix_web::test]
async fn test_add_pet_rejects_malformed_json() {
    let app = petstore_app!();

    let req = test::TestRequest::post()
        .uri("/pets")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_missing_pet_is_404_error_body() {
    let app = petstore_app!();

    let req = test::TestRequest::get().uri("/pets/7").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"code": 404, "message": "Pet 7 not found"}));
}

#[actix_web::test]
async fn test_delete_pet() {
    let app = petstore_app!();

    let req = test::TestRequest::post()
        .uri("/pets")
        .set_json(json!({"name": "Tom"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::delete().uri("/pets/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete().uri("/pets/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_find_pets_filters_and_limits() {
    let app = petstore_app!();

    for (name, tag) in [("Rex", "dog"), ("Tom", "cat"), ("Fido", "dog")] {
        let req = test::TestRequest::post()
            .uri("/pets")
            .set_json(json!({"name": name, "tag": tag}))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }

    let req = test::TestRequest::get().uri("/pets?tags=dog").to_request();
    let dogs: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = dogs
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Rex", "Fido"]);

    let req = test::TestRequest::get().uri("/pets?limit=1").to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(first.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get().uri("/pets?limit=0").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        json!("Request query parameter 'limit' must be >= 1")
    );
}

/// Answers `findPetById` with canned bodies, some of which break the contract.
async fn scripted_pet(
    wrapper: web::Data<RouteWrapper>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    handle(&wrapper, &req, &body, |parts, res| async move {
        match parts.params["id"].as_i64().unwrap_or_default() {
            1 => res.send(json!({"id": 2, "name": "Buddy"}), HttpSink),
            2 => res.send(json!({"id": 2, "name": "Buddy", "color": "brown"}), HttpSink),
            10 => res.send(json!({}), HttpSink),
            11 => res.send(json!({"id": "two", "name": "Buddy"}), HttpSink),
            12 => res.send(json!({"name": "Buddy"}), HttpSink),
            13 => res.send(json!({"id": 13, "name": "Buddy", "tag": 9}), HttpSink),
            20 => res
                .status(400)?
                .send(json!({"code": 400, "message": "bad pet"}), HttpSink),
            _ => res
                .status(404)?
                .send(json!({"code": 404, "message": "not found"}), HttpSink),
        }
    })
    .await
}

macro_rules! scripted_app {
    () => {{
        let store = Petstore::new().unwrap();
        let wrapper = RouteWrapper::new(store.session(), "findPetById").unwrap();
        test::init_service(
            App::new()
                .app_data(web::Data::new(wrapper))
                .route("/pets/{id}", web::get().to(scripted_pet)),
        )
        .await
    }};
}

async fn fetch(id: u32) -> (StatusCode, Value) {
    let app = scripted_app!();
    let req = test::TestRequest::get()
        .uri(&format!("/pets/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    (status, test::read_body_json(resp).await)
}

#[actix_web::test]
async fn test_valid_responses_pass_through() {
    assert_eq!(
        fetch(1).await,
        (StatusCode::OK, json!({"id": 2, "name": "Buddy"}))
    );
    assert_eq!(
        fetch(2).await,
        (
            StatusCode::OK,
            json!({"id": 2, "name": "Buddy", "color": "brown"})
        )
    );
}

#[actix_web::test]
async fn test_invalid_responses_are_rejected() {
    let (status, body) = fetch(10).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        json!("Response body must have required property 'name'")
    );

    let (_, body) = fetch(11).await;
    assert_eq!(
        body["error"],
        json!("Response body property 'id' must be integer")
    );

    let (_, body) = fetch(12).await;
    assert_eq!(
        body["error"],
        json!("Response body must have required property 'id'")
    );
}

#[actix_web::test]
async fn test_response_is_coerced() {
    assert_eq!(
        fetch(13).await,
        (
            StatusCode::OK,
            json!({"id": 13, "name": "Buddy", "tag": "9"})
        )
    );
}

#[actix_web::test]
async fn test_status_category_and_default() {
    assert_eq!(
        fetch(20).await,
        (
            StatusCode::BAD_REQUEST,
            json!({"code": 400, "message": "bad pet"})
        )
    );
    assert_eq!(
        fetch(99).await,
        (
            StatusCode::NOT_FOUND,
            json!({"code": 404, "message": "not found"})
        )
    );
}
