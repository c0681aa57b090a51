use oavk_core::{
    compile_contract, AppError, CompileOptions, ContractError, OperationIdPolicy, RequestParts,
    RouteWrapper, SchemaSet, StatusKey, ValidatorSession,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;

const STORE: &str = r##"
openapi: "3.0.3"
info: {title: store, version: "1"}
paths:
  /orders/{orderId}:
    parameters:
      - {name: orderId, in: path, required: true, schema: {type: integer}}
    get:
      operationId: getOrder
      parameters:
        - {name: expand, in: query, schema: {type: boolean, default: false}}
        - {name: X-Tenant, in: header, required: true, schema: {type: string}}
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Order'}
        4XX: {$ref: '#/components/responses/Problem'}
    put:
      operationId: replaceOrder
      requestBody:
        $ref: '#/components/requestBodies/OrderBody'
      responses:
        '204': {description: replaced}
        default: {$ref: '#/components/responses/Problem'}
components:
  schemas:
    Order:
      type: object
      required: [id, lines]
      properties:
        id: {type: integer}
        note: {type: string, nullable: true}
        lines:
          type: array
          items: {$ref: '#/components/schemas/Line'}
    Line:
      type: object
      required: [sku, qty]
      properties:
        sku: {type: string}
        qty: {type: integer, minimum: 1}
    Problem:
      type: object
      required: [message]
      properties:
        message: {type: string}
  requestBodies:
    OrderBody:
      required: true
      content:
        application/json:
          schema: {$ref: '#/components/schemas/Order'}
  responses:
    Problem:
      description: problem
      content:
        application/json:
          schema: {$ref: '#/components/schemas/Problem'}
"##;

fn session() -> Arc<ValidatorSession> {
    let schemas = compile_contract(STORE, &CompileOptions::default()).unwrap();
    Arc::new(ValidatorSession::with_defaults(schemas))
}

#[test]
fn test_schema_set_is_serializable_and_stable() {
    let first = compile_contract(STORE, &CompileOptions::default()).unwrap();
    let json = serde_json::to_value(&first).unwrap();
    let back: SchemaSet = serde_json::from_value(json).unwrap();
    assert_eq!(back, first);
    assert_eq!(
        first.operation_ids().map(|id| id.to_string()).collect::<Vec<_>>(),
        vec!["getOrder", "replaceOrder"]
    );
}

#[test]
fn test_request_passes_after_coercion() {
    let wrapper = RouteWrapper::new(&session(), "getOrder").unwrap();
    let mut parts = RequestParts {
        params: json!({"orderId": "42"}),
        headers: json!({"x-tenant": "acme", "accept": "application/json"}),
        ..RequestParts::default()
    };
    wrapper.validate_request(&mut parts).unwrap();
    assert_eq!(parts.params, json!({"orderId": 42}));
    assert_eq!(parts.query, json!({"expand": false}));
}

#[test]
fn test_params_are_checked_before_headers() {
    let wrapper = RouteWrapper::new(&session(), "getOrder").unwrap();
    let mut parts = RequestParts {
        params: json!({"orderId": "latest"}),
        ..RequestParts::default()
    };
    let err = wrapper.validate_request(&mut parts).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Request path parameter 'orderId' must be integer"
    );

    parts.params = json!({"orderId": "1"});
    let err = wrapper.validate_request(&mut parts).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Request headers must have required property 'x-tenant'"
    );
}

#[test]
fn test_nested_body_paths_are_dotted() {
    let validators = session().operation("replaceOrder").unwrap();
    let mut body = json!({"id": 1, "lines": [{"sku": "a", "qty": 1}, {"sku": "b", "qty": 0}]});
    let err = validators.request_body(Some(&mut body)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Request body property 'lines.1.qty' must be >= 1"
    );

    let mut body = json!({"id": 1, "note": null, "lines": []});
    assert!(validators.request_body(Some(&mut body)).is_ok());
}

#[test]
fn test_response_status_resolution_through_refs() {
    let validators = session().operation("getOrder").unwrap();
    assert_eq!(validators.resolve_status(409).unwrap(), StatusKey::Category(4));
    assert!(validators
        .response_body(&mut json!({"message": "conflict"}), 409)
        .is_ok());

    let err = validators.response_body(&mut json!({}), 500).unwrap_err();
    assert!(matches!(err, AppError::MissingResponseSchema(_)));
    assert_eq!(
        err.to_string(),
        "Operation 'getOrder' declares no response schema for status 500"
    );
}

#[test]
fn test_predicates_compile_once_across_threads() {
    let session = session();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                let validators = session.operation("getOrder").unwrap();
                let mut params = json!({"orderId": i.to_string()});
                validators.params(&mut params).unwrap();
                params
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), json!({"orderId": i}));
    }
    assert_eq!(session.compiled_count(), 1);
}

#[test]
fn test_sessions_do_not_share_caches() {
    let a = session();
    let b = session();
    a.operation("getOrder")
        .unwrap()
        .params(&mut json!({"orderId": 1}))
        .unwrap();
    assert_eq!(a.compiled_count(), 1);
    assert_eq!(b.compiled_count(), 0);
}

#[test]
fn test_missing_operation_id_policies() {
    let contract = STORE.replace("      operationId: replaceOrder\n", "");

    let err = compile_contract(&contract, &CompileOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        AppError::Contract(ContractError::MissingOperationId { .. })
    ));

    let derived = compile_contract(
        &contract,
        &CompileOptions {
            operation_ids: OperationIdPolicy::DeriveFromRoute,
        },
    )
    .unwrap();
    let ids: Vec<String> = derived.operation_ids().map(|id| id.to_string()).collect();
    assert_eq!(ids, vec!["getOrder", "PUT /orders/{orderId}"]);
    assert!(derived.get("PUT /orders/{orderId}").is_some());
}

#[test]
fn test_no_body_operation_rejects_payload() {
    let validators = session().operation("getOrder").unwrap();
    assert!(validators.request_body(None).is_ok());
    let err = validators
        .request_body(Some(&mut Value::from("surprise")))
        .unwrap_err();
    assert_eq!(err.to_string(), "Request body must NOT be valid");
}
