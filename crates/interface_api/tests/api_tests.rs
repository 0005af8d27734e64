//! HTTP API tests against the in-memory store

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use domain_fundo::{FundoService, MockFundoStore};
use interface_api::create_router;
use test_utils::{assert_json_field_error, CnpjFixtures, TestFundoBuilder};

fn server(store: &MockFundoStore) -> TestServer {
    let service = FundoService::new(Arc::new(store.clone()), Arc::new(store.clone()));
    TestServer::new(create_router(service)).unwrap()
}

async fn create(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/fundos").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_liveness_and_readiness() {
        let store = MockFundoStore::new();
        let server = server(&store);

        let live = server.get("/health").await;
        live.assert_status_ok();
        assert!(!live.header("x-request-id").is_empty());
        assert_eq!(live.json::<Value>()["status"], "healthy");

        let ready = server.get("/health/ready").await;
        ready.assert_status_ok();
        assert_eq!(ready.json::<Value>()["status"], "ready");
    }
}

mod fundos {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_full_representation() {
        let store = MockFundoStore::new();
        let mm = store.seed_relatorio("MM Int'l", true).await;
        let server = server(&store);

        let body = create(
            &server,
            TestFundoBuilder::new()
                .with_obs("Fundo espelho")
                .with_relatorios([mm.id])
                .build_json(),
        )
        .await;

        assert_eq!(body["st_cnpj_fundo"], CnpjFixtures::primary());
        assert_eq!(body["st_obs_fundo"], "Fundo espelho");
        assert_eq!(body["relatorios"][0]["relatorio"]["nome"], "MM Int'l");
        assert!(body.get("relatorios_ids").is_none());
        assert!(body["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_create_validation_errors_are_field_keyed() {
        let store = MockFundoStore::new();
        let server = server(&store);

        let response = server
            .post("/api/fundos")
            .json(&json!({
                "st_cnpj_fundo": CnpjFixtures::bad_checksum(),
                "st_classe_fundo": "Renda Fixa",
                "cod_quantum_fundomaster": 4321,
                "relatorios_ids": [77]
            }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        assert_json_field_error(&body, "st_cnpj_fundo");
        assert_json_field_error(&body, "st_estrategia_fundo");
        assert_json_field_error(&body, "st_cnpj_fundomaster");
        assert_json_field_error(&body, "relatorios_ids");
        assert_eq!(store.fundo_count().await, 0);
    }

    #[tokio::test]
    async fn test_unformatted_cnpj_rejected() {
        let store = MockFundoStore::new();
        let server = server(&store);

        let response = server
            .post("/api/fundos")
            .json(&TestFundoBuilder::new().with_cnpj(CnpjFixtures::unformatted()).build_json())
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_json_field_error(&response.json::<Value>(), "st_cnpj_fundo");
    }

    #[tokio::test]
    async fn test_duplicate_cnpj_rejected() {
        let store = MockFundoStore::new();
        let server = server(&store);
        create(&server, TestFundoBuilder::new().build_json()).await;

        let response = server.post("/api/fundos").json(&TestFundoBuilder::new().build_json()).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_json_field_error(&response.json::<Value>(), "st_cnpj_fundo");
        assert_eq!(store.fundo_count().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let store = MockFundoStore::new();
        let server = server(&store);

        let response = server
            .post("/api/fundos")
            .content_type("application/json")
            .bytes("{not json".into())
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_type_errors_are_field_keyed() {
        let store = MockFundoStore::new();
        let server = server(&store);

        let mut bad_ids = TestFundoBuilder::new().build_json();
        bad_ids["relatorios_ids"] = json!(["abc"]);
        let response = server.post("/api/fundos").json(&bad_ids).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "validation_error");
        assert_json_field_error(&body, "relatorios_ids");

        let mut bad_code = TestFundoBuilder::new().build_json();
        bad_code["cod_quantum_fundomaster"] = json!("xyz");
        let response = server.post("/api/fundos").json(&bad_code).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_json_field_error(&response.json::<Value>(), "cod_quantum_fundomaster");

        assert_eq!(store.fundo_count().await, 0);
    }

    #[tokio::test]
    async fn test_null_required_field_rejected_on_patch() {
        let store = MockFundoStore::new();
        let r1 = store.seed_relatorio("Multimercados", true).await;
        let server = server(&store);
        let created = create(&server, TestFundoBuilder::new().with_relatorios([r1.id]).build_json()).await;
        let path = format!("/api/fundos/{}", created["id_fundo"]);

        let response = server.patch(&path).json(&json!({"st_cnpj_fundo": null})).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        assert_eq!(body["fields"]["st_cnpj_fundo"][0], "This field may not be null.");

        let response = server.patch(&path).json(&json!({"relatorios_ids": null})).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_json_field_error(&response.json::<Value>(), "relatorios_ids");

        let current = server.get(&path).await.json::<Value>();
        assert_eq!(current["st_cnpj_fundo"], CnpjFixtures::primary());
        assert_eq!(store.link_count().await, 1);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let store = MockFundoStore::new();
        let server = server(&store);

        server.get("/api/fundos/abc").await.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = MockFundoStore::new();
        let server = server(&store);

        server.get("/api/fundos/999").await.assert_status_not_found();
        server.delete("/api/fundos/999").await.assert_status_not_found();
        server
            .patch("/api/fundos/999")
            .json(&json!({"st_classe_fundo": "Ações"}))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_put_requires_every_required_field() {
        let store = MockFundoStore::new();
        let server = server(&store);
        let created = create(&server, TestFundoBuilder::new().build_json()).await;
        let id = created["id_fundo"].as_i64().unwrap();

        let response = server
            .put(&format!("/api/fundos/{}", id))
            .json(&json!({"st_classe_fundo": "Ações"}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        assert_json_field_error(&body, "st_cnpj_fundo");
        assert_json_field_error(&body, "st_estrategia_fundo");
    }

    #[tokio::test]
    async fn test_patch_keeps_links_unless_supplied() {
        let store = MockFundoStore::new();
        let r1 = store.seed_relatorio("Multimercados", true).await;
        let server = server(&store);
        let created = create(
            &server,
            TestFundoBuilder::new().with_obs("nota").with_relatorios([r1.id]).build_json(),
        )
        .await;
        let path = format!("/api/fundos/{}", created["id_fundo"]);

        let patched = server
            .patch(&path)
            .json(&json!({"st_classe_fundo": "Ações", "st_obs_fundo": null}))
            .await;
        patched.assert_status_ok();
        let body = patched.json::<Value>();
        assert_eq!(body["st_classe_fundo"], "Ações");
        assert_eq!(body["st_obs_fundo"], Value::Null);
        assert_eq!(body["relatorios"].as_array().unwrap().len(), 1);

        let cleared = server.patch(&path).json(&json!({"relatorios_ids": []})).await;
        cleared.assert_status_ok();
        assert!(cleared.json::<Value>()["relatorios"].as_array().unwrap().is_empty());
        assert_eq!(store.link_count().await, 0);
    }

    #[tokio::test]
    async fn test_patch_master_code_checked_against_merged_state() {
        let store = MockFundoStore::new();
        let server = server(&store);
        let created = create(&server, TestFundoBuilder::new().build_json()).await;

        let response = server
            .patch(&format!("/api/fundos/{}", created["id_fundo"]))
            .json(&json!({"cod_quantum_fundomaster": 12}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_json_field_error(&response.json::<Value>(), "st_cnpj_fundomaster");
    }

    #[tokio::test]
    async fn test_delete_cascades_links() {
        let store = MockFundoStore::new();
        let r1 = store.seed_relatorio("Multimercados", true).await;
        let server = server(&store);
        let created = create(&server, TestFundoBuilder::new().with_relatorios([r1.id]).build_json()).await;
        let path = format!("/api/fundos/{}", created["id_fundo"]);

        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);

        server.get(&path).await.assert_status_not_found();
        assert_eq!(store.link_count().await, 0);
    }

    #[tokio::test]
    async fn test_linked_relatorios_sub_resource() {
        let store = MockFundoStore::new();
        let rv = store.seed_relatorio("RV Int'l USD", true).await;
        let mm = store.seed_relatorio("MM Int'l", true).await;
        let server = server(&store);
        let created = create(
            &server,
            TestFundoBuilder::new().with_relatorios([rv.id, mm.id]).build_json(),
        )
        .await;

        let response = server
            .get(&format!("/api/fundos/{}/relatorios", created["id_fundo"]))
            .await;
        response.assert_status_ok();
        let nomes: Vec<String> = response
            .json::<Vec<Value>>()
            .iter()
            .map(|r| r["nome"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(nomes, vec!["MM Int'l", "RV Int'l USD"]);
    }
}

mod listing {
    use super::*;

    async fn seeded() -> (MockFundoStore, TestServer) {
        let store = MockFundoStore::new();
        let mm = store.seed_relatorio("MM Int'l", true).await;
        let server = server(&store);

        create(&server, TestFundoBuilder::new().build_json()).await;
        create(
            &server,
            TestFundoBuilder::new()
                .with_cnpj(CnpjFixtures::VALID[3])
                .with_classe("Multimercado")
                .with_estrategia("Long Short")
                .with_obs("Hedge cambial")
                .with_relatorios([mm.id])
                .build_json(),
        )
        .await;
        (store, server)
    }

    #[tokio::test]
    async fn test_list_representation_newest_first() {
        let (_store, server) = seeded().await;

        let items = server.get("/api/fundos").await.json::<Vec<Value>>();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["st_cnpj_fundo"], CnpjFixtures::VALID[3]);
        assert_eq!(items[0]["relatorios_nomes"], json!(["MM Int'l"]));
        assert!(items[0].get("st_obs_fundo").is_none());
        assert!(items[0].get("updated_at").is_none());
    }

    #[tokio::test]
    async fn test_query_filters() {
        let (_store, server) = seeded().await;

        let by_report = server
            .get("/api/fundos")
            .add_query_param("relatorio", "int'l")
            .await
            .json::<Vec<Value>>();
        assert_eq!(by_report.len(), 1);

        let by_search = server
            .get("/api/fundos")
            .add_query_param("search", "hedge")
            .await
            .json::<Vec<Value>>();
        assert_eq!(by_search.len(), 1);

        let combined = server
            .get("/api/fundos")
            .add_query_param("classe", "renda")
            .add_query_param("search", "hedge")
            .await
            .json::<Vec<Value>>();
        assert!(combined.is_empty());

        let empty_term = server
            .get("/api/fundos")
            .add_query_param("cnpj", "")
            .await
            .json::<Vec<Value>>();
        assert_eq!(empty_term.len(), 2);
    }

    #[tokio::test]
    async fn test_fields_are_anded_and_search_is_ored() {
        let store = MockFundoStore::new();
        let server = server(&store);
        create(
            &server,
            TestFundoBuilder::new()
                .with_cnpj(CnpjFixtures::VALID[0])
                .with_classe("Renda Fixa")
                .with_estrategia("Macro")
                .build_json(),
        )
        .await;
        create(
            &server,
            TestFundoBuilder::new()
                .with_cnpj(CnpjFixtures::VALID[1])
                .with_classe("Renda Fixa")
                .with_estrategia("Equity")
                .build_json(),
        )
        .await;

        let both_fields = server
            .get("/api/fundos")
            .add_query_param("classe", "Renda Fixa")
            .add_query_param("estrategia", "Macro")
            .await
            .json::<Vec<Value>>();
        assert_eq!(both_fields.len(), 1);
        assert_eq!(both_fields[0]["st_estrategia_fundo"], "Macro");

        let search = server
            .get("/api/fundos")
            .add_query_param("search", "Renda Fixa")
            .await
            .json::<Vec<Value>>();
        assert_eq!(search.len(), 2);
    }

    #[tokio::test]
    async fn test_distinct_classes_and_estrategias() {
        let (_store, server) = seeded().await;

        let classes = server.get("/api/fundos/classes").await.json::<Vec<String>>();
        assert_eq!(classes, vec!["Multimercado", "Renda Fixa"]);

        let estrategias = server.get("/api/fundos/estrategias").await.json::<Vec<String>>();
        assert_eq!(estrategias, vec!["Long Short", "Macro"]);
    }
}

mod relatorios {
    use super::*;

    #[tokio::test]
    async fn test_only_active_reports_listed_by_name() {
        let store = MockFundoStore::new();
        store.seed_relatorio("RV Int'l USD", true).await;
        store.seed_relatorio("MM Int'l", true).await;
        store.seed_relatorio("Antigo Int'l", false).await;
        let server = server(&store);

        let all = server.get("/api/relatorios").await.json::<Vec<Value>>();
        let nomes: Vec<_> = all.iter().map(|r| r["nome"].as_str().unwrap()).collect();
        assert_eq!(nomes, vec!["MM Int'l", "RV Int'l USD"]);

        let filtered = server
            .get("/api/relatorios")
            .add_query_param("nome", "usd")
            .await
            .json::<Vec<Value>>();
        assert_eq!(filtered.len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_report_not_retrievable_or_linkable() {
        let store = MockFundoStore::new();
        let inativo = store.seed_relatorio("Antigo", false).await;
        let server = server(&store);

        server
            .get(&format!("/api/relatorios/{}", inativo.id))
            .await
            .assert_status_not_found();

        let response = server
            .post("/api/fundos")
            .json(&TestFundoBuilder::new().with_relatorios([inativo.id]).build_json())
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        let message = body["fields"]["relatorios_ids"][0].as_str().unwrap();
        assert!(message.contains(&inativo.id.to_string()));
    }
}
