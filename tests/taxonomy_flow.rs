mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_json, TestApp};

#[tokio::test]
async fn species_hierarchy_and_sibling_uniqueness() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new()? else {
        return Ok(());
    };

    let token = app.register_token("taxonomy@b.com", "secret1").await?;

    let create = app
        .post_json(
            "/api/v1/species",
            &serde_json::json!({ "name": "Perro" }),
            Some(&token),
        )
        .await?;
    assert_eq!(create.status(), StatusCode::CREATED);
    let perro = body_to_json(create.into_body()).await?;
    let perro_id = perro["id"].as_str().unwrap().to_string();

    let duplicate = app
        .post_json(
            "/api/v1/species",
            &serde_json::json!({ "name": "Perro" }),
            Some(&token),
        )
        .await?;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    let body = body_to_json(duplicate.into_body()).await?;
    assert_eq!(body["message"], "Species already exists with this name");

    let sub = app
        .post_json(
            &format!("/api/v1/species/{perro_id}/subspecies"),
            &serde_json::json!({ "name": "Bulldog" }),
            Some(&token),
        )
        .await?;
    assert_eq!(sub.status(), StatusCode::CREATED);
    let bulldog = body_to_json(sub.into_body()).await?;
    let bulldog_id = bulldog["id"].as_str().unwrap().to_string();
    assert_eq!(bulldog["parentSpeciesId"].as_str().unwrap(), perro_id);

    let sub_dup = app
        .post_json(
            &format!("/api/v1/species/{perro_id}/subspecies"),
            &serde_json::json!({ "name": "Bulldog" }),
            Some(&token),
        )
        .await?;
    assert_eq!(sub_dup.status(), StatusCode::CONFLICT);
    let body = body_to_json(sub_dup.into_body()).await?;
    assert_eq!(body["message"], "Subspecies already exists");

    // The same name is fine under a different parent.
    let gato = app
        .post_json(
            "/api/v1/species",
            &serde_json::json!({ "name": "Gato" }),
            Some(&token),
        )
        .await?;
    let gato_id = body_to_json(gato.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();
    let cross_parent = app
        .post_json(
            &format!("/api/v1/species/{gato_id}/subspecies"),
            &serde_json::json!({ "name": "Bulldog" }),
            Some(&token),
        )
        .await?;
    assert_eq!(cross_parent.status(), StatusCode::CREATED);

    // A subspecies cannot act as a parent.
    let nested = app
        .post_json(
            &format!("/api/v1/species/{bulldog_id}/subspecies"),
            &serde_json::json!({ "name": "Nested" }),
            Some(&token),
        )
        .await?;
    assert_eq!(nested.status(), StatusCode::NOT_FOUND);
    let body = body_to_json(nested.into_body()).await?;
    assert_eq!(body["message"], "Species not found");

    let list = app.get("/api/v1/species", Some(&token)).await?;
    assert_eq!(list.status(), StatusCode::OK);
    let body = body_to_json(list.into_body()).await?;
    let entries = body.as_array().expect("species array");
    assert_eq!(entries.len(), 2);
    let perro_entry = entries
        .iter()
        .find(|entry| entry["name"] == "Perro")
        .expect("Perro listed");
    assert_eq!(perro_entry["subspecies"].as_array().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn renaming_species_respects_sibling_scope() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new()? else {
        return Ok(());
    };

    let token = app.register_token("rename@b.com", "secret1").await?;

    let perro = app
        .post_json(
            "/api/v1/species",
            &serde_json::json!({ "name": "Perro" }),
            Some(&token),
        )
        .await?;
    let perro_id = body_to_json(perro.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();
    let gato = app
        .post_json(
            "/api/v1/species",
            &serde_json::json!({ "name": "Gato" }),
            Some(&token),
        )
        .await?;
    let gato_id = body_to_json(gato.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let clash = app
        .put_json(
            &format!("/api/v1/species/{gato_id}"),
            &serde_json::json!({ "name": "Perro" }),
            Some(&token),
        )
        .await?;
    assert_eq!(clash.status(), StatusCode::CONFLICT);

    let renamed = app
        .put_json(
            &format!("/api/v1/species/{gato_id}"),
            &serde_json::json!({ "name": "Felino" }),
            Some(&token),
        )
        .await?;
    assert_eq!(renamed.status(), StatusCode::OK);
    let body = body_to_json(renamed.into_body()).await?;
    assert_eq!(body["name"], "Felino");

    let delete = app
        .delete(&format!("/api/v1/species/{perro_id}"), Some(&token))
        .await?;
    assert_eq!(delete.status(), StatusCode::NO_CONTENT);

    let gone = app
        .delete(&format!("/api/v1/species/{perro_id}"), Some(&token))
        .await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn species_routes_require_a_token() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new()? else {
        return Ok(());
    };

    let response = app.get("/api/v1/species", None).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
