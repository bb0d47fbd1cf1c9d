mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_json, body_to_vec, TestApp};

struct Clinic {
    token: String,
    patient_id: String,
}

async fn seed_clinic(app: &TestApp) -> Result<Clinic> {
    let token = app.register_with_profile("clinic@b.com", "secret1").await?;

    let species = app
        .post_json(
            "/api/v1/species",
            &serde_json::json!({ "name": "Perro" }),
            Some(&token),
        )
        .await?;
    let species_id = body_to_json(species.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();
    let sub = app
        .post_json(
            &format!("/api/v1/species/{species_id}/subspecies"),
            &serde_json::json!({ "name": "Bulldog" }),
            Some(&token),
        )
        .await?;
    let subspecies_id = body_to_json(sub.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let owner = app
        .post_json(
            "/api/v1/owners",
            &serde_json::json!({
                "name": "Carlos",
                "lastname": "Ruiz",
                "birthday": "1985-02-20",
                "direction": "Av. Siempre Viva 742",
                "phone": "999888777"
            }),
            Some(&token),
        )
        .await?;
    let owner_id = body_to_json(owner.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let patient = app
        .post_json(
            "/api/v1/patients",
            &serde_json::json!({
                "name": "Toby",
                "weight": 12.5,
                "birthday": "2020-06-01",
                "subspeciesId": subspecies_id,
                "ownerId": owner_id
            }),
            Some(&token),
        )
        .await?;
    anyhow::ensure!(patient.status() == StatusCode::CREATED, "patient seed failed");
    let patient_id = body_to_json(patient.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    Ok(Clinic { token, patient_id })
}

async fn seed_attention(app: &TestApp, clinic: &Clinic) -> Result<String> {
    let attention = app
        .post_json(
            "/api/v1/medical-attentions",
            &serde_json::json!({
                "weight": 12.8,
                "description": "Annual checkup",
                "date": "2024-05-10T10:00:00",
                "resultNotes": "Healthy",
                "patientId": clinic.patient_id
            }),
            Some(&clinic.token),
        )
        .await?;
    anyhow::ensure!(
        attention.status() == StatusCode::CREATED,
        "attention seed failed"
    );
    Ok(body_to_json(attention.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string())
}

#[tokio::test]
async fn event_optional_fields_are_explicit_nulls() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new()? else {
        return Ok(());
    };

    let clinic = seed_clinic(&app).await?;

    let event_type = app
        .post_json(
            "/api/v1/event-types",
            &serde_json::json!({ "name": "Surgery", "typeColor": "#FF0000" }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(event_type.status(), StatusCode::CREATED);
    let event_type_id = body_to_json(event_type.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let duplicate_type = app
        .post_json(
            "/api/v1/event-types",
            &serde_json::json!({ "name": "Surgery", "typeColor": "#00FF00" }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(duplicate_type.status(), StatusCode::CONFLICT);

    let event = app
        .post_json(
            "/api/v1/events",
            &serde_json::json!({
                "title": "Neutering",
                "description": "Routine procedure",
                "startTime": "2024-06-01T09:00:00",
                "eventTypeId": event_type_id
            }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(event.status(), StatusCode::CREATED);
    let raw = body_to_vec(event.into_body()).await?;
    let text = String::from_utf8(raw)?;
    assert!(text.contains("\"endTime\":null"));
    assert!(text.contains("\"patientId\":null"));

    let bad_type = app
        .post_json(
            "/api/v1/events",
            &serde_json::json!({
                "title": "Orphan",
                "description": "No such type",
                "startTime": "2024-06-01T09:00:00",
                "eventTypeId": uuid::Uuid::new_v4()
            }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(bad_type.status(), StatusCode::NOT_FOUND);
    let body = body_to_json(bad_type.into_body()).await?;
    assert_eq!(body["message"], "Event type not found");

    Ok(())
}

#[tokio::test]
async fn medicine_assignment_pair_is_unique() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new()? else {
        return Ok(());
    };

    let clinic = seed_clinic(&app).await?;
    let attention_id = seed_attention(&app, &clinic).await?;

    let medicine = app
        .post_json(
            "/api/v1/medicines",
            &serde_json::json!({ "name": "Amoxicillin" }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(medicine.status(), StatusCode::CREATED);
    let medicine_id = body_to_json(medicine.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let duplicate_medicine = app
        .post_json(
            "/api/v1/medicines",
            &serde_json::json!({ "name": "Amoxicillin" }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(duplicate_medicine.status(), StatusCode::CONFLICT);

    let assign = app
        .post_json(
            &format!("/api/v1/medical-attentions/{attention_id}/medicines"),
            &serde_json::json!({ "medicineId": medicine_id, "details": "250mg twice a day" }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(assign.status(), StatusCode::CREATED);

    // The pair is the identity: assigning again conflicts instead of
    // duplicating the row.
    let again = app
        .post_json(
            &format!("/api/v1/medical-attentions/{attention_id}/medicines"),
            &serde_json::json!({ "medicineId": medicine_id, "details": "500mg once a day" }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let update = app
        .put_json(
            &format!("/api/v1/medical-attentions/{attention_id}/medicines/{medicine_id}"),
            &serde_json::json!({ "details": "500mg once a day" }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(update.status(), StatusCode::OK);
    let body = body_to_json(update.into_body()).await?;
    assert_eq!(body["details"], "500mg once a day");

    let list = app
        .get(
            &format!("/api/v1/medical-attentions/{attention_id}/medicines"),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(list.status(), StatusCode::OK);
    let body = body_to_json(list.into_body()).await?;
    let medicines = body["medicines"].as_array().unwrap();
    assert_eq!(medicines.len(), 1);
    assert_eq!(medicines[0]["name"], "Amoxicillin");
    assert_eq!(medicines[0]["details"], "500mg once a day");

    let remove = app
        .delete(
            &format!("/api/v1/medical-attentions/{attention_id}/medicines/{medicine_id}"),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(remove.status(), StatusCode::NO_CONTENT);

    let gone = app
        .delete(
            &format!("/api/v1/medical-attentions/{attention_id}/medicines/{medicine_id}"),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    let body = body_to_json(gone.into_body()).await?;
    assert_eq!(body["message"], "Medicine is not assigned with medical attention");

    Ok(())
}

#[tokio::test]
async fn attention_queries_scope_by_parent() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new()? else {
        return Ok(());
    };

    let clinic = seed_clinic(&app).await?;
    seed_attention(&app, &clinic).await?;

    let by_patient = app
        .get(
            &format!("/api/v1/medical-attentions/patient/{}", clinic.patient_id),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(by_patient.status(), StatusCode::OK);
    let body = body_to_json(by_patient.into_body()).await?;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let missing_patient = app
        .get(
            &format!("/api/v1/medical-attentions/patient/{}", uuid::Uuid::new_v4()),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(missing_patient.status(), StatusCode::NOT_FOUND);

    let by_date = app
        .get("/api/v1/medical-attentions/date/2024-05-10", Some(&clinic.token))
        .await?;
    assert_eq!(by_date.status(), StatusCode::OK);
    let body = body_to_json(by_date.into_body()).await?;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let off_date = app
        .get("/api/v1/medical-attentions/date/2024-05-11", Some(&clinic.token))
        .await?;
    let body = body_to_json(off_date.into_body()).await?;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let range = app
        .get(
            "/api/v1/medical-attentions/range?from=2024-05-01&to=2024-05-31",
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(range.status(), StatusCode::OK);
    let body = body_to_json(range.into_body()).await?;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let backwards = app
        .get(
            "/api/v1/medical-attentions/range?from=2024-05-31&to=2024-05-01",
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(backwards.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn document_names_are_unique_per_owning_entity() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new()? else {
        return Ok(());
    };

    let clinic = seed_clinic(&app).await?;
    let attention_id = seed_attention(&app, &clinic).await?;

    let doc = serde_json::json!({
        "name": "xray-front",
        "link": "https://files.example.com/xray-front.png",
        "type": "image"
    });

    let create = app
        .post_json(
            &format!("/api/v1/patients/{}/documents", clinic.patient_id),
            &doc,
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(create.status(), StatusCode::CREATED);
    let document_id = body_to_json(create.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let duplicate = app
        .post_json(
            &format!("/api/v1/patients/{}/documents", clinic.patient_id),
            &doc,
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    let body = body_to_json(duplicate.into_body()).await?;
    assert_eq!(body["message"], "Document already exists with this name");

    // The same name is fine under a different owning entity.
    let for_attention = app
        .post_json(
            &format!("/api/v1/medical-attentions/{attention_id}/documents"),
            &doc,
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(for_attention.status(), StatusCode::CREATED);

    let bad_type = app
        .post_json(
            &format!("/api/v1/patients/{}/documents", clinic.patient_id),
            &serde_json::json!({
                "name": "notes",
                "link": "https://files.example.com/notes.bin",
                "type": "spreadsheet"
            }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(bad_type.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(bad_type.into_body()).await?;
    assert!(body["errors"].as_array().is_some());

    let update = app
        .put_json(
            &format!("/api/v1/documents/{document_id}"),
            &serde_json::json!({
                "name": "xray-side",
                "link": "https://files.example.com/xray-side.png",
                "type": "image"
            }),
            Some(&clinic.token),
        )
        .await?;
    assert_eq!(update.status(), StatusCode::OK);
    let body = body_to_json(update.into_body()).await?;
    assert_eq!(body["name"], "xray-side");

    let delete = app
        .delete(&format!("/api/v1/documents/{document_id}"), Some(&clinic.token))
        .await?;
    assert_eq!(delete.status(), StatusCode::NO_CONTENT);

    let gone = app
        .get(&format!("/api/v1/documents/{document_id}"), Some(&clinic.token))
        .await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn deleting_an_account_cascades_to_clinical_rows() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new()? else {
        return Ok(());
    };

    let clinic = seed_clinic(&app).await?;
    seed_attention(&app, &clinic).await?;

    let delete = app.delete("/api/v1/account", Some(&clinic.token)).await?;
    assert_eq!(delete.status(), StatusCode::NO_CONTENT);

    // A fresh account sees none of the deleted profile's rows.
    let other = app.register_with_profile("other@b.com", "secret1").await?;
    let patients = app.get("/api/v1/patients", Some(&other)).await?;
    let body = body_to_json(patients.into_body()).await?;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let attentions = app.get("/api/v1/medical-attentions", Some(&other)).await?;
    let body = body_to_json(attentions.into_body()).await?;
    assert_eq!(body.as_array().unwrap().len(), 0);

    Ok(())
}
