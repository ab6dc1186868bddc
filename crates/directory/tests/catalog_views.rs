mod common;

use axum::http::StatusCode;
use common::{TestApp, body_text, location};
use entity::{department, employee, role};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, IntoActiveModel};

#[tokio::test]
async fn department_list_shows_entries() {
    let app = TestApp::new().await;
    app.add_department("IT", "The IT Department").await;
    let response = app.get("/departments", Some(&app.admin_session())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<td>IT</td>"));
    assert!(body.contains("The IT Department"));
    assert!(body.contains(r#"href="/departments/add""#));
}

#[tokio::test]
async fn empty_list_says_so() {
    let app = TestApp::new().await;
    let response = app.get("/roles", Some(&app.admin_session())).await;
    assert!(body_text(response).await.contains("No roles have been added."));
}

#[tokio::test]
async fn list_accepts_post() {
    let app = TestApp::new().await;
    let response = app
        .post_form("/departments", Some(&app.admin_session()), "")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn add_form_renders() {
    let app = TestApp::new().await;
    let response = app.get("/departments/add", Some(&app.admin_session())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Add Department"));
}

#[tokio::test]
async fn adding_a_department_inserts_exactly_one() {
    let app = TestApp::new().await;
    let session = app.admin_session();
    assert_eq!(app.department_count().await, 0);

    let response = app
        .post_form(
            "/departments/add",
            Some(&session),
            "name=IT&description=The+IT+Department",
        )
        .await;
    assert_eq!(location(&response), "/departments");
    assert_eq!(app.department_count().await, 1);
    let (status, body) = app.follow(response, &session).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("You have successfully added a new department."));

    let stored = department::Entity::find()
        .one(app.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "IT");
    assert_eq!(stored.description.as_deref(), Some("The IT Department"));
}

#[tokio::test]
async fn duplicate_department_name_is_flashed_not_inserted() {
    let app = TestApp::new().await;
    let session = app.admin_session();
    app.add_department("IT", "The IT Department").await;

    let response = app
        .post_form("/departments/add", Some(&session), "name=IT&description=again")
        .await;
    assert_eq!(location(&response), "/departments");
    assert_eq!(app.department_count().await, 1);
    let (_, body) = app.follow(response, &session).await;
    assert!(body.contains("Error: department name already exists."));
}

#[tokio::test]
async fn blank_name_rerenders_form() {
    let app = TestApp::new().await;
    let response = app
        .post_form(
            "/departments/add",
            Some(&app.admin_session()),
            "name=+++&description=x",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("This field is required."));
    assert_eq!(app.department_count().await, 0);
}

#[tokio::test]
async fn overlong_description_rerenders_form() {
    let app = TestApp::new().await;
    let body = format!("name=Ops&description={}", "d".repeat(201));
    let response = app
        .post_form("/roles/add", Some(&app.admin_session()), &body)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("Description must be at most 200 characters.")
    );
    assert_eq!(app.role_count().await, 0);
}

#[tokio::test]
async fn edit_form_is_prefilled() {
    let app = TestApp::new().await;
    let ceo = app.add_role("CEO", "Run the whole company").await;
    let response = app
        .get(&format!("/roles/edit/{}", ceo.id), Some(&app.admin_session()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"value="CEO""#));
    assert!(body.contains(r#"value="Run the whole company""#));
}

#[tokio::test]
async fn editing_keeps_identity_and_count() {
    let app = TestApp::new().await;
    let session = app.admin_session();
    let it = app.add_department("IT", "The IT Department").await;

    let response = app
        .post_form(
            &format!("/departments/edit/{}", it.id),
            Some(&session),
            "name=Engineering&description=Builds+things",
        )
        .await;
    assert_eq!(location(&response), "/departments");
    assert_eq!(app.department_count().await, 1);
    let stored = department::Entity::find_by_id(it.id)
        .one(app.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Engineering");
    assert_eq!(stored.description.as_deref(), Some("Builds things"));

    let (_, body) = app.follow(response, &session).await;
    assert!(body.contains("You have successfully edited the department."));
}

#[tokio::test]
async fn editing_with_blank_name_rerenders_form() {
    let app = TestApp::new().await;
    let it = app.add_department("IT", "The IT Department").await;

    let response = app
        .post_form(
            &format!("/departments/edit/{}", it.id),
            Some(&app.admin_session()),
            "name=+++&description=x",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("This field is required."));
    let stored = department::Entity::find_by_id(it.id)
        .one(app.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "IT");
    assert_eq!(stored.description.as_deref(), Some("The IT Department"));
}

#[tokio::test]
async fn editing_onto_a_taken_name_is_flashed() {
    let app = TestApp::new().await;
    let session = app.admin_session();
    app.add_role("CEO", "Run the whole company").await;
    let cto = app.add_role("CTO", "Run the technology").await;

    let response = app
        .post_form(
            &format!("/roles/edit/{}", cto.id),
            Some(&session),
            "name=CEO&description=",
        )
        .await;
    assert_eq!(location(&response), "/roles");
    let stored = role::Entity::find_by_id(cto.id)
        .one(app.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "CTO");
    let (_, body) = app.follow(response, &session).await;
    assert!(body.contains("Error: role name already exists."));
}

#[tokio::test]
async fn editing_a_missing_entry_is_not_found() {
    let app = TestApp::new().await;
    let session = app.admin_session();
    let response = app.get("/departments/edit/77", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app
        .post_form("/departments/edit/77", Some(&session), "name=X")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("404 Error"));
}

#[tokio::test]
async fn deleting_removes_only_that_record() {
    let app = TestApp::new().await;
    let session = app.admin_session();
    let it = app.add_department("IT", "The IT Department").await;
    let hr = app.add_department("HR", "People").await;

    let response = app
        .get(&format!("/departments/delete/{}", it.id), Some(&session))
        .await;
    assert_eq!(location(&response), "/departments");
    assert_eq!(app.department_count().await, 1);
    let remaining = department::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(remaining, vec![hr]);

    let (_, body) = app.follow(response, &session).await;
    assert!(body.contains("You have successfully deleted the department."));
}

#[tokio::test]
async fn deleting_by_post_works_for_roles() {
    let app = TestApp::new().await;
    let ceo = app.add_role("CEO", "Run the whole company").await;
    let response = app
        .post_form(
            &format!("/roles/delete/{}", ceo.id),
            Some(&app.admin_session()),
            "",
        )
        .await;
    assert_eq!(location(&response), "/roles");
    assert_eq!(app.role_count().await, 0);
}

#[tokio::test]
async fn deleting_a_missing_entry_is_not_found() {
    let app = TestApp::new().await;
    app.add_role("CEO", "Run the whole company").await;
    let response = app.get("/roles/delete/404", Some(&app.admin_session())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.role_count().await, 1);
}

#[tokio::test]
async fn deleting_clears_employee_references() {
    let app = TestApp::new().await;
    let it = app.add_department("IT", "The IT Department").await;
    let ceo = app.add_role("CEO", "Run the whole company").await;
    let mut user = app.employee(app.user_id).await.into_active_model();
    user.department_id = Set(Some(it.id));
    user.role_id = Set(Some(ceo.id));
    user.update(app.db.as_ref()).await.unwrap();

    let response = app
        .get(&format!("/departments/delete/{}", it.id), Some(&app.admin_session()))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let user: employee::Model = app.employee(app.user_id).await;
    assert_eq!(user.department_id, None);
    assert_eq!(user.role_id, Some(ceo.id));
}
