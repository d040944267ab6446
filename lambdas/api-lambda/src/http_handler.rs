use langlearn_shared::{
    admins, analytics, auth, language_tests, organizations, student_tests, students,
    http::{
        json_response, method_not_allowed, not_found, preflight, query_param, required_query_param, respond,
    },
    AppState,
};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::sync::Arc;

/// Main Lambda handler - routes every HTTP request by method and path segments
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    tracing::info!("API Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        return preflight();
    }

    let store = state.store.as_ref();
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, parts.as_slice()) {
        (&Method::GET, []) => json_response(
            StatusCode::OK,
            &serde_json::json!({"message": "Language Learning API is running"}),
        ),

        // --- AUTH ---
        (&Method::POST, ["auth", "login"]) => auth::login(&state, body).await,

        // --- ORGANIZATIONS ---
        (&Method::GET, ["organization", "list"]) => {
            respond(StatusCode::OK, organizations::list_organizations(store).await)
        }

        // --- ADMINS ---
        (&Method::POST, ["admin", "add"]) => respond(StatusCode::OK, admins::add_admin(store, body).await),
        (&Method::GET, ["admin", "list"]) => {
            let org_id = query_param(&event, "org_id");
            respond(StatusCode::OK, admins::list_admins(store, org_id.as_deref()).await)
        }
        (&Method::GET, ["admin", admin_id]) => respond(StatusCode::OK, admins::get_admin(store, admin_id).await),
        (&Method::PUT, ["admin", admin_id]) => {
            respond(StatusCode::OK, admins::update_admin(store, admin_id, body).await)
        }
        (&Method::DELETE, ["admin", admin_id]) => {
            respond(StatusCode::OK, admins::delete_admin(store, admin_id).await)
        }

        // --- STUDENTS ---
        (&Method::POST, ["student", "add"]) => {
            respond(StatusCode::OK, students::add_student(store, body).await)
        }
        (&Method::GET, ["student", "list"]) => {
            let org_id = query_param(&event, "org_id");
            let language = query_param(&event, "language");
            respond(
                StatusCode::OK,
                students::list_students(store, org_id.as_deref(), language.as_deref()).await,
            )
        }
        (&Method::GET, ["student", student_id]) => {
            respond(StatusCode::OK, students::get_student(store, student_id).await)
        }
        (&Method::PUT, ["student", student_id]) => {
            respond(StatusCode::OK, students::update_student(store, student_id, body).await)
        }
        (&Method::DELETE, ["student", student_id]) => {
            respond(StatusCode::OK, students::delete_student(store, student_id).await)
        }

        // --- TESTS ---
        (&Method::POST, ["tests", "add"]) => {
            respond(StatusCode::OK, language_tests::add_test(store, body).await)
        }
        (&Method::GET, ["tests", "list"]) => {
            let result = match required_query_param(&event, "auth_id") {
                Ok(auth_id) => {
                    let status = query_param(&event, "status");
                    let language = query_param(&event, "language");
                    language_tests::list_tests(store, &auth_id, status.as_deref(), language.as_deref()).await
                }
                Err(e) => Err(e),
            };
            respond(StatusCode::OK, result)
        }
        (&Method::PUT, ["tests", test_id]) => {
            respond(StatusCode::OK, language_tests::update_test(store, test_id, body).await)
        }
        (&Method::DELETE, ["tests", test_id]) => {
            let auth_id = query_param(&event, "auth_id");
            respond(
                StatusCode::OK,
                language_tests::delete_test(store, test_id, auth_id.as_deref()).await,
            )
        }

        // --- STUDENT TESTS ---
        (&Method::GET, ["student-tests", "upcoming"]) => {
            let result = match auth::session_from_request(&state, &event) {
                Ok(claims) => {
                    let language = query_param(&event, "language");
                    student_tests::upcoming_tests(store, &claims.sub, language.as_deref()).await
                }
                Err(e) => Err(e),
            };
            respond(StatusCode::OK, result)
        }

        // --- ANALYTICS ---
        (&Method::GET, ["analytics", report]) => {
            let (org_id, language) = match (
                required_query_param(&event, "org_id"),
                required_query_param(&event, "language"),
            ) {
                (Ok(org_id), Ok(language)) => (org_id, language),
                (Err(e), _) | (_, Err(e)) => return e.into_response(),
            };
            match *report {
                "students" => respond(
                    StatusCode::OK,
                    analytics::student_analytics(store, &org_id, &language).await,
                ),
                "summary" => respond(StatusCode::OK, analytics::summary(store, &org_id, &language).await),
                "language-detail" => respond(
                    StatusCode::OK,
                    analytics::language_detail(store, &org_id, &language).await,
                ),
                _ => not_found(),
            }
        }

        (_, ["auth", "login"]) => method_not_allowed(),
        _ => not_found(),
    }
}
