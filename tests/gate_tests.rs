use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use calma_portal::{
    AppConfig, AppState, create_router,
    gate::{
        GateDecision, GateInputs, PendingPolicy, RedirectTarget, RouteClass, classify, evaluate,
        is_gated,
    },
};
use tower::ServiceExt;

const SIGNED_OUT: GateInputs = GateInputs {
    token_present: false,
    assessment_complete: false,
};
const PENDING: GateInputs = GateInputs {
    token_present: true,
    assessment_complete: false,
};
const COMPLETE: GateInputs = GateInputs {
    token_present: true,
    assessment_complete: true,
};

const PROTECTED_PAGES: [&str; 6] = [
    "/dashboard",
    "/dashboard/chat",
    "/dashboard/posts/42",
    "/dashboard/profile/change-password",
    "/some/unknown/page",
    "/admin",
];

const PUBLIC_PAGES: [&str; 5] = [
    "/",
    "/login",
    "/register",
    "/recover-password",
    "/reset-password",
];

// --- Pure decision table ---

#[test]
fn test_signed_out_users_only_reach_public_pages() {
    for path in PUBLIC_PAGES {
        assert_eq!(
            evaluate(path, SIGNED_OUT, PendingPolicy::Strict),
            GateDecision::Allow,
            "{path}"
        );
    }
    for path in PROTECTED_PAGES.iter().chain(["/test"].iter()) {
        assert_eq!(
            evaluate(path, SIGNED_OUT, PendingPolicy::Strict),
            GateDecision::Redirect(RedirectTarget::Login),
            "{path}"
        );
    }
}

#[test]
fn test_flag_without_token_still_goes_to_login() {
    let stale_flag = GateInputs {
        token_present: false,
        assessment_complete: true,
    };
    assert_eq!(
        evaluate("/dashboard", stale_flag, PendingPolicy::Strict),
        GateDecision::Redirect(RedirectTarget::Login)
    );
    assert_eq!(
        evaluate("/test", stale_flag, PendingPolicy::Strict),
        GateDecision::Redirect(RedirectTarget::Login)
    );
    assert_eq!(
        evaluate("/login", stale_flag, PendingPolicy::Strict),
        GateDecision::Allow
    );
}

#[test]
fn test_pending_users_are_sent_to_the_assessment() {
    assert_eq!(
        evaluate("/test", PENDING, PendingPolicy::Strict),
        GateDecision::Allow
    );
    for path in PROTECTED_PAGES {
        assert_eq!(
            evaluate(path, PENDING, PendingPolicy::Strict),
            GateDecision::Redirect(RedirectTarget::Assessment),
            "{path}"
        );
    }
}

#[test]
fn test_pending_policy_decides_public_pages() {
    for path in PUBLIC_PAGES {
        assert_eq!(
            evaluate(path, PENDING, PendingPolicy::Strict),
            GateDecision::Redirect(RedirectTarget::Assessment),
            "{path}"
        );
        assert_eq!(
            evaluate(path, PENDING, PendingPolicy::AllowPublic),
            GateDecision::Allow,
            "{path}"
        );
    }
    // The policy never opens protected pages.
    assert_eq!(
        evaluate("/dashboard", PENDING, PendingPolicy::AllowPublic),
        GateDecision::Redirect(RedirectTarget::Assessment)
    );
}

#[test]
fn test_completed_users_never_see_the_assessment_again() {
    assert_eq!(
        evaluate("/test", COMPLETE, PendingPolicy::Strict),
        GateDecision::Redirect(RedirectTarget::Dashboard)
    );
    for path in PROTECTED_PAGES.iter().chain(PUBLIC_PAGES.iter()) {
        assert_eq!(
            evaluate(path, COMPLETE, PendingPolicy::Strict),
            GateDecision::Allow,
            "{path}"
        );
    }
}

#[test]
fn test_classify_tolerates_one_trailing_slash() {
    assert_eq!(classify("/login/"), RouteClass::Public);
    assert_eq!(classify("/test/"), RouteClass::Assessment);
    assert_eq!(classify("/"), RouteClass::Public);
    assert_eq!(classify("/dashboard/"), RouteClass::Protected);
    assert_eq!(classify("/loginx"), RouteClass::Protected);
    assert_eq!(classify("/test/extra"), RouteClass::Protected);
}

#[test]
fn test_is_gated_skips_api_and_assets() {
    assert!(!is_gated("/api/posts"));
    assert!(!is_gated("/api"));
    assert!(!is_gated("/_next/static/chunk.js"));
    assert!(!is_gated("/_static/logo"));
    assert!(!is_gated("/_vercel/insights"));

    assert!(is_gated("/"));
    assert!(is_gated("/dashboard"));
    assert!(is_gated("/test"));
}

#[test]
fn test_is_gated_matches_whole_segments_and_dotted_paths() {
    assert!(is_gated("/apix"));
    assert!(is_gated("/api-docs"));
    assert!(is_gated("/_nextpage"));
    assert!(is_gated("/dashboard/posts/1.5"));
    assert!(is_gated("/dashboard/groups/a.b"));
    assert!(is_gated("/favicon.ico"));
}

#[test]
fn test_pending_policy_parsing() {
    assert_eq!("strict".parse::<PendingPolicy>(), Ok(PendingPolicy::Strict));
    assert_eq!("allow-public".parse::<PendingPolicy>(), Ok(PendingPolicy::AllowPublic));
    assert_eq!("ALLOW_PUBLIC".parse::<PendingPolicy>(), Ok(PendingPolicy::AllowPublic));
    assert!("lenient".parse::<PendingPolicy>().is_err());
    assert_eq!(PendingPolicy::default(), PendingPolicy::Strict);
    assert_eq!(PendingPolicy::AllowPublic.to_string(), "allow-public");
}

// --- Middleware through the full router ---

fn app(config: AppConfig) -> Router {
    create_router(AppState::new(config))
}

async fn get(router: &Router, path: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_router_redirects_signed_out_user_to_login() {
    let router = app(AppConfig::default());

    let response = get(&router, "/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");

    let response = get(&router, "/test", None).await;
    assert_eq!(location(&response), "/login");

    let response = get(&router, "/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_router_treats_empty_token_cookie_as_absent() {
    let router = app(AppConfig::default());
    let response = get(&router, "/dashboard", Some("authToken=")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_router_sends_pending_user_to_assessment() {
    let router = app(AppConfig::default());

    let response = get(&router, "/dashboard/posts", Some("authToken=abc")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/test");

    let response = get(&router, "/test", Some("authToken=abc")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Only the literal "true" counts as completed.
    let response = get(&router, "/dashboard", Some("authToken=abc; testCompleted=false")).await;
    assert_eq!(location(&response), "/test");
}

#[tokio::test]
async fn test_router_applies_pending_policy_to_public_pages() {
    let strict = app(AppConfig::default());
    let response = get(&strict, "/", Some("authToken=abc")).await;
    assert_eq!(location(&response), "/test");

    let lenient = app(AppConfig {
        pending_policy: PendingPolicy::AllowPublic,
        ..AppConfig::default()
    });
    let response = get(&lenient, "/", Some("authToken=abc")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_router_bounces_completed_user_off_assessment() {
    let router = app(AppConfig::default());
    let cookies = "authToken=abc; testCompleted=true";

    let response = get(&router, "/test", Some(cookies)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard");

    let response = get(&router, "/test/", Some(cookies)).await;
    assert_eq!(location(&response), "/dashboard");

    let response = get(&router, "/dashboard/groups/7", Some(cookies)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_router_serves_trailing_slash_pages() {
    let router = app(AppConfig::default());
    let response = get(&router, "/login/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_router_does_not_gate_api_or_assets() {
    let router = app(AppConfig::default());

    let response = get(&router, "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Unknown API paths are plain 404s, never redirects.
    let response = get(&router, "/api/nothing-here", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_router_gates_page_ids_containing_a_dot() {
    let router = app(AppConfig::default());

    for path in ["/dashboard/posts/1.5", "/dashboard/groups/a.b", "/favicon.ico"] {
        let response = get(&router, path, None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(location(&response), "/login", "{path}");
    }

    let response = get(&router, "/dashboard/posts/1.5", Some("authToken=abc")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/test");

    let response = get(
        &router,
        "/dashboard/posts/1.5",
        Some("authToken=abc; testCompleted=true"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_router_gates_paths_that_only_resemble_api() {
    let router = app(AppConfig::default());
    let response = get(&router, "/apix", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_router_unknown_page_for_completed_user_is_not_found() {
    let router = app(AppConfig::default());
    let response = get(
        &router,
        "/dashboard/nowhere",
        Some("authToken=abc; testCompleted=true"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_evaluation_is_repeatable() {
    let inputs = [SIGNED_OUT, PENDING, COMPLETE];
    let paths = ["/", "/test", "/test/", "/dashboard", "/dashboard/chat/"];
    for input in inputs {
        for path in paths {
            for policy in [PendingPolicy::Strict, PendingPolicy::AllowPublic] {
                let first = evaluate(path, input, policy);
                assert_eq!(evaluate(path, input, policy), first, "{path} {input:?}");
            }
        }
    }
}
