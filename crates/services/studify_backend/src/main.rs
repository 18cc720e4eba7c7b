// File: services/studify_backend/src/main.rs
use axum::{routing::get, Router};
use std::sync::Arc;
use studify_config::load_config;
use studify_db::DbClient;
#[cfg(feature = "dispatch")]
use studify_dispatch::JobScheduler;
use tokio::net::TcpListener;
use tracing::info;

#[cfg(any(feature = "push", feature = "sms", feature = "dispatch"))]
use studify_db::{
    DeviceRegistrationRepository, SentReminderRepository, SmsLogRepository,
    SqlDeviceRegistrationRepository, SqlEnrollmentRepository, SqlSentReminderRepository,
    SqlSmsLogRepository,
};

async fn init_schemas(db_client: &DbClient) {
    #[cfg(any(feature = "push", feature = "sms", feature = "dispatch"))]
    {
        SqlDeviceRegistrationRepository::new(db_client.clone())
            .init_schema()
            .await
            .expect("Failed to initialize device registration schema");
        SqlSmsLogRepository::new(db_client.clone())
            .init_schema()
            .await
            .expect("Failed to initialize SMS log schema");
        SqlSentReminderRepository::new(db_client.clone())
            .init_schema()
            .await
            .expect("Failed to initialize sent reminder schema");
        SqlEnrollmentRepository::new(db_client.clone())
            .init_schema()
            .await
            .expect("Failed to initialize enrollment schema");
    }
    #[cfg(not(any(feature = "push", feature = "sms", feature = "dispatch")))]
    let _ = db_client;
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    let config = Arc::new(load_config().expect("Failed to load config"));
    studify_common::logging::init();

    let db_client = DbClient::new(&config)
        .await
        .expect("Failed to connect to database");
    init_schemas(&db_client).await;

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Studify API!" }))
        .with_state(config.clone());

    #[cfg(feature = "push")]
    let push_router = studify_push::routes(config.clone(), db_client.clone());
    #[cfg(feature = "sms")]
    let sms_router = studify_sms::routes(config.clone(), db_client.clone());

    // The dispatch gateway is shared between the HTTP surface (manual scan,
    // broadcast, diagnostics) and the background scheduler so both operate on
    // the same scan-window state.
    #[cfg(feature = "dispatch")]
    let gateway = studify_dispatch::build_gateway(&config, db_client.clone())
        .expect("Failed to build dispatch gateway");
    #[cfg(feature = "dispatch")]
    let dispatch_router = studify_dispatch::routes(gateway.clone());

    #[cfg(feature = "dispatch")]
    let mut scheduler = JobScheduler::new();
    #[cfg(feature = "dispatch")]
    {
        if studify_common::is_feature_enabled(&config, config.use_dispatch, config.dispatch.as_ref())
        {
            let dispatch_config = config.dispatch.clone().unwrap_or_default();
            scheduler.start_scan(
                gateway.clone(),
                std::time::Duration::from_secs(dispatch_config.scan_interval_secs),
            );

            let cleanup_config = config.cleanup.clone().unwrap_or_default();
            let cleanup_job = Arc::new(studify_dispatch::CleanupJob::new(
                SqlDeviceRegistrationRepository::new(db_client.clone()),
                cleanup_config.retention_days,
            ));
            scheduler.start_cleanup(
                cleanup_job,
                std::time::Duration::from_secs(60),
                std::time::Duration::from_secs(cleanup_config.interval_secs),
            );
        } else {
            info!("Dispatch disabled by configuration; background jobs not started");
        }
    }

    let api_router = Router::new().nest("/api", {
        #[allow(unused_mut)] // for the features it needs to be mutable
        let mut router = api_router;
        #[cfg(feature = "push")]
        {
            router = router.merge(push_router);
        }
        #[cfg(feature = "sms")]
        {
            router = router.merge(sms_router);
        }
        #[cfg(feature = "dispatch")]
        {
            router = router.merge(dispatch_router);
        }
        router
    });

    #[allow(unused_mut)]
    let mut app = api_router;

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        #[cfg(feature = "dispatch")]
        use studify_dispatch::openapi::DispatchApiDoc;
        #[cfg(feature = "push")]
        use studify_push::openapi::PushApiDoc;
        #[cfg(feature = "sms")]
        use studify_sms::openapi::SmsApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        // Define the merged OpenAPI documentation struct
        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Studify API",
                version = "0.1.0",
                description = "Studify reminder and notification service API docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Studify", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        #[allow(unused_mut)] // for the features it needs to be mutable
        let mut openapi_doc = ApiDoc::openapi();
        #[cfg(feature = "push")]
        openapi_doc.merge(PushApiDoc::openapi());
        #[cfg(feature = "sms")]
        openapi_doc.merge(SmsApiDoc::openapi());
        #[cfg(feature = "dispatch")]
        openapi_doc.merge(DispatchApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    let app = app.layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    #[cfg(feature = "dispatch")]
    scheduler.stop();
}
