#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    routes::{
        bulk_registration::{
            get_module_register, get_student_register, internal_get_module_register,
            internal_get_student_register, post_module_register, post_student_register,
        },
        grade_detail::get_grade,
        grades::{
            get_grades, internal_get_add_grade_form, internal_get_grades,
            internal_get_module_options, internal_put_new_grade,
        },
        index::{get_index_route, internal_get_search, internal_post_seed},
        insights::{export_modules_csv, export_students_csv, get_insights},
        module_detail::{
            delete_module_student, get_module, internal_get_edit_module_form,
            internal_put_edit_module,
        },
        modules::{
            delete_module, get_modules, internal_get_add_module_form, internal_get_modules,
            internal_put_new_module,
        },
        registrations::{
            delete_registration, get_registrations, internal_get_add_registration_form,
            internal_get_registrations, internal_put_new_registration,
        },
        sse::sse_feed,
        student_detail::{
            delete_student_module, get_student, internal_get_edit_student_form,
            internal_put_edit_student,
        },
        students::{
            delete_student, get_students, internal_get_add_student_form, internal_get_students,
            internal_put_new_student,
        },
    },
    state::GradebookState,
};
use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod api;
mod bulk;
mod config;
mod data;
mod error;
mod fixtures;
mod listing;
mod maud_conveniences;
mod routes;
mod state;
mod stats;


async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}

pub fn router(state: GradebookState) -> Router {
    Router::new()
        .route("/", get(get_index_route))
        .route("/students", get(get_students))
        .route("/students/{id}", delete(delete_student))
        .route("/student/{id}", get(get_student))
        .route("/student/{id}/modules/{code}", delete(delete_student_module))
        .route(
            "/student/{id}/register",
            get(get_student_register).post(post_student_register),
        )
        .route("/modules", get(get_modules))
        .route("/modules/{code}", delete(delete_module))
        .route("/module/{code}", get(get_module))
        .route("/module/{code}/students/{id}", delete(delete_module_student))
        .route(
            "/module/{code}/register",
            get(get_module_register).post(post_module_register),
        )
        .route("/grades", get(get_grades))
        .route("/grade/{id}", get(get_grade))
        .route("/registrations", get(get_registrations))
        .route("/registrations/{id}/{code}", delete(delete_registration))
        .route("/insights", get(get_insights))
        .route("/insights/export/students.csv", get(export_students_csv))
        .route("/insights/export/modules.csv", get(export_modules_csv))
        .route("/internal/search", get(internal_get_search))
        .route("/internal/seed", post(internal_post_seed))
        .route("/internal/students", get(internal_get_students))
        .route(
            "/internal/students/new",
            get(internal_get_add_student_form).put(internal_put_new_student),
        )
        .route(
            "/internal/student/{id}/edit",
            get(internal_get_edit_student_form).put(internal_put_edit_student),
        )
        .route(
            "/internal/student/{id}/register",
            get(internal_get_student_register),
        )
        .route("/internal/modules", get(internal_get_modules))
        .route(
            "/internal/modules/new",
            get(internal_get_add_module_form).put(internal_put_new_module),
        )
        .route(
            "/internal/module/{code}/edit",
            get(internal_get_edit_module_form).put(internal_put_edit_module),
        )
        .route(
            "/internal/module/{code}/register",
            get(internal_get_module_register),
        )
        .route("/internal/grades", get(internal_get_grades))
        .route(
            "/internal/grades/new",
            get(internal_get_add_grade_form).put(internal_put_new_grade),
        )
        .route(
            "/internal/grades/module_options",
            get(internal_get_module_options),
        )
        .route("/internal/registrations", get(internal_get_registrations))
        .route(
            "/internal/registrations/new",
            get(internal_get_add_registration_form).put(internal_put_new_registration),
        )
        .route("/sse_feed", get(sse_feed))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // RUST_LOG can live in .env, so this has to go before tracing
    let dotenv = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    if let Err(e) = dotenv {
        warn!(?e, "no .env loaded, using the process environment");
    }

    let config = RuntimeConfiguration::new().expect("unable to create config");
    let state = GradebookState::new(config).expect("unable to create state");

    let server_ip = state.config().server_ip().to_string();
    let app = router(state);

    let listener = TcpListener::bind(&server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("unable to serve app");
}
