use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use campus_match::config::AppConfig;
use campus_match::error::AppError;
use campus_match::store::{DocumentStore, MemoryDocumentStore};
use campus_match::telemetry;
use campus_match::workflows::admissions::{
    admissions_router, AdmissionsService, ApplicationStatus, Enrichment, GatekeeperPolicy,
    StoreDirectory, StoreNotificationSink,
};
use campus_match::workflows::matching::{
    EducationEntry, EducationLevel, ExperienceLevel, RequirementSet, Target, TargetKind,
    TargetStatus, WorkExperienceEntry,
};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

type PortalService = AdmissionsService<
    MemoryDocumentStore,
    StoreDirectory<MemoryDocumentStore>,
    StoreNotificationSink<MemoryDocumentStore>,
>;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Campus Match",
    about = "Match students to courses and jobs, arbitrating admissions to a single acceptance",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk the full apply/admit/select/rank flow against seeded sample data
    Demo,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo => run_demo(),
    }
}

fn build_service(store: Arc<MemoryDocumentStore>, policy: GatekeeperPolicy) -> Arc<PortalService> {
    let providers = Arc::new(StoreDirectory::new(store.clone()));
    let notifier = Arc::new(StoreNotificationSink::new(store.clone()));
    Arc::new(AdmissionsService::new(store, providers, notifier, policy))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let store = Arc::new(MemoryDocumentStore::new());
    let service = build_service(
        store,
        GatekeeperPolicy {
            institution_cap: config.admissions.institution_cap,
        },
    );

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(admissions_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "admissions portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn run_demo() -> Result<(), AppError> {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = build_service(store.clone(), GatekeeperPolicy::default());

    let student_id = seed_demo_student(&store);
    let course_ids = seed_demo_courses(&store);
    seed_demo_jobs(&store);

    println!("Admissions portal demo");

    let report = service.check_eligibility(&student_id, &course_ids[0])?;
    println!("\nEligibility for {}:", course_ids[0]);
    println!(
        "- qualified: {}, target available: {}, already applied: {}, cap used: {}",
        report.qualified,
        report.target_available,
        report.already_applied,
        report.current_application_count
    );

    let mut application_ids = Vec::new();
    for course_id in &course_ids {
        let application = service.apply_for_target(&student_id, course_id)?;
        println!(
            "Applied to {} at {} ({})",
            application.target_title, application.institution_name, application.id
        );
        application_ids.push(application.id);
    }

    for application_id in &application_ids {
        service.update_application_status(application_id, ApplicationStatus::Admitted, "registrar")?;
    }
    println!("\nAll {} applications admitted", application_ids.len());

    let outcome = service.select_admission(&student_id, &application_ids[0])?;
    println!(
        "Selected {} -> accepted; {} admitted offer(s) automatically declined",
        outcome.accepted.target_title,
        outcome.declined.len()
    );

    println!("\nFinal application states");
    for application_id in &application_ids {
        let view = service.get_application(application_id, Enrichment::Stored)?;
        println!(
            "- {} at {}: {}",
            view.target_title,
            view.institution_name,
            view.application.status.label()
        );
    }

    let matches = service.matches_for_student(&student_id)?;
    println!("\nRanked job matches");
    if matches.is_empty() {
        println!("- none above the score floor");
    }
    for entry in &matches {
        println!(
            "- {} at {}: score {}{}",
            entry.job.title,
            entry.job.institution_name,
            entry.result.score,
            if entry.result.qualified { "" } else { " (below qualification threshold)" }
        );
    }

    Ok(())
}

fn seed_demo_student(store: &MemoryDocumentStore) -> String {
    let student = campus_match::workflows::matching::Candidate {
        id: String::new(),
        full_name: "Amara Okafor".to_string(),
        education: vec![EducationEntry {
            level: EducationLevel::Bachelors,
            field: "Computer Science".to_string(),
            gpa: 3.5,
            institution: "Lakeside University".to_string(),
            start_year: 2019,
            end_year: Some(2023),
        }],
        skills: vec![
            "reactjs".to_string(),
            "node".to_string(),
            "sql".to_string(),
        ],
        work_experience: vec![WorkExperienceEntry {
            position: "Junior Developer".to_string(),
            company: "Northwind".to_string(),
            years: 2.0,
            start_date: None,
            end_date: None,
        }],
        certificates: Vec::new(),
        preferred_location: Some("Des Moines".to_string()),
    };

    store
        .create(
            campus_match::workflows::admissions::collections::STUDENTS,
            serde_json::to_value(&student).expect("student serializes"),
        )
        .expect("student seeds")
}

fn seed_demo_courses(store: &MemoryDocumentStore) -> Vec<String> {
    let courses = [
        ("lakeside", "Lakeside University", "MSc Data Science"),
        ("hillcrest", "Hillcrest College", "MSc Software Engineering"),
        ("northgate", "Northgate Institute", "MSc Applied Statistics"),
    ];

    courses
        .iter()
        .map(|(institution_id, institution_name, title)| {
            let target = Target {
                id: String::new(),
                kind: TargetKind::Course,
                title: title.to_string(),
                institution_id: institution_id.to_string(),
                institution_name: institution_name.to_string(),
                location: None,
                status: TargetStatus::Active,
                requirements: RequirementSet {
                    education: Some(EducationLevel::Bachelors),
                    min_gpa: Some(3.0),
                    ..RequirementSet::default()
                },
            };
            seed_target(store, &target)
        })
        .collect()
}

fn seed_demo_jobs(store: &MemoryDocumentStore) {
    let jobs = [
        (
            "initech",
            "Initech",
            "Frontend Developer",
            RequirementSet {
                skills: vec!["React".to_string(), "Node".to_string()],
                experience_level: Some(ExperienceLevel::EntryLevel),
                ..RequirementSet::default()
            },
        ),
        (
            "globex",
            "Globex",
            "Data Engineer",
            RequirementSet {
                skills: vec!["SQL".to_string(), "Spark".to_string()],
                experience_level: Some(ExperienceLevel::MidLevel),
                ..RequirementSet::default()
            },
        ),
        (
            "umbrella",
            "Umbrella Corp",
            "Principal Architect",
            RequirementSet {
                education: Some(EducationLevel::Masters),
                experience_level: Some(ExperienceLevel::Senior),
                skills: vec!["Kubernetes".to_string()],
                ..RequirementSet::default()
            },
        ),
    ];

    for (institution_id, institution_name, title, requirements) in jobs {
        let target = Target {
            id: String::new(),
            kind: TargetKind::Job,
            title: title.to_string(),
            institution_id: institution_id.to_string(),
            institution_name: institution_name.to_string(),
            location: None,
            status: TargetStatus::Active,
            requirements,
        };
        seed_target(store, &target);
    }
}

fn seed_target(store: &MemoryDocumentStore, target: &Target) -> String {
    let collection = match target.kind {
        TargetKind::Course => campus_match::workflows::admissions::collections::COURSES,
        TargetKind::Job => campus_match::workflows::admissions::collections::JOBS,
    };
    store
        .create(collection, serde_json::to_value(target).expect("target serializes"))
        .expect("target seeds")
}
