use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use quizsmith::clients::FlexibleClient;
use quizsmith::config::ServerConfig;
use quizsmith::interceptors::FileInterceptor;
use quizsmith::server::{self, AppService};
use quizsmith::store::{FileDocumentStore, QuizStore};
use quizsmith::QuizGenerator;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    config.validate()?;

    let client_type = config.client_type()?;
    let client = FlexibleClient::from_type(&client_type, config.model.clone())
        .with_context(|| format!("failed to create {client_type} client"))?;

    let mut generator = QuizGenerator::new(client, config.generator_config());
    if let Some(dir) = &config.transcript_dir {
        info!(path = %dir.display(), "Recording generation transcripts");
        generator = generator.with_interceptor(Arc::new(FileInterceptor::new(dir.clone())));
    }

    let store = match &config.data_dir {
        Some(dir) => {
            let backend = FileDocumentStore::open(dir.clone())
                .await
                .with_context(|| format!("failed to open data directory {}", dir.display()))?;
            QuizStore::new(Arc::new(backend))
        }
        None => {
            info!("No data directory configured, quizzes are kept in memory");
            QuizStore::in_memory()
        }
    };

    let service: web::Data<AppService> =
        web::Data::new(AppService::new(generator, store, config.service_config()));

    info!(bind = %config.bind, client = %client_type, "Starting quiz server");
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(service.clone())
            .configure(server::configure)
    })
    .bind(&config.bind)
    .with_context(|| format!("failed to bind {}", config.bind))?
    .run()
    .await?;

    Ok(())
}
