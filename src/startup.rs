use crate::configuration::Settings;
use crate::connectors::{AmqpPublisher, BlobStorage, EventPublisher, LocalBlobStorage};
use crate::errors::ApiError;
use crate::extract::ExtractorRegistry;
use crate::helpers::MqManager;
use crate::middleware;
use crate::models::EventChannel;
use crate::routes;
use crate::services::IngestionPipeline;
use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpServer};
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

/// Wires the production collaborators: the broker-backed publisher, whose exchanges and
/// queues are declared before the first request, and the filesystem bucket.
pub async fn run(
    listener: TcpListener,
    pg_pool: Pool<Postgres>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let mq_manager = Arc::new(MqManager::try_new(settings.amqp.connection_string())?);
    let publisher = Arc::new(AmqpPublisher::new(mq_manager));
    for channel in EventChannel::ALL {
        publisher.ensure_channel(channel).await.map_err(|err| {
            tracing::error!("declaring {:?}: {}", channel, err);
            std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
        })?;
    }

    let blob_store = Arc::new(LocalBlobStorage::new(
        &settings.storage.root_dir,
        &settings.storage.bucket_name,
    ));

    serve(listener, pg_pool, settings, publisher, blob_store)
}

pub fn serve(
    listener: TcpListener,
    pg_pool: Pool<Postgres>,
    settings: Settings,
    publisher: Arc<dyn EventPublisher>,
    blob_store: Arc<dyn BlobStorage>,
) -> Result<Server, std::io::Error> {
    let max_upload_bytes = settings.storage.max_upload_bytes;
    let pipeline = web::Data::new(IngestionPipeline::new(
        pg_pool.clone(),
        blob_store,
        Arc::new(ExtractorRegistry::with_defaults()),
        publisher,
    ));
    let settings = web::Data::new(settings);
    let pg_pool = web::Data::new(pg_pool);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(middleware::authentication::Manager::new())
            .wrap(actix_web::middleware::Compress::default())
            .wrap(Cors::permissive())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                ApiError::bad_request(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                ApiError::bad_request(err.to_string()).into()
            }))
            .app_data(web::FormConfig::default().error_handler(|err, _req| {
                ApiError::bad_request(err.to_string()).into()
            }))
            .service(web::scope("/health").service(routes::health_check))
            .service(
                web::scope("/accounts")
                    .service(routes::account::login)
                    .service(routes::account::add)
                    .service(routes::account::documents)
                    .service(routes::account::chats)
                    .service(routes::account::item),
            )
            .service(
                web::scope("/chats")
                    .service(routes::chat::add::add)
                    .service(routes::chat::get::item)
                    .service(routes::chat::delete::item)
                    .service(routes::chat::message::add)
                    .service(routes::chat::unread::item)
                    .service(routes::chat::unread::mark_as_read),
            )
            .service(
                web::scope("/documents")
                    .service(routes::document::add::add)
                    .service(routes::document::delete::item),
            )
            .app_data(pg_pool.clone())
            .app_data(pipeline.clone())
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
