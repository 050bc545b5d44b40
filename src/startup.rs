use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use secrecy::Secret;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::email_client::EmailClient;
use crate::mail::Mailer;
use crate::routes::{
    admin_login, error_chain_fmt, handle_confirm_subscription, handle_create_newsletter,
    handle_create_subscription, handle_delete_newsletter, handle_get_newsletter,
    handle_join_waitlist, handle_list_newsletters, handle_preview_newsletter,
    handle_schedule_newsletter, handle_send_newsletter, handle_switch_language,
    handle_unsubscribe, handle_update_newsletter, health_check, reject_non_admin,
};

/// Token guarding the `/admin` routes.
pub struct AdminToken(pub Secret<String>);

pub struct Application {
    pub port: u16,
    pub server: Server,
}

#[derive(thiserror::Error)]
pub enum StartupError {
    #[error("Failed to load the configuration.")]
    Config(#[from] config::ConfigError),
    #[error("Failed to run database migrations.")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Sender email is not valid: {0}")]
    InvalidSender(String),
    #[error("Failed to build the email client.")]
    EmailClient(#[from] reqwest::Error),
    #[error("Failed to bind or run the server.")]
    Io(#[from] std::io::Error),
}

impl std::fmt::Debug for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, StartupError> {
        let db_pool = get_connection_db_pool(&config.database);

        // The database file belongs to this service, so it keeps its own schema up to date
        sqlx::migrate!("./migrations").run(&db_pool).await?;

        let sender_email = config
            .get_email_client_sender()
            .map_err(StartupError::InvalidSender)?;
        let email_client = EmailClient::new(
            config.get_email_client_base_url(),
            sender_email,
            config.get_email_client_sender_name(),
            config.get_email_client_api(),
            Some(config.get_email_client_timeout()),
        )?;
        let mailer = Mailer::new(
            email_client,
            config.get_app_base_url(),
            config.get_email_client_sender_name(),
        );

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            db_pool,
            mailer,
            AdminToken(config.get_admin_token()),
        )?;

        tracing::info!("Server listening on {}", config.get_address());

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    db_pool: SqlitePool,
    mailer: Mailer,
    admin_token: AdminToken,
) -> Result<Server, std::io::Error> {
    let db_pool = web::Data::new(db_pool);
    let mailer = web::Data::new(mailer);
    let admin_token = web::Data::new(admin_token);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/lang/{lang}", web::get().to(handle_switch_language))
            .route("/waitlist", web::post().to(handle_join_waitlist))
            .route("/subscriptions", web::post().to(handle_create_subscription))
            .route(
                "/subscriptions/confirm",
                web::get().to(handle_confirm_subscription),
            )
            .route("/unsubscribe", web::get().to(handle_unsubscribe))
            // Registered before the guarded scope so it stays reachable without the cookie
            .route("/admin/login", web::get().to(admin_login))
            .service(
                web::scope("/admin")
                    .wrap(from_fn(reject_non_admin))
                    .route("/newsletters", web::get().to(handle_list_newsletters))
                    .route("/newsletters", web::post().to(handle_create_newsletter))
                    .route("/newsletters/{id}", web::get().to(handle_get_newsletter))
                    .route("/newsletters/{id}", web::put().to(handle_update_newsletter))
                    .route(
                        "/newsletters/{id}",
                        web::delete().to(handle_delete_newsletter),
                    )
                    .route(
                        "/newsletters/{id}/schedule",
                        web::post().to(handle_schedule_newsletter),
                    )
                    .route(
                        "/newsletters/{id}/send",
                        web::post().to(handle_send_newsletter),
                    )
                    .route(
                        "/newsletters/{id}/preview",
                        web::get().to(handle_preview_newsletter),
                    ),
            )
            .app_data(db_pool.clone())
            .app_data(mailer.clone())
            .app_data(admin_token.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Connections are opened lazily and handed back to the pool when each query finishes.
pub fn get_connection_db_pool(config: &DatabaseSettings) -> SqlitePool {
    SqlitePoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
