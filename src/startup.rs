use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::SessionAuthenticator;
use crate::configuration::ApplicationSettings;
use crate::logger::LoggerMiddleware;
use crate::middleware::SessionMiddleware;
use crate::routes::{get_current_user, health_check, login, logout, signup};

pub fn run(
    listener: TcpListener,
    authenticator: Arc<SessionAuthenticator>,
    application: &ApplicationSettings,
) -> Result<Server, std::io::Error> {
    let authenticator_data = web::Data::from(authenticator.clone());
    let static_dir = application.static_dir.clone();

    let server = HttpServer::new(move || {
        App::new()
            // Innermost first: the session check runs inside both loggers
            .wrap(SessionMiddleware::new(authenticator.clone()))
            .wrap(LoggerMiddleware)
            .wrap(Logger::default())

            // Shared state
            .app_data(authenticator_data.clone())

            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/signup", web::post().to(signup))
                    .route("/login", web::post().to(login))
                    .route("/logout", web::post().to(logout))
                    .route("/me", web::get().to(get_current_user)),
            )

            // Static file serving (must be last to not override API routes)
            .service(fs::Files::new("/", &static_dir).index_file("index.html"))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
