use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::configuration::Settings;
use crate::middleware::AccessTokenMiddleware;
use crate::routes::{
    delete_user, health_check, login, logout, protected, refresh, register, update_role,
};
use crate::store::CredentialStore;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn CredentialStore>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let service = web::Data::new(AuthService::new(store, &settings.jwt));
    let codec = service.codec().clone();
    let app_settings = web::Data::new(settings.application.clone());
    let jwt_settings = web::Data::new(settings.jwt.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            // Shared state
            .app_data(service.clone())
            .app_data(app_settings.clone())
            .app_data(jwt_settings.clone())
            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .route("/api/register", web::post().to(register))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/logout", web::post().to(logout))
            // Protected routes (require a valid access token)
            .service(
                web::scope("/api")
                    .wrap(AccessTokenMiddleware::new(codec.clone()))
                    .route("/protected", web::get().to(protected))
                    .route("/users/{username}", web::delete().to(delete_user))
                    .route("/users/{username}/role", web::put().to(update_role)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
