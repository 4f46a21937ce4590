mod handlers;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use utils::{config::Config, db::establish_connection};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file FIRST before anything else
    dotenv::dotenv().ok();

    // Initialize logger with default level if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=================================================");
    println!("🏥 BNS Household Survey Backend");
    println!("=================================================");

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    let host = config.host.clone();
    let port = config.port;

    println!("📝 Configuration loaded:");
    println!(
        "   - Database: {}",
        config.database_url.split('@').last().unwrap_or("***")
    );
    println!("   - Host: {}", host);
    println!("   - Port: {}", port);
    println!(
        "   - Registration: {}",
        if config.allow_registration {
            "ENABLED"
        } else {
            "DISABLED"
        }
    );
    println!(
        "   - Log level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    );

    // Establish database connection
    print!("🔌 Connecting to database... ");
    let db = establish_connection(&config.database_url)
        .await
        .expect("Failed to connect to database");
    println!("✅ Connected!");

    log::info!("Database connection established");

    // Start HTTP server
    println!("🌐 Starting HTTP server at http://{}:{}", host, port);
    println!("📍 Available endpoints:");
    println!("   - POST http://{}:{}/auth/register", host, port);
    println!("   - POST http://{}:{}/auth/login", host, port);
    println!("   - GET  http://{}:{}/auth/user (JWT required)", host, port);
    println!(
        "   - GET  http://{}:{}/households (JWT required)",
        host, port
    );
    println!(
        "   - GET  http://{}:{}/households/summary (JWT required)",
        host, port
    );
    println!(
        "   - POST http://{}:{}/households/import (JWT required)",
        host, port
    );
    println!("=================================================");

    log::info!("Server started at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin(&config.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(config.clone()))
            .wrap(Logger::default())
            .wrap(cors) // CORS must be wrapped AFTER Logger to ensure headers are added to all responses
            // Public endpoints (no authentication required)
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login))
                    .route(
                        "/user",
                        web::get()
                            .to(handlers::auth::current_user)
                            .wrap(crate::middleware::auth::JwtMiddleware),
                    ),
            )
            // Household records and reports (JWT required).
            // Literal paths are registered before the {id} routes so
            // "check-duplicate", "summary", etc. are not read as ids.
            .service(
                web::scope("/households")
                    .wrap(crate::middleware::auth::JwtMiddleware)
                    .route(
                        "/check-duplicate",
                        web::get().to(handlers::households::check_duplicate),
                    )
                    .route(
                        "/summary/export",
                        web::get().to(handlers::export::export_summary),
                    )
                    .route("/summary", web::get().to(handlers::summary::get_summary))
                    .route(
                        "/export",
                        web::get().to(handlers::export::export_households),
                    )
                    .route(
                        "/import",
                        web::post().to(handlers::households::import_households),
                    )
                    .route("", web::get().to(handlers::households::list_households))
                    .route("", web::post().to(handlers::households::create_household))
                    .route("/{id}", web::get().to(handlers::households::get_household))
                    .route(
                        "/{id}",
                        web::put().to(handlers::households::update_household),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(handlers::households::delete_household),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
