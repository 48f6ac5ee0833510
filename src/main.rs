use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use login_risk_scoring::api;
use login_risk_scoring::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    let config = Config::from_env();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(config.log_level.clone()));

    let bind_addr = config.bind_addr.clone();
    let state = web::Data::new(login_risk_scoring::build_app_state(config));

    info!("login-risk-scoring starting on {bind_addr}");
    info!("models loaded: {}", state.models_loaded);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .route("/health", web::get().to(api::health))
            .service(
                web::scope("/v1")
                    .route("/analyze", web::post().to(api::analyze))
                    .route("/feedback", web::post().to(api::feedback)),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
