// src/server.rs

//! HTTP search endpoint.
//!
//! `GET /news?q=<term>` answers with a JSON array of `{link, title}`,
//! newest first. Store failures become a `500` with a plain-text cause.

use actix_web::dev::Server;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use serde::Deserialize;

use crate::models::ServerConfig;
use crate::services::QueryService;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

async fn search(params: web::Query<SearchParams>, service: web::Data<QueryService>) -> HttpResponse {
    match service.handle(params.q.as_deref()).await {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(e) => {
            log::error!("Search for {:?} failed: {}", params.q, e);
            HttpResponse::InternalServerError()
                .content_type("text/plain; charset=utf-8")
                .body(e.to_string())
        }
    }
}

/// Register the search routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/news", web::get().to(search))
        .route("/news/", web::get().to(search));
}

/// Bind the search server without starting to serve.
///
/// Binding eagerly lets callers fail before any background work starts.
pub fn bind(config: &ServerConfig, service: QueryService) -> std::io::Result<Server> {
    let data = web::Data::new(service);
    let address = config.address();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(&address)?
    .run();

    log::info!("Search endpoint listening on http://{}/news", address);
    Ok(server)
}
