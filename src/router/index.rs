use crate::graphql::index::graphql_routes;
use crate::uploader::index::upload_routes;
use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(graphql_routes);
    cfg.configure(upload_routes);
}
