pub mod http_server;
pub mod middleware;
pub mod models;
pub mod routes;
