use actix_cors::Cors;
use actix_web::http::header;

pub fn cors_middleware() -> Cors {
    // Allow the canvas frontend dev server
    Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://localhost:5173")
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}
