use axum::response::IntoResponse;
use http::header::CONTENT_TYPE;

pub(crate) async fn serve_style_css() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css")], include_str!("../static/style.css"))
}
