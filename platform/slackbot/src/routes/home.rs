use actix_web::{get, HttpResponse};

pub const BANNER: &str = "StockBot is up. Use /price and /watchlist in Slack.";

#[get("/")]
pub async fn banner() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(BANNER)
}
