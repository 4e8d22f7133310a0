use crate::commands::{self, SlashCommand, PRICE_USAGE};
use crate::coordinator::Coordinator;
use crate::reply::Reply;
use actix_web::{post, web};
use tracing::{info, Instrument};

#[post("/slack/price")]
pub async fn quote(coordinator: web::Data<Coordinator>, form: web::Form<SlashCommand>) -> Reply {
    let command = form.into_inner();
    let span = command.span();

    async move {
        let symbol = match commands::parse_price(&command.text) {
            Ok(symbol) => symbol,
            Err(e) => {
                info!(error = %e, text = %command.text, "rejected /price");
                return Reply::private(PRICE_USAGE);
            }
        };

        info!(symbol = %symbol, "looking up price");

        coordinator
            .respond(symbol, command.deferred_target())
            .await
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timing;
    use crate::reply::Visibility;
    use actix_web::{test, App};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use stockbot::quote::QuoteResult;
    use stockbot::resolver::{Interface as ResolverInterface, MockInterface as MockResolverInterface};

    #[actix_web::test]
    async fn test_quote_usage() {
        let coordinator = web::Data::new(Coordinator::new(None, Timing::default()));

        let app = test::init_service(App::new().app_data(coordinator).service(quote)).await;

        let request = test::TestRequest::post()
            .uri("/slack/price")
            .set_form([("text", "   ")])
            .to_request();

        let reply: Reply = test::call_and_read_body_json(&app, request).await;

        assert_eq!(reply, Reply::private(PRICE_USAGE));
    }

    #[actix_web::test]
    async fn test_quote_live() {
        let mut mock_resolver = MockResolverInterface::new();

        mock_resolver
            .expect_resolve()
            .withf(|symbol, _| symbol.as_str() == "AAPL")
            .times(1)
            .returning(|_, _| QuoteResult::Live {
                price: Decimal::new(18950, 2),
                change: Decimal::new(-120, 2),
                change_percent: "-0.63%".to_string(),
            });

        let mock_resolver: Arc<dyn ResolverInterface> = Arc::new(mock_resolver);

        let coordinator = web::Data::new(Coordinator::new(Some(mock_resolver), Timing::default()));

        let app = test::init_service(App::new().app_data(coordinator).service(quote)).await;

        let request = test::TestRequest::post()
            .uri("/slack/price")
            .set_form([("text", "aapl"), ("command", "/price"), ("user_id", "U1")])
            .to_request();

        let reply: Reply = test::call_and_read_body_json(&app, request).await;

        assert_eq!(reply.visibility, Visibility::Public);
        assert_eq!(reply.text, "AAPL: $189.50 (Δ -1.2000, -0.63%)");
    }
}
