use crate::commands::{
    Error as CommandError, SlashCommand, WatchlistCommand, WATCHLIST_INVALID, WATCHLIST_USAGE,
};
use crate::coordinator::Coordinator;
use crate::reply::{self, Reply};
use actix_web::{post, web};
use std::sync::Arc;
use stockbot::watchlist::Interface as WatchlistInterface;
use tracing::{info, Instrument};

#[post("/slack/watchlist")]
pub async fn dispatch(
    watchlist: web::Data<Arc<dyn WatchlistInterface>>,
    coordinator: web::Data<Coordinator>,
    form: web::Form<SlashCommand>,
) -> Reply {
    let command = form.into_inner();
    let span = command.span();

    async move {
        let parsed = match WatchlistCommand::parse(&command.text) {
            Ok(parsed) => parsed,
            Err(CommandError::Empty) => return Reply::private(WATCHLIST_USAGE),
            Err(e) => {
                info!(error = %e, text = %command.text, "rejected /watchlist");
                return Reply::private(WATCHLIST_INVALID);
            }
        };

        match parsed {
            WatchlistCommand::Add(symbols) => {
                watchlist.add(&symbols);
                info!(count = symbols.len(), "watchlist add");
                Reply::public(reply::added(&symbols))
            }
            WatchlistCommand::Remove(symbols) => {
                let removal = watchlist.remove(&symbols);
                info!(
                    removed = removal.removed.len(),
                    missing = removal.missing.len(),
                    "watchlist remove"
                );
                Reply::public(reply::removed(&removal))
            }
            WatchlistCommand::List => {
                let symbols = watchlist.list();
                info!(count = symbols.len(), "watchlist list");
                coordinator
                    .respond_batch(symbols, command.deferred_target())
                    .await
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timing;
    use actix_web::{test, App};
    use stockbot::quote::Symbol;
    use stockbot::watchlist::{MockInterface as MockWatchlistInterface, Removal, Watchlist};

    fn symbols(raw: &[&str]) -> Vec<Symbol> {
        raw.iter().map(|s| Symbol::parse(s).unwrap()).collect()
    }

    #[actix_web::test]
    async fn test_command_flow() {
        let watchlist: Arc<dyn WatchlistInterface> = Arc::new(Watchlist::new());
        let coordinator = web::Data::new(Coordinator::new(None, Timing::default()));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(watchlist))
                .app_data(coordinator)
                .service(dispatch),
        )
        .await;

        let send = |text: &'static str| {
            test::TestRequest::post()
                .uri("/slack/watchlist")
                .set_form([("text", text)])
                .to_request()
        };

        let reply: Reply = test::call_and_read_body_json(&app, send("list")).await;
        assert_eq!(reply, Reply::public(reply::WATCHLIST_EMPTY));

        let reply: Reply = test::call_and_read_body_json(&app, send("add msft aapl")).await;
        assert_eq!(reply, Reply::public("✅ Added: MSFT, AAPL"));

        let reply: Reply = test::call_and_read_body_json(&app, send("remove MSFT GOOG")).await;
        assert_eq!(reply, Reply::public("🗑️ Removed: MSFT. Not in list: GOOG"));

        let reply: Reply = test::call_and_read_body_json(&app, send("list")).await;
        assert_eq!(
            reply,
            Reply::public(
                "📊 Watchlist:\nAAPL: (quote provider is not configured, set ALPHA_VANTAGE_API_KEY)"
            )
        );
    }

    #[actix_web::test]
    async fn test_command_usage_and_invalid() {
        let mut mock_watchlist = MockWatchlistInterface::new();
        mock_watchlist.expect_add().never();
        mock_watchlist.expect_remove().never();
        mock_watchlist.expect_list().never();

        let watchlist: Arc<dyn WatchlistInterface> = Arc::new(mock_watchlist);
        let coordinator = web::Data::new(Coordinator::new(None, Timing::default()));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(watchlist))
                .app_data(coordinator)
                .service(dispatch),
        )
        .await;

        for (text, expected) in [
            ("", WATCHLIST_USAGE),
            ("add", WATCHLIST_INVALID),
            ("clear", WATCHLIST_INVALID),
        ] {
            let request = test::TestRequest::post()
                .uri("/slack/watchlist")
                .set_form([("text", text)])
                .to_request();

            let reply: Reply = test::call_and_read_body_json(&app, request).await;

            assert_eq!(reply, Reply::private(expected));
        }
    }

    #[actix_web::test]
    async fn test_command_remove_uses_store_result() {
        let mut mock_watchlist = MockWatchlistInterface::new();

        mock_watchlist
            .expect_remove()
            .withf(|requested| requested == symbols(&["TSLA"]).as_slice())
            .times(1)
            .returning(|requested| Removal {
                removed: vec![],
                missing: requested.to_vec(),
            });

        let watchlist: Arc<dyn WatchlistInterface> = Arc::new(mock_watchlist);
        let coordinator = web::Data::new(Coordinator::new(None, Timing::default()));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(watchlist))
                .app_data(coordinator)
                .service(dispatch),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/slack/watchlist")
            .set_form([("text", "remove tsla")])
            .to_request();

        let reply: Reply = test::call_and_read_body_json(&app, request).await;

        assert_eq!(reply, Reply::public("Not in list: TSLA"));
    }
}
