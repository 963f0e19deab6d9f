use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "SHAREPOINT_SYNC_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_ENV)
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Starts a Graph stand-in, or returns `None` when localhost cannot be bound.
///
/// Sandboxes without loopback networking skip; set
/// `SHAREPOINT_SYNC_REQUIRE_SOCKET_TESTS=1` to turn the skip into a failure.
#[track_caller]
pub fn graph_mock_or_skip() -> impl Future<Output = Option<MockServer>> {
    let caller = Location::caller();
    let bindable = TcpListener::bind("127.0.0.1:0").is_ok();
    async move {
        if bindable {
            return Some(MockServer::start().await);
        }
        let message = format!(
            "[graph-mock] cannot bind localhost at {}:{}",
            caller.file(),
            caller.line()
        );
        assert!(!sockets_required(), "{message}; {REQUIRE_ENV} is set");
        eprintln!("{message}; skipping");
        None
    }
}
