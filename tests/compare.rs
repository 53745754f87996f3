//! Integration tests for the dual-target comparator.
//!
//! Two `httptest` servers play production and a single backend; the
//! connect-to override points at the second one.

#[cfg(test)]
mod tests {
    use httptest::{matchers::*, responders::*, Expectation, Server};

    use http_test::compare::body_digest;
    use http_test::initialization::init_crypto_provider;
    use http_test::{
        fire_and_compare, AssertionFailure, Config, ConnectTo, Failure, RequestSpec,
        RequirementSet,
    };

    fn config() -> Config {
        init_crypto_provider();
        Config::default()
    }

    fn serve(path: &'static str, status: u16, body: &'static str, backend: &'static str) -> Server {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", path)).respond_with(
                status_code(status)
                    .insert_header("X-Backend", backend)
                    .body(body),
            ),
        );
        server
    }

    fn connect_to(server: &Server) -> ConnectTo {
        ConnectTo::parse(&server.addr().to_string()).expect("connect-to")
    }

    #[tokio::test]
    async fn test_identical_bodies_pass_despite_different_headers() {
        let production = serve("/page", 200, "<html>same</html>", "prod-1");
        let backend = serve("/page", 200, "<html>same</html>", "backend-7");

        let spec = RequestSpec::new(production.url_str("/page"));
        let requirements = RequirementSet::new().with_status(200);
        let outcome = fire_and_compare(&spec, &requirements, &connect_to(&backend), &config()).await;
        assert!(outcome.is_ok(), "unexpected failure: {outcome:?}");
    }

    #[tokio::test]
    async fn test_different_bodies_fail_with_digest_mismatch() {
        let production = serve("/page", 200, "version 1", "prod-1");
        let backend = serve("/page", 200, "version 2", "backend-7");

        let spec = RequestSpec::new(production.url_str("/page"));
        let requirements = RequirementSet::new().with_status(200);
        let target = connect_to(&backend);
        match fire_and_compare(&spec, &requirements, &target, &config()).await {
            Err(Failure::DigestMismatch {
                connect_to,
                primary,
                secondary,
            }) => {
                assert_eq!(connect_to, target.as_str());
                assert_eq!(primary, body_digest(b"version 1"));
                assert_eq!(secondary, body_digest(b"version 2"));
            }
            other => panic!("expected digest mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_digest_skipped_when_status_is_not_200() {
        let production = serve("/missing", 404, "not here", "prod-1");
        let backend = serve("/missing", 404, "nothing to see", "backend-7");

        let spec = RequestSpec::new(production.url_str("/missing"));
        let requirements = RequirementSet::new().with_status(404);
        let outcome = fire_and_compare(&spec, &requirements, &connect_to(&backend), &config()).await;
        assert!(outcome.is_ok(), "unexpected failure: {outcome:?}");
    }

    #[tokio::test]
    async fn test_backend_failure_names_connect_to() {
        let production = serve("/page", 200, "ok", "prod-1");
        let backend = serve("/page", 500, "boom", "backend-7");

        let spec = RequestSpec::new(production.url_str("/page"));
        let requirements = RequirementSet::new().with_status(200);
        let target = connect_to(&backend);
        match fire_and_compare(&spec, &requirements, &target, &config()).await {
            Err(Failure::ConnectTo {
                connect_to,
                failure,
            }) => {
                assert_eq!(connect_to, target.as_str());
                assert!(matches!(
                    *failure,
                    Failure::Assertion(AssertionFailure::Status {
                        expected: 200,
                        observed: 500
                    })
                ));
            }
            other => panic!("expected connect-to failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_both_failures_are_reported() {
        let production = serve("/page", 503, "down", "prod-1");
        let backend = serve("/page", 502, "down too", "backend-7");

        let spec = RequestSpec::new(production.url_str("/page"));
        let requirements = RequirementSet::new().with_status(200);
        let outcome = fire_and_compare(&spec, &requirements, &connect_to(&backend), &config()).await;
        match outcome {
            Err(failure @ Failure::Both { .. }) => {
                let message = failure.to_string();
                assert!(message.contains("503"), "{message}");
                assert!(message.contains("502"), "{message}");
            }
            other => panic!("expected both to fail, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backend_sees_child_identity() {
        let production = Server::run();
        let backend = Server::run();
        let spec = RequestSpec::new(production.url_str("/id"));

        production.expect(
            Expectation::matching(request::headers(contains((
                "user-agent",
                matches("^HTTPTEST/[0-9]+\\.[A-Z0-9]{4}$"),
            ))))
            .respond_with(status_code(200).body("same")),
        );
        backend.expect(
            Expectation::matching(request::headers(contains((
                "user-agent",
                matches("^HTTPTEST/[0-9]+\\.[A-Z0-9]{4}-B$"),
            ))))
            .respond_with(status_code(200).body("same")),
        );

        let requirements = RequirementSet::new().with_status(200);
        let outcome = fire_and_compare(&spec, &requirements, &connect_to(&backend), &config()).await;
        assert!(outcome.is_ok(), "unexpected failure: {outcome:?}");
    }
}
