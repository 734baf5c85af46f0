mod helpers;

use ferrous_ipstack_application::use_cases::ResolveHostnameUseCase;
use ferrous_ipstack_domain::{AddressList, ResolveError};
use helpers::MockHostnameResolver;
use smallvec::smallvec;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn make_use_case(resolver: Arc<MockHostnameResolver>, max_outstanding: usize) -> ResolveHostnameUseCase {
    ResolveHostnameUseCase::new(resolver, Duration::from_millis(500), 2, max_outstanding)
}

#[tokio::test]
async fn test_execute_returns_resolver_addresses_in_order() {
    let resolver = Arc::new(MockHostnameResolver::new());
    let addresses: AddressList = smallvec![ip("192.0.2.1"), ip("192.0.2.2")];
    resolver.set_response("example.test", Ok(addresses.clone()));

    let use_case = make_use_case(resolver.clone(), 4);
    let result = use_case.execute("example.test").await.unwrap();

    assert_eq!(result, addresses);
    assert_eq!(
        resolver.calls(),
        vec![("example.test".to_string(), Duration::from_millis(500), 2)]
    );
}

#[tokio::test]
async fn test_empty_hostname_never_reaches_resolver() {
    let resolver = Arc::new(MockHostnameResolver::new());
    let use_case = make_use_case(resolver.clone(), 4);

    let result = use_case.execute("").await;

    assert!(matches!(result, Err(ResolveError::InvalidHostname(_))));
    assert!(resolver.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_label_rejected() {
    let resolver = Arc::new(MockHostnameResolver::new());
    let use_case = make_use_case(resolver.clone(), 4);

    let name = format!("{}.test", "x".repeat(64));
    let result = use_case.execute(&name).await;

    assert!(matches!(result, Err(ResolveError::InvalidHostname(_))));
    assert!(resolver.calls().is_empty());
}

#[tokio::test]
async fn test_execute_with_passes_explicit_limits() {
    let resolver = Arc::new(MockHostnameResolver::new());
    resolver.set_response("example.test", Err(ResolveError::ServerFailure));

    let use_case = make_use_case(resolver.clone(), 4);
    let result = use_case
        .execute_with("example.test", Duration::from_millis(100), 0)
        .await;

    assert_eq!(result, Err(ResolveError::ServerFailure));
    assert_eq!(resolver.calls()[0].1, Duration::from_millis(100));
    assert_eq!(resolver.calls()[0].2, 0);
}

#[tokio::test]
async fn test_outstanding_resolutions_are_bounded() {
    let resolver = Arc::new(MockHostnameResolver::new().with_delay(Duration::from_millis(20)));
    for i in 0..6 {
        resolver.set_response(&format!("host{}.test", i), Ok(smallvec![ip("192.0.2.9")]));
    }

    let use_case = Arc::new(make_use_case(resolver.clone(), 2));
    assert_eq!(use_case.available_slots(), 2);

    let mut handles = Vec::new();
    for i in 0..6 {
        let use_case = use_case.clone();
        handles.push(tokio::spawn(async move {
            use_case.execute(&format!("host{}.test", i)).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert!(resolver.max_in_flight() <= 2);
    assert_eq!(resolver.calls().len(), 6);
}
