//! Key store behavior against mock key authorities.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MockAuthority, TestIssuer, UNREACHABLE_HOST, store_for_hosts};
use sip_attestation::KeyStoreError;
use wiremock::ResponseTemplate;

#[tokio::test]
async fn miss_fetches_and_caches_key() {
    let issuer = TestIssuer::generate();
    let authority = MockAuthority::start().await;
    authority.serve(&issuer.kid(), issuer.paserk(), 1).await;

    let store = store_for_hosts([authority.host()]);

    let first = store.get_public_key(&issuer.kid()).await.unwrap();
    let second = store.get_public_key(&issuer.kid()).await.unwrap();

    assert_eq!(first, issuer.verifying_key());
    assert_eq!(second, first);
    assert!(store.contains(&issuer.kid()));
    assert_eq!(store.cached_key_count(), 1);
}

#[tokio::test]
async fn trailing_whitespace_in_body_is_ignored() {
    let issuer = TestIssuer::generate();
    let authority = MockAuthority::start().await;
    authority
        .serve(&issuer.kid(), format!("{}\r\n", issuer.paserk()), 1)
        .await;

    let store = store_for_hosts([authority.host()]);

    assert_eq!(
        store.get_public_key(&issuer.kid()).await.unwrap(),
        issuer.verifying_key()
    );
}

#[tokio::test]
async fn locally_added_key_skips_authorities() {
    let issuer = TestIssuer::generate();
    let authority = MockAuthority::start().await;
    authority.serve(&issuer.kid(), issuer.paserk(), 0).await;

    let store = store_for_hosts([authority.host()]);
    store.add_public_key(issuer.verifying_key()).await;

    assert_eq!(
        store.get_public_key(&issuer.kid()).await.unwrap(),
        issuer.verifying_key()
    );
}

#[tokio::test]
async fn not_found_everywhere_is_no_such_key_and_not_cached() {
    let issuer = TestIssuer::generate();
    let first = MockAuthority::start().await;
    let second = MockAuthority::start().await;
    first.fail(&issuer.kid(), 404, 2).await;
    second.fail(&issuer.kid(), 404, 2).await;

    let store = store_for_hosts([first.host(), second.host()]);

    for _ in 0..2 {
        let err = store.get_public_key(&issuer.kid()).await.unwrap_err();
        assert_eq!(err, KeyStoreError::NoSuchKey { kid: issuer.kid() });
    }
    assert!(!store.contains(&issuer.kid()));
}

#[tokio::test]
async fn later_authority_is_tried_after_failure() {
    let issuer = TestIssuer::generate();
    let first = MockAuthority::start().await;
    let second = MockAuthority::start().await;
    first.fail(&issuer.kid(), 404, 1).await;
    second.serve(&issuer.kid(), issuer.paserk(), 1).await;

    let store = store_for_hosts([first.host(), second.host()]);

    assert_eq!(
        store.get_public_key(&issuer.kid()).await.unwrap(),
        issuer.verifying_key()
    );
}

#[tokio::test]
async fn walk_stops_at_first_success() {
    let issuer = TestIssuer::generate();
    let first = MockAuthority::start().await;
    let second = MockAuthority::start().await;
    first.serve(&issuer.kid(), issuer.paserk(), 1).await;
    second.serve(&issuer.kid(), issuer.paserk(), 0).await;

    let store = store_for_hosts([first.host(), second.host()]);

    assert!(store.get_public_key(&issuer.kid()).await.is_ok());
}

#[tokio::test]
async fn server_error_is_status_error() {
    let issuer = TestIssuer::generate();
    let authority = MockAuthority::start().await;
    authority.fail(&issuer.kid(), 500, 1).await;

    let store = store_for_hosts([authority.host()]);
    let err = store.get_public_key(&issuer.kid()).await.unwrap_err();

    assert!(matches!(err, KeyStoreError::Status { status: 500, .. }));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn unreachable_authority_is_transport_error() {
    let issuer = TestIssuer::generate();
    let store = store_for_hosts([UNREACHABLE_HOST]);

    let err = store.get_public_key(&issuer.kid()).await.unwrap_err();

    assert!(matches!(err, KeyStoreError::Transport { .. }), "got {err:?}");
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn slow_authority_times_out() {
    let issuer = TestIssuer::generate();
    let authority = MockAuthority::start().await;
    authority
        .respond(
            &issuer.kid(),
            ResponseTemplate::new(200)
                .set_body_string(issuer.paserk())
                .set_delay(Duration::from_secs(3)),
            0..=1,
        )
        .await;

    let store = store_for_hosts([authority.host()]);
    let err = store.get_public_key(&issuer.kid()).await.unwrap_err();

    assert!(matches!(err, KeyStoreError::Transport { .. }), "got {err:?}");
}

#[tokio::test]
async fn last_authority_decides_the_error() {
    let issuer = TestIssuer::generate();
    let authority = MockAuthority::start().await;
    authority.fail(&issuer.kid(), 404, 2).await;

    let unreachable_then_missing =
        store_for_hosts([UNREACHABLE_HOST.to_string(), authority.host()]);
    assert!(
        unreachable_then_missing
            .get_public_key(&issuer.kid())
            .await
            .unwrap_err()
            .is_not_found()
    );

    let missing_then_unreachable =
        store_for_hosts([authority.host(), UNREACHABLE_HOST.to_string()]);
    assert!(matches!(
        missing_then_unreachable
            .get_public_key(&issuer.kid())
            .await
            .unwrap_err(),
        KeyStoreError::Transport { .. }
    ));
}

#[tokio::test]
async fn substituted_key_is_rejected() {
    let requested = TestIssuer::generate();
    let substitute = TestIssuer::generate();
    let authority = MockAuthority::start().await;
    authority.serve(&requested.kid(), substitute.paserk(), 1).await;

    let store = store_for_hosts([authority.host()]);
    let err = store.get_public_key(&requested.kid()).await.unwrap_err();

    assert!(matches!(err, KeyStoreError::KeyMismatch { ref kid, .. } if *kid == requested.kid()));
    assert!(!store.contains(&requested.kid()));
    assert!(!store.contains(&substitute.kid()));
}

#[tokio::test]
async fn garbage_body_is_invalid_key() {
    let issuer = TestIssuer::generate();
    let authority = MockAuthority::start().await;
    authority.serve(&issuer.kid(), "<html>maintenance</html>", 1).await;

    let store = store_for_hosts([authority.host()]);
    let err = store.get_public_key(&issuer.kid()).await.unwrap_err();

    assert!(matches!(err, KeyStoreError::InvalidKey { .. }), "got {err:?}");
}

#[tokio::test]
async fn fetch_from_host_does_not_touch_cache() {
    let issuer = TestIssuer::generate();
    let authority = MockAuthority::start().await;
    authority.serve(&issuer.kid(), issuer.paserk(), 1).await;

    let store = store_for_hosts(Vec::<String>::new());
    let key = store
        .fetch_from_host(&issuer.kid(), &authority.host())
        .await
        .unwrap();

    assert_eq!(key, issuer.verifying_key());
    assert!(!store.contains(&issuer.kid()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_misses_share_one_fetch() {
    let issuer = TestIssuer::generate();
    let authority = MockAuthority::start().await;
    authority
        .respond(
            &issuer.kid(),
            ResponseTemplate::new(200)
                .set_body_string(issuer.paserk())
                .set_delay(Duration::from_millis(100)),
            1,
        )
        .await;

    let store = store_for_hosts([authority.host()]);
    let kid = issuer.kid();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = Arc::clone(&store);
            let kid = kid.clone();
            tokio::spawn(async move { store.get_public_key(&kid).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), issuer.verifying_key());
    }
}
