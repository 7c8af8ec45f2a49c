use super::*;
use crate::api::Credential;
use crate::router::SIGN_IN_PATH;
use crate::storage::MemoryStorage;
use crate::ui::RecordingEffects;

fn memory_context() -> (AppContext, Arc<MemoryStorage>, Arc<RecordingEffects>) {
    let storage = Arc::new(MemoryStorage::new());
    let effects = Arc::new(RecordingEffects::new());
    let ctx = AppContext::with_storage(AppConfig::default(), storage.clone(), effects.clone()).unwrap();
    (ctx, storage, effects)
}

#[test]
fn fresh_context_is_signed_out() {
    let (mut ctx, _, _) = memory_context();
    assert!(!ctx.session.is_authenticated());
    assert!(matches!(ctx.navigate("/"), Navigation::Redirect { to: SIGN_IN_PATH, .. }));
    assert!(matches!(ctx.navigate(SIGN_IN_PATH), Navigation::Proceed(_)));
}

#[tokio::test]
async fn init_rehydrates_persisted_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig { storage_path: dir.path().join("storage.json"), ..AppConfig::default() };

    let mut first = AppContext::init(config.clone(), Arc::new(RecordingEffects::new())).unwrap();
    assert!(first.session.register("a@x.com", "tmdb-key").await);
    assert!(first.session.login("a@x.com", "tmdb-key", true));
    first.teardown();

    let second = AppContext::init(config, Arc::new(RecordingEffects::new())).unwrap();
    assert!(second.session.is_authenticated());
    assert_eq!(second.session.credential(), Some(&Credential::new("tmdb-key")));
    assert_eq!(second.session.remembered_email().as_deref(), Some("a@x.com"));
}

#[tokio::test]
async fn scenario_register_login_browse_logout() {
    let (mut ctx, _, effects) = memory_context();
    assert!(ctx.session.register("a@x.com", "pw1").await);

    assert!(!ctx.session.login("a@x.com", "wrong", false));
    assert!(!ctx.session.is_authenticated());
    assert!(matches!(ctx.navigate("/browse"), Navigation::Redirect { .. }));

    assert!(ctx.session.login("a@x.com", "pw1", false));
    assert!(ctx.session.is_authenticated());
    assert!(matches!(ctx.navigate("/browse"), Navigation::Proceed(r) if r.name == "browse"));

    ctx.session.logout();
    assert!(!ctx.session.check_auth());
    assert_eq!(ctx.session.credential(), None);
    assert!(matches!(ctx.navigate("/browse"), Navigation::Redirect { .. }));
    assert_eq!(effects.navigations(), vec!["/".to_owned(), SIGN_IN_PATH.to_owned()]);
}

#[test]
fn favorites_share_context_storage() {
    let (ctx, storage, _) = memory_context();
    let movie = crate::api::Movie {
        id: 10,
        title: "Ten".to_owned(),
        poster_path: None,
        backdrop_path: None,
        overview: String::new(),
        vote_average: 6.0,
        release_date: String::new(),
        genre_ids: Vec::new(),
    };
    assert!(ctx.favorites().toggle(&movie).unwrap());
    assert!(ctx.favorites().is_favorite(10));
    assert!(Favorites::load(storage).is_favorite(10));
}

#[tokio::test]
async fn validation_enabled_wires_api_probe() {
    let storage = Arc::new(MemoryStorage::new());
    let config = AppConfig {
        api: crate::config::ApiConfig { base_url: "http://127.0.0.1:1/3".to_owned(), ..Default::default() },
        validate_credentials: true,
        ..AppConfig::default()
    };
    let ctx = AppContext::with_storage(config, storage, Arc::new(RecordingEffects::new())).unwrap();
    // Unreachable upstream: the probe fails, so registration is refused.
    assert!(!ctx.session.register("a@x.com", "key").await);
}
