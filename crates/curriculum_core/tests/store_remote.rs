use curriculum_core::{
    ApiError, ApiRequest, Curriculum, CurriculumApi, CurriculumStore, HttpMethod, NodeFields,
    NodePatch, NodePath, RemoteCurriculumStore,
};
use std::cell::{Cell, RefCell};

/// In-process backend that accepts curriculum creation and records every call.
#[derive(Default)]
struct FakeApi {
    server: RefCell<Vec<Curriculum>>,
    sent: RefCell<Vec<ApiRequest>>,
    fetches: Cell<usize>,
    offline: Cell<bool>,
}

impl FakeApi {
    fn with_math() -> Self {
        let api = Self::default();
        api.server.borrow_mut().push(
            serde_json::from_str(r#"{"id":"c1","name":"Math","grades":[{"id":"g1","name":"G1"}]}"#)
                .unwrap(),
        );
        api
    }
}

impl CurriculumApi for FakeApi {
    fn fetch_curricula(&self) -> Result<Vec<Curriculum>, ApiError> {
        self.fetches.set(self.fetches.get() + 1);
        if self.offline.get() {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(self.server.borrow().clone())
    }

    fn send(&self, request: &ApiRequest) -> Result<(), ApiError> {
        if self.offline.get() {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        self.sent.borrow_mut().push(request.clone());
        if request.method == HttpMethod::Post && request.path == "/curriculums" {
            let body = request.body.clone().unwrap();
            self.server
                .borrow_mut()
                .push(serde_json::from_value(body).unwrap());
        }
        Ok(())
    }
}

#[test]
fn mutation_sends_one_request_then_reloads() {
    let api = FakeApi::with_math();
    let mut store = RemoteCurriculumStore::new(&api);
    assert_eq!(api.fetches.get(), 1);
    assert_eq!(store.curricula().len(), 1);

    let id = store.add_curriculum("Science", NodeFields::default()).unwrap();

    assert_eq!(api.sent.borrow().len(), 1);
    assert_eq!(api.sent.borrow()[0].path, "/curriculums");
    assert_eq!(api.fetches.get(), 2);
    assert!(store.tree().contains(&NodePath::curriculum(id)));
    assert_eq!(store.last_error(), None);
}

#[test]
fn accepted_update_is_only_visible_after_server_applies_it() {
    let api = FakeApi::with_math();
    let mut store = RemoteCurriculumStore::new(&api);
    let grade = NodePath::curriculum("c1").grade("g1");

    assert!(store.update_grade(&grade, NodePatch::name("Grade One")));

    let sent = api.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, HttpMethod::Put);
    assert_eq!(sent[0].path, "/grades/g1");
    // The fake backend ignores updates, so the reload shows server state.
    assert_eq!(store.tree().get(&grade).unwrap().data.name, "G1");
}

#[test]
fn transport_failure_sets_error_and_keeps_tree() {
    let api = FakeApi::with_math();
    let mut store = RemoteCurriculumStore::new(&api);
    api.offline.set(true);

    assert!(!store.delete_grade(&NodePath::curriculum("c1").grade("g1")));

    let message = store.last_error().unwrap().to_string();
    assert!(message.contains("Failed to delete grade"), "{message}");
    assert!(message.contains("connection refused"), "{message}");
    assert!(store.tree().contains(&NodePath::curriculum("c1").grade("g1")));
    assert_eq!(api.fetches.get(), 1);

    store.clear_error();
    assert_eq!(store.last_error(), None);
}

#[test]
fn unresolved_path_sends_nothing() {
    let api = FakeApi::with_math();
    let mut store = RemoteCurriculumStore::new(&api);

    assert!(store
        .add_book(&NodePath::curriculum("c1").grade("missing"), "B1", NodeFields::default())
        .is_none());
    assert!(api.sent.borrow().is_empty());
    assert_eq!(api.fetches.get(), 1);
}

#[test]
fn initial_load_failure_starts_empty_with_error() {
    let api = FakeApi::with_math();
    api.offline.set(true);
    let store = RemoteCurriculumStore::new(&api);

    assert!(store.tree().is_empty());
    assert!(store.last_error().unwrap().contains("load curricula"));
}

#[test]
fn successful_retry_clears_previous_error() {
    let api = FakeApi::with_math();
    api.offline.set(true);
    let mut store = RemoteCurriculumStore::new(&api);
    assert!(store.last_error().is_some());

    api.offline.set(false);
    store.reload();
    assert_eq!(store.last_error(), None);
    assert_eq!(store.curricula().len(), 1);

    api.offline.set(true);
    assert!(!store.delete_grade(&NodePath::curriculum("c1").grade("g1")));
    assert!(store.last_error().is_some());

    api.offline.set(false);
    assert!(store.add_curriculum("Science", NodeFields::default()).is_some());
    assert_eq!(store.last_error(), None);
}
