use focus_server::{ApiError, NewUser, UserRepository};

fn temp_repo() -> (tempfile::TempDir, UserRepository) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("test.db");
    let repo = UserRepository::new(db_path.to_str().unwrap()).expect("open repository");
    (dir, repo)
}

fn new_user(name: &str) -> NewUser {
    NewUser {
        username: name.to_string(),
        password: "hunter2".to_string(),
    }
}

#[test]
fn create_and_fetch_round_trip() {
    let (_dir, repo) = temp_repo();
    let created = repo.create(new_user("alice")).expect("create");
    assert_eq!(created.username, "alice");

    let fetched = repo.get(created.id).expect("get").expect("present");
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.username, "alice");
}

#[test]
fn duplicate_username_is_a_conflict() {
    let (_dir, repo) = temp_repo();
    repo.create(new_user("bob")).expect("first create");
    let err = repo.create(new_user("bob")).unwrap_err();
    assert!(matches!(err, ApiError::UsernameTaken), "got {err:?}");
}

#[test]
fn list_returns_users_in_insertion_order() {
    let (_dir, repo) = temp_repo();
    repo.create(new_user("a")).unwrap();
    repo.create(new_user("b")).unwrap();
    repo.create(new_user("c")).unwrap();
    let names: Vec<_> = repo
        .list()
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn delete_reports_whether_a_row_existed() {
    let (_dir, repo) = temp_repo();
    let user = repo.create(new_user("gone")).unwrap();
    assert!(repo.delete(user.id).unwrap());
    assert!(!repo.delete(user.id).unwrap());
    assert!(repo.get(user.id).unwrap().is_none());
}

#[test]
fn api_shape_hides_the_password() {
    let (_dir, repo) = temp_repo();
    let user = repo.create(new_user("careful")).unwrap();
    let api = user.to_api();
    let json = serde_json::to_value(&api).unwrap();
    assert!(json.get("password").is_none());
    assert_eq!(json["username"], "careful");
}
