use cucumber::{given, then, when};
use live_lobby_client::{Role, SessionState};
use live_lobby_tests::LobbyWorld;
use std::time::Duration;

fn parse_role(word: &str) -> Role {
    match word {
        "coordinator" => Role::Coordinator,
        "member" => Role::Member,
        other => panic!("Unknown role '{}'", other),
    }
}

fn parse_state(word: &str) -> SessionState {
    match word {
        "Idle" => SessionState::Idle,
        "Joining" => SessionState::Joining,
        "Joined" => SessionState::Joined,
        "Started" => SessionState::Started,
        "Left" => SessionState::Left,
        other => panic!("Unknown state '{}'", other),
    }
}

fn second(user: &str) -> String {
    format!("{}#2", user)
}

// ===== Given Steps =====

#[given("a running lobby server")]
async fn running_server(world: &mut LobbyWorld) {
    world.start_server().await;
}

#[given(expr = "{string} has joined lobby {string} as a {word}")]
async fn has_joined(world: &mut LobbyWorld, user: String, lobby: String, role: String) {
    world.mount(&user, &lobby, &user, parse_role(&role)).await;
    assert!(
        world.last_error.is_none(),
        "join failed: {:?}",
        world.last_error
    );
}

// ===== When Steps =====

#[when(expr = "{string} joins lobby {string} again as a {word}")]
async fn joins_again(world: &mut LobbyWorld, user: String, lobby: String, role: String) {
    let view = world.mounted(&user).session.view();
    world.remembered.insert(user.clone(), view);
    world
        .mount(&second(&user), &lobby, &user, parse_role(&role))
        .await;
}

#[when(expr = "{string} requests the start")]
async fn requests_start(world: &mut LobbyWorld, user: String) {
    world.last_error = world.mounted(&user).session.request_start().await.err();
}

#[when(expr = "{string} leaves")]
async fn leaves(world: &mut LobbyWorld, user: String) {
    world.mounted(&user).session.teardown().await;
}

// ===== Then Steps =====

#[then(expr = "{string} sees {int} participant(s)")]
async fn sees_participants(world: &mut LobbyWorld, user: String, count: usize) {
    let reached = world
        .eventually(&user, |m| m.session.view().len() == count)
        .await;
    assert!(
        reached,
        "'{}' sees {} participant(s), expected {}",
        user,
        world.mounted(&user).session.view().len(),
        count
    );
}

#[then(expr = "{string} and {string} see the same participants")]
async fn same_participants(world: &mut LobbyWorld, first: String, other: String) {
    let expected = world.mounted(&first).session.view();
    let reached = world
        .eventually(&other, |m| m.session.view() == expected)
        .await;
    assert!(reached, "'{}' and '{}' disagree on membership", first, other);
}

#[then(expr = "{string} is notified of the start exactly once")]
async fn started_once(world: &mut LobbyWorld, user: String) {
    let reached = world.eventually(&user, |m| m.started_count() >= 1).await;
    assert!(reached, "'{}' never saw the start", user);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(world.mounted(&user).started_count(), 1);
}

#[then(expr = "{string} is not notified of a start")]
async fn not_started(world: &mut LobbyWorld, user: String) {
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(world.mounted(&user).started_count(), 0);
}

#[then(expr = "{string} is in state {string}")]
async fn in_state(world: &mut LobbyWorld, user: String, state: String) {
    let expected = parse_state(&state);
    let reached = world
        .eventually(&user, |m| m.session.state() == expected)
        .await;
    assert!(
        reached,
        "'{}' is {}, expected {}",
        user,
        world.mounted(&user).session.state(),
        expected
    );
}

#[then(expr = "the request fails with {string}")]
async fn request_fails(world: &mut LobbyWorld, kind: String) {
    let error = world.last_error.as_ref().expect("the request succeeded");
    assert_eq!(error.kind().to_string(), kind);
}

#[then(expr = "the second session of {string} keeps the earlier view")]
async fn second_keeps_view(world: &mut LobbyWorld, user: String) {
    assert!(world.last_error.is_none(), "remount failed: {:?}", world.last_error);
    let expected = world
        .remembered
        .get(&user)
        .cloned()
        .expect("no view remembered");
    let label = second(&user);
    let reached = world
        .eventually(&label, |m| m.session.view() == expected)
        .await;
    assert!(reached, "remounted view differs for '{}'", user);
}

#[then(expr = "the second session of {string} reported no errors")]
async fn second_no_errors(world: &mut LobbyWorld, user: String) {
    let errors = world.mounted(&second(&user)).errors();
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[then(expr = "{string} reported no errors")]
async fn no_errors(world: &mut LobbyWorld, user: String) {
    let errors = world.mounted(&user).errors();
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}
