//! End-to-end session test against the live server.
//!
//! # Design
//! Starts the server on a random port and drives `TodoSession` through a
//! reqwest-backed transport: real HTTP, real cache invalidation, real
//! completion stamping. The session is polled the way a UI event loop
//! would, sleeping between ticks until the pending work settles.

use std::sync::Arc;
use std::time::Duration;

use todo_client::{
    ActionKind, HttpMethod, HttpRequest, HttpResponse, MutationOutcome, TodoSession, Transport,
};

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { todo_server::run(listener).await });
    format!("http://{addr}")
}

fn reqwest_transport() -> Transport {
    let http = reqwest::Client::new();
    Arc::new(move |req: HttpRequest| {
        let http = http.clone();
        Box::pin(async move {
            let method = match req.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Patch => reqwest::Method::PATCH,
                HttpMethod::Delete => reqwest::Method::DELETE,
            };
            let mut builder = http.request(method, req.path.clone());
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = req.body {
                builder = builder.body(body);
            }
            let response = builder.send().await.map_err(|e| e.to_string())?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| e.to_string())?;
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body,
            })
        })
    })
}

async fn settle(session: &mut TodoSession) {
    for _ in 0..200 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        session.poll();
        if !session.is_mutating() && !session.list().is_loading() {
            return;
        }
    }
    panic!("session did not settle");
}

#[tokio::test]
async fn session_lifecycle() {
    let base_url = start_server().await;
    let mut session = TodoSession::new(&base_url, reqwest_transport());

    // Initial load: empty list, sentinel action.
    session.load();
    settle(&mut session).await;
    assert_eq!(session.list().data(), Some(&Vec::new()));
    assert_eq!(session.last_action(), MutationOutcome::none());

    // Add: input clears, list cache refreshes, outcome records the add.
    session.set_input("test todo list");
    session.add_todo();
    settle(&mut session).await;

    assert_eq!(session.input(), "");
    let action = session.last_action();
    assert_eq!(action.action, ActionKind::Add);
    assert_eq!(action.result_data.len(), 1);
    assert_eq!(action.result_data[0].title, "test todo list");

    let list = session.list().data().unwrap().clone();
    assert_eq!(list.len(), 1);
    assert!(!list[0].is_completed);

    // Toggle: the update becomes the most recent action and persists.
    session.toggle_todo(&list[0]);
    settle(&mut session).await;

    let action = session.last_action();
    assert_eq!(action.action, ActionKind::Update);
    assert!(action.result_data[0].is_completed);
    assert!(session.list().data().unwrap()[0].is_completed);

    // Add a second item, then delete the first: the delete's remaining
    // list wins the last-action view and the cache shrinks by one.
    session.set_input("second");
    session.add_todo();
    settle(&mut session).await;
    assert_eq!(session.last_action().action, ActionKind::Add);

    let id = session.list().data().unwrap()[0].id;
    session.remove_todo(id);
    settle(&mut session).await;

    let action = session.last_action();
    assert_eq!(action.action, ActionKind::Delete);
    assert_eq!(action.result_data.len(), 1);
    assert_eq!(action.result_data[0].title, "second");

    let list = session.list().data().unwrap();
    assert_eq!(list.len(), 1);
    assert!(list.iter().all(|t| t.id != id));
}

#[tokio::test]
async fn rejected_add_leaves_rendered_state_untouched() {
    let base_url = start_server().await;
    let mut session = TodoSession::new(&base_url, reqwest_transport());

    session.load();
    settle(&mut session).await;

    session.set_input("kept");
    session.add_todo();
    settle(&mut session).await;
    let before = session.last_action();

    // Empty title round-trips to the server's 400; the failure is logged
    // and nothing visible changes.
    session.set_input("");
    session.add_todo();
    settle(&mut session).await;

    assert_eq!(session.last_action(), before);
    assert_eq!(session.list().data().unwrap().len(), 1);
}
