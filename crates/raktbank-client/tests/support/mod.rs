//! Stub collaborator endpoints for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{http::StatusCode, routing::post, Json, Router};
use raktbank_client::{ClientConfig, RemoteClient};
use reqwest::Url;
use serde_json::Value;

/// Request bodies a stub endpoint has received, in arrival order
#[derive(Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<Value>>>);

impl Recorded {
    pub fn bodies(&self) -> Vec<Value> {
        self.0.lock().expect("recorded lock").clone()
    }

    fn push(&self, body: Value) {
        self.0.lock().expect("recorded lock").push(body);
    }
}

/// POST route that records the JSON body and answers with `status`.
pub fn recording_route(status: StatusCode) -> (axum::routing::MethodRouter, Recorded) {
    let recorded = Recorded::default();
    let sink = recorded.clone();
    let route = post(move |Json(body): Json<Value>| {
        let sink = sink.clone();
        async move {
            sink.push(body);
            status
        }
    });
    (route, recorded)
}

/// Serve `app` on an ephemeral localhost port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

pub fn remote_for(addr: SocketAddr) -> RemoteClient {
    let url = Url::parse(&format!("http://{addr}")).expect("stub url");
    ClientConfig::new(url).remote_client().expect("remote client")
}

/// A client pointed at a port nobody listens on.
pub fn unreachable_remote() -> RemoteClient {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway addr");
    drop(listener);
    remote_for(addr)
}

pub fn json_response(status: StatusCode, body: Value) -> (StatusCode, Json<Value>) {
    (status, Json(body))
}
