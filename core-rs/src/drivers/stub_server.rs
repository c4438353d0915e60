//! Loopback HTTP server with scripted responses for driver tests
//!
//! Each connection carries one request (`Connection: close`). The responder
//! receives the request target (path and query) and returns a status and
//! JSON body.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::config::ClientConfig;

pub struct StubServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
    targets: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&str) -> (u16, String) + Send + 'static,
    {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let targets = Arc::new(Mutex::new(Vec::new()));

        let (thread_hits, thread_targets) = (hits.clone(), targets.clone());
        thread::spawn(move || {
            for stream in listener.incoming() {
                let mut stream = match stream {
                    Ok(stream) => stream,
                    Err(_) => continue,
                };
                let mut reader = match stream.try_clone() {
                    Ok(clone) => BufReader::new(clone),
                    Err(_) => continue,
                };

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut header = String::new();
                    match reader.read_line(&mut header) {
                        Ok(0) | Err(_) => break,
                        Ok(_) if header == "\r\n" => break,
                        Ok(_) => {}
                    }
                }

                let target = request_line.split_whitespace().nth(1).unwrap_or("").to_string();
                thread_hits.fetch_add(1, Ordering::SeqCst);
                thread_targets.lock().unwrap().push(target.clone());

                let (status, body) = respond(&target);
                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { base_url, hits, targets }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

/// Client settings that reach the loopback server directly
pub fn config() -> ClientConfig {
    ClientConfig {
        timeout_secs: 5,
        connect_timeout_secs: 5,
        use_system_proxy: false,
        ..ClientConfig::default()
    }
}

/// `page=<n>` from a request target
pub fn page_of(target: &str) -> usize {
    target
        .split(|c| c == '?' || c == '&')
        .find_map(|pair| pair.strip_prefix("page="))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}
