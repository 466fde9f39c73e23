// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

//! Single-shot HTTP responder standing in for a geolocation service.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What the service received.
pub struct Captured {
    pub head: String,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let mut parts = line.splitn(2, ':');
            let key = parts.next()?.trim();
            let value = parts.next()?.trim();
            if key.eq_ignore_ascii_case(name) {Some(value)} else {None}
        })
    }
}

pub struct Stub {
    pub url: String,
    handle: JoinHandle<Captured>,
}

impl Stub {
    /// Answers the next request with `status` and a JSON `body`.
    pub fn reply(status: &str, body: &str) -> Stub {
        Self::spawn(status.to_string(), body.to_string(), None)
    }

    /// Reads the request, then stays silent for `delay`.
    pub fn stall(delay: Duration) -> Stub {
        Self::spawn("200 OK".to_string(), "{}".to_string(), Some(delay))
    }

    fn spawn(status: String, body: String, delay: Option<Duration>) -> Stub {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/geolocate",
            listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let captured = read_request(&mut stream);
            if let Some(delay) = delay {
                thread::sleep(delay);
                return captured;
            }
            let response = format!("HTTP/1.1 {}\r\n\
                Content-Type: application/json\r\n\
                Content-Length: {}\r\n\
                Connection: close\r\n\r\n{}", status, body.len(), body);
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            captured
        });
        Stub {url, handle}
    }

    pub fn captured(self) -> Captured {
        self.handle.join().unwrap()
    }
}

fn read_request<R: Read>(stream: &mut R) -> Captured {
    let mut data = Vec::new();
    let mut buf = [0; 4096];
    let head_end = loop {
        let n = stream.read(&mut buf).unwrap();
        assert!(n > 0, "connection closed before headers");
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&data[..head_end]).into_owned();
    let mut captured = Captured {head, body: data[head_end..].to_vec()};
    let length = captured.header("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    while captured.body.len() < length {
        let n = stream.read(&mut buf).unwrap();
        assert!(n > 0, "connection closed before body");
        captured.body.extend_from_slice(&buf[..n]);
    }
    captured
}
