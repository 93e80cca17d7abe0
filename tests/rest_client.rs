use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use staffview::api::{ApiError, Employee, EmployeeApi, RestClient};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Minimal HTTP/1.1 backend answering every request with one canned response.
async fn backend(status: u16, body: &'static str) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&recorded);
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 1024];
            let header_end = loop {
                let read = stream.read(&mut chunk).await.unwrap();
                if read == 0 {
                    break None;
                }
                buffer.extend_from_slice(&chunk[..read]);
                if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                    break Some(pos + 4);
                }
            };
            let Some(header_end) = header_end else {
                continue;
            };

            let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
            let mut lines = head.split("\r\n");
            let mut request_line = lines.next().unwrap_or_default().split(' ');
            let method = request_line.next().unwrap_or_default().to_string();
            let path = request_line.next().unwrap_or_default().to_string();
            let headers: Vec<(String, String)> = lines
                .filter_map(|l| l.split_once(':'))
                .map(|(n, v)| (n.trim().to_ascii_lowercase(), v.trim().to_string()))
                .collect();

            let length: usize = headers
                .iter()
                .find(|(n, _)| n == "content-length")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(0);
            while buffer.len() < header_end + length {
                let read = stream.read(&mut chunk).await.unwrap();
                if read == 0 {
                    break;
                }
                buffer.extend_from_slice(&chunk[..read]);
            }
            let request_body = String::from_utf8_lossy(&buffer[header_end..]).to_string();
            log.lock().unwrap().push(Recorded {
                method,
                path,
                headers,
                body: request_body,
            });

            let response = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }
    });

    (format!("http://{addr}/api"), recorded)
}

fn anna() -> Employee {
    Employee {
        id: None,
        first_name: "Anna".to_string(),
        second_name: None,
        surname: "Ivanova".to_string(),
        revenue: 7.0,
        quality: 8.5,
        discipline: 10.0,
    }
}

#[tokio::test]
async fn lists_employees() {
    let (base, recorded) = backend(
        200,
        r#"[{"id": 1, "first_name": "Anna", "second_name": "Petrovna", "surname": "Ivanova",
             "revenue": 7, "quality": 8.5, "discipline": 10},
            {"id": 2, "first_name": "Oleg", "surname": "Orlov",
             "revenue": 3, "quality": 4, "discipline": 5}]"#,
    )
    .await;
    let client = RestClient::new(&base).unwrap();

    let envelope = client.list().await.unwrap();
    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.data.len(), 2);
    assert_eq!(envelope.data[0].full_name(), "Ivanova Anna Petrovna");
    assert_eq!(envelope.data[1].second_name, None);

    let requests = recorded.lock().unwrap();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/api/employees/all");
    assert_eq!(requests[0].header("accept"), Some("application/json"));
}

#[tokio::test]
async fn get_and_delete_use_id_paths() {
    let (base, recorded) = backend(
        200,
        r#"{"id": 7, "first_name": "Oleg", "surname": "Orlov", "revenue": 3, "quality": 4, "discipline": 5}"#,
    )
    .await;
    let client = RestClient::new(&base).unwrap();

    assert_eq!(client.get(7).await.unwrap().data.id, Some(7));
    assert_eq!(client.delete(7).await.unwrap().data.surname, "Orlov");

    let requests = recorded.lock().unwrap();
    let calls: Vec<(&str, &str)> = requests
        .iter()
        .map(|r| (r.method.as_str(), r.path.as_str()))
        .collect();
    assert_eq!(
        calls,
        vec![("GET", "/api/employees/get/7"), ("DELETE", "/api/employees/delete/7")]
    );
}

#[tokio::test]
async fn create_posts_json_and_accepts_empty_body() {
    let (base, recorded) = backend(201, "").await;
    let client = RestClient::new(&base).unwrap();

    let envelope = client.create(&anna()).await.unwrap();
    assert_eq!(envelope.status, 201);
    assert!(envelope.data.is_null());

    let requests = recorded.lock().unwrap();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/employees/create");
    assert_eq!(requests[0].header("content-type"), Some("application/json"));
    let sent: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(sent["surname"], "Ivanova");
    assert_eq!(sent["quality"], 8.5);
    assert!(sent.get("id").is_none());
    assert!(sent.get("second_name").is_none());
}

#[tokio::test]
async fn http_error_keeps_backend_detail() {
    let (base, _recorded) = backend(
        404,
        r#"{"detail": {"error_code": "EMPLOYEE_NOT_FOUND", "message": "Employee 9 not found"}}"#,
    )
    .await;
    let client = RestClient::new(&base).unwrap();

    let err = client.get(9).await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.error_code(), Some("EMPLOYEE_NOT_FOUND"));
    assert_eq!(err.to_string(), "HTTP 404: Employee 9 not found");
}

#[tokio::test]
async fn unexpected_shape_is_a_decode_error() {
    let (base, _recorded) = backend(200, r#"{"items": []}"#).await;
    let client = RestClient::new(&base).unwrap();

    assert!(matches!(client.list().await, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = RestClient::new(&format!("http://{addr}")).unwrap();

    assert!(matches!(client.list().await, Err(ApiError::Transport(_))));
}
