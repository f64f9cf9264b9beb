#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::thread;

use tempfile::{TempDir, tempdir};

pub const VALID_CNPJ: &str = "19131243000197";

pub fn sample_body(cnpj: &str) -> String {
    format!(
        r#"{{
            "cnpj": "{cnpj}",
            "razao_social": "PADARIA SÃO JOÃO LTDA",
            "natureza_juridica": "Sociedade Empresária Limitada",
            "data_inicio_atividade": "2013-10-03",
            "opcao_pelo_simples": true,
            "data_opcao_pelo_simples": "2014-01-01",
            "data_exclusao_do_simples": null,
            "uf": "SP"
        }}"#
    )
}

/// Temporary directory standing in for the folder beside the executable.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the workspace; the file is not created.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, contents).expect("write workspace file");
        path
    }
}

/// Minimal HTTP/1.1 server answering canned responses keyed by request path.
/// Unknown paths get a 404.
pub struct StubRegistry {
    addr: SocketAddr,
}

impl StubRegistry {
    pub fn serve(routes: Vec<(String, u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub registry");
        let addr = listener.local_addr().expect("stub address");
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                respond(stream, &routes);
            }
        });
        Self { addr }
    }

    /// Answers 200 with a sample record for each identifier in `found`.
    pub fn with_records(found: &[&str]) -> Self {
        let routes = found
            .iter()
            .map(|cnpj| (format!("/api/cnpj/v1/{cnpj}"), 200, sample_body(cnpj)))
            .collect();
        Self::serve(routes)
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/api/cnpj/v1/{{cnpj}}", self.addr)
    }
}

/// Endpoint on a port nobody listens on.
pub fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}/api/cnpj/v1/{{cnpj}}")
}

fn respond(mut stream: TcpStream, routes: &[(String, u16, String)]) {
    let Ok(clone) = stream.try_clone() else { return };
    let mut reader = BufReader::new(clone);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) => break,
            Ok(_) if header == "\r\n" => break,
            Ok(_) => continue,
            Err(_) => return,
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = routes
        .iter()
        .find(|(route, _, _)| route == path)
        .map(|(_, status, body)| (*status, body.as_str()))
        .unwrap_or((404, r#"{"message": "CNPJ não encontrado"}"#));
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
