use std::time::Duration;

use h1_pipeline::handler::make_handler;
use h1_pipeline::message::{IncomingMessage, OutgoingMessage};
use h1_pipeline::server::Server;
use indoc::indoc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn start_server() -> std::net::SocketAddr {
    let handler = make_handler(|mut request: IncomingMessage, mut response: OutgoingMessage| async move {
        let body = request.body_mut().collect_bytes().await.unwrap();
        if request.url() == "/slow" {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        response.set_header("x-path", request.url()).unwrap();
        response.write(format!("{} ", request.method())).unwrap();
        response.end_with(body).unwrap();
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::builder().address(addr).handler(handler).build().unwrap();
    tokio::spawn(server.serve(listener));
    addr
}

#[tokio::test]
async fn pipelined_requests_over_tcp() {
    let addr = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let requests = indoc! {"
        POST /slow HTTP/1.1
        Host: localhost
        Content-Length: 3

        one
        GET /fast HTTP/1.1
        Host: localhost
        Connection: close

    "};
    stream.write_all(requests.replace('\n', "\r\n").replace("one\r\n", "one").as_bytes()).await.unwrap();

    let mut output = String::new();
    stream.read_to_string(&mut output).await.unwrap();

    assert_eq!(
        output,
        "HTTP/1.1 200 OK\r\nx-path: /slow\r\ntransfer-encoding: chunked\r\n\r\n5\r\nPOST \r\n3\r\none\r\n0\r\n\r\n\
         HTTP/1.1 200 OK\r\nx-path: /fast\r\nconnection: close\r\ntransfer-encoding: chunked\r\n\r\n4\r\nGET \r\n0\r\n\r\n"
    );
}

#[tokio::test]
async fn connections_are_independent() {
    let addr = start_server().await;

    let mut broken = TcpStream::connect(addr).await.unwrap();
    broken.write_all(b"NOT HTTP AT ALL\r\n\r\n").await.unwrap();

    let mut healthy = TcpStream::connect(addr).await.unwrap();
    healthy.write_all(b"GET /ok HTTP/1.0\r\n\r\n").await.unwrap();

    let mut output = String::new();
    healthy.read_to_string(&mut output).await.unwrap();
    assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(output.contains("connection: close\r\n"));
    assert!(output.ends_with("GET "));

    let mut rest = Vec::new();
    broken.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}
